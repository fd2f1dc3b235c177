//! CIパイプライン設定ドキュメント
//!
//! ステージ一覧とジョブ（ラベル → 定義）で構成される。
//! 各インポートはステージ1つ、隠しジョブ1つ、パッケージ・バージョンごとのジョブに展開される。
//!
//! ```yaml
//! stages:
//! - import1
//! .import1:scripts:
//!   image: node:alpine
//!   stage: import1
//!   needs: []
//!   script:
//!   - ...
//! import1:lodash:4.17.21:
//!   extends: .import1:scripts
//!   variables:
//!     PACKAGE_NAME: lodash
//!     PACKAGE_VERSION: 4.17.21
//! ```

use crate::error::{ImporterError, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// 隠しジョブ
///
/// 直接スケジュールされず、`extends` で各パッケージのジョブから参照される。
/// パッケージのインポートに必要なスクリプトはすべてここに置く。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiddenJob {
    #[serde(skip)]
    label: String,
    pub image: String,
    pub stage: String,
    pub needs: Vec<String>,
    #[serde(rename = "script")]
    pub scripts: Vec<String>,
}

impl HiddenJob {
    /// ラベルは `.` で始まる必要がある
    pub fn new(label: String, stage: &str, image: &str, scripts: Vec<String>) -> Result<Self> {
        if !label.starts_with('.') {
            return Err(ImporterError::InvalidHiddenJobLabel(label));
        }

        Ok(Self {
            label,
            image: image.to_string(),
            stage: stage.to_string(),
            needs: Vec::new(),
            scripts,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// パッケージ1バージョン分のジョブ
///
/// スクリプトは隠しジョブにあるため、環境変数だけを持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    #[serde(skip)]
    label: String,
    pub extends: String,
    pub variables: BTreeMap<String, String>,
}

impl Job {
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// パイプラインのジョブ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PipelineJob {
    Hidden(HiddenJob),
    Standard(Job),
}

impl PipelineJob {
    pub fn label(&self) -> &str {
        match self {
            PipelineJob::Hidden(job) => job.label(),
            PipelineJob::Standard(job) => job.label(),
        }
    }
}

/// 追加するジョブの定義
#[derive(Debug, Clone, Default)]
pub struct StandardJob {
    stage: String,
    package_name: String,
    package_version: String,
    env_vars: BTreeMap<String, String>,
}

impl StandardJob {
    pub fn new(stage: &str, package_name: &str, package_version: &str) -> Self {
        Self {
            stage: stage.to_string(),
            package_name: package_name.to_string(),
            package_version: package_version.to_string(),
            env_vars: BTreeMap::new(),
        }
    }

    /// 追加の環境変数（PACKAGE_NAME / PACKAGE_VERSION と衝突した場合はこちらが優先）
    pub fn with_env_vars(mut self, env_vars: BTreeMap<String, String>) -> Self {
        self.env_vars = env_vars;
        self
    }

    fn label(&self) -> String {
        format!(
            "{}:{}:{}",
            self.stage, self.package_name, self.package_version
        )
    }

    fn variables(self) -> BTreeMap<String, String> {
        let mut variables = BTreeMap::from([
            ("PACKAGE_NAME".to_string(), self.package_name),
            ("PACKAGE_VERSION".to_string(), self.package_version),
        ]);
        variables.extend(self.env_vars);
        variables
    }
}

/// CIパイプライン設定
///
/// ジョブはラベル順に保持されるため、同じ入力からは常に同じドキュメントが得られる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<String>,
    jobs: BTreeMap<String, PipelineJob>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(stages: usize) -> Self {
        Self {
            stages: Vec::with_capacity(stages),
            jobs: BTreeMap::new(),
        }
    }

    pub fn add_stage(&mut self, stage: &str) {
        self.stages.push(stage.to_string());
    }

    /// 隠しジョブを追加（ラベルは `.{stage}:scripts`）
    pub fn add_hidden_job(&mut self, stage: &str, image: &str, scripts: Vec<String>) -> Result<()> {
        let job = HiddenJob::new(hidden_job_label(stage), stage, image, scripts)?;
        self.insert(PipelineJob::Hidden(job));
        Ok(())
    }

    /// パッケージのジョブを追加（ラベルは `{stage}:{name}:{version}`）
    ///
    /// 同じラベルのジョブがあれば上書きする。
    pub fn add_job(&mut self, job: StandardJob) {
        let label = job.label();
        let extends = hidden_job_label(&job.stage);
        let variables = job.variables();

        self.insert(PipelineJob::Standard(Job {
            label,
            extends,
            variables,
        }));
    }

    fn insert(&mut self, job: PipelineJob) {
        self.jobs.insert(job.label().to_string(), job);
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn jobs(&self) -> &BTreeMap<String, PipelineJob> {
        &self.jobs
    }

    pub fn get(&self, label: &str) -> Option<&PipelineJob> {
        self.jobs.get(label)
    }

    /// YAMLドキュメントに変換
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// `stages` を先頭に、ジョブをラベルをキーとしてトップレベルに展開する
impl Serialize for Pipeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.jobs.len() + 1))?;
        map.serialize_entry("stages", &self.stages)?;
        for (label, job) in &self.jobs {
            map.serialize_entry(label, job)?;
        }
        map.end()
    }
}

pub fn hidden_job_label(stage: &str) -> String {
    format!(".{stage}:scripts")
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
