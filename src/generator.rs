//! 設定からCIパイプライン設定ファイルを生成する

use crate::config::Configuration;
use crate::error::{ImporterError, Result};
use crate::packages::PackagesProvider;
use crate::pipeline::{Pipeline, StandardJob};
use crate::registry::registry_for;
use std::io::Write;

/// CIエンジンが受け付ける設定ファイルの上限（5 MiB）
pub const MAX_CONFIG_SIZE: usize = 5 * 1024 * 1024;

/// パイプライン生成器
///
/// インポートは名前順、パッケージも名前順、バージョンは記述順に展開するため、
/// 同じ入力からは常に同じ出力が得られる。
pub struct Generator<'a> {
    config: &'a Configuration,
    packages: &'a dyn PackagesProvider,
    max_size: usize,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a Configuration, packages: &'a dyn PackagesProvider) -> Self {
        Self {
            config,
            packages,
            max_size: MAX_CONFIG_SIZE,
        }
    }

    /// 出力サイズの上限を変更（テスト用）
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// パイプライン設定を生成して `out` に書き込む
    ///
    /// サイズ上限の検証は書き込み後に行う。上限を超えた場合も出力は書き込まれたままなので、
    /// 不要なら呼び出し側で削除すること。
    pub fn generate<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        let yaml = self.build_pipeline()?.to_yaml()?;

        out.write_all(yaml.as_bytes())?;
        out.flush()?;

        validate_size(yaml.len(), self.max_size)
    }

    /// パイプラインを組み立てる
    pub fn build_pipeline(&self) -> Result<Pipeline> {
        // スクリプトを組み立てる前に全インポートを検証
        for (name, import) in &self.config.imports {
            import.validate(name)?;
        }

        let mut pipeline = Pipeline::with_capacity(self.config.imports.len());

        for (import_name, import) in &self.config.imports {
            pipeline.add_stage(import_name);

            let registry = registry_for(import, import_name, self.packages)?;
            let scripts = registry.scripts()?;
            let image = import
                .image
                .as_deref()
                .unwrap_or_else(|| registry.image_name());

            pipeline.add_hidden_job(import_name, image, scripts)?;

            let packages = self.packages.packages_map(import_name)?;
            for (name, versions) in &packages {
                for version in versions {
                    let env_vars = registry.additional_env_vars(name, version);
                    pipeline.add_job(
                        StandardJob::new(import_name, name, version).with_env_vars(env_vars),
                    );
                }
            }
        }

        Ok(pipeline)
    }
}

/// 生成物のサイズが上限未満か検証
pub fn validate_size(size: usize, max_size: usize) -> Result<()> {
    if size >= max_size {
        return Err(ImporterError::ConfigTooLarge {
            size,
            limit: max_size,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;

#[cfg(test)]
#[path = "generator_proptests.rs"]
mod proptests;
