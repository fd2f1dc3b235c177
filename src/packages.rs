//! インポート対象パッケージの列挙
//!
//! パッケージ一覧は設定ファイルにインラインで書くか、
//! 2列（パッケージ名, バージョン）のCSVファイルを参照する。

use crate::config::{scalar_to_string, Configuration};
use crate::error::{ImporterError, Result};
use serde_yaml::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// パッケージ名 → バージョン一覧（バージョンは記述順）
pub type PackagesMap = BTreeMap<String, Vec<String>>;

/// パッケージ一覧の取得元
pub trait PackagesProvider {
    /// インポート名に対応するパッケージ一覧を取得
    fn packages_map(&self, import_name: &str) -> Result<PackagesMap>;
}

/// 設定ファイル上の `packages` の値
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PackagesSpec {
    /// 未指定（または文字列以外のスカラー）
    #[default]
    Empty,
    /// インライン指定
    Inline(PackagesMap),
    /// ファイルパス指定（`.csv` で終わる必要がある）
    Path(String),
}

impl PackagesSpec {
    /// YAMLの値から変換
    ///
    /// バージョンはスカラー1つでもリストでもよい。
    pub fn from_value(import_name: &str, value: Option<Value>) -> Result<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::Empty),
            Some(Value::String(path)) => Ok(Self::Path(path)),
            Some(Value::Mapping(mapping)) => {
                let mut packages = PackagesMap::new();
                for (name, versions) in &mapping {
                    let name = scalar_to_string(name)
                        .ok_or_else(|| invalid_packages(import_name, "package names must be strings"))?;
                    let versions = versions_of(import_name, &name, versions)?;
                    packages.insert(name, versions);
                }
                Ok(Self::Inline(packages))
            }
            Some(Value::Sequence(_)) => Err(invalid_packages(
                import_name,
                "packages must be a mapping or a csv file path",
            )),
            Some(_) => Ok(Self::Empty),
        }
    }
}

fn versions_of(import_name: &str, package: &str, value: &Value) -> Result<Vec<String>> {
    let invalid = || invalid_packages(import_name, &format!("versions of {package:?} must be strings"));

    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| scalar_to_string(item).ok_or_else(invalid))
            .collect(),
        scalar => scalar_to_string(scalar).map(|v| vec![v]).ok_or_else(invalid),
    }
}

fn invalid_packages(import_name: &str, reason: &str) -> ImporterError {
    ImporterError::InvalidConfig {
        import: import_name.to_string(),
        reason: reason.to_string(),
    }
}

/// 設定ファイルを元にしたパッケージ一覧の取得元
///
/// 初回取得結果はインポート名ごとにキャッシュされ、
/// 2回目以降はCSVファイルを読み直さない。
#[derive(Debug, Default)]
pub struct PackageSource {
    specs: BTreeMap<String, PackagesSpec>,
    cache: RefCell<HashMap<String, PackagesMap>>,
}

impl PackageSource {
    pub fn new(specs: BTreeMap<String, PackagesSpec>) -> Self {
        Self {
            specs,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Configuration) -> Self {
        let specs = config
            .imports
            .iter()
            .map(|(name, import)| (name.clone(), import.packages.clone()))
            .collect();
        Self::new(specs)
    }

    fn read(&self, import_name: &str) -> Result<PackagesMap> {
        match self.specs.get(import_name) {
            None | Some(PackagesSpec::Empty) => Ok(PackagesMap::new()),
            Some(PackagesSpec::Inline(packages)) => Ok(packages.clone()),
            Some(PackagesSpec::Path(path)) if path.ends_with(".csv") => {
                read_csv(Path::new(path))
            }
            Some(PackagesSpec::Path(path)) => Err(ImporterError::PackagesNotCsv {
                import: import_name.to_string(),
                value: path.clone(),
            }),
        }
    }
}

impl PackagesProvider for PackageSource {
    fn packages_map(&self, import_name: &str) -> Result<PackagesMap> {
        if let Some(cached) = self.cache.borrow().get(import_name) {
            return Ok(cached.clone());
        }

        let packages = self.read(import_name)?;
        self.cache
            .borrow_mut()
            .insert(import_name.to_string(), packages.clone());

        Ok(packages)
    }
}

/// 2列のCSVを読み込む（ヘッダー行なし）
pub fn read_csv(path: &Path) -> Result<PackagesMap> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_path(path)?;

    let mut packages = PackagesMap::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != 2 {
            return Err(ImporterError::InvalidCsv {
                path: path.display().to_string(),
                reason: format!(
                    "csv records must have 2 fields (package, version), got {}",
                    record.len()
                ),
            });
        }

        packages
            .entry(record[0].to_string())
            .or_default()
            .push(record[1].to_string());
    }

    Ok(packages)
}

#[cfg(test)]
#[path = "packages_test.rs"]
mod tests;
