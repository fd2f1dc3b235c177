//! 設定ファイル（config.yml）の読み込みと検証
//!
//! トップレベルはインポート名 → インポート定義のマッピング。
//!
//! ```yaml
//! import1:
//!   type: npm
//!   source:
//!     url: https://registry.npmjs.org
//!   destination:
//!     url: https://destination.test
//!     credentials:
//!       token: TOKEN
//!   packages:
//!     lodash: ["4.17.21"]
//! ```

use crate::error::{ImporterError, Result};
use crate::output;
use crate::packages::PackagesSpec;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// サポートするインポート種別
pub const SUPPORTED_TYPES: &[&str] = &["npm", "nuget", "maven", "pypi"];

/// トークンが base64 エンコード済みであることを示す追加パラメータ名
pub const BASE64_TOKEN_KEY: &str = "_base64_token";

/// レジストリへのアクセスに使う認証情報
///
/// `token` 以外のキーはすべて `additional_parameters` に入る。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub additional_parameters: BTreeMap<String, String>,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            additional_parameters: BTreeMap::new(),
        }
    }

    /// 追加パラメータを設定
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_parameters.insert(key.into(), value.into());
        self
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// 追加パラメータを取得（空文字列はNoneとして扱う）
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.additional_parameters
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// `_base64_token` が "1" のときトークンは base64 形式
    pub fn use_base64_token(&self) -> bool {
        self.parameter(BASE64_TOKEN_KEY) == Some("1")
    }
}

/// パッケージレジストリ（URL + 認証情報）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    pub url: String,
    pub credentials: Credentials,
}

impl RegistryConfig {
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            credentials,
        }
    }

    fn require_token(&self, label: &'static str, import_name: &str) -> Result<()> {
        if !self.credentials.has_token() {
            return Err(ImporterError::MissingToken {
                registry: label,
                import: import_name.to_string(),
            });
        }
        Ok(())
    }

    fn validate_url(&self, label: &'static str, import_name: &str) -> Result<()> {
        url::Url::parse(&self.url).map_err(|e| ImporterError::InvalidUrl {
            import: import_name.to_string(),
            registry: label,
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

/// インポート定義（ソース → デスティネーションの片方向コピー）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// インポート種別（npm, nuget, maven, pypi）
    pub kind: String,
    /// ジョブで使うイメージ（未指定ならレジストリのデフォルト）
    pub image: Option<String>,
    pub source: RegistryConfig,
    pub destination: RegistryConfig,
    pub packages: PackagesSpec,
}

impl Import {
    pub fn new(kind: impl Into<String>, source: RegistryConfig, destination: RegistryConfig) -> Self {
        Self {
            kind: kind.into(),
            image: None,
            source,
            destination,
            packages: PackagesSpec::Empty,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_packages(mut self, packages: PackagesSpec) -> Self {
        self.packages = packages;
        self
    }

    /// 項目間の整合性チェック
    ///
    /// パイプライン生成の前にも呼ばれる。
    pub fn validate(&self, import_name: &str) -> Result<()> {
        if self.source.url == self.destination.url {
            return Err(ImporterError::SameUrl(import_name.to_string()));
        }

        self.destination.require_token("destination", import_name)
    }

    fn validate_fields(&self, import_name: &str) -> Result<()> {
        if !SUPPORTED_TYPES.contains(&self.kind.as_str()) {
            return Err(ImporterError::UnknownType {
                import: import_name.to_string(),
                kind: self.kind.clone(),
                expected: SUPPORTED_TYPES.join(", "),
            });
        }

        self.source.validate_url("source", import_name)?;
        self.destination.validate_url("destination", import_name)
    }
}

/// 設定ファイルのルート構造
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    pub imports: BTreeMap<String, Import>,
}

impl Configuration {
    pub fn new(imports: BTreeMap<String, Import>) -> Self {
        Self { imports }
    }

    /// 設定ファイルを読み込み、検証する
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        output::info("Config loaded");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let file: BTreeMap<String, ImportEntry> = serde_yaml::from_str(content)?;

        let imports = file
            .into_iter()
            .map(|(name, entry)| {
                let import = entry.into_import(&name)?;
                Ok((name, import))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let config = Self { imports };
        config.validate()?;
        Ok(config)
    }

    /// 全インポートを名前順に検証し、最初のエラーを返す
    pub fn validate(&self) -> Result<()> {
        for (name, import) in &self.imports {
            import.validate_fields(name)?;
            import.validate(name)?;
        }
        Ok(())
    }
}

// ==================== file format ====================

/// 未知のキーは無視する
#[derive(Debug, Deserialize)]
struct ImportEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    image: Option<String>,
    source: RegistryEntry,
    destination: RegistryEntry,
    #[serde(default)]
    packages: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RegistryEntry {
    url: String,
    #[serde(default)]
    credentials: Option<CredentialsEntry>,
}

#[derive(Debug, Deserialize)]
struct CredentialsEntry {
    #[serde(default)]
    token: Option<Value>,
    #[serde(flatten)]
    additional_parameters: BTreeMap<String, Value>,
}

impl ImportEntry {
    fn into_import(self, import_name: &str) -> Result<Import> {
        Ok(Import {
            kind: self.kind,
            image: self.image.filter(|image| !image.is_empty()),
            source: self.source.into_registry(import_name)?,
            destination: self.destination.into_registry(import_name)?,
            packages: PackagesSpec::from_value(import_name, self.packages)?,
        })
    }
}

impl RegistryEntry {
    fn into_registry(self, import_name: &str) -> Result<RegistryConfig> {
        let credentials = match self.credentials {
            Some(entry) => entry.into_credentials(import_name)?,
            None => Credentials::default(),
        };
        Ok(RegistryConfig::new(self.url, credentials))
    }
}

impl CredentialsEntry {
    fn into_credentials(self, import_name: &str) -> Result<Credentials> {
        let token = match &self.token {
            Some(value) => scalar_to_string(value).ok_or_else(|| invalid_scalar(import_name, "token"))?,
            None => String::new(),
        };

        let mut additional_parameters = BTreeMap::new();
        for (key, value) in &self.additional_parameters {
            if value.is_null() {
                continue;
            }
            let value = scalar_to_string(value).ok_or_else(|| invalid_scalar(import_name, key))?;
            additional_parameters.insert(key.clone(), value);
        }

        Ok(Credentials {
            token,
            additional_parameters,
        })
    }
}

fn invalid_scalar(import_name: &str, key: &str) -> ImporterError {
    ImporterError::InvalidConfig {
        import: import_name.to_string(),
        reason: format!("credentials field {key:?} must be a string"),
    }
}

/// YAMLのスカラー値を文字列に変換（数値・真偽値も文字列として扱う）
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
