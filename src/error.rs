use thiserror::Error;

/// pkgs-importer 統一エラー型
#[derive(Debug, Error)]
pub enum ImporterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("import {import:?} has an unsupported type {kind:?}, expected one of: {expected}")]
    UnknownType {
        import: String,
        kind: String,
        expected: String,
    },

    #[error("import {import:?} has an invalid {registry} url {url:?}: {reason}")]
    InvalidUrl {
        import: String,
        registry: &'static str,
        url: String,
        reason: String,
    },

    #[error("import {import:?} is invalid: {reason}")]
    InvalidConfig { import: String, reason: String },

    #[error("import {0:?} has the same url for the source and the destination")]
    SameUrl(String),

    #[error("credentials token for {registry} in import {import:?} is required")]
    MissingToken {
        registry: &'static str,
        import: String,
    },

    #[error("no registry object for type {kind:?} in import {import:?}")]
    UnknownRegistry { kind: String, import: String },

    #[error("{ecosystem} credentials for {registry} in import {import:?} require a token and {requirement} for authenticated registries")]
    InvalidCredentials {
        ecosystem: &'static str,
        registry: &'static str,
        import: String,
        requirement: String,
    },

    #[error("{0} is an invalid Maven package name. It must contain : between the group ID and the artifact ID.")]
    InvalidPackageName(String),

    #[error("{packaging} is an invalid Maven packaging string. It must be one of : {expected}.")]
    InvalidPackaging { packaging: String, expected: String },

    #[error("{0} is an invalid Maven version string. It must be in the form of : version[:packaging].")]
    InvalidVersion(String),

    #[error("invalid csv file {path:?}: {reason}")]
    InvalidCsv { path: String, reason: String },

    #[error("packages of import {import:?} (value {value:?}) is not a csv file path")]
    PackagesNotCsv { import: String, value: String },

    #[error("error with label {0:?}: hidden jobs labels must start by a dot(.)")]
    InvalidHiddenJobLabel(String),

    #[error("the generated config file is {size} bytes which is over the limit of {limit} bytes for the CI engine")]
    ConfigTooLarge { size: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, ImporterError>;

/// エラーの大分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// ファイル・シリアライズ関連
    Io,
    /// 設定ファイルや認証情報の検証
    Validation,
    /// パッケージ一覧の取得
    DataSource,
    /// 生成物の出力
    Output,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Io => "io",
            ErrorCategory::Validation => "validation",
            ErrorCategory::DataSource => "data source",
            ErrorCategory::Output => "output",
        }
    }
}

impl ImporterError {
    /// エラーの大分類を取得
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImporterError::Io(_) | ImporterError::Yaml(_) => ErrorCategory::Io,
            ImporterError::Csv(_)
            | ImporterError::InvalidCsv { .. }
            | ImporterError::PackagesNotCsv { .. } => {
                ErrorCategory::DataSource
            }
            ImporterError::ConfigTooLarge { .. } | ImporterError::InvalidHiddenJobLabel(_) => {
                ErrorCategory::Output
            }
            _ => ErrorCategory::Validation,
        }
    }
}
