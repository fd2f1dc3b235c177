//! パッケージ形式ごとのレジストリ抽象化
//!
//! 各パッケージ形式（npm, Maven, NuGet, PyPI）が、1パッケージ分のインポートを行う
//! スクリプトを組み立てる。使う側は具体的な形式を意識せず、`Registry` traitを通じて操作する。
//!
//! ## 使い方
//!
//! ```ignore
//! let registry = registry_for(&import, "import1", &packages)?;
//! let scripts = registry.scripts()?;
//! let image = registry.image_name();
//! ```

mod maven;
mod npm;
mod nuget;
mod pypi;

pub use maven::MavenRegistry;
pub use npm::NpmRegistry;
pub use nuget::NugetRegistry;
pub use pypi::PypiRegistry;

use crate::config::{Credentials, Import};
use crate::error::{ImporterError, Result};
use crate::packages::PackagesProvider;
use std::collections::BTreeMap;

/// ソースレジストリのラベル（settings.xml の server id や nuget の source 名）
pub const SOURCE_REGISTRY_LABEL: &str = "pkgs_importer_source";
/// デスティネーションレジストリのラベル
pub const DESTINATION_REGISTRY_LABEL: &str = "pkgs_importer_destination";

/// パッケージ形式ごとのレジストリtrait
pub trait Registry {
    /// 1パッケージのインポートに必要なスクリプト行を返す
    fn scripts(&self) -> Result<Vec<String>>;

    /// 必要なCLIを含むデフォルトのイメージ名
    fn image_name(&self) -> &'static str;

    /// パイプラインのジョブに追加で渡す環境変数
    fn additional_env_vars(&self, name: &str, version: &str) -> BTreeMap<String, String> {
        let _ = (name, version);
        BTreeMap::new()
    }
}

/// インポート種別からレジストリを取得する
///
/// 種別が不明な場合はエラー。構築時の検証に失敗した場合もエラーを返す。
pub fn registry_for(
    import: &Import,
    import_name: &str,
    packages: &dyn PackagesProvider,
) -> Result<Box<dyn Registry>> {
    match import.kind.as_str() {
        "npm" => Ok(Box::new(NpmRegistry::new(import.clone()))),
        "nuget" => Ok(Box::new(NugetRegistry::new(import.clone(), import_name)?)),
        "maven" => Ok(Box::new(MavenRegistry::new(
            import.clone(),
            import_name,
            packages,
        )?)),
        "pypi" => Ok(Box::new(PypiRegistry::new(import.clone(), import_name)?)),
        other => Err(ImporterError::UnknownRegistry {
            kind: other.to_string(),
            import: import_name.to_string(),
        }),
    }
}

/// 認証情報の形を検証する
///
/// トークンがある場合、`accepted` のうちちょうど1つの追加パラメータが必要。
/// トークンがなければ匿名アクセスとして常に有効。
pub(crate) fn validate_credentials(
    credentials: &Credentials,
    ecosystem: &'static str,
    accepted: &[&str],
    registry: &'static str,
    import_name: &str,
) -> Result<()> {
    if !credentials.has_token() {
        return Ok(());
    }

    let present = accepted
        .iter()
        .filter(|key| credentials.parameter(key).is_some())
        .count();

    if present == 1 {
        return Ok(());
    }

    let requirement = accepted
        .iter()
        .map(|key| format!("a {key}"))
        .collect::<Vec<_>>()
        .join(" or ");

    Err(ImporterError::InvalidCredentials {
        ecosystem,
        registry,
        import: import_name.to_string(),
        requirement,
    })
}

/// ソースとデスティネーションの両方の認証情報を検証
pub(crate) fn validate_import_credentials(
    import: &Import,
    import_name: &str,
    ecosystem: &'static str,
    accepted: &[&str],
) -> Result<()> {
    validate_credentials(
        &import.source.credentials,
        ecosystem,
        accepted,
        "source",
        import_name,
    )?;
    validate_credentials(
        &import.destination.credentials,
        ecosystem,
        accepted,
        "destination",
        import_name,
    )
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
