//! NuGet レジストリ実装
//!
//! 認証とインポートは nuget CLI で行う。
//! - <https://learn.microsoft.com/en-us/nuget/reference/cli-reference/cli-ref-sources>
//! - <https://learn.microsoft.com/en-us/nuget/reference/cli-reference/cli-ref-install>
//! - <https://learn.microsoft.com/en-us/nuget/reference/cli-reference/cli-ref-push>

use crate::config::{Import, RegistryConfig};
use crate::error::Result;
use crate::registry::{
    validate_import_credentials, Registry, DESTINATION_REGISTRY_LABEL, SOURCE_REGISTRY_LABEL,
};

/// NuGet レジストリ
pub struct NugetRegistry {
    import: Import,
}

impl NugetRegistry {
    /// 認証情報を検証して作成
    pub fn new(import: Import, import_name: &str) -> Result<Self> {
        validate_import_credentials(&import, import_name, "NuGet", &["username"])?;
        Ok(Self { import })
    }

    fn configure_access(registry: &RegistryConfig, label: &str) -> String {
        let mut cmd = format!(r#"nuget sources Add -Name {} -Source "{}""#, label, registry.url);

        if registry.credentials.has_token() {
            cmd.push_str(&format!(r#" -password "{}""#, registry.credentials.token));
        }

        for (key, value) in &registry.credentials.additional_parameters {
            cmd.push_str(&format!(" -{key} {value}"));
        }

        cmd
    }

    fn install_scripts(label: &str) -> [String; 2] {
        [
            "mkdir _pkg".to_string(),
            format!(
                "nuget install $PACKAGE_NAME -Version $PACKAGE_VERSION -NoCache -DirectDownload \
                 -NonInteractive -DependencyVersion Ignore -Source {label} -OutputDirectory _pkg"
            ),
        ]
    }

    fn remove_source(label: &str) -> String {
        format!("nuget sources Remove -Name {label}")
    }
}

impl Registry for NugetRegistry {
    fn scripts(&self) -> Result<Vec<String>> {
        let mut scripts = Vec::with_capacity(8);

        scripts.push(Self::remove_source("nuget.org"));
        scripts.push(Self::configure_access(
            &self.import.source,
            SOURCE_REGISTRY_LABEL,
        ));
        scripts.extend(Self::install_scripts(SOURCE_REGISTRY_LABEL));
        scripts.push(Self::remove_source(SOURCE_REGISTRY_LABEL));
        scripts.push("cd _pkg && cd $(ls -d */|head -n 1)".to_string());
        scripts.push(Self::configure_access(
            &self.import.destination,
            DESTINATION_REGISTRY_LABEL,
        ));
        scripts.push(format!(
            "nuget push $(ls *.nupkg | head -n 1) -Source {DESTINATION_REGISTRY_LABEL}"
        ));

        Ok(scripts)
    }

    fn image_name(&self) -> &'static str {
        "mono:6"
    }
}

#[cfg(test)]
#[path = "nuget_test.rs"]
mod tests;
