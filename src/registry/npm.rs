//! npm レジストリ実装
//!
//! 認証は `.npmrc` を書き換えて行う。インポート自体は通常の npm コマンドを使う。
//! - <https://docs.npmjs.com/cli/v9/commands/npm-pack#description>
//! - <https://docs.npmjs.com/cli/v9/commands/npm-publish#description>

use crate::config::{Import, RegistryConfig, BASE64_TOKEN_KEY};
use crate::error::Result;
use crate::registry::Registry;

/// npm レジストリ
pub struct NpmRegistry {
    import: Import,
}

impl NpmRegistry {
    pub fn new(import: Import) -> Self {
        Self { import }
    }

    fn configure_access(registry: &RegistryConfig) -> Vec<String> {
        let mut scripts = vec![format!(r#"echo "registry = {}" >> .npmrc"#, registry.url)];

        if registry.credentials.has_token() {
            scripts.push(Self::auth_token_script(registry));
        }

        scripts.extend(
            registry
                .credentials
                .additional_parameters
                .iter()
                .filter(|(key, _)| key.as_str() != BASE64_TOKEN_KEY)
                .map(|(key, value)| Self::config_value_script(key, value)),
        );

        scripts
    }

    /// `//host/path:_authToken = TOKEN`（base64 の場合は `_auth`）
    fn auth_token_script(registry: &RegistryConfig) -> String {
        let url = registry.url.as_str();
        let schemeless = url.strip_prefix("https:").unwrap_or(url);
        let schemeless = schemeless.strip_prefix("http:").unwrap_or(schemeless);

        let auth_key = if registry.credentials.use_base64_token() {
            "_auth"
        } else {
            "_authToken"
        };

        Self::config_value_script(
            &format!("{schemeless}:{auth_key}"),
            &registry.credentials.token,
        )
    }

    fn config_value_script(key: &str, value: &str) -> String {
        format!(r#"echo "{key} = {value}" >> .npmrc"#)
    }

    fn pack_scripts() -> [&'static str; 2] {
        [
            "mkdir _pkg",
            r#"npm pack --pack-destination="_pkg" $PACKAGE_NAME@$PACKAGE_VERSION"#,
        ]
    }

    /// publishConfig を取り除いて再パックする
    fn process_package_scripts() -> [&'static str; 5] {
        [
            "cd _pkg",
            "ls *.tgz | xargs tar zxvf",
            "cd package",
            "npm pkg delete publishConfig",
            "npm pack",
        ]
    }
}

impl Registry for NpmRegistry {
    fn scripts(&self) -> Result<Vec<String>> {
        let mut scripts = Vec::with_capacity(15);

        scripts.extend(Self::configure_access(&self.import.source));
        scripts.extend(Self::pack_scripts().map(String::from));
        scripts.push("rm -f .npmrc".to_string());
        scripts.extend(Self::process_package_scripts().map(String::from));
        scripts.extend(Self::configure_access(&self.import.destination));
        scripts.push("ls *.tgz | xargs npm publish".to_string());

        Ok(scripts)
    }

    fn image_name(&self) -> &'static str {
        "node:alpine"
    }
}

#[cfg(test)]
#[path = "npm_test.rs"]
mod tests;
