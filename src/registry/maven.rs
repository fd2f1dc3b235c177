//! Maven レジストリ実装
//!
//! 認証は settings.xml を書き出して行う。インポートには以下の maven コマンドを使う。
//! - <https://maven.apache.org/plugins/maven-dependency-plugin/get-mojo.html>
//! - <https://maven.apache.org/plugins/maven-deploy-plugin/deploy-file-mojo.html>
//!
//! パッケージ名は `groupId:artifactId`、バージョンは `version[:packaging]` 形式。

use crate::config::{Credentials, Import};
use crate::error::{ImporterError, Result};
use crate::packages::PackagesProvider;
use crate::registry::{
    validate_import_credentials, Registry, DESTINATION_REGISTRY_LABEL, SOURCE_REGISTRY_LABEL,
};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// 有効な packaging
pub const VALID_PACKAGINGS: &[&str] = &[
    "pom",
    "jar",
    "maven-plugin",
    "ejb",
    "war",
    "ear",
    "rar",
    "aar",
];

const DEFAULT_PACKAGING: &str = "jar";
const COORDINATES_SEPARATOR: char = ':';
const SETTINGS_FILE: &str = "settings.xml";
const MAVEN_REPO_LOCAL: &str = "deps";

static GROUP_AND_ARTIFACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^:]+:[^:]+$").expect("valid regex"));

/// settings.xml の認証方式
enum Access<'a> {
    /// ユーザー名 + パスワード（トークン）
    BasicAuth { username: &'a str, password: &'a str },
    /// カスタムヘッダー（ヘッダー名 + トークン）
    CustomHeader { name: &'a str, value: &'a str },
}

impl<'a> Access<'a> {
    fn from_credentials(credentials: &'a Credentials) -> Option<Self> {
        if !credentials.has_token() {
            return None;
        }
        if let Some(username) = credentials.parameter("username") {
            return Some(Access::BasicAuth {
                username,
                password: &credentials.token,
            });
        }
        credentials
            .parameter("header_name")
            .map(|name| Access::CustomHeader {
                name,
                value: &credentials.token,
            })
    }

    fn settings_xml(&self, label: &str) -> String {
        let server = match self {
            Access::BasicAuth { username, password } => format!(
                "<id>{}</id><username>{}</username><password>{}</password>",
                escape(label),
                escape(username),
                escape(password)
            ),
            Access::CustomHeader { name, value } => format!(
                "<id>{}</id><configuration><httpHeaders><property><name>{}</name><value>{}</value></property></httpHeaders></configuration>",
                escape(label),
                escape(name),
                escape(value)
            ),
        };

        format!(r#"echo "<settings><servers><server>{server}</server></servers></settings>" > {SETTINGS_FILE}"#)
    }
}

/// テンプレートに埋め込む値のエスケープ
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Maven レジストリ
pub struct MavenRegistry {
    import: Import,
}

impl MavenRegistry {
    /// 認証情報とパッケージ一覧をすべて検証して作成
    ///
    /// パッケージ一覧の検証はスクリプト生成より前に行い、最初のエラーで失敗する。
    pub fn new(import: Import, import_name: &str, packages: &dyn PackagesProvider) -> Result<Self> {
        validate_import_credentials(&import, import_name, "Maven", &["username", "header_name"])?;

        let packages = packages.packages_map(import_name)?;
        for (name, versions) in &packages {
            validate_package_name(name)?;
            for version in versions {
                validate_package_version(version)?;
            }
        }

        Ok(Self { import })
    }

    fn pull_script(&self, label: &str) -> String {
        let mut cmd = format!(
            "mvn dependency:get -Dmaven.repo.local={MAVEN_REPO_LOCAL} -Dtransitive=false \
             -Dartifact=$PACKAGE_NAME:$PACKAGE_VERSION -DremoteRepositories={label}::::{}",
            self.import.source.url
        );

        if self.import.source.credentials.has_token() {
            cmd.push_str(&format!(" -s {SETTINGS_FILE}"));
        }

        cmd
    }

    /// ダウンロードしたアーティファクトのディレクトリへ移動する
    fn cd_into_package_directory() -> [String; 2] {
        [
            r#"pkg_dir=$(echo $PACKAGE_NAME | cut -d ":" -f 1 | tr "." "/")/$(echo $PACKAGE_NAME | cut -d ":" -f 2)/$(echo $PACKAGE_VERSION | cut -d ":" -f 1)"#.to_string(),
            format!(r#"cd $(find {MAVEN_REPO_LOCAL} -path "*/$pkg_dir")"#),
        ]
    }

    fn push_script(&self, label: &str) -> String {
        format!(
            r#"mvn deploy:deploy-file -Durl={} -DrepositoryId={label} -Dfile="$(find . -type f -name "*.$PACKAGE_PACKAGING")" -Dpackaging="$PACKAGE_PACKAGING" -DpomFile=$(ls *.pom | head -n 1) -s {SETTINGS_FILE}"#,
            self.import.destination.url
        )
    }
}

impl Registry for MavenRegistry {
    fn scripts(&self) -> Result<Vec<String>> {
        let mut scripts = Vec::with_capacity(6);

        if let Some(access) = Access::from_credentials(&self.import.source.credentials) {
            scripts.push(access.settings_xml(SOURCE_REGISTRY_LABEL));
        }
        scripts.push(self.pull_script(SOURCE_REGISTRY_LABEL));
        scripts.extend(Self::cd_into_package_directory());

        if let Some(access) = Access::from_credentials(&self.import.destination.credentials) {
            scripts.push(access.settings_xml(DESTINATION_REGISTRY_LABEL));
        }
        scripts.push(self.push_script(DESTINATION_REGISTRY_LABEL));

        Ok(scripts)
    }

    fn image_name(&self) -> &'static str {
        "maven:eclipse-temurin"
    }

    /// `PACKAGE_PACKAGING` をバージョン文字列の `:packaging` から決める（既定は jar）
    fn additional_env_vars(&self, _name: &str, version: &str) -> BTreeMap<String, String> {
        let packaging = match version.split_once(COORDINATES_SEPARATOR) {
            Some((_, packaging)) if !packaging.contains(COORDINATES_SEPARATOR) => packaging,
            _ => DEFAULT_PACKAGING,
        };

        BTreeMap::from([("PACKAGE_PACKAGING".to_string(), packaging.to_string())])
    }
}

fn validate_package_name(name: &str) -> Result<()> {
    if !GROUP_AND_ARTIFACT.is_match(name) {
        return Err(ImporterError::InvalidPackageName(name.to_string()));
    }
    Ok(())
}

fn validate_package_version(version: &str) -> Result<()> {
    match version.matches(COORDINATES_SEPARATOR).count() {
        0 => Ok(()),
        1 => {
            let packaging = version
                .split_once(COORDINATES_SEPARATOR)
                .map(|(_, packaging)| packaging)
                .unwrap_or_default();
            if VALID_PACKAGINGS.contains(&packaging) {
                Ok(())
            } else {
                Err(ImporterError::InvalidPackaging {
                    packaging: packaging.to_string(),
                    expected: format!("[{}]", VALID_PACKAGINGS.join(" ")),
                })
            }
        }
        _ => Err(ImporterError::InvalidVersion(version.to_string())),
    }
}

#[cfg(test)]
#[path = "maven_test.rs"]
mod tests;
