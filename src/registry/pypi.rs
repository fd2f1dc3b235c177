//! PyPI レジストリ実装
//!
//! ダウンロードは pip、アップロードは twine で行う。
//! - <https://pip.pypa.io/en/stable/cli/pip_download/>
//! - <https://twine.readthedocs.io/en/stable/index.html#twine-upload>

use crate::config::{Credentials, Import, RegistryConfig};
use crate::error::{ImporterError, Result};
use crate::registry::{validate_import_credentials, Registry};
use url::Url;

/// PyPI レジストリ
pub struct PypiRegistry {
    import: Import,
    import_name: String,
}

impl PypiRegistry {
    /// 認証情報を検証して作成
    pub fn new(import: Import, import_name: &str) -> Result<Self> {
        validate_import_credentials(&import, import_name, "PyPI", &["username"])?;
        Ok(Self {
            import,
            import_name: import_name.to_string(),
        })
    }

    fn install_script(&self) -> Result<String> {
        let index_url = self.index_url(&self.import.source)?;
        Ok(format!(
            r#"python -m pip download "$PACKAGE_NAME==$PACKAGE_VERSION" -d pkgs --no-cache-dir --no-deps -i {index_url}"#
        ))
    }

    fn push_script(&self) -> String {
        let destination = &self.import.destination;
        let mut cmd = format!("python -m twine upload --repository-url {} ", destination.url);

        let (user, password) = Self::username_and_password(&destination.credentials);
        if let Some(user) = user {
            cmd.push_str(&format!(r#"-u "{user}" "#));
        }
        if let Some(password) = password {
            cmd.push_str(&format!(r#"-p "{password}" "#));
        }

        cmd.push_str("./*");
        cmd
    }

    /// ユーザー名とパスワードが揃っていれば URL の userinfo に埋め込む
    fn index_url(&self, registry: &RegistryConfig) -> Result<String> {
        let (Some(user), Some(password)) = Self::username_and_password(&registry.credentials)
        else {
            return Ok(registry.url.clone());
        };

        let invalid = |reason: String| ImporterError::InvalidUrl {
            import: self.import_name.clone(),
            registry: "source",
            url: registry.url.clone(),
            reason,
        };

        let mut url = Url::parse(&registry.url).map_err(|e| invalid(e.to_string()))?;
        url.set_username(user)
            .map_err(|_| invalid("url cannot carry a username".to_string()))?;
        url.set_password(Some(password))
            .map_err(|_| invalid("url cannot carry a password".to_string()))?;

        let index_url = url.to_string();
        // パスなしのURLにパーサーが補った "/" は付けない
        let added_root = url.path() == "/"
            && url.query().is_none()
            && url.fragment().is_none()
            && !registry.url.ends_with('/');
        match index_url.strip_suffix('/') {
            Some(trimmed) if added_root => Ok(trimmed.to_string()),
            _ => Ok(index_url),
        }
    }

    fn username_and_password(credentials: &Credentials) -> (Option<&str>, Option<&str>) {
        let password = Some(credentials.token.as_str()).filter(|t| !t.is_empty());
        (credentials.parameter("username"), password)
    }
}

impl Registry for PypiRegistry {
    fn scripts(&self) -> Result<Vec<String>> {
        Ok(vec![
            self.install_script()?,
            "cd pkgs".to_string(),
            "python -m pip install twine".to_string(),
            self.push_script(),
        ])
    }

    fn image_name(&self) -> &'static str {
        "python:alpine"
    }
}

#[cfg(test)]
#[path = "pypi_test.rs"]
mod tests;
