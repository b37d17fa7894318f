//! Server configuration loaded from TOML.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

impl ServerConfig {
    /// Resolve a context name or literal path to a config file path.
    /// Names resolve to `/etc/roster/<name>.toml`; anything containing
    /// `/` or `.` is used as-is.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/roster/{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Refuse to start with incomplete configuration.
    pub fn verify(&self) -> anyhow::Result<()> {
        if self.jwt.secret.is_empty() {
            anyhow::bail!("JWT secret is empty in configuration");
        }
        if self.storage.data_dir.is_empty() {
            anyhow::bail!("storage data_dir is empty in configuration");
        }
        Ok(())
    }

    /// SQLite database path under the data directory.
    pub fn sqlite_path(&self) -> PathBuf {
        Path::new(&self.storage.data_dir).join("data.sqlite")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> ServerConfig {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn resolve_name_vs_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/roster/prod.toml"),
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml"),
        );
    }

    #[test]
    fn verify_rejects_empty_fields() {
        let config = parsed(
            r#"
            [storage]
            data_dir = "/var/lib/roster"
            [jwt]
            secret = ""
            "#,
        );
        assert!(config.verify().is_err());

        let config = parsed(
            r#"
            [storage]
            data_dir = "/var/lib/roster"
            [jwt]
            secret = "s3cret"
            "#,
        );
        assert!(config.verify().is_ok());
        assert_eq!(
            config.sqlite_path(),
            PathBuf::from("/var/lib/roster/data.sqlite"),
        );
    }
}
