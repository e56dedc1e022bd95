use anyhow::{Result, anyhow};
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::fmt;

/// Env var that overrides `auth.signing_key`.
pub const SIGNING_KEY_ENV: &str = "JWT_SIGNING_KEY";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub auth: Auth,
    pub store: Store,
    pub files: Files,
    #[serde(default)]
    pub portfolio: Portfolio,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
    #[serde(default = "default_upload_limit")]
    pub upload_limit_bytes: u64,
}

impl Http {
    /// Both paths, when TLS is configured.
    pub fn tls(&self) -> Option<(&str, &str)> {
        match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        }
    }
}

fn default_upload_limit() -> u64 {
    10 * 1024 * 1024
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Deserialize)]
pub struct Auth {
    pub backend: String, // "fake" or "real"
    pub issuer: String,
    pub audience: String,
    pub signing_key: String,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

const REDACTED: &str = "<redacted>";

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("backend", &self.backend)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("signing_key", &REDACTED)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &REDACTED)
            .finish()
    }
}

impl Auth {
    pub fn signing_key(&self) -> Vec<u8> {
        std::env::var(SIGNING_KEY_ENV)
            .unwrap_or_else(|_| self.signing_key.clone())
            .into_bytes()
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory", "mysql" or "redis"
    pub mysql_dsn: Option<String>,
    pub redis_dsn: Option<String>,
    #[serde(default = "default_redis_prefix")]
    pub redis_prefix: String,
}

fn default_redis_prefix() -> String {
    "folio".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Files {
    pub backend: String, // "memory" or "disk"
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct Portfolio {
    pub seed_path: Option<String>,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

impl Settings {
    pub fn from_toml_str(toml: &str) -> Result<Settings> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(|e| anyhow!(e))?
            .try_deserialize()
            .map_err(|e| anyhow!(e))?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[http]
address = "127.0.0.1:8000"

[log]
filter = "info"

[auth]
backend = "real"
issuer = "folio.auth"
audience = "folio-admin"
signing_key = "dev-secret"

[store]
backend = "memory"

[files]
backend = "memory"
"#;

    #[test]
    fn defaults_fill_optional_fields() {
        let settings = Settings::from_toml_str(MINIMAL).unwrap();
        assert_eq!(settings.auth.admin_username, "admin");
        assert_eq!(settings.auth.admin_password, "admin123");
        assert_eq!(settings.http.upload_limit_bytes, 10 * 1024 * 1024);
        assert!(settings.http.tls().is_none());
        assert!(settings.portfolio.seed_path.is_none());
        assert_eq!(settings.files.upload_dir, "uploads");
        assert_eq!(settings.store.redis_prefix, "folio");
    }

    #[test]
    fn debug_output_hides_credentials() {
        let settings = Settings::from_toml_str(MINIMAL).unwrap();
        let printed = format!("{:?}", settings);
        assert!(!printed.contains("dev-secret"));
        assert!(!printed.contains("admin123"));
        assert!(printed.contains("admin_username: \"admin\""));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn missing_section_is_an_error() {
        assert!(Settings::from_toml_str("[log]\nfilter = \"info\"\n").is_err());
    }
}
