use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub upload: UploadConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub cors_permissive: bool,
}

// Настройки базы данных. Без DATABASE_URL работаем на MemoryStore
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub pool_size: u32,
}

// Настройки загрузки файлов
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
    pub key_policy: StorageKeyPolicy,
}

/// How an uploaded file is named on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKeyPolicy {
    /// Client filename (final path component only). Same name overwrites.
    #[default]
    Original,
    /// `<uuid>_<filename>`; the client name is kept only as metadata.
    Unique,
}

impl FromStr for StorageKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(StorageKeyPolicy::Original),
            "unique" => Ok(StorageKeyPolicy::Unique),
            other => Err(format!("unknown storage key policy {other:?}")),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 25 * 1024 * 1024;

impl UploadConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        UploadConfig {
            dir: dir.into(),
            max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            key_policy: StorageKeyPolicy::default(),
        }
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            expected,
            value,
        }),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Собирает конфиг из произвольного источника пар ключ-значение
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            app: AppConfig {
                host: var_or("HOST", "0.0.0.0"),
                port: parse_or(&lookup, "PORT", 8000, "a valid port number")?,
                environment: var_or("ENVIRONMENT", "development"),
                rust_log: var_or("RUST_LOG", "ticket_booking=debug,tower_http=debug"),
                cors_permissive: parse_or(&lookup, "CORS_PERMISSIVE", false, "true or false")?,
            },
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
                pool_size: parse_or(&lookup, "DB_POOL_SIZE", 10, "a valid number")?,
            },
            upload: UploadConfig {
                dir: PathBuf::from(var_or("UPLOAD_DIR", "./uploads")),
                max_bytes: parse_or(
                    &lookup,
                    "UPLOAD_MAX_BYTES",
                    DEFAULT_UPLOAD_MAX_BYTES,
                    "a size in bytes",
                )?,
                key_policy: parse_or(
                    &lookup,
                    "UPLOAD_KEY_POLICY",
                    StorageKeyPolicy::Original,
                    "original or unique",
                )?,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.environment.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.app.port, 8000);
        assert_eq!(config.app.host, "0.0.0.0");
        assert!(!config.app.cors_permissive);
        assert!(config.database.url.is_none());
        assert_eq!(config.upload.dir, PathBuf::from("./uploads"));
        assert_eq!(config.upload.max_bytes, DEFAULT_UPLOAD_MAX_BYTES);
        assert_eq!(config.upload.key_policy, StorageKeyPolicy::Original);
        assert!(!config.is_production());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "9090"),
            ("DATABASE_URL", "postgres://localhost/tickets"),
            ("UPLOAD_DIR", "/tmp/assets"),
            ("UPLOAD_KEY_POLICY", "Unique"),
            ("ENVIRONMENT", "production"),
        ])
        .unwrap();

        assert_eq!(config.app.port, 9090);
        assert_eq!(config.database.url.as_deref(), Some("postgres://localhost/tickets"));
        assert_eq!(config.upload.dir, PathBuf::from("/tmp/assets"));
        assert_eq!(config.upload.key_policy, StorageKeyPolicy::Unique);
        assert!(config.is_production());
    }

    #[test]
    fn blank_database_url_means_no_database() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();

        assert!(config.database.url.is_none());
    }

    #[test]
    fn invalid_values_are_reported_with_their_key() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().starts_with("PORT must be"));

        let err = config_from(&[("UPLOAD_KEY_POLICY", "random")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "UPLOAD_KEY_POLICY", .. }));
    }
}
