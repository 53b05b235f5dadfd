use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::color::{parse_hex_color, HexColor};

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Extra colors every new user starts with, besides the default color.
    #[serde(default)]
    pub starter_palette: Vec<String>,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialAppConfig {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    listen_addr: Option<String>,
    log_dir: Option<String>,
    starter_palette: Option<Vec<String>>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl PartialAppConfig {
    fn from_env() -> Self {
        let var = |key: &str| env::var(key).ok().filter(|v| !v.is_empty());
        PartialAppConfig {
            database_url: var("DATABASE_URL"),
            jwt_secret: var("JWT_SECRET"),
            listen_addr: var("LISTEN_ADDR"),
            log_dir: var("LOG_DIR"),
            starter_palette: var("STARTER_PALETTE").map(|list| split_palette(&list)),
        }
    }

    fn from_file(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(PartialAppConfig::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse TOML from config file at {path:?}: {e}"))
    }
}

fn split_palette(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

impl AppConfig {
    /// Loads `.env`, then the optional TOML file, then lets environment variables override it.
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path_str) => PartialAppConfig::from_file(Path::new(path_str))?,
            None => PartialAppConfig::default(),
        };

        Self::merge(PartialAppConfig::from_env(), file_config)
    }

    fn merge(env_config: PartialAppConfig, file_config: PartialAppConfig) -> Result<Self, String> {
        Ok(AppConfig {
            database_url: env_config
                .database_url
                .or(file_config.database_url)
                .ok_or("DATABASE_URL is required")?,
            jwt_secret: env_config
                .jwt_secret
                .or(file_config.jwt_secret)
                .ok_or("JWT_SECRET is required")?,
            listen_addr: env_config
                .listen_addr
                .or(file_config.listen_addr)
                .unwrap_or_else(default_listen_addr),
            log_dir: env_config
                .log_dir
                .or(file_config.log_dir)
                .unwrap_or_else(default_log_dir),
            starter_palette: env_config
                .starter_palette
                .or(file_config.starter_palette)
                .unwrap_or_default(),
        })
    }

    /// The configured starter colors that parse. Invalid entries are logged and skipped.
    pub fn starter_palette(&self) -> Vec<HexColor> {
        self.starter_palette
            .iter()
            .filter_map(|code| match parse_hex_color(code) {
                Ok(hex) => Some(hex),
                Err(e) => {
                    warn!(code = %code, error = %e, "Skipping invalid starter palette color.");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(toml_text: &str) -> PartialAppConfig {
        toml::from_str(toml_text).unwrap()
    }

    #[test]
    fn test_env_overrides_file() {
        let file = partial(
            r#"
            database_url = "sqlite://file.db"
            jwt_secret = "file-secret"
            listen_addr = "127.0.0.1:9000"
            "#,
        );
        let env = PartialAppConfig {
            jwt_secret: Some("env-secret".to_string()),
            ..Default::default()
        };

        let config = AppConfig::merge(env, file).unwrap();
        assert_eq!(config.database_url, "sqlite://file.db");
        assert_eq!(config.jwt_secret, "env-secret");
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.log_dir, "logs");
        assert!(config.starter_palette.is_empty());
    }

    #[test]
    fn test_missing_required_values() {
        let file = partial(r#"jwt_secret = "s""#);
        let err = AppConfig::merge(PartialAppConfig::default(), file).unwrap_err();
        assert_eq!(err, "DATABASE_URL is required");

        let file = partial(r#"database_url = "sqlite::memory:""#);
        let err = AppConfig::merge(PartialAppConfig::default(), file).unwrap_err();
        assert_eq!(err, "JWT_SECRET is required");
    }

    #[test]
    fn test_starter_palette_skips_invalid_codes() {
        let file = partial(
            r##"
            database_url = "sqlite::memory:"
            jwt_secret = "s"
            starter_palette = ["ff0000", "not-a-color", "#00ff00-0.5"]
            "##,
        );
        let config = AppConfig::merge(PartialAppConfig::default(), file).unwrap();

        let palette = config.starter_palette();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette[0].to_string(), "#FF0000-1.0");
        assert_eq!(palette[1].to_string(), "#00FF00-0.5");
    }

    #[test]
    fn test_split_palette_from_env_list() {
        assert_eq!(
            split_palette(" ff0000, ,00ff00 ,"),
            vec!["ff0000".to_string(), "00ff00".to_string()]
        );
    }
}
