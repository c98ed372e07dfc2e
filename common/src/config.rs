// common/src/config.rs
use config::{Config as ConfigFile, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Central configuration for the portal
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub web_server_addr: String,

    /// Credential seeded at startup
    pub admin: AdminConfig,

    /// Document store holding users and counters
    pub store: StoreConfig,

    /// Shared directory served to logged-in users
    pub files: FilesConfig,

    pub session: SessionConfig,

    pub login_throttle: LoginThrottleConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    File,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// JSON document path, used when `kind = "file"`
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub public_dir: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secure_cookie: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginThrottleConfig {
    pub max_attempts: usize,
    pub window_seconds: u64,
    /// Key clients on `X-Forwarded-For`/`Forwarded` instead of the peer address.
    /// Only safe behind a reverse proxy that overwrites those headers.
    pub trust_forwarded_for: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_server_addr: "127.0.0.1:3000".to_string(),
            admin: AdminConfig::default(),
            store: StoreConfig::default(),
            files: FilesConfig::default(),
            session: SessionConfig::default(),
            login_throttle: LoginThrottleConfig::default(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "Admin".to_string(),
            password: "testingPassword".to_string(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            path: "./data/filedrop.json".to_string(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            public_dir: "./public".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "filedrop_session".to_string(),
            secure_cookie: true,
        }
    }
}

impl Default for LoginThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            window_seconds: 60,
            trust_forwarded_for: false,
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        let config = ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Environment variables with prefix "APP", e.g. APP__ADMIN__PASSWORD
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from files, falling back to plain environment variables
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");
                Self::from_plain_env()
            }
        }
    }

    fn from_plain_env() -> Self {
        let defaults = Self::default();

        let store_kind = match env::var("STORE_KIND").map(|v| v.to_lowercase()).as_deref() {
            Ok("file") => StoreKind::File,
            Ok("memory") => StoreKind::Memory,
            _ => defaults.store.kind,
        };

        let secure_cookie = env::var("SECURE_COOKIE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(defaults.session.secure_cookie);

        let max_attempts = env::var("LOGIN_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.login_throttle.max_attempts);

        let window_seconds = env::var("LOGIN_WINDOW_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.login_throttle.window_seconds);

        let trust_forwarded_for = env::var("TRUST_FORWARDED_FOR")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(defaults.login_throttle.trust_forwarded_for);

        Self {
            web_server_addr: env::var("WEB_SERVER_ADDR").unwrap_or(defaults.web_server_addr),
            admin: AdminConfig {
                username: env::var("ADMIN_USERNAME").unwrap_or(defaults.admin.username),
                password: env::var("ADMIN_PASSWORD").unwrap_or(defaults.admin.password),
            },
            store: StoreConfig {
                kind: store_kind,
                path: env::var("STORE_PATH").unwrap_or(defaults.store.path),
            },
            files: FilesConfig {
                public_dir: env::var("PUBLIC_DIR").unwrap_or(defaults.files.public_dir),
            },
            session: SessionConfig {
                cookie_name: env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.session.cookie_name),
                secure_cookie,
            },
            login_throttle: LoginThrottleConfig {
                max_attempts,
                window_seconds,
                trust_forwarded_for,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = ConfigFile::builder()
            .add_source(config::File::from_str(
                "[store]\nkind = \"file\"\npath = \"/tmp/users.json\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.store.kind, StoreKind::File);
        assert_eq!(config.store.path, "/tmp/users.json");
        assert_eq!(config.admin.username, "Admin");
        assert_eq!(config.session.cookie_name, "filedrop_session");
        assert_eq!(config.login_throttle.window_seconds, 60);
        assert!(!config.login_throttle.trust_forwarded_for);
    }
}
