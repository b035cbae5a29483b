//! Configuration loading and root folder resolution
//!
//! The root folder holds the service TOML file, the SQLite database and the
//! uploads directory. It is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `USPSHARE_ROOT` environment variable
//! 3. `root_folder` key of `<config_dir>/uspshare/config.toml`
//! 4. OS-dependent default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the root folder
pub const ROOT_ENV_VAR: &str = "USPSHARE_ROOT";

/// Service configuration file name inside the root folder
pub const CONFIG_FILE_NAME: &str = "uspshare.toml";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_FILE: &str = "uspshare.db";
const DEFAULT_UPLOADS_DIR: &str = "uploads";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_NOTIFICATION_LIMIT: i64 = 50;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

/// Resolve the root folder (CLI > env > user config file > OS default)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = root_folder_from_user_config() {
        return path;
    }

    default_root_folder()
}

fn root_folder_from_user_config() -> Option<PathBuf> {
    let config_path = dirs::config_dir()?.join("uspshare").join("config.toml");
    let content = std::fs::read_to_string(&config_path).ok()?;
    let value = toml::from_str::<toml::Value>(&content).ok()?;
    value
        .get("root_folder")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("uspshare"))
        .unwrap_or_else(|| PathBuf::from("./uspshare_data"))
}

/// Raw contents of `<root>/uspshare.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    bind: Option<String>,
    database_file: Option<String>,
    uploads_dir: Option<String>,
    jwt_secret: Option<String>,
    token_ttl_hours: Option<i64>,
    notification_limit: Option<i64>,
    max_upload_bytes: Option<usize>,
    max_avatar_bytes: Option<usize>,
    cors_origin: Option<String>,
}

/// Effective service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub root_folder: PathBuf,
    pub bind: SocketAddr,
    pub database_path: PathBuf,
    pub uploads_dir: PathBuf,
    /// Configured signing secret; `None` means one is generated and persisted
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: i64,
    pub notification_limit: i64,
    pub max_upload_bytes: usize,
    pub max_avatar_bytes: usize,
    /// Allowed browser origin; `None` allows any origin
    pub cors_origin: Option<String>,
}

impl AppConfig {
    /// Defaults rooted at `root_folder`, ignoring files and environment
    pub fn with_root(root_folder: impl Into<PathBuf>) -> Self {
        let root_folder = root_folder.into();
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            database_path: root_folder.join(DEFAULT_DATABASE_FILE),
            uploads_dir: root_folder.join(DEFAULT_UPLOADS_DIR),
            jwt_secret: None,
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            notification_limit: DEFAULT_NOTIFICATION_LIMIT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_avatar_bytes: DEFAULT_MAX_AVATAR_BYTES,
            cors_origin: None,
            root_folder,
        }
    }

    /// Load configuration for `root_folder`
    ///
    /// A missing `uspshare.toml` is not an error: defaults are used and a
    /// warning is logged. Environment overrides (`USPSHARE_BIND`,
    /// `USPSHARE_JWT_SECRET`, `USPSHARE_CORS_ORIGIN`) are applied last.
    pub fn load(root_folder: &Path) -> Result<Self> {
        let mut config = Self::with_root(root_folder);
        let config_path = root_folder.join(CONFIG_FILE_NAME);

        match std::fs::read_to_string(&config_path) {
            Ok(content) => {
                let file: FileConfig = toml::from_str(&content).map_err(|e| {
                    Error::Config(format!("Invalid {}: {}", config_path.display(), e))
                })?;
                config.apply_file(file)?;
                info!(path = %config_path.display(), "Loaded configuration file");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %config_path.display(), "Config file not found, using defaults");
            }
            Err(e) => return Err(e.into()),
        }

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<()> {
        if let Some(bind) = file.bind {
            self.bind = parse_bind(&bind)?;
        }
        if let Some(db) = file.database_file {
            self.database_path = self.root_folder.join(db);
        }
        if let Some(dir) = file.uploads_dir {
            self.uploads_dir = self.root_folder.join(dir);
        }
        if file.jwt_secret.is_some() {
            self.jwt_secret = file.jwt_secret;
        }
        if let Some(ttl) = file.token_ttl_hours {
            self.token_ttl_hours = ttl;
        }
        if let Some(limit) = file.notification_limit {
            self.notification_limit = limit;
        }
        if let Some(max) = file.max_upload_bytes {
            self.max_upload_bytes = max;
        }
        if let Some(max) = file.max_avatar_bytes {
            self.max_avatar_bytes = max;
        }
        if file.cors_origin.is_some() {
            self.cors_origin = file.cors_origin;
        }
        Ok(())
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(bind) = non_empty_env("USPSHARE_BIND") {
            self.bind = parse_bind(&bind)?;
        }
        if let Some(secret) = non_empty_env("USPSHARE_JWT_SECRET") {
            self.jwt_secret = Some(secret);
        }
        if let Some(origin) = non_empty_env("USPSHARE_CORS_ORIGIN") {
            self.cors_origin = Some(origin);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.token_ttl_hours <= 0 {
            return Err(Error::Config("token_ttl_hours must be positive".to_string()));
        }
        if self.notification_limit <= 0 {
            return Err(Error::Config("notification_limit must be positive".to_string()));
        }
        if matches!(&self.jwt_secret, Some(s) if s.len() < 16) {
            return Err(Error::Config(
                "jwt_secret must be at least 16 characters".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bind(value: &str) -> Result<SocketAddr> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid bind address: {}", value)))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
