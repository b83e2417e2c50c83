use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::{env, fs};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Sections every config file must declare, even if empty.
pub const REQUIRED_SECTIONS: [&str; 5] = ["env", "server", "storage", "auth", "logging"];

/// The secret shipped in the sample config. Refused in production.
pub const SAMPLE_JWT_SECRET: &str = "change-me";

static CONFIG: OnceLock<Arc<AppConfig>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("missing required config section `{0}`")]
    MissingSection(&'static str),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Test,
    Production,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: Environment,
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://briefhub.db?mode=rwc".to_string(),
            max_connections: 20,
            min_connections: 1,
        }
    }
}

/// Object storage and upload limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,
    /// Custom S3 endpoint (MinIO). `None` uses AWS.
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Prefix for the public URL of stored objects
    pub public_base_url: String,
    /// Maximum number of files per multipart request (default: 10)
    pub max_files: usize,
    /// Maximum size of a single file in bytes (default: 100 MB)
    pub max_file_size: usize,
    pub allowed_mime_types: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "briefhub".to_string(),
            endpoint: None,
            region: "us-east-1".to_string(),
            access_key: None,
            secret_key: None,
            public_base_url: "http://localhost:9000/briefhub".to_string(),
            max_files: 10,
            max_file_size: 100 * 1024 * 1024, // 100 MB
            allowed_mime_types: default_mime_types(),
        }
    }
}

fn default_mime_types() -> Vec<String> {
    [
        "image/jpeg",
        "image/png",
        "image/gif",
        "image/webp",
        "image/svg+xml",
        "video/mp4",
        "video/quicktime",
        "video/webm",
        "audio/mpeg",
        "audio/wav",
        "application/pdf",
        "application/zip",
        "text/plain",
    ]
    .iter()
    .map(|m| m.to_string())
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub allow_basic_auth: bool,
    pub allow_api_keys: bool,
    pub bootstrap_super_admin: Option<BootstrapAccount>,
    pub rbac: RbacConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SAMPLE_JWT_SECRET.to_string(),
            access_token_ttl_minutes: 60,
            refresh_token_ttl_days: 30,
            allow_basic_auth: true,
            allow_api_keys: true,
            bootstrap_super_admin: None,
            rbac: RbacConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Role -> permission policy. Permissions are `resource:action` strings,
/// either side may be `*`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    pub root_permission: String,
    pub global_read_roles: Vec<String>,
    pub global_write_roles: Vec<String>,
    pub roles: HashMap<String, RoleDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoleDefinition {
    pub permissions: Vec<String>,
    pub inherits: Vec<String>,
}

impl RoleDefinition {
    fn new(permissions: &[&str], inherits: &[&str]) -> Self {
        Self {
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            inherits: inherits.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl Default for RbacConfig {
    fn default() -> Self {
        let mut roles = HashMap::new();
        roles.insert(
            "user".to_string(),
            RoleDefinition::new(
                &[
                    "brands:create",
                    "brands:update",
                    "brands:delete",
                    "briefs:create",
                    "briefs:update",
                    "briefs:delete",
                    "submissions:*",
                    "reactions:*",
                    "portfolios:*",
                    "creatives:*",
                    "uploads:create",
                ],
                &[],
            ),
        );
        roles.insert(
            "admin".to_string(),
            RoleDefinition::new(&["tags:*", "users:read", "users:update", "users:delete"], &["user"]),
        );
        roles.insert(
            "super_admin".to_string(),
            RoleDefinition::new(&["*:*"], &["admin"]),
        );

        Self {
            root_permission: "*:*".to_string(),
            global_read_roles: Vec::new(),
            global_write_roles: Vec::new(),
            roles,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "briefhub_backend=info,tower_http=info".to_string(),
            format: LogFormat::Full,
        }
    }
}

impl AppConfig {
    /// Parse and validate a YAML document. Environment overrides are not applied.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        let mapping = value
            .as_mapping()
            .ok_or_else(|| ConfigError::Invalid("top level must be a mapping".to_string()))?;

        for section in REQUIRED_SECTIONS {
            if !mapping.contains_key(section) {
                return Err(ConfigError::MissingSection(section));
            }
        }

        let config: AppConfig = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file, apply environment overrides and validate it.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Secrets are usually injected through the environment rather than the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = env::var("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(url) = env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(key) = env::var("S3_ACCESS_KEY") {
            self.storage.access_key = Some(key);
        }
        if let Ok(key) = env::var("S3_SECRET_KEY") {
            self.storage.secret_key = Some(key);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must not be empty".to_string()));
        }
        if self.env == Environment::Production && self.auth.jwt_secret == SAMPLE_JWT_SECRET {
            return Err(ConfigError::Invalid(
                "auth.jwt_secret must be changed in production".to_string(),
            ));
        }
        if self.auth.access_token_ttl_minutes <= 0 || self.auth.refresh_token_ttl_days <= 0 {
            return Err(ConfigError::Invalid("token lifetimes must be positive".to_string()));
        }
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.bucket must not be empty".to_string()));
        }
        if self.storage.max_files == 0 || self.storage.max_file_size == 0 {
            return Err(ConfigError::Invalid("storage limits must be positive".to_string()));
        }

        let rbac = &self.auth.rbac;
        let referenced = rbac
            .global_read_roles
            .iter()
            .chain(rbac.global_write_roles.iter())
            .chain(rbac.roles.values().flat_map(|r| r.inherits.iter()));
        for role in referenced {
            if !rbac.roles.contains_key(role) {
                return Err(ConfigError::Invalid(format!(
                    "auth.rbac references undeclared role `{}`",
                    role
                )));
            }
        }

        Ok(())
    }

    /// Config for development and tests (sqlite, sample secret, default policy)
    pub fn development() -> Self {
        Self {
            env: Environment::Development,
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                ..Default::default()
            },
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Resolve the config path: explicit argument, then `APP_CONFIG`, then the default.
pub fn resolve_path(path: Option<&Path>) -> PathBuf {
    match path {
        Some(p) => p.to_path_buf(),
        None => env::var("APP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
    }
}

/// Load the process-wide config once; later calls return the memoized value.
pub fn load(path: Option<&Path>) -> Result<Arc<AppConfig>, ConfigError> {
    if let Some(config) = CONFIG.get() {
        return Ok(config.clone());
    }

    let config = Arc::new(AppConfig::from_path(&resolve_path(path))?);
    Ok(CONFIG.get_or_init(|| config).clone())
}
