//! Configuration loading and types for Gearshift.
//!
//! Configuration is read from an optional YAML file and deserialized into
//! the [`Config`] struct.  Environment variables are applied on top so the
//! service can be deployed with nothing but a `.env` file, using the same
//! variable names the rental API has always used (`PORT`, `DATABASE`,
//! `BUCKET`, `BUCKET_REGION`, `AWS_ACCESS_KEY`, `AWS_SECRET_KEY`).

use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Cross-origin policy.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Relational store settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Image storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Observability settings (metrics endpoint).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,

    /// Maximum request body size in bytes for multipart uploads.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout: default_shutdown_timeout(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// Allowed browser origins.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Exact origins allowed to call the API with credentials.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Relational store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Engine: `sqlite` or `memory`.
    #[serde(default = "default_database_engine")]
    pub engine: String,

    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: default_database_engine(),
            path: default_database_path(),
        }
    }
}

/// Image storage backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Backend type: `local`, `memory`, `aws`.
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// Namespace prepended to every generated object key.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Local storage configuration.
    #[serde(default)]
    pub local: LocalStorageConfig,

    /// In-memory storage configuration.
    #[serde(default)]
    pub memory: MemoryStorageConfig,

    /// AWS S3 configuration.
    #[serde(default)]
    pub aws: Option<AwsStorageConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            key_prefix: default_key_prefix(),
            local: LocalStorageConfig::default(),
            memory: MemoryStorageConfig::default(),
            aws: None,
        }
    }
}

/// Local filesystem storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalStorageConfig {
    /// Root directory for stored images.
    #[serde(default = "default_storage_root")]
    pub root_dir: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_storage_root(),
        }
    }
}

/// In-memory storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryStorageConfig {
    /// Cap on total stored bytes; 0 means unlimited.
    #[serde(default)]
    pub max_size_bytes: u64,
}

/// AWS S3 configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AwsStorageConfig {
    /// Target S3 bucket name.
    pub bucket: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom S3-compatible endpoint (e.g. MinIO, LocalStack).
    #[serde(default)]
    pub endpoint_url: String,
    /// Force path-style URL addressing.
    #[serde(default)]
    pub use_path_style: bool,
    /// Explicit AWS access key (falls back to env/credential chain).
    #[serde(default)]
    pub access_key_id: String,
    /// Explicit AWS secret key (falls back to env/credential chain).
    #[serde(default)]
    pub secret_access_key: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: text or json.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    /// Enable Prometheus metrics collection and `/metrics` endpoint.
    #[serde(default = "default_true")]
    pub metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { metrics: true }
    }
}

// -- Defaults ----------------------------------------------------------------

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4407
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_max_upload_size() -> usize {
    10 * 1024 * 1024
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "http://localhost:4407",
        "https://gearshift-rentals.vercel.app",
        "https://gearshift-api-latest.onrender.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_database_engine() -> String {
    "sqlite".to_string()
}

fn default_database_path() -> String {
    "./data/gearshift.db".to_string()
}

fn default_storage_backend() -> String {
    "local".to_string()
}

fn default_key_prefix() -> String {
    "gearshift-images/".to_string()
}

fn default_storage_root() -> String {
    "./data/uploads".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

// -- Loader ------------------------------------------------------------------

/// Load and parse configuration from a YAML file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let config: Config = serde_yaml::from_str(&contents)?;
    Ok(config)
}

/// Load the YAML file if it exists, otherwise start from defaults, then
/// apply environment overrides.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let mut config = if path.as_ref().exists() {
        load_config(path)?
    } else {
        Config::default()
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` is injected so tests do not have to mutate the process
/// environment.  Setting `BUCKET` switches the storage backend to `aws`.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(port) = var("PORT").and_then(|p| p.trim().parse().ok()) {
        config.server.port = port;
    }
    if let Some(host) = var("HOST") {
        config.server.host = host;
    }
    if let Some(path) = var("DATABASE") {
        config.database.path = path;
    }
    if let Some(origins) = var("ALLOWED_ORIGINS") {
        config.cors.allowed_origins = origins
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
    }

    if let Some(bucket) = var("BUCKET") {
        let aws = config.storage.aws.get_or_insert_with(|| AwsStorageConfig {
            bucket: String::new(),
            region: default_region(),
            endpoint_url: String::new(),
            use_path_style: false,
            access_key_id: String::new(),
            secret_access_key: String::new(),
        });
        aws.bucket = bucket;
        config.storage.backend = "aws".to_string();
    }
    if let Some(aws) = config.storage.aws.as_mut() {
        if let Some(region) = var("BUCKET_REGION") {
            aws.region = region;
        }
        if let Some(key) = var("AWS_ACCESS_KEY") {
            aws.access_key_id = key;
        }
        if let Some(secret) = var("AWS_SECRET_KEY") {
            aws.secret_access_key = secret;
        }
    }
}
