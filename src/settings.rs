use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use dotenv::dotenv;
use std::{env, fmt, str::FromStr};
use zeroize::Zeroizing;

use crate::{auth::admin_token::AdminGate, codec::DecodePolicy};

pub const MIN_ADMIN_TOKEN_LEN: usize = 12;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_storage_backend")]
    pub storage_backend: StorageBackend,

    #[serde(default)]
    pub database_url: String,

    #[serde(default = "default_max_db_connections")]
    pub max_db_connections: u32,

    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_secret")]
    pub admin_token: Zeroizing<String>,

    #[serde(default)]
    pub array_decode_policy: DecodePolicy,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Portfolio-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_storage_backend() -> StorageBackend {
    StorageBackend::Postgres
}
fn default_max_db_connections() -> u32 {
    20
}
fn default_run_migrations() -> bool {
    true
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Zeroizing<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Zeroizing::new)
}

impl AppConfig {
    /// Loads `config/default`, `config/{APP_ENV}`, then `APP_*` variables
    /// (`__` separates nested keys).
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .try_parsing(true)
                    .ignore_empty(true),
            )
            .set_override("env", env_name.to_string())?;

        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.storage_backend == StorageBackend::Postgres && self.database_url.trim().is_empty() {
            errors.push("DATABASE_URL cannot be empty when the postgres backend is selected");
        }
        if self.admin_token.len() < MIN_ADMIN_TOKEN_LEN {
            errors.push("ADMIN_TOKEN must be at least 12 characters");
        }
        if self.max_db_connections == 0 {
            errors.push("MAX_DB_CONNECTIONS must be greater than zero");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn admin_gate(&self) -> AdminGate {
        AdminGate::new(self.admin_token.clone())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else if self.len() < MIN_ADMIN_TOKEN_LEN {
            "[TOO_SHORT]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("storage_backend", &self.storage_backend)
            .field("database_url", &self.database_url.redact())
            .field("max_db_connections", &self.max_db_connections)
            .field("run_migrations", &self.run_migrations)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("admin_token", &self.admin_token.redact())
            .field("array_decode_policy", &self.array_decode_policy)
            .field("log_format", &self.log_format)
            .finish()
    }
}
