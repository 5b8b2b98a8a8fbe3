//! Server configuration parsed from environment variables.

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
pub const DEFAULT_CONSTANT_AGE: u32 = 25;
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Mock,
    Constant,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown AGE_MODEL: {0} (expected 'mock' or 'constant')")]
    UnknownModel(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    /// Per-image upload limit in bytes.
    pub max_file_size: usize,
    pub model: ModelKind,
    /// Age reported by the constant model.
    pub constant_age: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| (*o).to_owned()).collect(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            model: ModelKind::Mock,
            constant_age: DEFAULT_CONSTANT_AGE,
        }
    }
}

impl ServerConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `HOST`: default `0.0.0.0`
    /// - `PORT`: default 5000
    /// - `ALLOWED_ORIGINS`: comma-separated, `*` allows any origin
    /// - `MAX_FILE_SIZE`: bytes per image, default 10 MiB
    /// - `AGE_MODEL`: `mock` (default) or `constant`
    /// - `CONSTANT_AGE`: default 25
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        Ok(Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT", defaults.port),
            allowed_origins,
            max_file_size: env_parse("MAX_FILE_SIZE", defaults.max_file_size),
            model: parse_model(std::env::var("AGE_MODEL").ok().as_deref())?,
            constant_age: env_parse("CONSTANT_AGE", defaults.constant_age),
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_owned)
        .collect()
}

pub(crate) fn parse_model(raw: Option<&str>) -> Result<ModelKind, ConfigError> {
    match raw.map(str::trim).unwrap_or("mock") {
        "mock" => Ok(ModelKind::Mock),
        "constant" => Ok(ModelKind::Constant),
        other => Err(ConfigError::UnknownModel(other.to_owned())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
