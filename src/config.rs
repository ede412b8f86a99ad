use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH,
    DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL, DEFAULT_PORT,
};
use crate::error::{AppError, Result};

pub const CONFIG_PATH_ENV: &str = "APOD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const NASA_API_LOCATION_ENV: &str = "NASA_API_LOCATION";
pub const NASA_API_KEY_ENV: &str = "NASA_API_KEY";
pub const IMAGE_PROXY_ENV: &str = "CLOUDINARY_API_LOCATION";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub nasa: NasaConfig,
    pub images: ImageConfig,
    pub carousel: CarouselConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NasaConfig {
    pub api_location: Option<String>,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub proxy_location: Option<String>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the rotated JSON log files.
    pub dir: String,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_LOG_DIR.to_string(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Default for NasaConfig {
    fn default() -> Self {
        Self {
            api_location: None,
            api_key: None,
            timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            proxy_location: None,
            width: DEFAULT_IMAGE_WIDTH,
            height: DEFAULT_IMAGE_HEIGHT,
        }
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Endpoint and credentials for the upstream APOD API.
#[derive(Debug, Clone)]
pub struct NasaEndpoint {
    pub location: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Config {
    /// Defaults, overlaid by the optional TOML file, overlaid by the environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).ok();
        let mut config = match path.as_deref() {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH)?,
            None => {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Environment values win over file values; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(location) = non_empty(NASA_API_LOCATION_ENV) {
            self.nasa.api_location = Some(location);
        }
        if let Some(key) = non_empty(NASA_API_KEY_ENV) {
            self.nasa.api_key = Some(key);
        }
        if let Some(proxy) = non_empty(IMAGE_PROXY_ENV) {
            self.images.proxy_location = Some(proxy);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.carousel.batch_size == 0 {
            return Err(AppError::Config("carousel.batch_size must be at least 1".into()));
        }
        if self.nasa.timeout_ms == 0 {
            return Err(AppError::Config("nasa.timeout_ms must be positive".into()));
        }
        if self.logging.dir.trim().is_empty() {
            return Err(AppError::Config("logging.dir must not be empty".into()));
        }
        if self.images.width == 0 || self.images.height == 0 {
            return Err(AppError::Config("image dimensions must be positive".into()));
        }
        Ok(())
    }

    /// The upstream endpoint, or `MissingNasaConfig` when location or key is unset.
    pub fn nasa_endpoint(&self) -> Result<NasaEndpoint> {
        match (&self.nasa.api_location, &self.nasa.api_key) {
            (Some(location), Some(api_key)) => Ok(NasaEndpoint {
                location: location.clone(),
                api_key: api_key.clone(),
                timeout: Duration::from_millis(self.nasa.timeout_ms),
            }),
            _ => {
                warn!(
                    "{} and {} must both be set",
                    NASA_API_LOCATION_ENV, NASA_API_KEY_ENV
                );
                Err(AppError::MissingNasaConfig)
            }
        }
    }
}
