use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for the attendance client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttendanceConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Token handling
    pub auth: AuthConfig,
    /// Where the "stay logged in" session lives
    pub session: SessionConfig,
    /// Position reported with punches and logins
    pub geolocation: GeolocationConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the PHP API, without trailing slash
    pub base_url: String,
    /// Outgoing request limiting
    pub rate_limit: RateLimitConfig,
    /// How long a fetched workplace directory stays cached
    pub workplace_cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// HS256 secret; when set, token signatures are verified
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Session file path; defaults to the user config dir
    pub store_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeolocationConfig {
    /// Whether the user allowed location access
    pub permission_granted: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON lines instead of human readable output
    pub json_logs: bool,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "https://www.360digital.it/api".to_string(),
                rate_limit: RateLimitConfig {
                    requests_per_second: 2,
                    burst_capacity: 5,
                },
                workplace_cache_ttl_seconds: 600, // 10 minutes
            },
            auth: AuthConfig { jwt_secret: None },
            session: SessionConfig { store_path: None },
            geolocation: GeolocationConfig {
                permission_granted: true,
                latitude: None,
                longitude: None,
            },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                json_logs: false,
            },
        }
    }
}

impl SessionConfig {
    /// Resolved session file location
    pub fn resolved_path(&self) -> PathBuf {
        match &self.store_path {
            Some(path) => PathBuf::from(path),
            None => dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("attendance-client")
                .join("session.json"),
        }
    }
}

impl AttendanceConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (attendance.toml, .attendance-rc)
    /// 3. Environment variables (prefixed with ATTENDANCE__)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("attendance.toml").exists() {
            builder = builder.add_source(File::with_name("attendance"));
        }

        if Path::new(".attendance-rc").exists() {
            builder = builder.add_source(File::with_name(".attendance-rc").format(config::FileFormat::Toml));
        }

        // Double underscore keeps snake_case keys like base_url intact
        builder = builder.add_source(
            Environment::with_prefix("ATTENDANCE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<AttendanceConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = AttendanceConfig::load_env_file();
        AttendanceConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static AttendanceConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
