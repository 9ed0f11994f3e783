//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are merged in increasing
//! priority order:
//!
//! 1. built-in defaults ([`ServiceConfig::default`])
//! 2. `<config_dir>/task-service.toml`
//! 3. `<config_dir>/task-service.<environment>.toml`
//! 4. `TASK_SERVICE_<SECTION>__<KEY>` environment variables
//!
//! Both files are optional.

use config::{Config, Environment, File};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ConfigResult, ConfigurationError};
use super::ServiceConfig;

const BASE_FILE_STEM: &str = "task-service";
const ENV_PREFIX: &str = "TASK_SERVICE";

/// Loaded configuration together with where it came from
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ServiceConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with an explicit environment
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            environment = %environment,
            directory = %config_directory.display(),
            "Loading configuration"
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        debug!(
            config = %serde_json::to_string(&config).unwrap_or_else(|_| "[serialization error]".to_string()),
            "Merged configuration"
        );
        info!(
            environment = %environment,
            rest_bind_address = %config.rest.bind_address,
            grpc_enabled = config.grpc.enabled,
            grpc_bind_address = %config.grpc.bind_address,
            repository_backend = ?config.repository.backend,
            event_sender_backend = ?config.event_sender.backend,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration, e.g. in tests
    pub fn from_config(config: ServiceConfig, environment: impl Into<String>) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.into(),
            config_directory: Self::default_config_directory(),
        }))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect the deployment environment from environment variables
    pub fn detect_environment() -> String {
        env::var("TASK_SERVICE_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    fn default_config_directory() -> PathBuf {
        env::var("TASK_SERVICE_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }

    fn load_and_merge_config(config_directory: &Path, environment: &str) -> ConfigResult<ServiceConfig> {
        let defaults = Config::try_from(&ServiceConfig::default())
            .map_err(|e| ConfigurationError::load_failed("defaults", e))?;

        let base_file = config_directory.join(format!("{BASE_FILE_STEM}.toml"));
        let environment_file = config_directory.join(format!("{BASE_FILE_STEM}.{environment}.toml"));

        let merged = Config::builder()
            .add_source(defaults)
            .add_source(File::from(base_file.clone()).required(false))
            .add_source(File::from(environment_file.clone()).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                ConfigurationError::load_failed(
                    format!("{} / {}", base_file.display(), environment_file.display()),
                    e,
                )
            })?;

        Ok(merged.try_deserialize::<ServiceConfig>()?)
    }
}
