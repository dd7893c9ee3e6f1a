use crate::models::{Settings, UserConfig};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

/// File name of the user configuration inside the config directory
pub const USER_CONFIG_FILE: &str = "ModHearth Config.yaml";

/// Prefix of environment overrides, e.g. `MODHEARTH__DEBUG_MODE=true`
pub const ENV_PREFIX: &str = "MODHEARTH";

/// Configuration manager for loading and saving `ModHearth Config.yaml`.
///
/// Loading layers the YAML file with `MODHEARTH__*` environment overrides for
/// the scalar settings; saving writes the file settings only, so an override
/// never leaks into the file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    user_config_path: Utf8PathBuf,
    /// Replaces the process environment when set (tests)
    env_source: Option<HashMap<String, String>>,
}

/// Scalar settings that may be overridden from the environment.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    df_exe_path: Option<Utf8PathBuf>,
    installed_mods_path: Option<Utf8PathBuf>,
    theme: Option<u32>,
    log_dir: Option<String>,
    debug_mode: Option<bool>,
    json_logs: Option<bool>,
}

impl EnvOverrides {
    fn apply(self, settings: &mut Settings) {
        if let Some(path) = self.df_exe_path {
            settings.df_exe_path = Some(path);
        }
        if let Some(path) = self.installed_mods_path {
            settings.installed_mods_path = Some(path);
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(log_dir) = self.log_dir {
            settings.log_dir = log_dir;
        }
        if let Some(debug_mode) = self.debug_mode {
            settings.debug_mode = debug_mode;
        }
        if let Some(json_logs) = self.json_logs {
            settings.json_logs = json_logs;
        }
    }
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            user_config_path: config_dir.join(USER_CONFIG_FILE),
            config_dir,
            env_source: None,
        })
    }

    /// Manage a config file with a non-standard name or location.
    pub fn from_file<P: AsRef<Utf8Path>>(path: P) -> Self {
        let user_config_path = path.as_ref().to_path_buf();
        let config_dir = user_config_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();
        Self {
            config_dir,
            user_config_path,
            env_source: None,
        }
    }

    /// Read overrides from `vars` instead of the process environment.
    pub fn with_env_source(mut self, vars: HashMap<String, String>) -> Self {
        self.env_source = Some(vars);
        self
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn user_config_path(&self) -> &Utf8Path {
        &self.user_config_path
    }

    /// Load the user configuration with environment overrides applied.
    ///
    /// # Returns
    /// The loaded UserConfig, or defaults (plus overrides) if the file doesn't exist
    pub fn load_user_config(&self) -> Result<UserConfig> {
        let mut config = self.load_user_config_file()?;
        self.env_overrides()?.apply(&mut config.settings);
        Ok(config)
    }

    /// Load the user configuration exactly as stored on disk.
    pub fn load_user_config_file(&self) -> Result<UserConfig> {
        if !self.user_config_path.exists() {
            tracing::warn!(
                "User config file not found at {}, using defaults",
                self.user_config_path
            );
            return Ok(UserConfig::default());
        }

        let file_contents = fs::read_to_string(&self.user_config_path)
            .with_context(|| format!("Failed to read user config: {}", self.user_config_path))?;

        if file_contents.trim().is_empty() {
            tracing::warn!("User config {} is empty, using defaults", self.user_config_path);
            return Ok(UserConfig::default());
        }

        let config: UserConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse user config: {}", self.user_config_path))?;

        tracing::info!("Loaded user config from {}", self.user_config_path);
        Ok(config)
    }

    /// Save the user configuration file.
    pub fn save_user_config(&self, config: &UserConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize user config to YAML")?;

        fs::write(&self.user_config_path, yaml_string)
            .with_context(|| format!("Failed to write user config: {}", self.user_config_path))?;

        tracing::info!("Saved user config to {}", self.user_config_path);
        Ok(())
    }

    fn env_overrides(&self) -> Result<EnvOverrides> {
        let environment = ::config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(self.env_source.clone());

        let overrides: EnvOverrides = ::config::Config::builder()
            .add_source(environment)
            .build()
            .context("Failed to read environment overrides")?
            .try_deserialize()
            .context("Invalid MODHEARTH__* environment override")?;

        tracing::debug!("Environment overrides: {:?}", overrides);
        Ok(overrides)
    }
}
