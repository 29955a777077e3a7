//! Configuration management module.
//!
//! This module handles loading and saving the application configuration:
//! the service root, where the session entry is kept, and the timings used
//! while starting up.

mod error;

pub use error::ConfigError;

use crate::error::AppError;
use crate::session::DEFAULT_SERVICE_NAME;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

const FILE_NAME: &str = "config.yml";
const DEFAULT_DIRECTORY_PATH: &str = ".config/library-desk";
const DEFAULT_BASE_URL: &str = "https://libaray-saas-backend.onrender.com";

/// Oversees management of configuration file.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub service_name: String,
    pub session_dir: PathBuf,
    pub bootstrap_timeout: Duration,
    pub splash: Duration,
    pub request_timeout: Duration,
    pub log_level: LevelFilter,
    file_path: PathBuf,
}

/// Define specification for configuration file.
///
#[derive(Debug, Default, Serialize, Deserialize)]
struct FileSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splash_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Return the defaults for a configuration kept in `dir_path`.
    ///
    pub fn new(dir_path: &Path) -> Config {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            session_dir: dir_path.to_path_buf(),
            bootstrap_timeout: Duration::from_millis(5000),
            splash: Duration::from_millis(2000),
            request_timeout: Duration::from_millis(15000),
            log_level: LevelFilter::Warn,
            file_path: dir_path.join(FILE_NAME),
        }
    }

    /// Load the configuration from the custom directory if provided or the
    /// default one otherwise. A missing file yields the defaults.
    ///
    pub fn load(custom_path: Option<&str>) -> Result<Config, AppError> {
        let dir_path = match custom_path {
            Some(path) => Path::new(&path).to_path_buf(),
            None => Config::default_path()?,
        };
        let mut config = Config::new(&dir_path);

        if config.file_path.exists() {
            let contents =
                fs::read_to_string(&config.file_path).map_err(|e| ConfigError::LoadFailed {
                    path: config.file_path.clone(),
                    message: format!("IO error: {}", e),
                })?;
            config.apply(&contents)?;
        }

        Ok(config)
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Override defaults with whatever the file content specifies.
    ///
    fn apply(&mut self, contents: &str) -> Result<(), ConfigError> {
        if contents.trim().is_empty() {
            return Ok(());
        }
        let data: FileSpec = serde_yaml::from_str(contents)
            .map_err(|e| ConfigError::DeserializationFailed(e.to_string()))?;

        if let Some(base_url) = data.base_url {
            self.base_url = base_url;
        }
        if let Some(service_name) = data.service_name {
            if service_name.trim().is_empty() || service_name.contains(|c: char| c == '/' || c == '\\') {
                return Err(ConfigError::InvalidValue {
                    key: "service_name",
                    value: service_name,
                });
            }
            self.service_name = service_name;
        }
        if let Some(session_dir) = data.session_dir {
            self.session_dir = session_dir;
        }
        if let Some(ms) = data.bootstrap_timeout_ms {
            self.bootstrap_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = data.splash_ms {
            self.splash = Duration::from_millis(ms);
        }
        if let Some(ms) = data.request_timeout_ms {
            self.request_timeout = Duration::from_millis(ms);
        }
        if let Some(level) = data.log_level {
            self.log_level = level.parse().map_err(|_| ConfigError::InvalidValue {
                key: "log_level",
                value: level,
            })?;
        }
        Ok(())
    }

    /// Serialize the configuration and write it to the disk, creating the
    /// directory when needed.
    ///
    pub fn save(&self) -> Result<(), AppError> {
        let data = FileSpec {
            base_url: Some(self.base_url.clone()),
            service_name: Some(self.service_name.clone()),
            session_dir: Some(self.session_dir.clone()),
            bootstrap_timeout_ms: Some(millis(self.bootstrap_timeout)),
            splash_ms: Some(millis(self.splash)),
            request_timeout_ms: Some(millis(self.request_timeout)),
            log_level: Some(self.log_level.to_string().to_lowercase()),
        };
        let content = serde_yaml::to_string(&data)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        if let Some(parent) = self.file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirectoryFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut file = fs::File::create(&self.file_path).map_err(|e| ConfigError::SaveFailed {
            path: self.file_path.clone(),
            source: e,
        })?;
        write!(file, "{}", content).map_err(|e| ConfigError::SaveFailed {
            path: self.file_path.clone(),
            source: e,
        })?;
        file.flush().map_err(|e| ConfigError::SaveFailed {
            path: self.file_path.clone(),
            source: e,
        })?;
        Ok(())
    }

    /// Returns the path buffer for the default configuration directory or an
    /// error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, AppError> {
        match dirs::home_dir() {
            Some(home) => {
                let home_path = Path::new(&home);
                let default_config_path = Path::new(DEFAULT_DIRECTORY_PATH);
                Ok(home_path.join(default_config_path))
            }
            None => Err(ConfigError::HomeDirectoryNotFound.into()),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
