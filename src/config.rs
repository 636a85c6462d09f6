//! Configuration management for pagecheck.
//!
//! Settings are layered: built-in defaults, an optional config file (TOML,
//! YAML or JSON, chosen by extension), `PAGECHECK_*` environment variables,
//! then command line flags applied by the CLI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::analysis::{RecencyClassifier, DEFAULT_WINDOW_DAYS};
use crate::report::ReportFormat;

/// Name config files are discovered under (`pagecheck.toml`, `pagecheck.yaml`, ...).
pub const APP_NAME: &str = "pagecheck";

/// Default report subdirectory of the working directory.
const OUTPUT_SUBDIR: &str = "output";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid {key} in config file {}: {value}", path.display())]
    InvalidValue {
        path: PathBuf,
        key: &'static str,
        value: String,
    },
}

/// Effective application settings.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Directory receiving reports and `failed_links.txt`.
    pub output_dir: PathBuf,
    /// User agent override (`impersonate` picks a random browser).
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
    /// Base delay between page requests in milliseconds.
    pub request_delay_ms: u64,
    /// Recency window in days.
    pub window_days: i64,
    pub report_format: ReportFormat,
}

impl Default for Settings {
    fn default() -> Self {
        let output_dir = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(OUTPUT_SUBDIR);

        Self {
            output_dir,
            user_agent: None,
            request_timeout: 100,
            request_delay_ms: 1_000,
            window_days: DEFAULT_WINDOW_DAYS,
            report_format: ReportFormat::Csv,
        }
    }
}

impl Settings {
    pub fn classifier(&self) -> RecencyClassifier {
        RecencyClassifier::with_window_days(self.window_days)
    }

    /// Apply `PAGECHECK_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("PAGECHECK_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(shellexpand::tilde(&dir).as_ref());
        }
        if let Some(user_agent) = lookup("PAGECHECK_USER_AGENT") {
            self.user_agent = Some(user_agent);
        }
        if let Some(timeout) = parse_env(&lookup, "PAGECHECK_REQUEST_TIMEOUT")? {
            self.request_timeout = timeout;
        }
        if let Some(delay) = parse_env(&lookup, "PAGECHECK_REQUEST_DELAY_MS")? {
            self.request_delay_ms = delay;
        }
        if let Some(days) = parse_env::<_, i64>(&lookup, "PAGECHECK_WINDOW_DAYS")? {
            if days < 0 {
                return Err(ConfigError::InvalidEnv {
                    key: "PAGECHECK_WINDOW_DAYS".to_string(),
                    value: days.to_string(),
                });
            }
            self.window_days = days;
        }
        Ok(())
    }
}

fn parse_env<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                key: key.to_string(),
                value,
            }),
    }
}

/// Contents of a config file. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_format: Option<ReportFormat>,
    /// Path the config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific file path.
    /// The format follows the extension: `.toml`, `.yaml`/`.yml`, else JSON.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parsed: Result<Config, String> = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| e.to_string()),
            _ => serde_json::from_str(&contents).map_err(|e| e.to_string()),
        };

        let mut config = parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        if let Some(days) = config.window_days.filter(|days| *days < 0) {
            return Err(ConfigError::InvalidValue {
                path: path.to_path_buf(),
                key: "window_days",
                value: days.to_string(),
            });
        }

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Find a config file in the standard locations.
    /// Discovery is delegated to prefer; parsing stays with `load_from_path`.
    pub async fn discover() -> Option<PathBuf> {
        let found = prefer::load(APP_NAME).await.ok()?;
        found.source_path().map(|path| path.to_path_buf())
    }

    /// Directory relative paths in the config are resolved against.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are joined onto `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref output_dir) = self.output_dir {
            settings.output_dir = self.resolve_path(output_dir, base_dir);
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(delay) = self.request_delay_ms {
            settings.request_delay_ms = delay;
        }
        if let Some(days) = self.window_days {
            settings.window_days = days;
        }
        if let Some(format) = self.report_format {
            settings.report_format = format;
        }
    }
}

/// Build settings from defaults, the config file and the environment.
///
/// `config_path` overrides discovery; a missing explicit path is an error.
pub async fn load_settings(config_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => Config::discover().await,
    };
    if let Some(path) = path {
        debug!("Loading config from {}", path.display());
        let config = Config::load_from_path(&path)?;
        let base_dir = config.base_dir().unwrap_or_else(|| PathBuf::from("."));
        config.apply_to_settings(&mut settings, &base_dir);
    }

    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}
