use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;

use crate::deletion::FailurePolicy;
use crate::local::LocalResolver;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tautulli: TautulliConfig,
    pub local: LocalConfig,
    pub deletion: DeletionConfig,
    pub archive: ArchiveConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TautulliConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Page length requested from `get_library_media_info`.
    pub media_page_length: u32,
}

impl Default for TautulliConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8181".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            media_page_length: 10_000,
        }
    }
}

/// Mapping between the paths the server reports and the local mount.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    pub root_directory: Option<String>,
    pub relative_path_prefix: Option<String>,
    pub strict_paths: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeletionConfig {
    pub on_error: FailurePolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Directory that receives `archived_media.zip`.
    pub archive_path: String,
    pub s3_bucket: String,
    pub rclone_path: String,
    pub rclone_url: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            archive_path: ".".to_string(),
            s3_bucket: "my-bucket".to_string(),
            rclone_path: "rclone".to_string(),
            rclone_url: "127.0.0.1:1234".to_string(),
        }
    }
}

/// Overridden at runtime by `TRACING_LEVEL` and `LOG_FILE_PATH`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "./logs/unwatched.log".to_string(),
        }
    }
}

impl AppConfig {
    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> AppConfig {
        let mut config = self.clone();
        if !config.tautulli.api_key.is_empty() {
            config.tautulli.api_key = "********".to_string();
        }
        config
    }

    pub fn resolver(&self) -> LocalResolver {
        LocalResolver::new(
            non_empty(self.local.root_directory.as_deref()).map(PathBuf::from),
            non_empty(self.local.relative_path_prefix.as_deref()).map(str::to_string),
        )
        .strict(self.local.strict_paths)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("UNWATCHED")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
