use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use unwatched_core::config::LoggingConfig;

/// Stdout (ANSI) plus a plain-text log file. `TRACING_LEVEL` and
/// `LOG_FILE_PATH` win over the `[logging]` config section.
pub fn init_logger(config: &LoggingConfig) -> WorkerGuard {
    let level = env::var("TRACING_LEVEL").ok();
    let filter_layer = EnvFilter::try_new(pick(level.as_deref(), &config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file = env::var("LOG_FILE_PATH").ok();
    let (dir, name) = log_target(pick(file.as_deref(), &config.file));

    let file_appender = tracing_appender::rolling::never(&dir, &name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer)
        .init();

    debug!(dir = %dir.display(), file = %name.display(), "Logging to file");

    guard
}

fn pick<'a>(override_value: Option<&'a str>, configured: &'a str) -> &'a str {
    override_value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(configured)
}

/// Split a log path into the appender's directory and file name.
fn log_target(path: &str) -> (PathBuf, PathBuf) {
    let path = Path::new(path);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("unwatched.log"));
    (dir, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_config() {
        assert_eq!(pick(Some("debug"), "info"), "debug");
        assert_eq!(pick(Some("  "), "info"), "info");
        assert_eq!(pick(None, "warn"), "warn");
    }

    #[test]
    fn test_log_target_split() {
        assert_eq!(
            log_target("./logs/unwatched.log"),
            (PathBuf::from("./logs"), PathBuf::from("unwatched.log"))
        );
        assert_eq!(
            log_target("run.log"),
            (PathBuf::from("."), PathBuf::from("run.log"))
        );
        assert_eq!(
            log_target("/var/log/"),
            (PathBuf::from("/"), PathBuf::from("log"))
        );
    }
}
