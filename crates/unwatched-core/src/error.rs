use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed '{command}' response: {source}")]
    MalformedResponse {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Tautulli '{command}' returned an error: {message}")]
    Api {
        command: &'static str,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Offload error: {0}")]
    Offload(String),

    #[error("{0}")]
    Other(String),
}
