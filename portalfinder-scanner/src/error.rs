use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

/// Failure of a single (candidate, path) probe. Never fatal to the scan.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid probe target '{0}'")]
    InvalidTarget(String),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ProbeError {
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            ProbeError::Timeout {
                url: url.to_string(),
            }
        } else {
            ProbeError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
