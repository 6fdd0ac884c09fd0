use jobscout_core::ConfigError;
use thiserror::Error;

/// Errors the scraper lets escape.
///
/// Provider failures never show up here: they are absorbed into the
/// manifest or into fallback data.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid search configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
