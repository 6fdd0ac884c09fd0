use jobscout_core::ConfigError;
use jobscout_scraper::ScrapeError;
use thiserror::Error;

/// Errors a pipeline run can raise.
///
/// Provider failures never appear here. They are absorbed by the scraper
/// and the matching engine.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("profile text is empty")]
    EmptyProfile,

    #[error("pipeline run cancelled")]
    Cancelled,

    #[error("invalid pipeline parameters: {0}")]
    InvalidParams(#[from] ConfigError),
}

impl From<ScrapeError> for PipelineError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Config(e) => Self::InvalidParams(e),
            ScrapeError::Client(reason) => Self::InvalidParams(ConfigError::invalid("source", reason)),
        }
    }
}

/// Errors from turning a document into profile text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no text could be extracted from the document")]
    Empty,

    #[error("document is not valid UTF-8 text")]
    Encoding,

    #[error("unsupported document type: {0}")]
    Unsupported(String),

    #[error("failed to read PDF: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
