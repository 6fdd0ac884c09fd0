//! Turning an uploaded document into profile text.

use crate::error::ExtractError;
use jobscout_core::Profile;
use std::path::Path;

/// Produces plain text from document bytes.
pub trait TextExtractor: Send + Sync {
    /// Extract raw text from `bytes`.
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Reads UTF-8 text documents as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| ExtractError::Encoding)
    }
}

/// Extracts the text layer of a PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
    }
}

/// Pick an extractor from a file extension.
pub fn extractor_for(path: &Path) -> Result<Box<dyn TextExtractor>, ExtractError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(Box::new(PdfExtractor)),
        "txt" | "md" | "text" | "" => Ok(Box::new(PlainTextExtractor)),
        other => Err(ExtractError::Unsupported(other.to_string())),
    }
}

/// Extract and clean profile text from document bytes.
///
/// # Errors
/// Fails if the extractor fails or nothing but whitespace remains.
pub fn extract_profile(
    extractor: &dyn TextExtractor,
    bytes: &[u8],
) -> Result<Profile, ExtractError> {
    let text = clean_text(&extractor.extract(bytes)?);
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(Profile::new(text))
}

/// Read a resume from disk and extract its profile text.
pub fn load_profile(path: &Path) -> Result<Profile, ExtractError> {
    let extractor = extractor_for(path)?;
    let bytes = std::fs::read(path)?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
    extract_profile(extractor.as_ref(), &bytes)
}

/// Collapse runs of spaces within lines and drop blank lines.
#[must_use]
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
