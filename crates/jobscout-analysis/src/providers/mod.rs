//! Analysis provider implementations.

pub mod anthropic;
pub mod common;
pub mod keyword;

pub use anthropic::AnthropicAnalyzer;
pub use keyword::KeywordAnalyzer;
