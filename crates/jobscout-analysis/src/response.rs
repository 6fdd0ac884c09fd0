//! Parsing provider replies into an [`Analysis`].
//!
//! Two shapes are accepted: a `score|reasons` line (what the prompt asks
//! for) and a JSON object with `score` and `rationale` fields. Either may be
//! wrapped in a Markdown code fence. A reply with neither shape is
//! malformed; a reply with the right shape but a non-numeric score is
//! well-formed and carries [`ScoreReading::Unparsable`].

use crate::client::{Analysis, ScoreReading};
use crate::error::{AnalysisError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

#[allow(clippy::expect_used)]
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid number pattern"));

#[derive(Debug, Deserialize)]
struct JsonReply {
    score: Option<Value>,
    #[serde(alias = "reasons", alias = "reasoning")]
    rationale: Option<Value>,
}

/// Parse a raw reply from `provider`.
pub fn parse_response(provider: &str, text: &str) -> Result<Analysis> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(AnalysisError::malformed(provider, "empty reply"));
    }

    if body.starts_with('{') {
        return parse_json(provider, body);
    }

    parse_pipe(provider, body)
}

fn parse_pipe(provider: &str, body: &str) -> Result<Analysis> {
    let Some((score_part, rationale)) = body.split_once('|') else {
        return Err(AnalysisError::malformed(
            provider,
            format!("expected 'score|reasons', got: {}", preview(body)),
        ));
    };

    let rationale = rationale.trim();
    if rationale.is_empty() {
        return Err(AnalysisError::malformed(provider, "empty rationale"));
    }

    Ok(Analysis {
        score: read_score_text(score_part),
        rationale: rationale.to_string(),
    })
}

fn parse_json(provider: &str, body: &str) -> Result<Analysis> {
    let reply: JsonReply = serde_json::from_str(body)
        .map_err(|e| AnalysisError::malformed(provider, format!("invalid JSON: {e}")))?;

    let score = match reply.score {
        Some(Value::Number(n)) => n
            .as_f64()
            .map_or_else(|| ScoreReading::Unparsable(n.to_string()), ScoreReading::Value),
        Some(Value::String(s)) => read_score_text(&s),
        Some(other) => ScoreReading::Unparsable(other.to_string()),
        None => return Err(AnalysisError::malformed(provider, "missing score field")),
    };

    let rationale = match reply.rationale {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("; "),
        _ => String::new(),
    };
    if rationale.is_empty() {
        return Err(AnalysisError::malformed(provider, "missing rationale field"));
    }

    Ok(Analysis { score, rationale })
}

fn read_score_text(text: &str) -> ScoreReading {
    let text = text.trim();
    NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map_or_else(|| ScoreReading::Unparsable(text.to_string()), ScoreReading::Value)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // drop the info string (e.g. "json") on the opening line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().trim_end_matches("```").trim()
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(80).collect();
    if text.chars().count() > 80 {
        preview.push_str("...");
    }
    preview
}
