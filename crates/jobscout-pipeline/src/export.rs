//! Projecting ranked results into flat rows for presentation.

use jobscout_core::{Listing, ListingId};
use jobscout_matcher::{MatchResult, MatchStatus};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

/// Score at or above which a listing counts as a high match.
pub const HIGH_MATCH_THRESHOLD: u8 = 80;

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Job Title")]
    pub title: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Posted Date")]
    pub posted_date: String,
    #[serde(rename = "Match Score")]
    pub match_score: u8,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Match Reasoning")]
    pub match_reasoning: String,
    #[serde(rename = "Job URL")]
    pub url: String,
}

impl ExportRow {
    fn new(result: &MatchResult, listing: &Listing) -> Self {
        let status = match &result.status {
            MatchStatus::Scored => "scored".to_string(),
            MatchStatus::Failed(reason) => format!("failed: {reason}"),
        };

        Self {
            title: listing.title.clone(),
            company: listing.company.clone(),
            location: listing
                .location
                .clone()
                .unwrap_or_else(|| "Not specified".to_string()),
            posted_date: listing
                .posted_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            match_score: result.score,
            status,
            match_reasoning: result.rationale.clone(),
            url: listing.url.clone().unwrap_or_default(),
        }
    }
}

/// Pair ranked results with their listings, keeping the ranked order.
///
/// Results whose listing is not in `listings` are skipped.
#[must_use]
pub fn project_to_rows(results: &[MatchResult], listings: &[Listing]) -> Vec<ExportRow> {
    let by_id: HashMap<&ListingId, &Listing> =
        listings.iter().map(|listing| (&listing.id, listing)).collect();

    results
        .iter()
        .filter_map(|result| match by_id.get(&result.listing_id) {
            Some(listing) => Some(ExportRow::new(result, listing)),
            None => {
                tracing::warn!("No listing for result {}, skipping row", result.listing_id);
                None
            }
        })
        .collect()
}

/// Write rows as CSV with a header line.
pub fn write_csv<W: Write>(writer: W, rows: &[ExportRow]) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Headline numbers for a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub scored: usize,
    pub failed: usize,
    /// Mean score over scored results; `None` when nothing was scored.
    pub average_score: Option<f64>,
    pub high_matches: usize,
}

/// Summarize a set of results.
#[must_use]
pub fn summarize(results: &[MatchResult]) -> RunSummary {
    let scores: Vec<u8> = results
        .iter()
        .filter(|r| r.is_scored())
        .map(|r| r.score)
        .collect();

    let average_score = if scores.is_empty() {
        None
    } else {
        let sum: u32 = scores.iter().map(|&s| u32::from(s)).sum();
        #[allow(clippy::cast_precision_loss)]
        Some(f64::from(sum) / scores.len() as f64)
    };

    RunSummary {
        total: results.len(),
        scored: scores.len(),
        failed: results.len() - scores.len(),
        average_score,
        high_matches: scores.iter().filter(|&&s| s >= HIGH_MATCH_THRESHOLD).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jobscout_analysis::Analysis;
    use jobscout_matcher::FailureReason;

    fn listing(title: &str, url: Option<&str>) -> Listing {
        let id = url
            .and_then(ListingId::from_url)
            .unwrap_or_else(|| ListingId::derived("Acme", title, Some("Berlin")));
        Listing {
            id,
            title: title.to_string(),
            company: "Acme".to_string(),
            location: Some("Berlin".to_string()),
            description: "Build things".to_string(),
            url: url.map(str::to_string),
            posted_at: Some(chrono::Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()),
        }
    }

    fn fixtures() -> (Vec<Listing>, Vec<MatchResult>) {
        let listings = vec![
            listing("Backend Engineer", Some("https://example.com/jobs/1")),
            listing("Data Engineer", None),
            listing("Platform Engineer", Some("https://example.com/jobs/3")),
        ];
        let results = vec![
            MatchResult::from_analysis(listings[2].id.clone(), 2, Analysis::scored(92.0, "Great fit")),
            MatchResult::from_analysis(listings[0].id.clone(), 0, Analysis::scored(60.0, "Partial")),
            MatchResult::failed(listings[1].id.clone(), 1, FailureReason::Cancelled),
        ];
        (listings, results)
    }

    #[test]
    fn test_project_keeps_ranked_order() {
        let (listings, results) = fixtures();
        let rows = project_to_rows(&results, &listings);

        let titles: Vec<&str> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Platform Engineer", "Backend Engineer", "Data Engineer"]);
        assert_eq!(rows[0].match_score, 92);
        assert_eq!(rows[0].status, "scored");
        assert_eq!(rows[0].posted_date, "2024-03-05");
        assert_eq!(rows[2].status, "failed: cancelled");
        assert_eq!(rows[2].url, "");
    }

    #[test]
    fn test_project_skips_unknown_listing() {
        let (listings, mut results) = fixtures();
        results.push(MatchResult::failed(
            ListingId::derived("Other", "Ghost", None),
            9,
            FailureReason::Cancelled,
        ));
        assert_eq!(project_to_rows(&results, &listings).len(), 3);
    }

    #[test]
    fn test_write_csv() {
        let (listings, results) = fixtures();
        let rows = project_to_rows(&results, &listings);

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &rows).expect("write csv");
        let text = String::from_utf8(buffer).expect("utf8");
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("Job Title,Company,Location,Posted Date,Match Score,Status,Match Reasoning,Job URL")
        );
        assert_eq!(
            lines.next(),
            Some("Platform Engineer,Acme,Berlin,2024-03-05,92,scored,Great fit,https://example.com/jobs/3")
        );
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_summarize() {
        let (_, results) = fixtures();
        let summary = summarize(&results);

        assert_eq!(summary.total, 3);
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.average_score, Some(76.0));
        assert_eq!(summary.high_matches, 1);

        let empty = summarize(&[]);
        assert_eq!(empty.average_score, None);
        assert_eq!(empty.total, 0);
    }
}
