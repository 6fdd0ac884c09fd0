//! Shared types used across the Jobscout pipeline.
//!
//! A [`RawListing`] is whatever the source handed back; a [`Listing`] is the
//! validated form the rest of the pipeline works with. Validation is the only
//! way to obtain a `Listing`, so required fields are guaranteed non-empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Natural identifier of a listing.
///
/// Normally the listing URL without query string or fragment. Listings that
/// arrive without a URL get an identifier derived from company, title and
/// location so they can still be deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListingId(String);

impl ListingId {
    /// Build an identifier from a listing URL.
    ///
    /// Returns `None` if the URL is blank.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let base = url
            .trim()
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        if base.is_empty() {
            None
        } else {
            Some(Self(base.to_string()))
        }
    }

    /// Build an identifier for a listing that has no URL.
    #[must_use]
    pub fn derived(company: &str, title: &str, location: Option<&str>) -> Self {
        let key = |s: &str| collapse_whitespace(s).to_lowercase();
        Self(format!(
            "listing:{}:{}:{}",
            key(company),
            key(title),
            location.map(key).unwrap_or_default()
        ))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A listing exactly as the source produced it. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    /// Job title
    pub title: Option<String>,
    /// Hiring company
    pub company: Option<String>,
    /// Location as displayed by the source
    pub location: Option<String>,
    /// Job description text
    pub description: Option<String>,
    /// Listing URL
    pub url: Option<String>,
    /// When the listing was posted
    pub posted_at: Option<DateTime<Utc>>,
}

/// Why a raw listing could not be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Title missing or blank
    MissingTitle,
    /// Company missing or blank
    MissingCompany,
    /// Description missing or blank
    MissingDescription,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self {
            Self::MissingTitle => "title",
            Self::MissingCompany => "company",
            Self::MissingDescription => "description",
        };
        write!(f, "missing required field: {field}")
    }
}

impl std::error::Error for RejectReason {}

/// A validated job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Natural identifier, unique within one pipeline run
    pub id: ListingId,
    /// Job title (non-empty)
    pub title: String,
    /// Hiring company (non-empty)
    pub company: String,
    /// Location, if the source provided one
    pub location: Option<String>,
    /// Description (non-empty)
    pub description: String,
    /// Listing URL, if any
    pub url: Option<String>,
    /// When the listing was posted
    pub posted_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Validate and normalize a raw listing.
    ///
    /// # Errors
    /// Returns the first required field that is missing or blank.
    pub fn from_raw(raw: RawListing) -> std::result::Result<Self, RejectReason> {
        let title = required(raw.title.as_deref()).ok_or(RejectReason::MissingTitle)?;
        let company = required(raw.company.as_deref()).ok_or(RejectReason::MissingCompany)?;
        let description = raw
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .ok_or(RejectReason::MissingDescription)?
            .to_string();
        let location = required(raw.location.as_deref());
        let url = raw
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        let id = url
            .as_deref()
            .and_then(ListingId::from_url)
            .unwrap_or_else(|| ListingId::derived(&company, &title, location.as_deref()));

        Ok(Self {
            id,
            title,
            company,
            location,
            description,
            url,
            posted_at: raw.posted_at,
        })
    }
}

fn required(value: Option<&str>) -> Option<String> {
    value
        .map(collapse_whitespace)
        .filter(|v| !v.is_empty())
}

/// Collapse every run of whitespace into a single space and trim both ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Candidate profile text, typically extracted from a resume.
///
/// Owned by the caller; the pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile(String);

impl Profile {
    /// Wrap extracted profile text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Get the profile text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the profile holds no usable text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for Profile {
    fn from(text: String) -> Self {
        Self(text)
    }
}
