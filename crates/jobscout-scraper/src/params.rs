//! Search parameters and company filters.

use jobscout_core::{ConfigError, ConfigResult, SearchConfig};
use serde::{Deserialize, Serialize};

/// What to search for. Treated as immutable once a fetch begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Keyword phrases; a listing matches if any phrase matches
    pub keywords: Vec<String>,
    /// Location query, if any
    pub location: Option<String>,
    /// Maximum listings returned by one fetch
    pub max_results: usize,
    /// Listings requested per page
    pub page_size: usize,
    /// Search radius in miles
    pub distance_miles: Option<u32>,
    /// Only listings posted within this many days
    pub posted_within_days: Option<u32>,
    /// Company include/exclude lists
    pub companies: CompanyFilter,
}

impl SearchParams {
    /// Create parameters with the default limits from [`SearchConfig`].
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_config(&SearchConfig::default(), keywords)
    }

    /// Create parameters with limits taken from configuration.
    pub fn from_config<I, S>(config: &SearchConfig, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(Into::into)
                .filter(|k: &String| !k.trim().is_empty())
                .collect(),
            location: None,
            max_results: config.max_results,
            page_size: config.page_size,
            distance_miles: Some(config.distance_miles),
            posted_within_days: config.posted_within_days,
            companies: CompanyFilter::default(),
        }
    }

    /// Set the location query.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.location = if location.trim().is_empty() {
            None
        } else {
            Some(location)
        };
        self
    }

    /// Set the maximum number of listings.
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Set the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the search radius.
    #[must_use]
    pub fn with_distance(mut self, miles: u32) -> Self {
        self.distance_miles = Some(miles);
        self
    }

    /// Only include listings posted within the last `days` days.
    #[must_use]
    pub fn with_posted_within_days(mut self, days: u32) -> Self {
        self.posted_within_days = Some(days);
        self
    }

    /// Set company include/exclude lists.
    #[must_use]
    pub fn with_companies(mut self, companies: CompanyFilter) -> Self {
        self.companies = companies;
        self
    }

    /// Check limits before any request is made.
    ///
    /// `provider_page_limit` is the largest page the source can serve.
    pub fn validate(&self, provider_page_limit: usize) -> ConfigResult<()> {
        if self.max_results == 0 {
            return Err(ConfigError::invalid("max_results", "must be at least 1"));
        }
        if self.page_size == 0 {
            return Err(ConfigError::invalid("page_size", "must be at least 1"));
        }
        if self.page_size > provider_page_limit {
            return Err(ConfigError::invalid(
                "page_size",
                format!(
                    "{} exceeds the source limit of {provider_page_limit}",
                    self.page_size
                ),
            ));
        }
        Ok(())
    }

    /// Number of pages needed to reach `max_results`.
    #[must_use]
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.max_results.div_ceil(self.page_size)
    }

    /// Keywords joined into a single query string.
    #[must_use]
    pub fn keyword_query(&self) -> String {
        self.keywords.join(" ")
    }
}

/// Company include/exclude lists, compared case-insensitively by substring.
///
/// Exclusions win. An empty include list includes every company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyFilter {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl CompanyFilter {
    /// Build a filter from two lists of company names.
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            include: normalize(include),
            exclude: normalize(exclude),
        }
    }

    /// Parse newline- or comma-separated company lists.
    #[must_use]
    pub fn parse(include: &str, exclude: &str) -> Self {
        Self::new(split_list(include), split_list(exclude))
    }

    /// True if a listing from `company` should be kept.
    #[must_use]
    pub fn allows(&self, company: &str) -> bool {
        let company = company.to_lowercase();

        if self.exclude.iter().any(|excluded| company.contains(excluded)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|included| company.contains(included))
    }

    /// True if the filter lets everything through.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c| c == '\n' || c == ',')
}

fn normalize<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}
