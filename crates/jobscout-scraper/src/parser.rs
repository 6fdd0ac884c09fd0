use chrono::{DateTime, NaiveDate, Utc};
use jobscout_core::{types::collapse_whitespace, RawListing};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

struct CardSelectors {
    card: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    posted: Selector,
    link: Selector,
}

#[allow(clippy::expect_used)]
static CARD_SELECTORS: Lazy<CardSelectors> = Lazy::new(|| {
    let parse = |s: &str| Selector::parse(s).expect("valid card selector");
    CardSelectors {
        card: parse("div.base-card, div.job-search-card"),
        title: parse("h3.base-search-card__title, h4.base-search-card__title"),
        company: parse("h4.base-search-card__subtitle, h5.base-search-card__subtitle"),
        location: parse("span.job-search-card__location"),
        posted: parse("time.job-search-card__listdate, time.job-search-card__listdate--new, time"),
        link: parse("a.base-card__full-link, a.base-card--link, a"),
    }
});

#[allow(clippy::expect_used)]
static DESCRIPTION_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "div.description__text",
        "div.show-more-less-html__markup",
        "div.job-description",
        "div.description",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid description selector"))
    .collect()
});

/// Parses a page of job cards into raw listings.
///
/// Cards are never dropped here: missing fields stay `None` so the scraper
/// can count them as rejected.
pub struct CardParser;

impl CardParser {
    pub fn parse(html: &str) -> Vec<RawListing> {
        let document = Html::parse_fragment(html);
        let selectors = &*CARD_SELECTORS;

        document
            .select(&selectors.card)
            .map(|card| RawListing {
                title: extract_text(&card, &selectors.title),
                company: extract_text(&card, &selectors.company),
                location: extract_text(&card, &selectors.location),
                description: None,
                url: card
                    .select(&selectors.link)
                    .next()
                    .and_then(|el| el.value().attr("href"))
                    .map(|href| href.trim().to_string())
                    .filter(|href| !href.is_empty()),
                posted_at: card
                    .select(&selectors.posted)
                    .next()
                    .and_then(|el| el.value().attr("datetime"))
                    .and_then(parse_posted_at),
            })
            .collect()
    }
}

/// Pull the description text out of a job detail page.
pub fn parse_description(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    DESCRIPTION_SELECTORS.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
            .filter(|text| !text.is_empty())
    })
}

/// Description used when the detail page cannot be read.
pub fn summary_description(listing: &RawListing) -> Option<String> {
    let title = listing.title.as_deref()?;
    let company = listing.company.as_deref()?;
    let location = listing.location.as_deref().unwrap_or("Not specified");
    Some(format!(
        "Position: {title}\nCompany: {company}\nLocation: {location}"
    ))
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates.
pub fn parse_posted_at(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn extract_text(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|text| !text.is_empty())
}
