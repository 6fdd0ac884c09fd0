//! Prompt construction for provider-backed analysis.

use jobscout_core::{Listing, Profile};

/// Upper bound on description and profile text sent to the provider.
pub const MAX_SECTION_CHARS: usize = 8_000;

/// System prompt shared by every analysis request.
pub const SYSTEM_PROMPT: &str = "You are a recruiter scoring how well a candidate's resume matches \
a job posting. Judge skills, experience level and domain. Be concise.";

/// Build the user message for one (profile, listing) pair.
#[must_use]
pub fn build_prompt(profile: &Profile, listing: &Listing) -> String {
    format!(
        "Rate this job match between 0-100 based on how well the candidate's resume matches \
the job requirements.

JOB:
Title: {title}
Company: {company}
Location: {location}
Description: {description}

RESUME:
{resume}

Respond ONLY in this exact format:
[Score]|[2-3 key reasons for the score]

Example: 85|Strong backend background, relevant industry experience, leadership skills",
        title = listing.title,
        company = listing.company,
        location = listing.location.as_deref().unwrap_or("Not specified"),
        description = truncate(&listing.description, MAX_SECTION_CHARS),
        resume = truncate(profile.as_str(), MAX_SECTION_CHARS),
    )
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
