use crate::params::SearchParams;
use url::Url;

const SECONDS_PER_DAY: u64 = 86_400;

/// Build the guest search URL for one page.
pub fn build_search_url(base: &Url, params: &SearchParams, page_index: usize) -> Url {
    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("keywords", &params.keyword_query());
        if let Some(location) = &params.location {
            query.append_pair("location", location);
        }
        if let Some(distance) = params.distance_miles {
            query.append_pair("distance", &distance.to_string());
        }
        // newest first
        query.append_pair("sortBy", "DD");
        query.append_pair("start", &(page_index * params.page_size).to_string());
        if let Some(days) = params.posted_within_days {
            query.append_pair("f_TPR", &format!("r{}", u64::from(days) * SECONDS_PER_DAY));
        }
    }
    url
}
