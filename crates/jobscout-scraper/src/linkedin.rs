//! LinkedIn guest job-search source.

use crate::error::{Result, ScrapeError};
use crate::params::SearchParams;
use crate::parser::{parse_description, summary_description, CardParser};
use crate::source::{SourceClient, SourceError};
use crate::url_builder::build_search_url;
use async_trait::async_trait;
use jobscout_core::{ConfigError, RateGate, RawListing, SourceConfig};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Largest page the guest search endpoint returns.
pub const PAGE_LIMIT: usize = 10;

/// Fetches job cards from the public LinkedIn guest search endpoint.
///
/// When description fetching is on, the job page of each card from an
/// allowed company is requested through the same rate gate as the search
/// pages, for at most `max_results` cards per page.
pub struct LinkedInSource {
    client: Client,
    base_url: Url,
    gate: Arc<RateGate>,
    fetch_descriptions: bool,
}

impl LinkedInSource {
    /// Create a source from configuration.
    ///
    /// # Errors
    /// Returns a configuration error for an unparsable base URL, or a client
    /// error if the HTTP client cannot be built.
    pub fn new(config: &SourceConfig, gate: Arc<RateGate>) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::invalid("source.base_url", e.to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ScrapeError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            gate,
            fetch_descriptions: config.fetch_descriptions,
        })
    }

    async fn get(&self, url: &Url) -> std::result::Result<String, SourceError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok());
            return Err(status_error(status, retry_after));
        }

        response.text().await.map_err(request_error)
    }

    async fn fetch_description(&self, raw: &mut RawListing) {
        if let Some(url) = raw.url.as_deref().and_then(|u| Url::parse(u).ok()) {
            self.gate.acquire().await;
            match self.get(&url).await {
                Ok(html) => raw.description = parse_description(&html),
                Err(e) => tracing::debug!("No description for {}: {}", url, e),
            }
        }
    }
}

#[async_trait]
impl SourceClient for LinkedInSource {
    async fn fetch_page(
        &self,
        params: &SearchParams,
        page_index: usize,
    ) -> std::result::Result<Vec<RawListing>, SourceError> {
        let url = build_search_url(&self.base_url, params, page_index);
        tracing::debug!("Requesting {}", url);

        let html = self.get(&url).await?;
        let mut listings = CardParser::parse(&html);
        // The endpoint returns a fixed batch of cards per request.
        listings.truncate(params.page_size);

        let mut detail_requests = 0;
        for raw in &mut listings {
            let wanted = self.fetch_descriptions
                && detail_requests < params.max_results
                && raw
                    .company
                    .as_deref()
                    .is_some_and(|company| params.companies.allows(company));
            if wanted {
                detail_requests += 1;
                self.fetch_description(raw).await;
            }
            if raw.description.is_none() {
                raw.description = summary_description(raw);
            }
        }

        Ok(listings)
    }

    fn max_page_size(&self) -> usize {
        PAGE_LIMIT
    }

    fn source_id(&self) -> &str {
        "linkedin"
    }
}

fn request_error(error: reqwest::Error) -> SourceError {
    if error.is_builder() || error.is_redirect() || error.is_status() {
        SourceError::Fatal(error.to_string())
    } else if error.is_timeout()
        || error.is_connect()
        || error.is_request()
        || error.is_body()
        || error.is_decode()
    {
        SourceError::Transient(error.to_string())
    } else {
        SourceError::Fatal(error.to_string())
    }
}

fn status_error(status: StatusCode, retry_after: Option<&str>) -> SourceError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        SourceError::RateLimited {
            retry_after: retry_after
                .and_then(|value| value.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
        }
    } else if status.is_server_error() {
        SourceError::Transient(format!("server returned {status}"))
    } else {
        SourceError::Fatal(format!("server returned {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CompanyFilter;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn local_source() -> (LinkedInSource, TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let base = format!("http://{}", listener.local_addr().expect("local addr"));
        let config = SourceConfig {
            base_url: format!("{base}/search"),
            timeout_secs: 5,
            fetch_descriptions: true,
            ..SourceConfig::default()
        };
        let gate = Arc::new(RateGate::new(100, Duration::from_millis(10)));
        let source = LinkedInSource::new(&config, gate).expect("local source");
        (source, listener, base)
    }

    async fn read_request_path(socket: &mut TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            }
        }
        String::from_utf8_lossy(&buffer)
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_string()
    }

    /// Serve `cards` for searches and a description for every job page.
    fn serve_jobs(listener: TcpListener, cards: String) -> Arc<AtomicUsize> {
        let detail_requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&detail_requests);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let path = read_request_path(&mut socket).await;
                let body = if path.starts_with("/search") {
                    cards.clone()
                } else {
                    counter.fetch_add(1, Ordering::SeqCst);
                    r#"<div class="description__text">Full job description</div>"#.to_string()
                };
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        detail_requests
    }

    fn cards(base: &str, companies: &[&str]) -> String {
        companies
            .iter()
            .enumerate()
            .map(|(id, company)| {
                format!(
                    r#"<div class="base-card job-search-card">
                         <a class="base-card__full-link" href="{base}/jobs/view/{id}"></a>
                         <h3 class="base-search-card__title">Engineer {id}</h3>
                         <h4 class="base-search-card__subtitle">{company}</h4>
                       </div>"#
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_descriptions_skip_excluded_companies_and_stop_at_max_results() {
        let (source, listener, base) = local_source().await;
        let page = cards(&base, &["Acme", "Initech", "Globex", "Umbrella", "Hooli"]);
        let detail_requests = serve_jobs(listener, page);

        let params = SearchParams::new(["engineer"])
            .with_max_results(2)
            .with_companies(CompanyFilter::parse("", "Initech"));
        let listings = source.fetch_page(&params, 0).await.expect("page");

        assert_eq!(listings.len(), 5);
        assert_eq!(detail_requests.load(Ordering::SeqCst), 2);
        assert_eq!(listings[0].description.as_deref(), Some("Full job description"));
        assert_eq!(
            listings[1].description.as_deref(),
            Some("Position: Engineer 1\nCompany: Initech\nLocation: Not specified")
        );
        assert_eq!(listings[2].description.as_deref(), Some("Full job description"));
        assert!(listings[3]
            .description
            .as_deref()
            .is_some_and(|d| d.starts_with("Position: Engineer 3")));
    }

    #[tokio::test]
    async fn test_page_is_truncated_to_page_size() {
        let (source, listener, base) = local_source().await;
        let page = cards(&base, &["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"]);
        let detail_requests = serve_jobs(listener, page);

        let params = SearchParams::new(["engineer"]).with_page_size(3);
        let listings = source.fetch_page(&params, 1).await.expect("page");

        assert_eq!(listings.len(), 3);
        assert_eq!(detail_requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_dropped_connection_is_transient() {
        let (source, listener, _) = local_source().await;
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                read_request_path(&mut socket).await;
                drop(socket);
            }
        });

        let error = source
            .fetch_page(&SearchParams::new(["engineer"]), 0)
            .await
            .expect_err("closed connection fails");

        assert!(matches!(error, SourceError::Transient(_)), "{error:?}");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, Some("30")),
            SourceError::RateLimited {
                retry_after: Some(Duration::from_secs(30))
            }
        );
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, Some("Wed, 21 Oct 2015 07:28:00 GMT")),
            SourceError::RateLimited { retry_after: None }
        );
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, None),
            SourceError::Transient(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, None),
            SourceError::Fatal(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, None),
            SourceError::Fatal(_)
        ));
    }

    #[test]
    fn test_new_rejects_bad_base_url() {
        let config = SourceConfig {
            base_url: "not a url".to_string(),
            ..SourceConfig::default()
        };
        let gate = Arc::new(RateGate::new(1, Duration::from_secs(1)));

        let result = LinkedInSource::new(&config, gate);
        assert!(matches!(result, Err(ScrapeError::Config(_))));
    }

    #[test]
    fn test_default_source() {
        let gate = Arc::new(RateGate::new(1, Duration::from_secs(1)));
        let source = LinkedInSource::new(&SourceConfig::default(), gate).expect("default source");
        assert_eq!(source.max_page_size(), PAGE_LIMIT);
        assert_eq!(source.source_id(), "linkedin");
    }
}
