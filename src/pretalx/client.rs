use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::models::{Page, SubmissionDetail};
use crate::config::Config;
use crate::error::FetchError;

/// Authenticated client for one pretalx event's REST API.
#[derive(Clone)]
pub struct PretalxClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_pages: usize,
}

impl PretalxClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_key: config.pretalx_api_key.clone(),
            base_url: config.pretalx_base_url.clone(),
            max_pages: config.max_pages,
        })
    }

    pub fn submissions_url(&self) -> String {
        format!("{}/submissions/", self.base_url)
    }

    pub fn submission_url(&self, code: &str) -> String {
        format!("{}/submissions/{}/", self.base_url, code)
    }

    pub fn reviews_url(&self) -> String {
        format!("{}/reviews/", self.base_url)
    }

    /// Cursors carry the API token, so they must stay on the configured
    /// scheme, host and port.
    fn is_same_origin(&self, url: &str) -> bool {
        match (Url::parse(&self.base_url), Url::parse(url)) {
            (Ok(base), Ok(target)) => base.origin() == target.origin(),
            _ => false,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let text = response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Follows `next` cursors from `start_url` and returns every page's
    /// `results` concatenated in page order. Any failing page fails the whole
    /// call; partial results are never returned.
    pub async fn fetch_all<T: DeserializeOwned>(&self, start_url: &str) -> Result<Vec<T>, FetchError> {
        let mut items: Vec<T> = Vec::new();
        let mut reported_count = None;
        let mut next = Some(start_url.to_string());
        let mut pages = 0usize;

        while let Some(url) = next {
            if pages >= self.max_pages {
                return Err(FetchError::PageLimit {
                    limit: self.max_pages,
                    url,
                });
            }

            if !self.is_same_origin(&url) {
                warn!("Refusing cursor {} outside {}", url, self.base_url);
                return Err(FetchError::ForeignCursor { url });
            }

            let page: Page<T> = self.get_json(&url).await?;
            pages += 1;
            debug!("Fetched page {} from {} ({} results)", pages, url, page.results.len());

            if reported_count.is_none() {
                reported_count = page.count;
            }
            items.extend(page.results);
            next = page.next.filter(|n| !n.is_empty());
        }

        if let Some(count) = reported_count {
            if count != items.len() as u64 {
                warn!(
                    "{} reported {} items but pagination yielded {}",
                    start_url,
                    count,
                    items.len()
                );
            }
        }

        info!("Fetched {} items over {} pages from {}", items.len(), pages, start_url);
        Ok(items)
    }

    pub async fn fetch_submission(&self, code: &str) -> Result<SubmissionDetail, FetchError> {
        self.get_json(&self.submission_url(code)).await
    }
}
