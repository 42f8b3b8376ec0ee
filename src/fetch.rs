use crate::error::{RenderError, Result};
use crate::tooltip::DisplayRecord;
use crate::utils::wiki_url;
use reqwest::{Client, StatusCode};
use std::future::Future;
use tokio::time::{Duration, timeout};

/// Where raw icon and background bytes come from.
pub trait ImageSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct HttpImageSource {
    client: Client,
}

impl HttpImageSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

// A fetch that takes longer than `limit` fails instead of being skipped.
pub async fn fetch_with_timeout<S: ImageSource>(
    source: &S,
    url: &str,
    limit: Duration,
) -> Result<Vec<u8>> {
    match timeout(limit, source.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(RenderError::FetchTimeout(url.to_string())),
    }
}

/// Returns `url` if a HEAD request answers 200. Any failure means no link.
pub async fn verify_link(client: &Client, url: String) -> Option<String> {
    match client.head(&url).send().await {
        Ok(response) if response.status() == StatusCode::OK => Some(url),
        Ok(response) => {
            log::debug!("Wiki link {} answered {}", url, response.status());
            None
        }
        Err(e) => {
            log::warn!("Wiki link check failed for {}: {}", url, e);
            None
        }
    }
}

pub async fn attach_wiki_link(record: &mut DisplayRecord, client: &Client, base_url: &str) {
    let url = wiki_url(base_url, &record.title);
    record.url = verify_link(client, url).await;
}
