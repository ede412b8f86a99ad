use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::{Config, NasaEndpoint};
use crate::error::Result;
use crate::media::ImageUrlResolver;
use crate::metrics;
use crate::types::{ApodRecord, FetchOutcome, LoadError};

/// Anything that can resolve a single calendar date to an APOD entry.
#[async_trait]
pub trait ApodSource: Send + Sync {
    async fn fetch_one(&self, date: &str) -> FetchOutcome;
}

/// Upstream payload. Every field is optional until validated.
#[derive(Debug, Deserialize)]
struct RawApod {
    title: Option<String>,
    url: Option<String>,
    explanation: Option<String>,
}

impl RawApod {
    fn into_record(self, date: &str) -> Option<ApodRecord> {
        let present = |field: Option<String>| field.filter(|value| !value.trim().is_empty());
        Some(ApodRecord {
            title: present(self.title)?,
            date: date.to_string(),
            media_url: present(self.url)?,
            explanation: present(self.explanation)?,
        })
    }
}

/// reqwest-backed client for the NASA APOD endpoint.
pub struct NasaApodClient {
    http: reqwest::Client,
    endpoint: NasaEndpoint,
    resolver: ImageUrlResolver,
    width: u32,
    height: u32,
}

impl NasaApodClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: NasaEndpoint,
        resolver: ImageUrlResolver,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            http,
            endpoint,
            resolver,
            width,
            height,
        }
    }

    /// Build a client from configuration; fails when the NASA endpoint is not configured.
    pub fn from_config(http: reqwest::Client, config: &Config) -> Result<Self> {
        let endpoint = config.nasa_endpoint()?;
        let resolver = ImageUrlResolver::new(config.images.proxy_location.clone());
        info!(
            location = %endpoint.location,
            timeout_ms = endpoint.timeout.as_millis() as u64,
            image_proxy = resolver.is_proxied(),
            "APOD client configured"
        );
        Ok(Self::new(
            http,
            endpoint,
            resolver,
            config.images.width,
            config.images.height,
        ))
    }

    async fn request(&self, date: &str) -> FetchOutcome {
        let response = match self
            .http
            .get(&self.endpoint.location)
            .query(&[("api_key", self.endpoint.api_key.as_str()), ("date", date)])
            .header(ACCEPT, "application/json")
            .timeout(self.endpoint.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failed(classify_transport(&e)),
        };

        let status = response.status();
        if status.as_u16() >= 500 {
            warn!(%status, "Upstream reports a service outage");
            return FetchOutcome::Failed(LoadError::service_outage());
        }
        if !status.is_success() {
            warn!(%status, "Upstream rejected the request");
            return FetchOutcome::Failed(LoadError::api_error());
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return FetchOutcome::Failed(classify_transport(&e)),
        };

        let raw: RawApod = match serde_json::from_slice(&body) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Malformed APOD payload: {}", e);
                return FetchOutcome::Failed(LoadError::api_error());
            }
        };

        match raw.into_record(date) {
            Some(mut record) => {
                record.media_url = self
                    .resolver
                    .resolve(&record.media_url, self.width, self.height);
                FetchOutcome::Ok(record)
            }
            None => {
                debug!("APOD payload is missing required fields, skipping");
                FetchOutcome::Absent
            }
        }
    }
}

#[async_trait]
impl ApodSource for NasaApodClient {
    #[instrument(skip(self), fields(outcome = tracing::field::Empty))]
    async fn fetch_one(&self, date: &str) -> FetchOutcome {
        let started = Instant::now();
        let outcome = self.request(date).await;
        tracing::Span::current().record("outcome", outcome.label());
        metrics::fetch::outcome(outcome.label(), started.elapsed().as_secs_f64());
        outcome
    }
}

fn classify_transport(e: &reqwest::Error) -> LoadError {
    if e.is_timeout() {
        warn!("APOD request timed out: {}", e);
        LoadError::timeout()
    } else if e.is_builder() {
        warn!("APOD request could not be built: {}", e);
        LoadError::api_error()
    } else {
        warn!("APOD request failed before a response: {}", e);
        LoadError::network()
    }
}
