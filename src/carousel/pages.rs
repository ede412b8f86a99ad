use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;

use crate::dates::format_date;
use crate::error::{AppError, Result};
use crate::loader::ApodLoader;
use crate::types::LoadResult;

/// Loads one page of the feed anchored at `base`.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn load_page(&self, base: NaiveDate) -> Result<LoadResult>;
}

/// In-process pages straight from the loader.
pub struct LoaderPages {
    loader: ApodLoader,
    batch_size: usize,
}

impl LoaderPages {
    pub fn new(loader: ApodLoader, batch_size: usize) -> Self {
        Self { loader, batch_size }
    }
}

#[async_trait]
impl PageSource for LoaderPages {
    async fn load_page(&self, base: NaiveDate) -> Result<LoadResult> {
        Ok(self.loader.load(self.batch_size, base).await)
    }
}

/// Pages fetched from a running service's `/apod-loader` endpoint.
pub struct RemotePageSource {
    http: reqwest::Client,
    endpoint: String,
}

impl RemotePageSource {
    /// `base_url` is the service root, e.g. `http://127.0.0.1:3000`.
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}/apod-loader", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl PageSource for RemotePageSource {
    async fn load_page(&self, base: NaiveDate) -> Result<LoadResult> {
        let last_date = format_date(base);
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("lastDate", last_date.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            return Err(AppError::InvalidDate(last_date));
        }
        let result = response.error_for_status()?.json::<LoadResult>().await?;
        Ok(result)
    }
}
