//! Market-data HTTP access.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::{Error, Result};

/// Something that can GET a URL and hand back its JSON body.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// Plain unauthenticated GETs against the public CoinGecko API.
pub struct CoinGeckoClient {
    http: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl MarketDataSource for CoinGeckoClient {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!(
                "Failed to fetch data from {}: {}",
                url,
                status.canonical_reason().unwrap_or(status.as_str())
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Fetch(format!("Invalid JSON from {}: {}", url, e)))
    }
}
