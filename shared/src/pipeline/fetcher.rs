//! Ordered fetch loop that builds the consolidated dataset.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::extractor::extract_relevant;
use super::resolver::{has_placeholder, placeholder_names, resolve_placeholders};
use super::synthesizer::is_under_base;
use crate::llm::CompletionClient;
use crate::market::MarketDataSource;
use crate::models::QueryContext;

/// Resolved endpoint → fetched payload, in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConsolidatedDataset(Map<String, Value>);

impl ConsolidatedDataset {
    pub fn insert(&mut self, endpoint: String, payload: Value) {
        self.0.insert(endpoint, payload);
    }

    pub fn get(&self, endpoint: &str) -> Option<&Value> {
        self.0.get(endpoint)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Walks an endpoint list in order, resolving placeholders against the
/// last successful payload.
pub struct Fetcher<'a> {
    pub llm: &'a dyn CompletionClient,
    pub market: &'a dyn MarketDataSource,
    pub model: &'a str,
    pub query: &'a QueryContext,
    /// Every fetched URL must sit under this
    pub base_url: &'a str,
    pub extract_relevant: bool,
}

impl Fetcher<'_> {
    /// Fetch every endpoint; failures are logged and skipped.
    pub async fn run(&self, endpoints: &[String]) -> ConsolidatedDataset {
        let mut dataset = ConsolidatedDataset::default();
        let mut previous = Value::Object(Map::new());

        for endpoint in endpoints {
            let Some((resolved, payload)) = self.fetch_one(endpoint, &previous).await else {
                continue;
            };

            let stored = if self.extract_relevant {
                extract_relevant(self.llm, &payload, self.query, &resolved, self.model).await
            } else {
                payload.clone()
            };

            dataset.insert(resolved, stored);
            previous = payload;
        }

        info!(
            requested = endpoints.len(),
            fetched = ?dataset.endpoints().collect::<Vec<_>>(),
            "Consolidated market data"
        );
        dataset
    }

    async fn fetch_one(&self, endpoint: &str, previous: &Value) -> Option<(String, Value)> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            warn!("Skipping blank endpoint");
            return None;
        }

        let resolved = if has_placeholder(endpoint) {
            match resolve_placeholders(self.llm, endpoint, previous, self.model).await {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!(endpoint, error = %e, "Could not resolve endpoint placeholders");
                    return None;
                }
            }
        } else {
            endpoint.to_string()
        };

        if has_placeholder(&resolved) {
            warn!(
                endpoint = %resolved,
                unresolved = ?placeholder_names(&resolved),
                "Endpoint still has placeholders, skipping"
            );
            return None;
        }
        if !is_under_base(&resolved, self.base_url) {
            warn!(endpoint = %resolved, "Endpoint outside the market-data base URL, skipping");
            return None;
        }

        match self.market.get_json(&resolved).await {
            Ok(payload) => Some((resolved, payload)),
            Err(e) => {
                warn!(endpoint = %resolved, error = %e, "Error fetching market data");
                None
            }
        }
    }
}
