//! Query → endpoints → market data → chart.
//!
//! Each LLM-backed stage is a free function over [`CompletionClient`];
//! [`FinancePipeline`] sequences them for one request.
//!
//! Failures before visualization only shrink the dataset. The
//! visualization call always runs, and the model is told to produce
//! illustrative data when nothing was fetched.

pub mod extractor;
pub mod fetcher;
pub mod normalizer;
pub mod resolver;
pub mod synthesizer;
pub mod visualizer;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::llm::CompletionClient;
use crate::market::MarketDataSource;
use crate::models::{FinanceResponse, QueryContext, ValidatedRequest};
use crate::{Error, Result};

pub use fetcher::{ConsolidatedDataset, Fetcher};
pub use normalizer::normalize_chart;

/// Knobs that stay fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Every synthesized endpoint must start with this
    pub base_url: String,
    /// Store extracted rather than raw payloads in the dataset
    pub relevance_extraction: bool,
}

pub struct FinancePipeline {
    llm: Arc<dyn CompletionClient>,
    market: Arc<dyn MarketDataSource>,
    options: PipelineOptions,
}

impl FinancePipeline {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        market: Arc<dyn MarketDataSource>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            llm,
            market,
            options,
        }
    }

    /// Synthesize endpoints and fetch them. Never fails; problems yield a
    /// smaller (possibly empty) dataset.
    pub async fn gather_data(&self, query: &QueryContext, model: &str) -> ConsolidatedDataset {
        let endpoints = match synthesizer::synthesize_endpoints(
            self.llm.as_ref(),
            query,
            model,
            &self.options.base_url,
        )
        .await
        {
            Ok(endpoints) => endpoints,
            Err(e) => {
                warn!(error = %e, "Failed to obtain market-data endpoints");
                Vec::new()
            }
        };

        let dataset = Fetcher {
            llm: self.llm.as_ref(),
            market: self.market.as_ref(),
            model,
            query,
            base_url: &self.options.base_url,
            extract_relevant: self.options.relevance_extraction,
        }
        .run(&endpoints)
        .await;

        if dataset.is_empty() {
            warn!("No market data fetched, visualization will run without it");
        }
        dataset
    }

    /// Run the whole pipeline for one validated request.
    pub async fn run(&self, request: &ValidatedRequest, today: DateTime<Utc>) -> Result<FinanceResponse> {
        let latest = request
            .latest()
            .ok_or_else(|| Error::Validation("Messages array must not be empty".to_string()))?;
        let query = QueryContext::new(latest, today);
        let dataset = self.gather_data(&query, &request.model).await;

        let completion = visualizer::synthesize_visualization(
            self.llm.as_ref(),
            &request.messages,
            &dataset,
            &query,
            &request.model,
        )
        .await?;

        let chart_data = completion
            .tool_use()
            .map(|tool| normalize_chart(&tool.input))
            .transpose()?;
        let tool_use = completion
            .tool_use_block()
            .map(serde_json::to_value)
            .transpose()?;

        info!(
            datasets = dataset.len(),
            chart = chart_data.is_some(),
            "Finance pipeline completed"
        );

        Ok(FinanceResponse {
            content: completion.first_text().unwrap_or_default().to_string(),
            has_tool_use: completion.has_tool_use(),
            tool_use,
            chart_data,
        })
    }
}
