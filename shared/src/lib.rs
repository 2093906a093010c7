//! Shared library for the finance chart Lambda.
//!
//! Turns a chat history into a chart specification: the latest message is
//! mapped to market-data endpoints, those are fetched in order, and the
//! consolidated data is handed to an LLM that answers with a chart tool call.

pub mod chart;
pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod market;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod secrets;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use chart::{ChartSpec, ChartType};
pub use config::{ApiKeySource, Config};
pub use error::{Error, Result};
pub use llm::{AnthropicClient, CompletionClient};
pub use market::{CoinGeckoClient, MarketDataSource};
pub use models::{FinanceRequest, FinanceResponse, QueryContext, ValidatedRequest};
pub use pipeline::{FinancePipeline, PipelineOptions};
pub use secrets::resolve_api_key;
pub use service::{FinanceService, Reply};
