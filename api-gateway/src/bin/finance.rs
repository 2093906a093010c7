//! Finance Lambda - Handles POST /api/finance.
//!
//! Turns the caller's chat history into a chart: endpoints are synthesized from
//! the latest message, fetched from CoinGecko, and handed to the model together
//! with the chart tool.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{error_response, reply_response};
use shared::{
    resolve_api_key, AnthropicClient, CoinGeckoClient, Config, FinancePipeline, FinanceService,
    PipelineOptions,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    service: FinanceService,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let api_key = resolve_api_key(&config).await?;

        let llm = AnthropicClient::new(&api_key, &config.anthropic_base_url, config.llm_timeout)?;
        let market = CoinGeckoClient::new(config.fetch_timeout)?;

        info!(
            relevance_extraction = config.relevance_extraction,
            llm_timeout_secs = config.llm_timeout.as_secs(),
            fetch_timeout_secs = config.fetch_timeout.as_secs(),
            "Finance handler initialized"
        );

        let pipeline = FinancePipeline::new(
            Arc::new(llm),
            Arc::new(market),
            PipelineOptions {
                base_url: config.coingecko_base_url,
                relevance_extraction: config.relevance_extraction,
            },
        );

        Ok(Self {
            service: FinanceService::new(pipeline),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let reply = state
        .service
        .handle(event.method().as_str(), event.body().as_ref())
        .await;

    reply_response(reply).or_else(|e| {
        error!(error = %e, "Failed to build response");
        error_response(500, "Failed to build response")
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
