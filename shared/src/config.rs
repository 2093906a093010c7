//! Configuration management for the finance Lambda.

use std::env;
use std::time::Duration;

use crate::{Error, Result};

const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3/";

/// Where the Anthropic API key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    /// Key supplied directly through `ANTHROPIC_API_KEY`
    Env(String),
    /// ARN of a Secrets Manager secret holding the key
    SecretArn(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Anthropic API key source
    pub api_key: ApiKeySource,
    /// Anthropic API base URL
    pub anthropic_base_url: String,
    /// Market-data base URL every synthesized endpoint must start with
    pub coingecko_base_url: String,
    /// Timeout for each LLM completion
    pub llm_timeout: Duration,
    /// Timeout for each market-data GET
    pub fetch_timeout: Duration,
    /// Run fetched payloads through the relevance extractor
    pub relevance_extraction: bool,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = match (
            non_empty("ANTHROPIC_API_KEY"),
            non_empty("ANTHROPIC_API_KEY_SECRET_ARN"),
        ) {
            (Some(key), _) => ApiKeySource::Env(key),
            (None, Some(arn)) => ApiKeySource::SecretArn(arn),
            (None, None) => {
                return Err(Error::Config(
                    "ANTHROPIC_API_KEY or ANTHROPIC_API_KEY_SECRET_ARN must be set".to_string(),
                ))
            }
        };

        Ok(Self {
            api_key,
            anthropic_base_url: non_empty("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string()),
            coingecko_base_url: non_empty("COINGECKO_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COINGECKO_BASE_URL.to_string()),
            llm_timeout: Duration::from_secs(parse_secs(non_empty("LLM_TIMEOUT_SECS"), 60)?),
            fetch_timeout: Duration::from_secs(parse_secs(non_empty("FETCH_TIMEOUT_SECS"), 15)?),
            relevance_extraction: non_empty("RELEVANCE_EXTRACTION_ENABLED")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            aws_region: non_empty("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        })
    }
}

fn parse_secs(value: Option<String>, default: u64) -> Result<u64> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid timeout value: {}", v))),
        None => Ok(default),
    }
}
