use std::{env, str::FromStr};

use dotenv::dotenv;

use crate::quoting::{
    constants::DEFAULT_MAX_ATTEMPTS, errors::QuoteError, models::Chain, path::parse_address_bytes,
};

pub const RPC_URL_VAR: &str = "ETH_RPC_URL";
pub const CHAIN_VAR: &str = "QUOTER_CHAIN";
pub const QUOTER_ADDRESS_VAR: &str = "QUOTER_ADDRESS";
pub const MAX_ATTEMPTS_VAR: &str = "QUOTE_MAX_ATTEMPTS";
pub const RETRY_QUOTER_FAILURES_VAR: &str = "QUOTE_RETRY_QUOTER_FAILURES";

/// Settings for talking to an on-chain quoter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuoterConfig {
    pub rpc_url: Option<String>,
    pub chain: Chain,
    /// Overrides the chain's default quoter deployment.
    pub quoter_address: Option<String>,
    pub max_attempts: usize,
    /// If set, a failing quoter call is handed to the retry loop instead of being turned into an
    /// empty quote.
    pub retry_quoter_failures: bool,
}

impl Default for QuoterConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            chain: Chain::default(),
            quoter_address: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_quoter_failures: false,
        }
    }
}

impl QuoterConfig {
    /// Loads the configuration from the process environment, reading a `.env` file first if one
    /// exists.
    pub fn from_env() -> Result<Self, QuoteError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, QuoteError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        config.rpc_url = non_empty(RPC_URL_VAR);
        if let Some(chain) = non_empty(CHAIN_VAR) {
            config.chain = Chain::from_str(&chain)?;
        }
        config.quoter_address = non_empty(QUOTER_ADDRESS_VAR);
        if let Some(attempts) = non_empty(MAX_ATTEMPTS_VAR) {
            config.max_attempts = attempts.parse().map_err(|_| {
                QuoteError::FatalError(format!("{MAX_ATTEMPTS_VAR} must be a positive integer"))
            })?;
        }
        if let Some(flag) = non_empty(RETRY_QUOTER_FAILURES_VAR) {
            config.retry_quoter_failures = parse_flag(&flag).ok_or_else(|| {
                QuoteError::FatalError(format!("{RETRY_QUOTER_FAILURES_VAR} must be a boolean"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.max_attempts == 0 {
            return Err(QuoteError::FatalError("max_attempts must be at least 1".to_string()));
        }
        if let Some(address) = &self.quoter_address {
            parse_address_bytes(address)
                .map_err(|_| QuoteError::FatalError(format!("Invalid quoter address: {address}")))?;
        }
        Ok(())
    }

    pub fn quoter_address(&self) -> &str {
        self.quoter_address
            .as_deref()
            .unwrap_or_else(|| self.chain.default_quoter_address())
    }

    pub fn rpc_url(&self) -> Result<&str, QuoteError> {
        self.rpc_url
            .as_deref()
            .ok_or_else(|| QuoteError::FatalError(format!("Missing {RPC_URL_VAR} in environment")))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
