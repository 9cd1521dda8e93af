use std::{fmt, str::FromStr};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::quoting::{
    constants::{BASE_QUOTER_ADDRESS, ETHEREUM_QUOTER_ADDRESS, MAX_TOKEN_DECIMALS},
    errors::QuoteError,
    path::{encode_path, encode_path_bytes, parse_address_bytes, validate_swap_route},
    serde_primitives::{biguint_string, biguint_string_option},
};

/// Chains with a known Uniswap QuoterV2 deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    #[default]
    Base,
}

impl Chain {
    pub fn id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Base => 8453,
        }
    }

    pub fn default_quoter_address(&self) -> &'static str {
        match self {
            Chain::Ethereum => ETHEREUM_QUOTER_ADDRESS,
            Chain::Base => BASE_QUOTER_ADDRESS,
        }
    }
}

impl FromStr for Chain {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ethereum" | "mainnet" | "1" => Ok(Chain::Ethereum),
            "base" | "8453" => Ok(Chain::Base),
            other => Err(QuoteError::InvalidInput(format!("Unsupported chain: {other}"))),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Ethereum => write!(f, "ethereum"),
            Chain::Base => write!(f, "base"),
        }
    }
}

/// An ERC-20 token as the quoter sees it.
///
/// `decimals` must match the token contract's `decimals()`. This is not checked on-chain, a
/// mismatch silently skews every conversion.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Token {
    pub address: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: &str, decimals: u8) -> Result<Self, QuoteError> {
        let token = Self { address: address.to_string(), decimals };
        token.validate()?;
        Ok(token)
    }

    pub fn validate(&self) -> Result<(), QuoteError> {
        parse_address_bytes(&self.address)?;
        validate_decimals(self.decimals)
    }
}

pub(crate) fn validate_decimals(decimals: u8) -> Result<(), QuoteError> {
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(QuoteError::InvalidInput(format!(
            "Token decimals must be between 0 and {MAX_TOKEN_DECIMALS}, got {decimals}"
        )));
    }
    Ok(())
}

/// A multi-hop swap route: `path[i] -> path[i + 1]` goes through the pool with fee tier `fees[i]`
/// (in hundredths of a bip).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SwapRoute {
    pub path: Vec<String>,
    pub fees: Vec<u32>,
}

impl SwapRoute {
    pub fn new(path: Vec<String>, fees: Vec<u32>) -> Result<Self, QuoteError> {
        validate_swap_route(path.len(), fees.len())?;
        Ok(Self { path, fees })
    }

    /// Builds a route from token descriptors, e.g. `[WETH, USDC]` with fees `[500]`.
    pub fn through(tokens: &[Token], fees: Vec<u32>) -> Result<Self, QuoteError> {
        Self::new(
            tokens
                .iter()
                .map(|token| token.address.clone())
                .collect(),
            fees,
        )
    }

    pub fn hops(&self) -> usize {
        self.fees.len()
    }

    pub fn token_in(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }

    pub fn token_out(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// The packed path as a `0x`-prefixed hex string.
    pub fn encode(&self) -> Result<String, QuoteError> {
        encode_path(&self.path, &self.fees)
    }

    pub fn encode_bytes(&self) -> Result<Vec<u8>, QuoteError> {
        encode_path_bytes(&self.path, &self.fees)
    }
}

/// Input of a single quote: a route plus a human-readable amount of the first token.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(flatten)]
    pub route: SwapRoute,
    /// Decimal string, e.g. `"1.5"`.
    pub amount_in: String,
    pub token_in_decimals: u8,
    pub token_out_decimals: u8,
}

impl QuoteRequest {
    pub fn new(
        route: SwapRoute,
        amount_in: impl Into<String>,
        token_in_decimals: u8,
        token_out_decimals: u8,
    ) -> Self {
        Self { route, amount_in: amount_in.into(), token_in_decimals, token_out_decimals }
    }

    pub fn validate(&self) -> Result<(), QuoteError> {
        validate_swap_route(self.route.path.len(), self.route.fees.len())?;
        validate_decimals(self.token_in_decimals)?;
        validate_decimals(self.token_out_decimals)
    }
}

/// Outcome of a quote. The `amount_out*` fields are `None` when the quoter call failed and the
/// failure was absorbed into a "no price available" result.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub encoded_path: String,
    #[serde(with = "biguint_string")]
    pub amount_in_raw: BigUint,
    #[serde(with = "biguint_string_option")]
    pub amount_out_raw: Option<BigUint>,
    /// Exact decimal rendering of `amount_out_raw`.
    pub amount_out: Option<String>,
    /// `amount_out` parsed as a float.
    pub rate: Option<f64>,
}
