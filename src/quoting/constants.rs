/// Substrings that mark an error message as a transient RPC failure. Matching is case-sensitive.
pub const TRANSIENT_RPC_MARKERS: [&str; 5] =
    ["network", "connection", "timeout", "server", "request failed"];

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 8_000;

/// Largest `decimals()` value accepted for a token descriptor.
pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Fee tiers are packed into 3 bytes (uint24).
pub const MAX_FEE_TIER: u32 = 0xFF_FFFF;

pub const ADDRESS_LENGTH: usize = 20;
pub const FEE_LENGTH: usize = 3;

// Uniswap QuoterV2 deployments, as listed in Uniswap's v3 deployment tables per chain.
pub const ETHEREUM_QUOTER_ADDRESS: &str = "0x61fFE014bA17989E743c5F6cB21bF9697530B21e";
pub const BASE_QUOTER_ADDRESS: &str = "0x3d4e44Eb1374240CE5F1B871ab261CD16335B76a";
