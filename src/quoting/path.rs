use tracing::warn;

use crate::quoting::{
    constants::{ADDRESS_LENGTH, FEE_LENGTH, MAX_FEE_TIER},
    errors::QuoteError,
};

/// Parses a hex address (with or without the `0x` prefix) into its 20 raw bytes.
///
/// Returns an `InvalidInput` error if the string is not exactly 40 hex characters long.
pub fn parse_address_bytes(address: &str) -> Result<[u8; ADDRESS_LENGTH], QuoteError> {
    let body = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    if body.len() != ADDRESS_LENGTH * 2 {
        return Err(QuoteError::InvalidInput(format!("Invalid token address: {address}")));
    }
    let mut bytes = [0u8; ADDRESS_LENGTH];
    hex::decode_to_slice(body, &mut bytes)
        .map_err(|_| QuoteError::InvalidInput(format!("Invalid token address: {address}")))?;
    Ok(bytes)
}

/// Checks that a route has exactly one fee tier per hop.
pub fn validate_route_shape(path_len: usize, fees_len: usize) -> Result<(), QuoteError> {
    if path_len != fees_len + 1 {
        return Err(QuoteError::InvalidRoute("path/fee length mismatch".to_string()));
    }
    Ok(())
}

/// Checks that a route can be quoted: one fee per hop and at least one hop.
pub fn validate_swap_route(path_len: usize, fees_len: usize) -> Result<(), QuoteError> {
    validate_route_shape(path_len, fees_len)?;
    if path_len < 2 {
        return Err(QuoteError::InvalidRoute("route needs at least two tokens".to_string()));
    }
    Ok(())
}

/// Packs a multi-hop route into the byte layout a Uniswap-V3-style quoter expects:
/// `token_0 (20) | fee_0 (3) | token_1 (20) | fee_1 (3) | ... | token_n (20)`.
///
/// Fees are written big-endian using only their low 24 bits.
pub fn encode_path_bytes<T: AsRef<str>>(
    path: &[T],
    fees: &[u32],
) -> Result<Vec<u8>, QuoteError> {
    validate_route_shape(path.len(), fees.len())?;

    let mut encoded = Vec::with_capacity(path.len() * ADDRESS_LENGTH + fees.len() * FEE_LENGTH);
    for (token, fee) in path.iter().zip(fees) {
        encoded.extend_from_slice(&parse_address_bytes(token.as_ref())?);
        if *fee > MAX_FEE_TIER {
            warn!(fee = *fee, "Fee tier does not fit in 3 bytes, only the low 24 bits are encoded");
        }
        encoded.extend_from_slice(&(fee & MAX_FEE_TIER).to_be_bytes()[1..]);
    }
    // validate_route_shape guarantees a non-empty path
    if let Some(last) = path.last() {
        encoded.extend_from_slice(&parse_address_bytes(last.as_ref())?);
    }
    Ok(encoded)
}

/// Encodes a multi-hop route as a `0x`-prefixed lowercase hex string.
pub fn encode_path<T: AsRef<str>>(path: &[T], fees: &[u32]) -> Result<String, QuoteError> {
    let encoded = encode_path_bytes(path, fees)?;
    Ok(format!("0x{}", hex::encode(encoded)))
}
