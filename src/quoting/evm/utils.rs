use alloy_primitives::{Address, U256};
use alloy_sol_types::SolValue;
use num_bigint::BigUint;

use crate::quoting::{errors::QuoteError, path::parse_address_bytes};

/// Safely converts a hex string to an `Address`.
///
/// Checks the length before attempting to convert, and returns a `QuoteError` if the address is
/// not 20 bytes long.
pub fn parse_address(address: &str) -> Result<Address, QuoteError> {
    parse_address_bytes(address).map(Address::from)
}

/// Converts a base-unit amount to a `U256`, failing if it does not fit in 256 bits.
pub fn biguint_to_u256(value: &BigUint) -> Result<U256, QuoteError> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(QuoteError::InvalidInput(format!("Amount {value} does not fit in a uint256")));
    }
    Ok(U256::from_be_slice(&bytes))
}

pub fn u256_to_biguint(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

/// Reads `amountOut` from a `quoteExactInput` response.
///
/// Quoter V1 returns a single `uint256`; QuoterV2 returns a tuple whose first word is `amountOut`.
/// Only the first ABI word is decoded so both shapes are accepted.
pub fn decode_amount_out(response: &[u8]) -> Result<U256, QuoteError> {
    if response.len() < 32 {
        return Err(QuoteError::FatalError(format!(
            "Failed to decode response for quoteExactInput: expected at least 32 bytes, got {}",
            response.len()
        )));
    }
    U256::abi_decode(&response[..32], true).map_err(|_| {
        QuoteError::FatalError("Failed to decode response for quoteExactInput".to_string())
    })
}
