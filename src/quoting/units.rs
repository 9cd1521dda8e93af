use num_bigint::BigUint;
use num_traits::Zero;

use crate::quoting::errors::QuoteError;

fn scale(decimals: u8) -> BigUint {
    BigUint::from(10u32).pow(u32::from(decimals))
}

fn parse_digits(digits: &str, amount: &str) -> Result<BigUint, QuoteError> {
    if digits.is_empty() {
        return Ok(BigUint::zero());
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(QuoteError::InvalidInput(format!("Invalid decimal amount: {amount}")));
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| QuoteError::InvalidInput(format!("Invalid decimal amount: {amount}")))
}

/// Converts a human-readable decimal amount (e.g. `"1.5"`) into integer base units, scaled by
/// `10^decimals`.
///
/// The conversion is exact. Trailing zeros in the fractional part are ignored, any other
/// fractional digit beyond `decimals` is rejected instead of rounded.
pub fn parse_units(amount: &str, decimals: u8) -> Result<BigUint, QuoteError> {
    let amount = amount.trim();
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(QuoteError::InvalidInput(format!("Invalid decimal amount: '{amount}'")));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > usize::from(decimals) {
        return Err(QuoteError::InvalidInput(format!(
            "Amount {amount} has more fractional digits than the token's {decimals} decimals"
        )));
    }
    let whole_units = parse_digits(whole, amount)?;
    let padded_fraction = format!("{fraction:0<width$}", width = usize::from(decimals));
    let fraction_units = parse_digits(&padded_fraction, amount)?;

    Ok(whole_units * scale(decimals) + fraction_units)
}

/// Converts integer base units back into the shortest exact decimal string (`3000000` with 6
/// decimals is `"3"`, `2500000` is `"2.5"`).
pub fn format_units(value: &BigUint, decimals: u8) -> String {
    let scale = scale(decimals);
    let whole = value / &scale;
    let fraction = value % &scale;
    if fraction.is_zero() {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction.to_string(), width = usize::from(decimals));
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Converts integer base units into a floating point amount. Precision is only lost in the final
/// float parse.
pub fn units_to_f64(value: &BigUint, decimals: u8) -> Result<f64, QuoteError> {
    let formatted = format_units(value, decimals);
    formatted
        .parse::<f64>()
        .map_err(|e| QuoteError::FatalError(format!("Failed to parse amount {formatted}: {e}")))
}
