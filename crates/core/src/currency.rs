//! Currency
//!
//! Rebate amounts are rounded to the minor-unit precision of the contract
//! currency (two decimals for EUR, none for XOF, ...).

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::iso::{self, Currency};
use thiserror::Error;

/// The currency code is not one the engine knows how to round.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

/// Resolve an ISO 4217 alphabetic code to a currency.
///
/// # Errors
///
/// Returns [`UnknownCurrency`] for codes outside the supported set.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, UnknownCurrency> {
    match code.trim().to_ascii_uppercase().as_str() {
        "EUR" => Ok(iso::EUR),
        "USD" => Ok(iso::USD),
        "GBP" => Ok(iso::GBP),
        "CHF" => Ok(iso::CHF),
        "CAD" => Ok(iso::CAD),
        "XOF" => Ok(iso::XOF),
        "XAF" => Ok(iso::XAF),
        "MAD" => Ok(iso::MAD),
        "JPY" => Ok(iso::JPY),
        _ => Err(UnknownCurrency(code.to_string())),
    }
}

/// Round an amount to the currency's minor unit, ties away from zero.
pub fn round_to_minor_units(amount: Decimal, currency: &Currency) -> Decimal {
    amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero)
}
