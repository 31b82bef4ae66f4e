//! Data structures shared by the storage adapters and the HTTP surface.

mod address;
mod shipping;

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

pub use address::*;
pub use shipping::*;

/// Number of fractional digits carried by monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Length of an ISO 3166-1 alpha-2 country code.
pub const COUNTRY_CODE_LENGTH: usize = 2;

/// Errors emitted when a user-supplied country code fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CountryCodeError {
    #[error("country code must be exactly {COUNTRY_CODE_LENGTH} letters")]
    WrongLength,
    #[error("country code contains non-alphabetic characters")]
    NonAlphabetic,
}

/// ISO 3166-1 alpha-2 code, canonicalised to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn parse(raw: &str) -> Result<Self, CountryCodeError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() != COUNTRY_CODE_LENGTH {
            return Err(CountryCodeError::WrongLength);
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CountryCodeError::NonAlphabetic);
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rounds an amount to cents and returns the integer minor units.
/// Returns `None` when the amount does not fit into an `i64`.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    let mut rounded = amount.round_dp(MONEY_SCALE);
    rounded.rescale(MONEY_SCALE);
    i64::try_from(rounded.mantissa()).ok()
}

/// Builds a two-digit decimal amount from integer minor units.
pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}
