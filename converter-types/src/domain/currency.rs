//! Currency codes and the validation rules applied to them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConversionError;

/// Length of an ISO-4217 style currency code.
pub const CODE_LEN: usize = 3;

/// Validates a currency code and, when given, its rate.
///
/// Rules are checked in order:
/// 1. a supplied rate must be a finite number greater than zero;
/// 2. the code must be exactly three alphabetic characters.
///
/// Case is not checked here; normalization happens in [`CurrencyCode::parse`].
pub fn validate_currency(code: &str, rate: Option<f64>) -> Result<(), ConversionError> {
    if let Some(rate) = rate {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ConversionError::invalid_rate(code, rate));
        }
    }

    let well_formed =
        code.chars().count() == CODE_LEN && code.chars().all(|c| c.is_ascii_alphabetic());
    if !well_formed {
        return Err(ConversionError::invalid(code));
    }

    Ok(())
}

/// A validated, upper-cased three letter currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Normalizes `raw` to upper case and validates it.
    pub fn parse(raw: &str) -> Result<Self, ConversionError> {
        let code = raw.to_uppercase();
        validate_currency(&code, None)?;
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
