//! CEP (Brazilian postal code) sanitizing and input masking.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of digits in a complete CEP.
pub const CEP_DIGITS: usize = 8;
/// Digits before the separating hyphen.
pub const CEP_PREFIX: usize = 5;

/// Strip every character that is not an ASCII digit.
#[must_use]
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Apply the `#####-###` mask to whatever the user typed.
///
/// Non-digits are dropped, the result is truncated to eight digits and a hyphen
/// is inserted after the fifth digit once a sixth is present. Formatting an
/// already formatted value returns it unchanged.
#[must_use]
pub fn format_cep(raw: &str) -> String {
    let mut digits = digits_only(raw);
    digits.truncate(CEP_DIGITS);
    if digits.len() > CEP_PREFIX {
        digits.insert(CEP_PREFIX, '-');
    }
    digits
}

/// Whether the input carries a full eight-digit code once masked.
#[must_use]
pub fn is_complete(raw: &str) -> bool {
    digits_only(raw).len() >= CEP_DIGITS
}

/// Result of running the mask over an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedInput {
    pub value: String,
    /// The value just became a complete code and should be announced.
    pub completed: bool,
}

impl MaskedInput {
    /// Mask `current` and report whether it completes a code that `previous` did not.
    #[must_use]
    pub fn apply(previous: &str, current: &str) -> Self {
        let value = format_cep(current);
        let completed = is_complete(&value) && value != format_cep(previous);
        Self { value, completed }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CepError {
    #[error("CEP must contain 8 digits (got {0})")]
    WrongLength(usize),
}

/// A complete, validated CEP.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cep(String);

impl Cep {
    /// Validate a CEP written with or without punctuation.
    ///
    /// # Errors
    ///
    /// Returns [`CepError::WrongLength`] unless exactly eight digits are present.
    pub fn parse(raw: &str) -> Result<Self, CepError> {
        let digits = digits_only(raw);
        if digits.len() == CEP_DIGITS {
            Ok(Self(digits))
        } else {
            Err(CepError::WrongLength(digits.len()))
        }
    }

    /// The bare eight digits.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, suffix) = self.0.split_at(CEP_PREFIX);
        write!(f, "{prefix}-{suffix}")
    }
}

impl TryFrom<String> for Cep {
    type Error = CepError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cep> for String {
    fn from(value: Cep) -> Self {
        value.to_string()
    }
}
