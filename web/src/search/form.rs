use thiserror::Error;

use crate::search::panel::SearchForm;

/// A form submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub entity: String,
    pub range_meters: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("entity name is empty")]
    EmptyEntity,
    #[error("range `{0}` is not a number")]
    InvalidRange(String),
}

impl SearchForm {
    /// Trims the entity name and parses the range the way a browser coerces
    /// a string to a number.
    ///
    /// A blank range reads as `0`; the API then rejects it. Anything else that
    /// does not coerce is invalid. Infinite and non-positive ranges pass and
    /// only skip the radius circle.
    pub fn validate(&self) -> Result<SearchQuery, FormError> {
        let entity = self.entity.trim();
        if entity.is_empty() {
            return Err(FormError::EmptyEntity);
        }

        let raw_range = self.range.trim();
        let range_meters = if raw_range.is_empty() {
            0.0
        } else {
            coerce_number(raw_range)
                .ok_or_else(|| FormError::InvalidRange(raw_range.to_string()))?
        };

        Ok(SearchQuery {
            entity: entity.to_string(),
            range_meters,
        })
    }
}

/// Number coercion for a trimmed, non-empty string: decimal literals with an
/// optional sign and exponent, `Infinity`, and unsigned `0x`/`0o`/`0b`
/// integers. Rust-only spellings such as `inf` or `nan` are rejected.
fn coerce_number(raw: &str) -> Option<f64> {
    match raw {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let radix = match raw.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &raw[2..];
        if digits.is_empty() {
            return None;
        }
        return digits.chars().try_fold(0.0, |acc: f64, c| {
            c.to_digit(radix)
                .map(|digit| acc * f64::from(radix) + f64::from(digit))
        });
    }

    let decimal = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if !decimal {
        return None;
    }
    raw.parse::<f64>().ok()
}
