//! Lenient currency parsing for operator input.
//!
//! Operators type amounts in whatever convention they are used to
//! (`1,250.50`, `1.250,50`, `200,80`, `1.250.000`). The rules, in order:
//!
//! 1. empty or missing input is zero;
//! 2. numbers are taken as they are;
//! 3. only commas, a single one followed by 1-2 digits: decimal comma;
//! 4. only commas otherwise: thousands separators, dropped;
//! 5. both separators: the rightmost one is the decimal point, the other is
//!    dropped everywhere;
//! 6. only dots, more than one: thousands separators, dropped;
//! 7. only dots, exactly one: decimal point (`1.250` is `1.25`);
//! 8. anything that still is not a number is zero;
//! 9. magnitudes above one trillion are clamped to it.
//!
//! Parsing never fails; [`try_parse_text`] is the variant that reports input
//! without any number in it.

use std::str::FromStr;

use rust_decimal::{Decimal, prelude::FromPrimitive};

use crate::Money;

/// Raw input handed to [`parse_amount`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AmountInput<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

impl<'a> From<&'a str> for AmountInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<&'a String> for AmountInput<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value.as_str())
    }
}

impl<'a> From<Option<&'a str>> for AmountInput<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Self::Missing, Self::Text)
    }
}

impl From<f64> for AmountInput<'_> {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Parses an amount, falling back to zero when nothing sensible can be read.
/// The result is clamped to [`Money::MAX_INPUT`] in either direction.
pub fn parse_amount<'a>(input: impl Into<AmountInput<'a>>) -> Money {
    let amount = match input.into() {
        AmountInput::Missing => Money::ZERO,
        AmountInput::Number(value) => Decimal::from_f64(value)
            .and_then(Money::from_decimal)
            .unwrap_or(Money::ZERO),
        AmountInput::Text(text) => try_parse_text(text).unwrap_or(Money::ZERO),
    };
    amount.clamp_input()
}

/// Renders any accepted input as `1,250.50`.
pub fn format_amount<'a>(input: impl Into<AmountInput<'a>>) -> String {
    parse_amount(input).to_string()
}

/// Parses text input. Empty input is zero; input with no digits is `None`.
pub fn try_parse_text(text: &str) -> Option<Money> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(Money::ZERO);
    }
    let normalized = normalize(trimmed)?;
    Decimal::from_str(&normalized)
        .ok()
        .and_then(Money::from_decimal)
}

/// Rewrites the text into a plain `[-]digits[.digits]` string.
fn normalize(text: &str) -> Option<String> {
    let negative = text.starts_with('-');
    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let commas = kept.matches(',').count();
    let dots = kept.matches('.').count();

    let body = match (commas, dots) {
        (0, 0) => kept,
        (1, 0) => {
            let decimals = kept.len() - kept.find(',').map_or(kept.len(), |idx| idx + 1);
            if (1..=2).contains(&decimals) {
                kept.replace(',', ".")
            } else {
                kept.replace(',', "")
            }
        }
        (_, 0) => kept.replace(',', ""),
        (0, 1) => kept,
        (0, _) => kept.replace('.', ""),
        _ => {
            let last_comma = kept.rfind(',').unwrap_or(0);
            let last_dot = kept.rfind('.').unwrap_or(0);
            if last_dot > last_comma {
                kept.replace(',', "")
            } else {
                kept.replace('.', "").replace(',', ".")
            }
        }
    };

    let body = if body.starts_with('.') {
        format!("0{body}")
    } else {
        body
    };
    let body = body.strip_suffix('.').map(str::to_string).unwrap_or(body);

    Some(if negative { format!("-{body}") } else { body })
}
