use rust_decimal::Decimal;
use thiserror::Error;

use ltt_core::calculations::common::round_half_up;

/// Error returned when price text cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid price '{input}': {source}")]
pub struct ParsePriceError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes price text: trims whitespace and removes the `$` sign and
/// commas (thousands separator).
fn normalize_price_input(s: &str) -> String {
    s.trim().replace(['$', ','], "")
}

/// Parses price text as typed into a currency field.
///
/// Handles a leading `$` and comma thousands separators (e.g. `"$1,234.56"`).
/// Empty or whitespace-only input is treated as 0. The sign is kept, so
/// range checks are left to the calculator.
pub fn parse_price(s: &str) -> Result<Decimal, ParsePriceError> {
    let normalized = normalize_price_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid price: {}", e);
        ParsePriceError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Formats an amount as en-US dollars, e.g. `$1,234.56` or `-$0.50`.
///
/// The amount is rounded half-up to cents first.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };

    let digits = format!("{:.2}", rounded.abs());
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Formats an amount as a plain number with exactly two decimals, e.g. `8475.00`.
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_half_up(amount))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Formats a rate fraction as a percentage, e.g. `0.015` as `1.5%`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}
