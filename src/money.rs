//! Guyana Dollar formatting helpers.
//!
//! Amounts are carried as `f64` throughout the engine.  These helpers
//! render them for display (`GY$1,234.56`) and parse the display form
//! back, so that values shown on screen survive a round trip to two
//! decimal places.

use crate::error::{EngineError, Result};

/// Currency prefix used for on-screen amounts.
pub const GYD_SYMBOL: &str = "GY$";

/// Round to cents, half away from zero.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Format an amount as Guyana Dollars with thousands separators and
/// exactly two decimal places.
pub fn format_gyd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{GYD_SYMBOL}{grouped}.{frac:02}")
}

/// Parse an amount produced by [`format_gyd`].  Plain numbers, an
/// optional `GY$` or `GYD` prefix, thousands separators and a leading
/// minus sign are accepted.
pub fn parse_gyd(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let rest = rest
        .strip_prefix(GYD_SYMBOL)
        .or_else(|| rest.strip_prefix("GYD"))
        .unwrap_or(rest)
        .trim_start();
    let digits: String = rest.chars().filter(|c| *c != ',').collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(EngineError::InvalidAmount(text.to_string()));
    }
    let value: f64 = digits
        .parse()
        .map_err(|_| EngineError::InvalidAmount(text.to_string()))?;
    Ok(if negative { -value } else { value })
}
