//! Decimal text helpers for prices, energy and money amounts.
//!
//! Card blocks and server payloads carry amounts as loosely formatted
//! ASCII (`"12.5"`, `"012.50 "`, trailing NULs).  They are parsed once
//! and re-rendered with two decimals before they are shown or sent.

use core::fmt::Write;

use heapless::String;

/// Rendered amount, e.g. `"102.20"`.
pub type Amount = String<16>;

/// Parse the longest leading decimal number in `text`.
///
/// Leading whitespace is skipped; anything after the number is ignored.
/// Text without a leading number reads as `0.0`.
pub fn parse_amount(text: &str) -> f32 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    let mut seen_dot = false;
    let mut seen_digit = false;
    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return 0.0;
    }
    trimmed[..end].parse().unwrap_or(0.0)
}

/// Render `value` with two decimals.
pub fn format_amount(value: f32) -> Amount {
    let mut out = Amount::new();
    if write!(out, "{:.2}", value).is_err() {
        out.clear();
        // Only reachable for values beyond 13 integer digits.
        let _ = out.push_str("---");
    }
    out
}

/// Parse then re-render, dropping any formatting noise.
pub fn normalize_amount(text: &str) -> Amount {
    format_amount(parse_amount(text))
}
