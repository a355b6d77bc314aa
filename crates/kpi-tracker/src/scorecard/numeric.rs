// Parsing and fixed-point rendering shared by scoring, normalization, and
// the spreadsheet codec.
//
// Form values arrive as free text, so every reader here is forgiving:
// nothing panics and anything unusable comes back as `None`.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};
use regex::Regex;
use std::sync::OnceLock;

static LEADING_NUMBER: OnceLock<Regex> = OnceLock::new();

fn leading_number() -> &'static Regex {
    LEADING_NUMBER.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")
            .expect("leading number pattern compiles")
    })
}

/// Read the leading decimal number of a form value.
///
/// - Leading whitespace is skipped.
/// - Trailing text after the number is ignored (`"250 orang"` reads as 250).
/// - Returns `None` when the value does not start with a number.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let matched = leading_number().find(trimmed)?;
    matched
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Read a whole cell as a number, rejecting trailing text.
///
/// An empty cell counts as zero, the way spreadsheet currency cells are read.
pub fn parse_strict(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|number| number.is_finite())
}

pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Render with exactly two decimals.
///
/// Exact binary ties on the third decimal (`x.125`, `x.375`, ...) round
/// away from zero, so `1.125` renders as `1.13` rather than banker's `1.12`.
pub fn fixed_2(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }
    let magnitude = value.abs();
    let rounded = if is_third_decimal_tie(magnitude) {
        (magnitude * 100.0).ceil() / 100.0
    } else {
        magnitude
    };
    let body = format!("{:.2}", rounded);
    if value < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

fn is_third_decimal_tie(magnitude: f64) -> bool {
    let eighths = magnitude * 8.0;
    eighths.fract() == 0.0 && eighths % 2.0 == 1.0
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", fixed_2(value))
}

/// Half-up rounding to two decimals on the numeric value itself.
pub fn round_half_up_2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Format a currency cell as `RM 1,234.50`.
///
/// Blank, zero, and non-numeric inputs all render as `RM 0.00`.
pub fn format_ringgit(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "0" || trimmed == "0.00" {
        return "RM 0.00".to_string();
    }
    match parse_strict(trimmed) {
        Some(amount) => format!("RM {}", group_thousands(amount)),
        None => "RM 0.00".to_string(),
    }
}

fn group_thousands(amount: f64) -> String {
    let fixed = fixed_2(amount);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let mut parts = unsigned.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next().unwrap_or("00");
    match int_part.parse::<u64>() {
        Ok(int_val) => format!(
            "{sign}{}.{frac_part}",
            int_val.to_formatted_string(&Locale::en)
        ),
        Err(_) => fixed,
    }
}
