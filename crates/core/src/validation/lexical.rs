//! Cell text helpers and lexical predicates used by the validator registry.
//!
//! Spreadsheet cells arrive as loosely typed JSON values. Checks operate on
//! the cell's text form, and numeric checks follow spreadsheet-number
//! coercion rules: surrounding whitespace is ignored and an empty string
//! counts as zero.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use validator::{ValidateEmail, ValidateUrl};

/// US month/day/year, e.g. `5/25/2016` or `05/25/2016`.
pub const SIMPLE_DATE_US_FORMAT: &str = "%m/%d/%Y";

static DECIMAL_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid regex"));
static FLOAT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid regex"));
static INT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("valid regex"));
static HEX_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0[xX][0-9a-fA-F]+$").expect("valid regex"));

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?$").expect("valid regex"));
static US_CURRENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?\$[+-]?(\d{1,3}(,\d{3})+|\d+)(\.\d{2})?$").expect("valid regex")
});
static SHORTHAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid regex"));
static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,10}[A-Za-z0-9]$").expect("valid regex"));
static PHONE_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s().*\-]+$").expect("valid regex"));
static DASH_OR_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\-.\u{2010}-\u{2015}\u{2212}\u{FE63}\u{FF0D}]").expect("valid regex"));

// ── Cell text ────────────────────────────────────────────────────────

/// Text form of a cell. `None`/`null` render as the empty string, numbers
/// without a trailing `.0`, and arrays as their elements joined by commas.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => format_number(f),
            None => n.to_string(),
        },
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| cell_text(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

/// Whether the cell is missing or holds only whitespace.
///
/// Numbers and booleans are never blank, so a numeric `0` is a value.
pub fn is_blank(value: Option<&Value>) -> bool {
    cell_text(value).trim().is_empty()
}

pub fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{}", f as i128)
    } else {
        f.to_string()
    }
}

// ── Numbers ──────────────────────────────────────────────────────────

/// Parse a whole string as a number. Whitespace is ignored, an empty string
/// is zero, and `Infinity` and hex literals are accepted. Anything else is
/// `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    if HEX_LITERAL.is_match(trimmed) {
        return i64::from_str_radix(&trimmed[2..], 16).ok().map(|n| n as f64);
    }
    if DECIMAL_LITERAL.is_match(trimmed) {
        return f64::from_str(trimmed).ok();
    }
    None
}

/// Numeric value of a cell, or `None` when it is not a number.
pub fn to_number(value: Option<&Value>) -> Option<f64> {
    match value {
        None => None,
        Some(Value::Null) => Some(0.0),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_number(s),
        Some(Value::Array(items)) => match items.as_slice() {
            [] => Some(0.0),
            [single] => to_number(Some(single)),
            _ => None,
        },
        Some(Value::Object(_)) => None,
    }
}

/// Parse the longest leading decimal literal, ignoring leading whitespace.
pub fn parse_float_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    if let Some(rest) = trimmed.strip_prefix('-') {
        if rest.starts_with("Infinity") {
            return Some(f64::NEG_INFINITY);
        }
    }
    if trimmed.trim_start_matches('+').starts_with("Infinity") {
        return Some(f64::INFINITY);
    }
    FLOAT_PREFIX
        .find(trimmed)
        .and_then(|m| f64::from_str(m.as_str()).ok())
}

/// Parse the leading base-10 integer, ignoring leading whitespace.
pub fn parse_int_prefix(text: &str) -> Option<f64> {
    INT_PREFIX
        .find(text.trim_start())
        .and_then(|m| f64::from_str(m.as_str()).ok())
}

/// Whether the cell holds an integer: whole-string numeric, and its integer
/// prefix equals its float prefix.
pub fn is_integer(value: Option<&Value>) -> bool {
    if to_number(value).is_none() {
        return false;
    }
    let text = cell_text(value);
    match (parse_int_prefix(&text), parse_float_prefix(&text)) {
        (Some(int), Some(float)) => int == float,
        _ => false,
    }
}

// ── Lexical forms ────────────────────────────────────────────────────

pub fn is_valid_decimal(text: &str) -> bool {
    DECIMAL.is_match(text.trim())
}

pub fn is_valid_us_currency(text: &str) -> bool {
    US_CURRENCY.is_match(text.trim())
}

pub fn is_valid_shorthand(text: &str) -> bool {
    SHORTHAND.is_match(text.trim())
}

pub fn is_valid_postal_code(text: &str) -> bool {
    POSTAL_CODE.is_match(text.trim())
}

/// A decimal between -100 and 100 inclusive.
pub fn is_valid_percentage(text: &str) -> bool {
    is_valid_decimal(text)
        && parse_number(text).is_some_and(|n| (-100.0..=100.0).contains(&n))
}

pub fn has_no_dash_hyphen_or_dot(text: &str) -> bool {
    !DASH_OR_DOT.is_match(text)
}

/// North American numbering plan: ten digits with an optional leading `1`
/// country code, and an area code that does not start with 0 or 1.
pub fn is_valid_phone_number(text: &str) -> bool {
    let trimmed = text.trim();
    if !PHONE_CHARSET.is_match(trimmed) {
        return false;
    }
    let digits: Vec<u8> = trimmed
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();
    let national = match digits.as_slice() {
        [1, rest @ ..] if rest.len() == 10 => rest,
        all if all.len() == 10 => all,
        _ => return false,
    };
    national[0] >= 2 && national[3] >= 2
}

pub fn is_valid_email(text: &str) -> bool {
    text.trim().to_string().validate_email()
}

/// Absolute http(s) URL. Scheme-less strings such as `www.example.com` fail.
pub fn is_valid_url(text: &str) -> bool {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")) && trimmed.to_string().validate_url()
}

pub fn is_valid_time_zone(text: &str) -> bool {
    chrono_tz::Tz::from_str(text.trim()).is_ok()
}

/// Whether the text parses as a US `month/day/year` date.
pub fn try_parse_as_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text.trim(), SIMPLE_DATE_US_FORMAT).is_ok()
}
