// Parsing and formatting helpers.
//
// Everything that touches raw CSV text or produces display strings lives here
// so the filter/aggregate code only ever sees typed values.
use crate::error::InputError;
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};
use rust_decimal::Decimal;
use std::str::FromStr;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a money amount, tolerating a leading `$`, thousands separators and
/// surrounding whitespace. Returns `None` for anything else.
pub fn parse_decimal_safe(s: Option<&str>) -> Option<Decimal> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    Decimal::from_str(&cleaned).ok()
}

pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.replace(',', "").parse::<i64>().ok()
}

/// Parse a calendar date. Date-only and date-time spellings are accepted; any
/// time of day is dropped.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Date typed by the user (CLI flag or menu prompt).
pub fn parse_user_date(s: &str) -> Result<NaiveDate, InputError> {
    parse_date_safe(Some(s)).ok_or_else(|| InputError::Date(s.trim().to_string()))
}

/// `1234567.891` -> `1,234,567.89`.
pub fn format_number(n: Decimal, decimals: u32) -> String {
    let neg = n.is_sign_negative() && !n.round_dp(decimals).is_zero();
    let s = format!("{:.*}", decimals as usize, n.abs().round_dp(decimals));
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u128 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Metric-card money format, e.g. `$1,234.50`.
pub fn format_money(n: Decimal) -> String {
    let body = format_number(n, 2);
    match body.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", body),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
