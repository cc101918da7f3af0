// Fixed display colors per category.
//
// The palette is static lookup data. Names not listed fall back to
// `DEFAULT_COLOR`.
use crate::types::Source;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const DEFAULT_COLOR: &str = "#8D99AE";

const SERVICE_PALETTE: [(&str, &str); 7] = [
    ("Haircut (Men)", "#F94144"),
    ("Haircut (Women)", "#F3722C"),
    ("Haircut (Kids)", "#F8961E"),
    ("Color", "#F9C74F"),
    ("Treatment", "#90BE6D"),
    ("Extensions", "#43AA8B"),
    ("Styling", "#577590"),
];

const PRODUCT_PALETTE: [(&str, &str); 7] = [
    ("Shampoo", "#F94144"),
    ("Conditioner", "#F3722C"),
    ("Hair Mask", "#F8961E"),
    ("Styling Gel", "#F9C74F"),
    ("Hair Spray", "#90BE6D"),
    ("Serum", "#43AA8B"),
    ("Hair Brush", "#577590"),
];

static SERVICE_COLORS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| SERVICE_PALETTE.into_iter().collect());

static PRODUCT_COLORS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| PRODUCT_PALETTE.into_iter().collect());

pub fn service_color(name: &str) -> &'static str {
    SERVICE_COLORS.get(name).copied().unwrap_or(DEFAULT_COLOR)
}

pub fn product_color(name: &str) -> &'static str {
    PRODUCT_COLORS.get(name).copied().unwrap_or(DEFAULT_COLOR)
}

pub fn source_color(source: Source) -> &'static str {
    match source {
        Source::Product => "#577590",
        Source::Service => "#F3722C",
    }
}

/// Color for a category of the given dataset.
pub fn color_for(source: Source, category: &str) -> &'static str {
    match source {
        Source::Service => service_color(category),
        Source::Product => product_color(category),
    }
}
