//! Timestamp normalisation
//!
//! Backends hand back dates in several shapes: SDK date-time values, HTTP
//! dates in headers, RFC 3339 strings in JSON, or bare epoch seconds. Every
//! date this crate exposes is an `i64` of epoch seconds.

use jiff::Timestamp;

/// Field names whose string values are dates
pub const DATE_FIELDS: &[&str] = &[
    "last_modified",
    "creation_date",
    "expiration",
    "expires",
    "expiry_date",
];

/// Whether a field name is one of the known date fields
///
/// Accepts snake_case, kebab-case and PascalCase spellings.
pub fn is_date_field(field: &str) -> bool {
    let normalized = to_snake_case(field);
    DATE_FIELDS.contains(&normalized.as_str())
}

/// Normalise a raw field value to epoch seconds
///
/// Numeric values pass through unchanged. Non-numeric values are parsed only
/// when `field` is a known date field; anything else yields `None`.
pub fn normalize(field: &str, raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Some(secs);
    }
    if !is_date_field(field) {
        return None;
    }
    parse_date(raw)
}

/// Parse a date string in RFC 3339 or RFC 2822 (HTTP-date) form
pub fn parse_date(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return Some(ts.as_second());
    }
    jiff::fmt::rfc2822::parse(raw)
        .ok()
        .map(|zoned| zoned.timestamp().as_second())
}

/// Extract and parse the `expiry-date` from an S3 `x-amz-expiration` header
///
/// The header looks like `expiry-date="Fri, 23 Dec 2012 00:00:00 GMT", rule-id="purge"`.
pub fn parse_expiration_header(header: &str) -> Option<i64> {
    let start = header.find("expiry-date=\"")? + "expiry-date=\"".len();
    let rest = &header[start..];
    let end = rest.find('"')?;
    normalize("expiry_date", &rest[..end])
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '-' {
            out.push('_');
            prev_lower = false;
        } else if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
