//! Table and cell helpers for human-readable listings

use comfy_table::presets::NOTHING;
use comfy_table::{ContentArrangement, Table};
use jiff::Timestamp;

/// A borderless table with the given header row
pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

/// Render epoch seconds as `YYYY-MM-DD HH:MM:SS` UTC, or `-` when unknown
pub fn format_timestamp(epoch: Option<i64>) -> String {
    epoch
        .and_then(|secs| Timestamp::from_second(secs).ok())
        .map(|ts| ts.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Render a byte count in binary units
pub fn format_size(bytes: i64) -> String {
    humansize::format_size(bytes.max(0) as u64, humansize::BINARY)
}
