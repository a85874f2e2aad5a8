//! Formatting and arithmetic helpers shared by the batch report and the CLI.

use crate::constants::SIZE_UNITS;

/// Format a byte count with base-1024 units.
///
/// The unit index is `floor(log1024(bytes))`, the scaled value is rounded to
/// two decimals and trailing zeros are dropped, so `1024` renders as `"1 KB"`
/// and `1536` as `"1.5 KB"`. Zero is `"0 Bytes"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return format!("0 {}", SIZE_UNITS[0]);
    }

    let unit_index = (bytes.ilog(1024) as usize).min(SIZE_UNITS.len() - 1);
    let scaled = bytes as f64 / 1024f64.powi(unit_index as i32);

    format!("{} {}", trim_decimals(&format!("{:.2}", scaled)), SIZE_UNITS[unit_index])
}

/// Two-decimal percentage without the `%` sign.
pub fn format_percent(percent: f64) -> String {
    format!("{:.2}", percent)
}

fn trim_decimals(fixed: &str) -> &str {
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed
    }
}

/// Size reduction as a percentage: positive means smaller, negative means the
/// payload grew. An empty original yields 0.
pub fn calculate_compression_ratio(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    ((original_size as f64 - compressed_size as f64) / original_size as f64) * 100.0
}
