//! Human-readable size and reduction metrics.

/// Binary units, indexed by `floor(log_1024(bytes))`.
const SIZE_UNITS: [&str; 3] = ["Bytes", "KB", "MB"];

/// Render a byte count with 1024-based units, rounded to two decimals.
///
/// Trailing zeros are dropped (`1536` renders as `1.5 KB`). Counts of a GiB
/// or more stay in `MB`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = (bytes.ilog(1024) as usize).min(SIZE_UNITS.len() - 1);
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = round_half_up(scaled * 100.0) / 100.0;

    format!("{} {}", rounded, SIZE_UNITS[exponent])
}

/// Percentage by which `compressed` is smaller than `original`.
///
/// Negative when compression inflated the file; the value is never clamped.
/// Returns 0 for an empty original, which ingestion never admits.
pub fn reduction_percent(original: u64, compressed: u64) -> i64 {
    if original == 0 {
        return 0;
    }
    let ratio = compressed as f64 / original as f64;
    round_half_up((1.0 - ratio) * 100.0) as i64
}

/// Round to the nearest integer with halves going toward positive infinity.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
