use chrono::Local;

/// Rounds to `decimals` places the way the dashboard has always shown values:
/// the exact binary value is rounded, and exact ties go to the even digit.
pub fn round_dp(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // Fixed-precision formatting rounds the exact value, ties to even
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Rounds an optional value, leaving `None` untouched.
pub fn round_opt(value: Option<f64>, decimals: u32) -> Option<f64> {
    value.map(|v| round_dp(v, decimals))
}

/// Wall-clock time in the `YYYY-MM-DD HH:MM:SS` layout used by the snapshot file
pub fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
