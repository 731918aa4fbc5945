//! Timestamp parsing and formatting.
//!
//! Timeline positions are plain `f64` seconds with millisecond precision.
//! Text forms: `HH:MM:SS[.mmm]`, `MM:SS`, `SS` for input, `HH:MM:SS.mmm` for
//! display and `HH:MM:SS,mmm` for SRT cues.

/// Tolerance used when comparing partition boundaries.
pub const BOUNDARY_TOLERANCE: f64 = 0.01;

/// Two boundaries closer than this are the same boundary.
pub const DEDUP_EPSILON: f64 = 0.001;

/// Whether two timeline positions are equal within [`BOUNDARY_TOLERANCE`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= BOUNDARY_TOLERANCE
}

/// Round to millisecond precision.
pub fn round_millis(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

/// Parse a timestamp string to total seconds.
///
/// # Examples
/// ```
/// use shorts_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
/// assert_eq!(parse_timestamp("00:00:01,500").unwrap(), 1.5);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    // SRT uses a comma before the milliseconds
    let normalized = ts.replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() > 3 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    const NAMES: [&str; 3] = ["hours", "minutes", "seconds"];
    let offset = 3 - parts.len();

    let mut total = 0.0;
    for (i, part) in parts.iter().enumerate() {
        let name = NAMES[offset + i];
        let value: f64 = part
            .parse()
            .map_err(|_| TimestampError::InvalidValue(name, part.to_string()))?;
        if value < 0.0 {
            return Err(TimestampError::Negative);
        }
        total = total * 60.0 + value;
    }

    Ok(total)
}

fn split_millis(total_secs: f64) -> (u64, u64, u64, u64) {
    let total_ms = (total_secs.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total = total_ms / 1000;
    (total / 3600, (total % 3600) / 60, total % 60, ms)
}

/// Format seconds as `HH:MM:SS.mmm`.
pub fn format_seconds(total_secs: f64) -> String {
    let (h, m, s, ms) = split_millis(total_secs);
    format!("{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
}

/// Format seconds as an SRT cue timestamp (`HH:MM:SS,mmm`).
pub fn format_srt_timestamp(total_secs: f64) -> String {
    let (h, m, s, ms) = split_millis(total_secs);
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// Filename-safe variant of [`format_seconds`] (`HH-MM-SS.mmm`).
pub fn format_filename_timestamp(total_secs: f64) -> String {
    format_seconds(total_secs).replace(':', "-")
}

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampError {
    /// Timestamp string is empty
    Empty,
    /// Timestamp contains negative values
    Negative,
    /// Invalid numeric value for a component
    InvalidValue(&'static str, String),
    /// Too many components
    InvalidFormat(String),
}

impl std::fmt::Display for TimestampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Timestamp cannot be empty"),
            Self::Negative => write!(f, "Timestamp cannot be negative"),
            Self::InvalidValue(component, value) => {
                write!(f, "Invalid {} value: {}", component, value)
            }
            Self::InvalidFormat(ts) => write!(
                f,
                "Invalid timestamp format '{}'. Use HH:MM:SS, HH:MM:SS.mmm, MM:SS, or SS",
                ts
            ),
        }
    }
}

impl std::error::Error for TimestampError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_forms() {
        assert_eq!(parse_timestamp("00:00:00").unwrap(), 0.0);
        assert_eq!(parse_timestamp("01:30:45").unwrap(), 5445.0);
        assert_eq!(parse_timestamp("53:53").unwrap(), 3233.0);
        assert_eq!(parse_timestamp("90").unwrap(), 90.0);
        assert!((parse_timestamp("00:00:30.500").unwrap() - 30.5).abs() < 1e-9);
        assert!((parse_timestamp("00:01:02,250").unwrap() - 62.25).abs() < 1e-9);
    }

    #[test]
    fn test_parse_timestamp_errors() {
        assert!(matches!(parse_timestamp(""), Err(TimestampError::Empty)));
        assert!(matches!(parse_timestamp("abc"), Err(TimestampError::InvalidValue("seconds", _))));
        assert!(matches!(parse_timestamp("x:10"), Err(TimestampError::InvalidValue("minutes", _))));
        assert!(matches!(parse_timestamp("1:2:3:4"), Err(TimestampError::InvalidFormat(_))));
        assert!(matches!(parse_timestamp("-5"), Err(TimestampError::Negative)));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "00:00:00.000");
        assert_eq!(format_seconds(90.5), "00:01:30.500");
        assert_eq!(format_seconds(3661.007), "01:01:01.007");
        assert_eq!(format_filename_timestamp(62.0), "00-01-02.000");
    }

    #[test]
    fn test_format_srt_timestamp() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(9.999), "00:00:09,999");
        assert_eq!(format_srt_timestamp(59.9996), "00:01:00,000");
    }

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(10.0, 10.005));
        assert!(approx_eq(10.0, 10.01));
        assert!(!approx_eq(10.0, 10.02));
    }
}
