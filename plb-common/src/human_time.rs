//! Human-readable runtime formatting
//!
//! Trial runtimes are measured as fractional seconds. Narration and the run
//! summary show them in the shortest format that fits the magnitude.

/// Format selection thresholds (seconds)
const SHORT_FORMAT_MAX: f64 = 100.0; // < 100s → X.XXs
const MEDIUM_FORMAT_MAX: f64 = 6000.0; // < 100m → M:SS.Xs
                                       // >= 100m → H:MM:SS

/// Format elapsed seconds as human-readable time.
///
/// - Short format (`X.XXs`): below 100 seconds
/// - Medium format (`M:SS.Xs`): below 100 minutes
/// - Long format (`H:MM:SS`): everything above
///
/// Negative and non-finite inputs never come out of `Instant::elapsed`, but
/// are still rendered instead of panicking.
///
/// # Examples
///
/// ```
/// use plb_common::human_time::format_runtime;
///
/// assert_eq!(format_runtime(4.5), "4.50s");
/// assert_eq!(format_runtime(330.0), "5:30.0s");
/// assert_eq!(format_runtime(7200.0), "2:00:00");
/// ```
pub fn format_runtime(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "n/a".to_string();
    }

    let is_negative = seconds < 0.0;
    let abs_seconds = seconds.abs();

    let formatted = if abs_seconds < SHORT_FORMAT_MAX {
        format!("{:.2}s", abs_seconds)
    } else if abs_seconds < MEDIUM_FORMAT_MAX {
        let minutes = (abs_seconds / 60.0).floor();
        let secs = abs_seconds - minutes * 60.0;
        format!("{}:{:04.1}s", minutes as u64, secs)
    } else {
        let whole = abs_seconds.round() as u64;
        let hours = whole / 3600;
        let mins = (whole % 3600) / 60;
        let secs = whole % 60;
        format!("{}:{:02}:{:02}", hours, mins, secs)
    };

    if is_negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Format an optional runtime, rendering `None` as "n/a"
pub fn format_runtime_opt(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) => format_runtime(s),
        None => "n/a".to_string(),
    }
}
