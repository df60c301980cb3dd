//! Time parsing and formatting utilities

use crate::error::{SplitXError, SplitXResult};

/// Time parser for the formats accepted on the command line
pub struct TimeParser;

impl TimeParser {
    /// Create a new time parser
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }

    /// Parse `SS(.ms)`, `MM:SS(.ms)` or `HH:MM:SS(.ms)` into seconds
    pub fn parse_time(&self, time_str: &str) -> SplitXResult<f64> {
        let time_str = time_str.trim();
        let invalid = || SplitXError::config(format!("Invalid time format: '{}'", time_str));

        let fields: Vec<&str> = time_str.split(':').collect();
        let (hours, minutes, seconds) = match fields.as_slice() {
            [s] => ("0", "0", *s),
            [m, s] => ("0", *m, *s),
            [h, m, s] => (*h, *m, *s),
            _ => return Err(invalid()),
        };

        let hours: u64 = hours.parse().map_err(|_| invalid())?;
        let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
        let seconds: f64 = seconds.parse().map_err(|_| invalid())?;

        if !seconds.is_finite() || seconds < 0.0 {
            return Err(invalid());
        }
        // Sexagesimal fields must stay below 60 once a larger unit is present
        if fields.len() > 1 && seconds >= 60.0 {
            return Err(invalid());
        }
        if fields.len() > 2 && minutes >= 60 {
            return Err(invalid());
        }

        Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
    }

    /// Format seconds to `HH:MM:SS.ms`, or `MM:SS.ms` under an hour
    pub fn format_time(&self, seconds: f64) -> String {
        let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let secs = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, secs, milliseconds)
        }
    }
}

impl Default for TimeParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for `TimeParser::new().parse_time`
pub fn parse_time(time_str: &str) -> SplitXResult<f64> {
    TimeParser::new().parse_time(time_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_seconds() {
        assert_eq!(parse_time("90").unwrap(), 90.0);
        assert_eq!(parse_time(" 12.5 ").unwrap(), 12.5);
    }

    #[test]
    fn parses_minutes_and_hours() {
        assert_eq!(parse_time("01:30").unwrap(), 90.0);
        assert_eq!(parse_time("01:30.250").unwrap(), 90.25);
        assert_eq!(parse_time("01:02:03.45").unwrap(), 3723.45);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "abc", "1:2:3:4", "-5", "00:75", "01:60:00", "1:-2", "inf"] {
            assert!(
                matches!(parse_time(bad), Err(SplitXError::Config { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn formats_time() {
        let parser = TimeParser::new();
        assert_eq!(parser.format_time(90.25), "01:30.250");
        assert_eq!(parser.format_time(3723.45), "01:02:03.450");
        assert_eq!(parser.format_time(-1.0), "00:00.000");
    }
}
