// Domain rules - Parameter validation applied before any transcoder runs

use std::path::PathBuf;

use crate::domain::model::*;
use crate::error::{SplitXError, SplitXResult};

/// Upper bound on parts a single split may produce
pub const MAX_PARTS: u64 = 10_000;

/// Validation rules for sizing strategies
pub struct SizingRules;

impl SizingRules {
    /// Reject non-positive, non-finite or out-of-range strategy parameters
    pub fn validate(strategy: &SizingStrategy) -> SplitXResult<()> {
        match *strategy {
            SizingStrategy::ByCount(parts) => {
                if parts < 2 {
                    return Err(SplitXError::config(format!(
                        "Part count must be at least 2, got {}",
                        parts
                    )));
                }
                if u64::from(parts) > MAX_PARTS {
                    return Err(SplitXError::config(format!(
                        "Part count must not exceed {}, got {}",
                        MAX_PARTS, parts
                    )));
                }
            }
            SizingStrategy::ByDuration(seconds) => {
                if !seconds.is_finite() || seconds <= 0.0 {
                    return Err(SplitXError::config(format!(
                        "Duration per part must be a positive number of seconds, got {}",
                        seconds
                    )));
                }
            }
            SizingStrategy::BySize(megabytes) => {
                if !megabytes.is_finite() || megabytes <= 0.0 {
                    return Err(SplitXError::config(format!(
                        "Target size must be a positive number of megabytes, got {}",
                        megabytes
                    )));
                }
            }
        }
        Ok(())
    }

    /// A planned part count must stay within bounds
    pub fn validate_part_count(parts: u64) -> SplitXResult<()> {
        if parts > MAX_PARTS {
            return Err(SplitXError::config(format!(
                "Split would produce {} parts (limit {})",
                parts, MAX_PARTS
            )));
        }
        Ok(())
    }
}

/// Validation rules for trim ranges
pub struct TrimRules;

impl TrimRules {
    /// Checks that can run before the source is probed
    pub fn validate_range(start: f64, end: f64) -> SplitXResult<()> {
        if !start.is_finite() || !end.is_finite() {
            return Err(SplitXError::config("Trim times must be finite"));
        }
        if start < 0.0 {
            return Err(SplitXError::config("Start time must be >= 0"));
        }
        if end <= start {
            return Err(SplitXError::config("End time must be greater than start time"));
        }
        Ok(())
    }

    /// Clamp the end to the probed duration. Returns the effective end and
    /// whether clamping happened.
    pub fn clamp_end(start: f64, end: f64, duration: f64) -> SplitXResult<(f64, bool)> {
        if end <= duration {
            return Ok((end, false));
        }
        if start >= duration {
            return Err(SplitXError::config(format!(
                "Start time ({}s) is beyond the video duration ({:.2}s)",
                start, duration
            )));
        }
        Ok((duration, true))
    }
}

/// Validation rules for merge requests
pub struct MergeRules;

impl MergeRules {
    pub fn validate_inputs(inputs: &[PathBuf]) -> SplitXResult<()> {
        if inputs.len() < 2 {
            return Err(SplitXError::validation(format!(
                "Merging needs at least 2 input files, got {}",
                inputs.len()
            )));
        }
        Ok(())
    }
}
