//! Split planning implementation

use tracing::{debug, info};

use crate::domain::model::{MediaAsset, Segment, SizingStrategy, SplitPlan, BYTES_PER_MB};
use crate::domain::rules::SizingRules;
use crate::error::{SplitXError, SplitXResult};

/// Relative tolerance when turning a part-count quotient into an integer
const RATIO_EPSILON: f64 = 1e-9;

/// Planner computing segment boundaries for a split
#[derive(Debug, Default, Clone, Copy)]
pub struct SplitPlanner;

impl SplitPlanner {
    /// Create a new split planner
    pub fn new() -> Self {
        Self
    }

    /// Plan a split of a probed asset
    pub fn plan_asset(&self, asset: &MediaAsset, strategy: &SizingStrategy) -> SplitXResult<SplitPlan> {
        let duration = asset
            .duration
            .ok_or_else(|| SplitXError::probe(format!("{} has not been probed", asset.file_name())))?;
        self.plan(duration, asset.size_bytes, strategy)
    }

    /// Plan a split of a source of `duration` seconds and `file_size_bytes` bytes.
    ///
    /// The size-based strategy assumes a constant bitrate across the whole
    /// source. Variable-bitrate sources will miss the target size; that is an
    /// accepted limit of the estimate.
    pub fn plan(
        &self,
        duration: f64,
        file_size_bytes: u64,
        strategy: &SizingStrategy,
    ) -> SplitXResult<SplitPlan> {
        SizingRules::validate(strategy)?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(SplitXError::config(format!(
                "Cannot split a source with duration {}s",
                duration
            )));
        }

        let (total_parts, part_length) = match *strategy {
            SizingStrategy::ByCount(parts) => (u64::from(parts), duration / f64::from(parts)),
            SizingStrategy::ByDuration(seconds) => (ceil_div(duration, seconds), seconds),
            SizingStrategy::BySize(target_mb) => {
                if file_size_bytes == 0 {
                    return Err(SplitXError::config(
                        "Cannot split by size: source file is empty",
                    ));
                }
                let file_size_mb = file_size_bytes as f64 / BYTES_PER_MB;
                let target_bytes = target_mb * BYTES_PER_MB;
                let bitrate_bps = (file_size_bytes as f64 * 8.0) / duration;
                let part_length = (target_bytes * 8.0) / bitrate_bps;
                (ceil_div(file_size_mb, target_mb), part_length)
            }
        };
        SizingRules::validate_part_count(total_parts)?;
        // Even a target larger than the source yields one part
        let total_parts = total_parts.max(1) as usize;

        info!(
            "Planned {} parts of {:.3}s for {:.3}s source ({})",
            total_parts, part_length, duration, strategy
        );

        let boundary = |k: usize| {
            if k >= total_parts {
                duration
            } else {
                k as f64 * part_length
            }
        };
        let segments: Vec<Segment> = (0..total_parts)
            .map(|i| Segment {
                index: i + 1,
                start: boundary(i),
                end: boundary(i + 1),
            })
            .collect();
        debug!("Segments: {:?}", segments);

        Ok(SplitPlan {
            duration,
            part_length,
            strategy: *strategy,
            file_size_bytes,
            segments,
        })
    }
}

/// Whole parts needed to cover `total` in pieces of `piece`. Quotients
/// within rounding noise of an integer count as that integer, so a tail
/// of zero length is never planned.
fn ceil_div(total: f64, piece: f64) -> u64 {
    let ratio = total / piece;
    let nearest = ratio.round();
    if (ratio - nearest).abs() <= RATIO_EPSILON * nearest.max(1.0) {
        nearest as u64
    } else {
        ratio.ceil() as u64
    }
}
