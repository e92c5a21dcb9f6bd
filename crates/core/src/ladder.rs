//! Grid ladder expansion.
//!
//! A ladder `{start, end, step}` yields rungs at `start + k*step` for
//! `k = 0, 1, 2, ...` while the price does not exceed `end`. A rung that lands
//! within `step * 1e-9` above `end` is still admitted, so ladders whose end was
//! typed with rounding noise keep their final level.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::{Result, ScheduleError};
use crate::types::{GridLadder, Rung};

/// Upper bound on rungs generated from a single ladder.
pub const DEFAULT_MAX_RUNGS_PER_LADDER: usize = 10_000;

/// Tolerance relative to `step` for admitting a rung at the end boundary.
fn boundary_tolerance(step: Decimal) -> Decimal {
    step * Decimal::new(1, 9)
}

/// Number of rungs `ladder` expands to. Zero when `end < start`.
///
/// # Errors
///
/// Returns `InvalidLadder` for a non-positive step or quantity or a price
/// range too wide for `Decimal`, and `LadderTooLarge` when the count does not
/// fit in a `usize`.
pub fn rung_count(ladder: &GridLadder) -> Result<usize> {
    ladder.validate()?;

    let span = ladder
        .end
        .checked_sub(ladder.start)
        .and_then(|span| span.checked_add(boundary_tolerance(ladder.step)))
        .ok_or_else(|| ScheduleError::InvalidLadder {
            label: ladder.label.clone(),
            reason: format!(
                "price range {} to {} is too wide",
                ladder.start, ladder.end
            ),
        })?;
    if span < Decimal::ZERO {
        return Ok(0);
    }

    let too_large = || ScheduleError::LadderTooLarge {
        label: ladder.label.clone(),
        rungs: usize::MAX,
        max: usize::MAX,
    };
    let levels = span.checked_div(ladder.step).ok_or_else(too_large)?.floor();
    levels
        .to_usize()
        .and_then(|n| n.checked_add(1))
        .ok_or_else(too_large)
}

/// Expands every ladder into rungs, in ladder order then level order.
///
/// # Errors
///
/// Returns `InvalidLadder` for a malformed ladder and `LadderTooLarge` when a
/// ladder would produce more than `max_rungs_per_ladder` rungs.
pub fn normalize(grids: &[GridLadder], max_rungs_per_ladder: usize) -> Result<Vec<Rung>> {
    let mut rungs = Vec::new();

    for (grid_index, ladder) in grids.iter().enumerate() {
        let count = match rung_count(ladder) {
            Err(ScheduleError::LadderTooLarge { label, rungs, .. }) => {
                return Err(ScheduleError::LadderTooLarge {
                    label,
                    rungs,
                    max: max_rungs_per_ladder,
                })
            }
            other => other?,
        };
        if count > max_rungs_per_ladder {
            return Err(ScheduleError::LadderTooLarge {
                label: ladder.label.clone(),
                rungs: count,
                max: max_rungs_per_ladder,
            });
        }

        tracing::debug!(
            label = %ladder.label,
            grid_index,
            rungs = count,
            "Expanded grid ladder"
        );

        rungs.reserve(count);
        for level in 0..count {
            let price = Decimal::from(level)
                .checked_mul(ladder.step)
                .and_then(|offset| ladder.start.checked_add(offset))
                .ok_or_else(|| ScheduleError::InvalidLadder {
                    label: ladder.label.clone(),
                    reason: format!("level {level} price overflows"),
                })?;
            rungs.push(Rung {
                price,
                qty: ladder.qty_per_level,
                grid_index,
                grid_label: ladder.label.clone(),
                level,
            });
        }
    }

    Ok(rungs)
}
