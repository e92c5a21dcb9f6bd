//! Trigger, ordering and allocation of exits against the open position.

use rust_decimal::Decimal;
use std::cmp::Ordering;

use crate::error::{Result, ScheduleError};
use crate::types::{Fill, FillKind, GridSort, PositionPlan, Rung, Side};

/// A price-triggered exit waiting for quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate<'a> {
    kind: FillKind,
    price: Decimal,
    qty: u32,
    /// Lump position for lumps, ladder position for rungs.
    source: usize,
    /// Rung position within its ladder; zero for lumps.
    level: usize,
    grid_label: Option<&'a str>,
}

impl Candidate<'_> {
    /// Declaration order: lumps first, then ladders, then rungs within a ladder.
    fn declaration_key(&self) -> (u8, usize, usize) {
        let rank = match self.kind {
            FillKind::Lump => 0,
            FillKind::Grid => 1,
        };
        (rank, self.source, self.level)
    }
}

/// Exits whose price the mark has reached, lumps before rungs.
fn triggered<'a>(plan: &PositionPlan, rungs: &'a [Rung]) -> Vec<Candidate<'a>> {
    let lumps = plan
        .lumps
        .iter()
        .enumerate()
        .filter(|(_, lump)| plan.side.is_triggered(plan.mark_price, lump.price))
        .map(|(i, lump)| Candidate {
            kind: FillKind::Lump,
            price: lump.price,
            qty: lump.qty,
            source: i,
            level: 0,
            grid_label: None,
        });

    let grid = rungs
        .iter()
        .filter(|rung| plan.side.is_triggered(plan.mark_price, rung.price))
        .map(|rung| Candidate {
            kind: FillKind::Grid,
            price: rung.price,
            qty: rung.qty,
            source: rung.grid_index,
            level: rung.level,
            grid_label: Some(rung.grid_label.as_str()),
        });

    lumps.chain(grid).collect()
}

fn order(candidates: &mut [Candidate<'_>], side: Side, grid_sort: GridSort) {
    match grid_sort {
        GridSort::ByPrice => candidates.sort_by(|a, b| {
            let by_price = match side {
                Side::Long => a.price.cmp(&b.price),
                Side::Short => b.price.cmp(&a.price),
            };
            match by_price {
                Ordering::Equal => a.declaration_key().cmp(&b.declaration_key()),
                unequal => unequal,
            }
        }),
        // Lumps as one block ahead of all grids; no price comparison.
        GridSort::ByDefinitionOrder => candidates.sort_by_key(|c| c.declaration_key()),
    }
}

/// Fills produced by walking triggered exits in allocation order until the
/// position's quantity runs out.
///
/// `rungs` must come from [`crate::ladder::normalize`] over `plan.grids`.
/// Untriggered exits, and triggered exits reached after the quantity is
/// exhausted, produce no fill.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if a fill's points or USD value leaves the
/// `Decimal` range.
pub fn evaluate(plan: &PositionPlan, rungs: &[Rung], point_value: Decimal) -> Result<Vec<Fill>> {
    let mut candidates = triggered(plan, rungs);
    order(&mut candidates, plan.side, plan.grid_sort);

    tracing::debug!(
        symbol = %plan.symbol,
        side = %plan.side,
        mark = %plan.mark_price,
        triggered = candidates.len(),
        "Evaluating exit schedule"
    );

    let mut remaining = plan.total_qty;
    let mut fills = Vec::new();

    for candidate in candidates {
        if remaining == 0 {
            tracing::debug!(
                price = %candidate.price,
                "Position exhausted; remaining triggered exits left unfilled"
            );
            break;
        }
        let qty = candidate.qty.min(remaining);
        if qty == 0 {
            continue;
        }
        remaining -= qty;

        let overflow =
            || ScheduleError::ArithmeticOverflow(format!("fill PnL at {}", candidate.price));
        let pnl_pts = plan
            .side
            .points(plan.avg_entry, candidate.price)
            .ok_or_else(overflow)?;
        let pnl_usd = points_to_usd(pnl_pts, point_value, qty).ok_or_else(overflow)?;
        let is_grid = candidate.kind == FillKind::Grid;
        fills.push(Fill {
            kind: candidate.kind,
            price: candidate.price,
            qty,
            pnl_pts,
            pnl_usd,
            grid_index: is_grid.then_some(candidate.source),
            grid_label: candidate.grid_label.map(str::to_string),
        });
    }

    Ok(fills)
}

/// `points * point_value * qty`, or `None` on overflow.
pub(crate) fn points_to_usd(points: Decimal, point_value: Decimal, qty: u32) -> Option<Decimal> {
    points
        .checked_mul(point_value)?
        .checked_mul(Decimal::from(qty))
}
