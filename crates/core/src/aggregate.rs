//! Realized/unrealized totals and per-ladder roll-ups over a fill list.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::schedule::points_to_usd;
use crate::types::{Fill, FillKind, PositionPlan, Summary};

/// Summarizes `fills` for `plan`, valuing any open remainder at the mark.
///
/// # Errors
///
/// Returns `AllocationOverflow` if the fills close more than `plan.total_qty`
/// and `ArithmeticOverflow` if a total leaves the `Decimal` range.
pub fn aggregate(plan: &PositionPlan, point_value: Decimal, fills: &[Fill]) -> Result<Summary> {
    let closed: u64 = fills.iter().map(|f| u64::from(f.qty)).sum();
    let overflow = || ScheduleError::AllocationOverflow {
        closed,
        total: plan.total_qty,
    };
    let closed_qty = u32::try_from(closed).map_err(|_| overflow())?;
    let remaining_qty = plan.total_qty.checked_sub(closed_qty).ok_or_else(overflow)?;

    let realized_pnl_usd = fills
        .iter()
        .try_fold(Decimal::ZERO, |sum, f| sum.checked_add(f.pnl_usd))
        .ok_or_else(|| arithmetic("realized PnL"))?;
    let unrealized_pnl_usd = plan
        .side
        .points(plan.avg_entry, plan.mark_price)
        .and_then(|points| points_to_usd(points, point_value, remaining_qty))
        .ok_or_else(|| arithmetic("unrealized PnL"))?;
    let total_pnl_usd = realized_pnl_usd
        .checked_add(unrealized_pnl_usd)
        .ok_or_else(|| arithmetic("total PnL"))?;

    let weighted_avg_exit = if closed_qty == 0 {
        None
    } else {
        let notional = fills
            .iter()
            .try_fold(Decimal::ZERO, |sum, f| {
                sum.checked_add(f.price.checked_mul(Decimal::from(f.qty))?)
            })
            .ok_or_else(|| arithmetic("exit notional"))?;
        notional.checked_div(Decimal::from(closed_qty))
    };

    Ok(Summary {
        symbol: plan.symbol.clone(),
        side: plan.side,
        avg_entry: plan.avg_entry,
        point_value,
        total_qty: plan.total_qty,
        closed_qty,
        remaining_qty,
        mark_price: plan.mark_price,
        grid_sort: plan.grid_sort,
        realized_pnl_usd,
        unrealized_pnl_usd,
        total_pnl_usd,
        weighted_avg_exit,
    })
}

fn arithmetic(what: &str) -> ScheduleError {
    ScheduleError::ArithmeticOverflow(what.to_string())
}

/// Price range and filled quantity of one ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRollup {
    pub grid_index: usize,
    pub grid_label: Option<String>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub total_qty: u32,
}

impl GridRollup {
    /// The ladder label, or `G<index>` when the fill carried none.
    #[must_use]
    pub fn display_label(&self) -> String {
        self.grid_label
            .clone()
            .unwrap_or_else(|| format!("G{}", self.grid_index))
    }
}

/// Groups grid fills by ladder in first-seen order. Lump fills are ignored.
#[must_use]
pub fn grid_rollups(fills: &[Fill]) -> Vec<GridRollup> {
    let mut rollups: Vec<GridRollup> = Vec::new();

    for fill in fills.iter().filter(|f| f.kind == FillKind::Grid) {
        let grid_index = fill.grid_index.unwrap_or_default();
        match rollups
            .iter_mut()
            .find(|r| r.grid_index == grid_index && r.grid_label == fill.grid_label)
        {
            Some(rollup) => {
                rollup.min_price = rollup.min_price.min(fill.price);
                rollup.max_price = rollup.max_price.max(fill.price);
                rollup.total_qty = rollup.total_qty.saturating_add(fill.qty);
            }
            None => rollups.push(GridRollup {
                grid_index,
                grid_label: fill.grid_label.clone(),
                min_price: fill.price,
                max_price: fill.price,
                total_qty: fill.qty,
            }),
        }
    }

    rollups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GridSort, Side};
    use rust_decimal_macros::dec;

    fn fill(kind: FillKind, price: Decimal, qty: u32, grid: Option<(usize, &str)>) -> Fill {
        let pnl_pts = price - dec!(100);
        Fill {
            kind,
            price,
            qty,
            pnl_pts,
            pnl_usd: pnl_pts * dec!(20) * Decimal::from(qty),
            grid_index: grid.map(|(i, _)| i),
            grid_label: grid.map(|(_, l)| l.to_string()),
        }
    }

    #[test]
    fn fully_closed_position() {
        let plan = PositionPlan::new("NQ", Side::Long, dec!(100), 10, dec!(108));
        let fills = vec![
            fill(FillKind::Lump, dec!(105), 6, None),
            fill(FillKind::Lump, dec!(108), 4, None),
        ];
        let summary = aggregate(&plan, dec!(20), &fills).unwrap();

        assert_eq!(summary.closed_qty, 10);
        assert_eq!(summary.remaining_qty, 0);
        assert_eq!(summary.realized_pnl_usd, dec!(1240));
        assert_eq!(summary.unrealized_pnl_usd, dec!(0));
        assert_eq!(summary.total_pnl_usd, dec!(1240));
        assert_eq!(summary.weighted_avg_exit, Some(dec!(106.2)));
        assert_eq!(summary.grid_sort, GridSort::ByPrice);
    }

    #[test]
    fn no_fills_values_everything_at_mark() {
        let plan = PositionPlan::new("NQ", Side::Long, dec!(100), 5, dec!(110));
        let summary = aggregate(&plan, dec!(20), &[]).unwrap();

        assert_eq!(summary.closed_qty, 0);
        assert_eq!(summary.remaining_qty, 5);
        assert_eq!(summary.realized_pnl_usd, dec!(0));
        assert_eq!(summary.unrealized_pnl_usd, dec!(1000));
        assert_eq!(summary.weighted_avg_exit, None);
    }

    #[test]
    fn short_remainder_loses_when_mark_rises() {
        let plan = PositionPlan::new("MNQ", Side::Short, dec!(100), 3, dec!(104));
        let summary = aggregate(&plan, dec!(2), &[]).unwrap();
        assert_eq!(summary.unrealized_pnl_usd, dec!(-24));
    }

    #[test]
    fn partial_close_splits_realized_and_unrealized() {
        let plan = PositionPlan::new("NQ", Side::Long, dec!(100), 4, dec!(103));
        let fills = vec![fill(FillKind::Grid, dec!(102), 1, Some((0, "G1")))];
        let summary = aggregate(&plan, dec!(20), &fills).unwrap();

        assert_eq!(summary.remaining_qty, 3);
        assert_eq!(summary.realized_pnl_usd, dec!(40));
        assert_eq!(summary.unrealized_pnl_usd, dec!(180));
        assert_eq!(summary.total_pnl_usd, dec!(220));
    }

    #[test]
    fn over_allocation_fails_fast() {
        let plan = PositionPlan::new("NQ", Side::Long, dec!(100), 2, dec!(110));
        let fills = vec![fill(FillKind::Lump, dec!(105), 3, None)];
        assert_eq!(
            aggregate(&plan, dec!(20), &fills),
            Err(ScheduleError::AllocationOverflow {
                closed: 3,
                total: 2
            })
        );
    }

    #[test]
    fn unrealized_overflow_is_an_error() {
        let plan = PositionPlan::new("NQ", Side::Long, Decimal::MIN, 1, Decimal::MAX);
        assert_eq!(
            aggregate(&plan, dec!(20), &[]),
            Err(ScheduleError::ArithmeticOverflow("unrealized PnL".to_string()))
        );
    }

    #[test]
    fn realized_sum_overflow_is_an_error() {
        let plan = PositionPlan::new("NQ", Side::Long, dec!(0), 2, dec!(0));
        let mut big = fill(FillKind::Lump, dec!(1), 1, None);
        big.pnl_usd = Decimal::MAX;
        let fills = vec![big.clone(), big];

        assert_eq!(
            aggregate(&plan, dec!(20), &fills),
            Err(ScheduleError::ArithmeticOverflow("realized PnL".to_string()))
        );
    }

    // ============================================
    // Grid Roll-ups
    // ============================================

    #[test]
    fn rollups_group_by_ladder_in_first_seen_order() {
        let fills = vec![
            fill(FillKind::Grid, dec!(104), 1, Some((1, "B"))),
            fill(FillKind::Lump, dec!(103), 5, None),
            fill(FillKind::Grid, dec!(102), 2, Some((0, "A"))),
            fill(FillKind::Grid, dec!(106), 1, Some((1, "B"))),
            fill(FillKind::Grid, dec!(101), 2, Some((0, "A"))),
        ];
        let rollups = grid_rollups(&fills);

        assert_eq!(rollups.len(), 2);
        assert_eq!(rollups[0].display_label(), "B");
        assert_eq!(
            (rollups[0].min_price, rollups[0].max_price, rollups[0].total_qty),
            (dec!(104), dec!(106), 2)
        );
        assert_eq!(
            (rollups[1].min_price, rollups[1].max_price, rollups[1].total_qty),
            (dec!(101), dec!(102), 4)
        );
    }

    #[test]
    fn unlabeled_ladder_falls_back_to_index() {
        let mut unlabeled = fill(FillKind::Grid, dec!(101), 1, Some((3, "")));
        unlabeled.grid_label = None;
        let rollups = grid_rollups(&[unlabeled]);
        assert_eq!(rollups[0].display_label(), "G3");
    }
}
