use exit_plan_core::{
    FixedExit, GridLadder, GridSort, PositionPlan, ScheduleCalculator, Side,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn mixed_plan(side: Side, mark: Decimal, grid_sort: GridSort) -> PositionPlan {
    let (lumps, grids) = match side {
        Side::Long => (
            vec![
                FixedExit::new(dec!(20050), 2).unwrap(),
                FixedExit::new(dec!(20120), 3).unwrap(),
            ],
            vec![
                GridLadder::new("scalp", dec!(20010), dec!(20060), dec!(10), 1).unwrap(),
                GridLadder::new("runner", dec!(20100), dec!(20200), dec!(25), 2).unwrap(),
            ],
        ),
        Side::Short => (
            vec![
                FixedExit::new(dec!(19950), 2).unwrap(),
                FixedExit::new(dec!(19880), 3).unwrap(),
            ],
            vec![
                GridLadder::new("scalp", dec!(19940), dec!(19990), dec!(10), 1).unwrap(),
                GridLadder::new("runner", dec!(19800), dec!(19900), dec!(25), 2).unwrap(),
            ],
        ),
    };
    PositionPlan::new("NQ", side, dec!(20000), 12, mark)
        .with_lumps(lumps)
        .with_grids(grids)
        .with_grid_sort(grid_sort)
}

fn marks(from: Decimal, to: Decimal, step: Decimal) -> Vec<Decimal> {
    let mut out = Vec::new();
    let mut m = from;
    while m <= to {
        out.push(m);
        m += step;
    }
    out
}

#[test]
fn quantity_is_conserved_for_every_mark() {
    let calc = ScheduleCalculator::default();
    for side in [Side::Long, Side::Short] {
        for sort in [GridSort::ByPrice, GridSort::ByDefinitionOrder] {
            for mark in marks(dec!(19750), dec!(20250), dec!(5)) {
                let (fills, summary) = calc.compute(&mixed_plan(side, mark, sort)).unwrap();
                let filled: u32 = fills.iter().map(|f| f.qty).sum();

                assert!(filled <= summary.total_qty);
                assert_eq!(filled, summary.closed_qty);
                assert_eq!(summary.closed_qty + summary.remaining_qty, summary.total_qty);
                assert_eq!(
                    summary.total_pnl_usd,
                    summary.realized_pnl_usd + summary.unrealized_pnl_usd
                );
            }
        }
    }
}

#[test]
fn repeated_evaluation_is_identical() {
    let calc = ScheduleCalculator::default();
    let plan = mixed_plan(Side::Long, dec!(20130), GridSort::ByPrice);

    let first = calc.compute(&plan).unwrap();
    let second = calc.compute(&plan).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn rising_mark_never_closes_less_on_a_long() {
    let calc = ScheduleCalculator::default();
    for sort in [GridSort::ByPrice, GridSort::ByDefinitionOrder] {
        let mut previous = 0;
        for mark in marks(dec!(19990), dec!(20250), dec!(2.5)) {
            let (_, summary) = calc.compute(&mixed_plan(Side::Long, mark, sort)).unwrap();
            assert!(
                summary.closed_qty >= previous,
                "closed qty fell from {previous} to {} at mark {mark}",
                summary.closed_qty
            );
            previous = summary.closed_qty;
        }
        assert_eq!(previous, 12);
    }
}

#[test]
fn falling_mark_never_closes_less_on_a_short() {
    let calc = ScheduleCalculator::default();
    let mut previous = 0;
    for mark in marks(dec!(19750), dec!(20010), dec!(2.5)).into_iter().rev() {
        let (_, summary) = calc
            .compute(&mixed_plan(Side::Short, mark, GridSort::ByPrice))
            .unwrap();
        assert!(summary.closed_qty >= previous);
        previous = summary.closed_qty;
    }
}

#[test]
fn short_position_mirrors_long_pnl() {
    let calc = ScheduleCalculator::default();
    let (long_fills, long_summary) = calc
        .compute(&mixed_plan(Side::Long, dec!(20070), GridSort::ByPrice))
        .unwrap();
    let (short_fills, short_summary) = calc
        .compute(&mixed_plan(Side::Short, dec!(19930), GridSort::ByPrice))
        .unwrap();

    assert_eq!(long_fills.len(), short_fills.len());
    assert_eq!(long_summary.closed_qty, short_summary.closed_qty);
    assert_eq!(long_summary.realized_pnl_usd, short_summary.realized_pnl_usd);
    assert_eq!(long_summary.unrealized_pnl_usd, short_summary.unrealized_pnl_usd);
    assert!(short_fills.iter().all(|f| f.pnl_pts > Decimal::ZERO));
}
