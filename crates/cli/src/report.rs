#![allow(clippy::format_push_string)]

use exit_plan_core::{grid_rollups, Fill, FillKind, GridRollup, Summary};
use rust_decimal::Decimal;
use serde::Serialize;

/// Machine-readable output of `schedule --json`.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub fills: Vec<Fill>,
    pub summary: Summary,
    pub grid_rollups: Vec<GridRollup>,
}

impl ScheduleReport {
    #[must_use]
    pub fn new(fills: Vec<Fill>, summary: Summary) -> Self {
        let grid_rollups = grid_rollups(&fills);
        Self {
            fills,
            summary,
            grid_rollups,
        }
    }
}

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn format(report: &ScheduleReport) -> String {
        let summary = &report.summary;
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                    EXIT SCHEDULE                              \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push('\n');

        // Position
        output.push_str("Position\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "Symbol:                {} ({} per point)\n",
            summary.symbol,
            usd(summary.point_value)
        ));
        output.push_str(&format!("Side:                  {}\n", summary.side));
        output.push_str(&format!("Avg Entry:             {}\n", summary.avg_entry));
        output.push_str(&format!("Mark:                  {}\n", summary.mark_price));
        output.push_str(&format!("Grid Order:            {}\n", summary.grid_sort));
        output.push('\n');

        // Exits
        output.push_str("Triggered Exits\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        let lumps: Vec<&Fill> = report
            .fills
            .iter()
            .filter(|f| f.kind == FillKind::Lump)
            .collect();
        if report.fills.is_empty() {
            output.push_str("No exits triggered at this mark.\n");
        } else if lumps.is_empty() {
            output.push_str("No lump exits triggered.\n");
        } else {
            output.push_str(&format!(
                "{:<6} {:>12} {:>6} {:>10} {:>14}\n",
                "Type", "Price", "Qty", "Points", "PnL"
            ));
            for fill in lumps {
                output.push_str(&format!(
                    "{:<6} {:>12} {:>6} {:>10} {:>14}\n",
                    "lump",
                    fill.price,
                    fill.qty,
                    fill.pnl_pts,
                    usd(fill.pnl_usd)
                ));
            }
        }
        output.push('\n');

        if !report.grid_rollups.is_empty() {
            output.push_str("Grid Ladders\n");
            output.push_str("───────────────────────────────────────────────────────────────\n");
            for rollup in &report.grid_rollups {
                output.push_str(&format!(
                    "{:<10} {} - {}  x{}\n",
                    rollup.display_label(),
                    rollup.min_price,
                    rollup.max_price,
                    rollup.total_qty
                ));
            }
            output.push('\n');
        }

        // Totals
        output.push_str("PnL\n");
        output.push_str("───────────────────────────────────────────────────────────────\n");
        output.push_str(&format!(
            "Closed / Remaining:    {} / {} of {}\n",
            summary.closed_qty, summary.remaining_qty, summary.total_qty
        ));
        if let Some(avg_exit) = summary.weighted_avg_exit {
            output.push_str(&format!("Avg Exit:              {:.2}\n", avg_exit));
        }
        output.push_str(&format!(
            "Realized:              {}\n",
            usd(summary.realized_pnl_usd)
        ));
        output.push_str(&format!(
            "Unrealized:            {}\n",
            usd(summary.unrealized_pnl_usd)
        ));
        output.push_str(&format!(
            "Total:                 {}\n",
            usd(summary.total_pnl_usd)
        ));
        output.push_str("═══════════════════════════════════════════════════════════════\n");

        output
    }
}

/// `$1,234.50` style amount with the sign in front of the dollar.
fn usd(amount: Decimal) -> String {
    let rounded = amount.abs().round_dp(2);
    let text = format!("{rounded:.2}");
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{frac}")
}
