//! Lists the point values the calculator will use.

use anyhow::Result;
use exit_plan_core::{AppConfig, PointValueTable};

/// Prints every configured symbol with its USD value per point.
///
/// # Errors
///
/// Returns an error if a configured point value is not positive.
pub fn run_instruments(config: &AppConfig) -> Result<()> {
    let table = PointValueTable::from_config(config)?;

    println!("{:<8} {:>12}", "Symbol", "USD / point");
    println!("─────────────────────");
    for (symbol, value) in table.iter() {
        println!("{symbol:<8} {value:>12}");
    }
    println!();
    println!(
        "Max rungs per ladder: {}",
        config.limits.max_rungs_per_ladder
    );

    Ok(())
}
