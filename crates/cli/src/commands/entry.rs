//! Derives the average entry of an open position from its live PnL.

use anyhow::{anyhow, Result};
use clap::Args;
use exit_plan_core::{AppConfig, EntryBasis, PointValueResolver, PointValueTable, Side};
use rust_decimal::Decimal;

/// Arguments for the entry command.
#[derive(Args, Debug, Clone)]
pub struct EntryArgs {
    /// Instrument symbol (e.g. NQ, MNQ)
    #[arg(long)]
    pub symbol: String,

    /// Position side: long or short
    #[arg(long, value_parser = parse_side)]
    pub side: Side,

    /// Open contracts
    #[arg(long)]
    pub qty: u32,

    /// Current market price
    #[arg(long)]
    pub current_price: Decimal,

    /// Open PnL in USD as shown by the broker (negative when losing)
    #[arg(long, allow_hyphen_values = true)]
    pub open_pnl: Decimal,
}

/// Parses `long`/`short` (also `buy`/`sell`), case-insensitively.
///
/// # Errors
///
/// Returns an error for any other value.
pub fn parse_side(s: &str) -> Result<Side> {
    match s.trim().to_lowercase().as_str() {
        "long" | "buy" => Ok(Side::Long),
        "short" | "sell" => Ok(Side::Short),
        _ => Err(anyhow!("Invalid side: '{}'. Valid values: long, short", s)),
    }
}

/// Prints the average entry implied by the current price and open PnL.
///
/// # Errors
///
/// Returns an error for an unknown symbol or a zero quantity.
pub fn run_entry(args: &EntryArgs, config: &AppConfig) -> Result<()> {
    let table = PointValueTable::from_config(config)?;
    let point_value = table.point_value(&args.symbol)?;
    let avg_entry = derive_entry(args, point_value)?;

    println!("Symbol:        {}", args.symbol.trim().to_uppercase());
    println!("Side:          {}", args.side);
    println!("Qty:           {}", args.qty);
    println!("Point Value:   {point_value}");
    println!("Current Price: {}", args.current_price);
    println!("Open PnL:      {}", args.open_pnl);
    println!("Avg Entry:     {avg_entry}");

    Ok(())
}

fn derive_entry(args: &EntryArgs, point_value: Decimal) -> exit_plan_core::Result<Decimal> {
    EntryBasis::FromOpenPnl {
        current_price: args.current_price,
        open_pnl_usd: args.open_pnl,
    }
    .resolve(args.side, point_value, args.qty)
}
