//! On-disk plan description (TOML or JSON) and its conversion to a core plan.

use anyhow::{Context, Result};
use exit_plan_core::{
    EntryBasis, FixedExit, GridLadder, GridSort, PointValueResolver, PositionPlan, Side,
};
use figment::{
    providers::{Format, Json, Toml},
    Figment,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A position and its exit plan as written by the user.
///
/// ```toml
/// symbol = "NQ"
/// side = "long"
/// total_qty = 10
/// avg_entry = 20000          # or: current_price + open_pnl_usd
/// mark_price = 20080         # optional
/// grid_sort = "price"        # or "group_order"
///
/// [[lumps]]
/// price = 20050
/// qty = 4
///
/// [[grids]]
/// label = "G1"
/// start = 20060
/// end = 20100
/// step = 10
/// qty_per_level = 1
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFile {
    pub symbol: String,
    pub side: Side,
    pub total_qty: u32,
    #[serde(flatten)]
    pub entry: EntryBasis,
    #[serde(default)]
    pub mark_price: Option<Decimal>,
    #[serde(default)]
    pub grid_sort: GridSort,
    #[serde(default)]
    pub lumps: Vec<FixedExit>,
    #[serde(default)]
    pub grids: Vec<GridLadder>,
}

impl PlanFile {
    /// Reads a plan file; `.json` is parsed as JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        anyhow::ensure!(path.is_file(), "Plan file not found: {}", path.display());

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let figment = if is_json {
            Figment::from(Json::file(path))
        } else {
            Figment::from(Toml::file(path))
        };

        figment
            .extract()
            .with_context(|| format!("Failed to parse plan file: {}", path.display()))
    }

    /// Parses a TOML plan held in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid plan.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(Figment::from(Toml::string(text)).extract()?)
    }

    /// Resolves the entry basis and mark price into a core plan.
    ///
    /// The mark is taken from `mark_override`, then the file's `mark_price`,
    /// then the entry basis default.
    ///
    /// # Errors
    ///
    /// Returns `UnknownSymbol` if the symbol is unsupported, or an entry error
    /// when the average entry cannot be derived.
    pub fn to_plan<R: PointValueResolver>(
        &self,
        resolver: &R,
        mark_override: Option<Decimal>,
    ) -> exit_plan_core::Result<PositionPlan> {
        let point_value = resolver.point_value(&self.symbol)?;
        let avg_entry = self.entry.resolve(self.side, point_value, self.total_qty)?;
        let mark_price = self
            .mark_price
            .unwrap_or_else(|| self.entry.default_mark(avg_entry));

        let plan = PositionPlan {
            symbol: self.symbol.trim().to_string(),
            side: self.side,
            avg_entry,
            total_qty: self.total_qty,
            lumps: self.lumps.clone(),
            grids: self.grids.clone(),
            mark_price,
            grid_sort: self.grid_sort,
        };

        Ok(match mark_override {
            Some(mark) => plan.with_mark(mark),
            None => plan,
        })
    }
}
