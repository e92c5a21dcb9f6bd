//! Plan inputs and schedule outputs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Direction of the open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Points gained by closing at `price` against an `avg_entry` cost basis,
    /// or `None` when the difference leaves the `Decimal` range.
    #[must_use]
    pub fn points(self, avg_entry: Decimal, price: Decimal) -> Option<Decimal> {
        match self {
            Self::Long => price.checked_sub(avg_entry),
            Self::Short => avg_entry.checked_sub(price),
        }
    }

    /// An exit at `price` has triggered once the mark reaches or passes it.
    #[must_use]
    pub fn is_triggered(self, mark_price: Decimal, price: Decimal) -> bool {
        match self {
            Self::Long => mark_price >= price,
            Self::Short => mark_price <= price,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// Allocation order among triggered exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridSort {
    /// Closest-to-entry price first; ties keep declaration order.
    #[default]
    #[serde(alias = "price")]
    ByPrice,
    /// All lumps in declaration order, then every ladder rung by ladder.
    #[serde(alias = "group_order")]
    ByDefinitionOrder,
}

impl std::fmt::Display for GridSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByPrice => write!(f, "by_price"),
            Self::ByDefinitionOrder => write!(f, "by_definition_order"),
        }
    }
}

/// A single predetermined exit price closing a fixed quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedExit {
    pub price: Decimal,
    pub qty: u32,
}

impl FixedExit {
    /// Builds a validated fixed exit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidExit` if the price is not positive or the quantity is zero.
    pub fn new(price: Decimal, qty: u32) -> Result<Self> {
        let exit = Self { price, qty };
        exit.validate()?;
        Ok(exit)
    }

    /// # Errors
    ///
    /// Returns `InvalidExit` if the price is not positive or the quantity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.price <= Decimal::ZERO {
            return Err(ScheduleError::InvalidExit(format!(
                "price must be positive, got {}",
                self.price
            )));
        }
        if self.qty == 0 {
            return Err(ScheduleError::InvalidExit(format!(
                "qty must be positive at price {}",
                self.price
            )));
        }
        Ok(())
    }
}

/// Evenly spaced exit levels from `start` up to `end`, `qty_per_level` each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLadder {
    pub label: String,
    pub start: Decimal,
    pub end: Decimal,
    pub step: Decimal,
    pub qty_per_level: u32,
}

impl GridLadder {
    /// Builds a validated ladder.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLadder` if `step` is not positive or `qty_per_level` is zero.
    pub fn new(
        label: impl Into<String>,
        start: Decimal,
        end: Decimal,
        step: Decimal,
        qty_per_level: u32,
    ) -> Result<Self> {
        let ladder = Self {
            label: label.into(),
            start,
            end,
            step,
            qty_per_level,
        };
        ladder.validate()?;
        Ok(ladder)
    }

    /// # Errors
    ///
    /// Returns `InvalidLadder` if `step` is not positive or `qty_per_level` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.step <= Decimal::ZERO {
            return Err(ScheduleError::InvalidLadder {
                label: self.label.clone(),
                reason: format!("step must be positive, got {}", self.step),
            });
        }
        if self.qty_per_level == 0 {
            return Err(ScheduleError::InvalidLadder {
                label: self.label.clone(),
                reason: "qty_per_level must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Everything needed to price one staged exit schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionPlan {
    pub symbol: String,
    pub side: Side,
    pub avg_entry: Decimal,
    pub total_qty: u32,
    #[serde(default)]
    pub lumps: Vec<FixedExit>,
    #[serde(default)]
    pub grids: Vec<GridLadder>,
    pub mark_price: Decimal,
    #[serde(default)]
    pub grid_sort: GridSort,
}

impl PositionPlan {
    /// Starts a plan with no exits and price-ordered allocation.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        avg_entry: Decimal,
        total_qty: u32,
        mark_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            avg_entry,
            total_qty,
            lumps: Vec::new(),
            grids: Vec::new(),
            mark_price,
            grid_sort: GridSort::default(),
        }
    }

    #[must_use]
    pub fn with_lumps(mut self, lumps: Vec<FixedExit>) -> Self {
        self.lumps = lumps;
        self
    }

    #[must_use]
    pub fn with_grids(mut self, grids: Vec<GridLadder>) -> Self {
        self.grids = grids;
        self
    }

    #[must_use]
    pub fn with_grid_sort(mut self, grid_sort: GridSort) -> Self {
        self.grid_sort = grid_sort;
        self
    }

    /// Same plan re-marked at a different target price.
    #[must_use]
    pub fn with_mark(&self, mark_price: Decimal) -> Self {
        Self {
            mark_price,
            ..self.clone()
        }
    }

    /// Checks the position and every exit.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPosition` for a zero-quantity position, `InvalidExit` or
    /// `InvalidLadder` for the first malformed exit.
    pub fn validate(&self) -> Result<()> {
        if self.total_qty == 0 {
            return Err(ScheduleError::InvalidPosition(
                "total_qty must be positive".to_string(),
            ));
        }
        for (i, lump) in self.lumps.iter().enumerate() {
            lump.validate().map_err(|e| match e {
                ScheduleError::InvalidExit(reason) => {
                    ScheduleError::InvalidExit(format!("lump #{}: {reason}", i + 1))
                }
                other => other,
            })?;
        }
        for grid in &self.grids {
            grid.validate()?;
        }
        Ok(())
    }
}

/// One discrete level expanded from a [`GridLadder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rung {
    pub price: Decimal,
    pub qty: u32,
    /// Position of the source ladder in the plan.
    pub grid_index: usize,
    pub grid_label: String,
    /// Position of this rung within its ladder.
    pub level: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillKind {
    Lump,
    Grid,
}

/// Quantity closed at one exit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    #[serde(rename = "type")]
    pub kind: FillKind,
    pub price: Decimal,
    /// Allocated quantity; may be less than the exit's nominal quantity.
    pub qty: u32,
    pub pnl_pts: Decimal,
    pub pnl_usd: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_label: Option<String>,
}

/// Aggregate result of one schedule evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub symbol: String,
    pub side: Side,
    pub avg_entry: Decimal,
    pub point_value: Decimal,
    pub total_qty: u32,
    pub closed_qty: u32,
    pub remaining_qty: u32,
    pub mark_price: Decimal,
    pub grid_sort: GridSort,
    pub realized_pnl_usd: Decimal,
    pub unrealized_pnl_usd: Decimal,
    pub total_pnl_usd: Decimal,
    /// `None` when nothing was closed.
    pub weighted_avg_exit: Option<Decimal>,
}
