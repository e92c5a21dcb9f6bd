use rust_decimal::Decimal;

use crate::error::Result;

/// Maps an instrument symbol to the USD value of one price point per contract.
pub trait PointValueResolver {
    /// # Errors
    ///
    /// Returns `UnknownSymbol` when the symbol is not supported.
    fn point_value(&self, symbol: &str) -> Result<Decimal>;
}

impl<R: PointValueResolver + ?Sized> PointValueResolver for &R {
    fn point_value(&self, symbol: &str) -> Result<Decimal> {
        (**self).point_value(symbol)
    }
}
