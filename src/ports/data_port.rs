//! Historical price data port trait.

use crate::domain::error::SimtraderError;
use crate::domain::selection::HistoricalTable;

pub trait DataPort {
    /// Load the full table: per-stock volatilities and the daily price rows.
    fn load_table(&self) -> Result<HistoricalTable, SimtraderError>;
}
