//! Price-history and earnings-estimate provider port.

use crate::domain::earnings::EarningsRecord;
use crate::domain::error::PegtrackError;
use crate::domain::price::PricePoint;

pub trait DataPort {
    /// Daily history for `symbol`, ascending by date.
    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, PegtrackError>;

    /// Quarterly actuals and estimates for `symbol`, ascending by fiscal date.
    /// An instrument with no earnings source yields an empty list.
    fn fetch_earnings(&self, symbol: &str) -> Result<Vec<EarningsRecord>, PegtrackError>;
}
