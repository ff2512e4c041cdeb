//! Portfolio-definition provider port.

use crate::domain::error::PegtrackError;
use crate::domain::portfolio::AllocationEntry;

pub trait PortfolioPort {
    fn portfolio_name(&self) -> Option<String>;

    /// Target allocations, in the order they were declared.
    fn allocations(&self) -> Result<Vec<AllocationEntry>, PegtrackError>;
}
