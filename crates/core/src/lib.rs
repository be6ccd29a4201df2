pub mod category;
pub mod money;
pub mod month;

pub use category::{Category, CoverageStatus, Direction, StatutoryType, VolatilityLevel};
pub use money::Money;
pub use month::{DateRange, Month};
