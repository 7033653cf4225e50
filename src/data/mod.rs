//! Price data: aligned tables and the source contract.

pub mod align;
pub mod prices;
pub mod source;

pub use align::{align, FillPolicy};
pub use prices::{NormalizedPriceTable, PriceTable};
pub use source::{load_prices, InMemoryPriceSource, PriceRequest, PriceSource};
