pub mod nse;
pub mod series;
pub mod table;
pub mod yahoo;

// Re-export the core bar types for convenient access (e.g. `use crate::market_data::Bar`).
pub use series::{Bar, PriceSeries};
