//! `restock-engine`: sales aggregation and replenishment calculation.
//!
//! Pure engine crate: reads grids through [`TabularSource`], returns calculated
//! products. File formats live in `restock-io`, the command line in `restock-cli`.

pub mod aggregate;
pub mod calc;
pub mod calendar;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod rules;
pub mod source;

pub use calendar::{IsoWeekId, RolloverRule, WeekSpan};
pub use config::RestockConfig;
pub use error::RestockError;
pub use model::{
    AggregatedProduct, CalcOutcome, CalculatedProduct, Cell, Grid, ProcessingInfo, RunOutput,
    StockStatus, Transaction,
};
pub use pipeline::process_and_calculate;
pub use source::{MemorySource, TabularSource};
