// File I/O: sales and rules tables in, reports out

pub mod export;
pub mod tabular;

pub use export::{export_csv, export_xlsx, ExportRequest};
pub use tabular::TabularFile;
