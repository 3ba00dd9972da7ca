//! Export functionality for experiment results
//!
//! Learning curves go to CSV; configurations and summaries to JSON.

mod series_csv;

pub use series_csv::{SeriesCsvExporter, write_json};
