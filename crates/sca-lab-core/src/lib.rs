pub mod error;
pub mod extractor;
pub mod runner;
pub mod stats;
pub mod table;

pub use error::TableError;
pub use extractor::compute_metrics;
pub use runner::{BatchOutcome, RunFailure, run_all, run_all_concurrent, run_entry};
pub use stats::Summary;
pub use table::{Direction, GroupSummary, ResultTable, TableRow, extract_number};
