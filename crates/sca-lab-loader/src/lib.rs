pub mod catalogue;
pub mod spec;
pub mod trace;

pub use catalogue::{discover_catalogue, load_catalogue, parse_catalogue};
pub use trace::{TraceError, TraceLine, parse_file, parse_line, parse_reader};
