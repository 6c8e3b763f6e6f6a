pub mod catalogue;
pub mod config;
pub mod record;
pub mod store;
pub mod value;

pub use catalogue::{CatalogueEntry, ExperimentCatalogue, LabelSpec};
pub use config::{AnalysisConfig, AnalysisConfigOverride, DEFAULT_SIMULATION_TIME_SECONDS};
pub use record::{ExperimentLabels, METRIC_FIELDS, MetricRecord};
pub use store::{RawRecordStore, STATISTICS_SCOPE, TOP_LEVEL_SCOPE};
pub use value::ScalarValue;
