pub mod error;
pub mod export;
pub mod summary;

pub use error::ReportError;
pub use export::{write_csv, write_json};
pub use summary::{Comparison, SummaryOptions, write_batch_failures, write_summary};

#[cfg(test)]
pub(crate) mod fixtures {
    use sca_lab_abstract::{ExperimentLabels, LabelSpec, RawRecordStore, ScalarValue};
    use sca_lab_core::{ResultTable, compute_metrics};

    fn store(tx: i64, rx: i64, delay_ns: i64) -> RawRecordStore {
        let mut store = RawRecordStore::new();
        store.insert("node[0]", "sender-tx-packets", ScalarValue::Integer(tx));
        store.insert("node[1]", "receiver-rx-packets", ScalarValue::Integer(rx));
        store.insert(".", "delay-average", ScalarValue::Integer(delay_ns));
        store
    }

    /// Two technologies at two distances, handed over out of order.
    pub fn technology_table() -> ResultTable {
        let runs = [
            ("20m", "wifi", 1000, 900, 4_000_000),
            ("0m", "wifi", 1000, 1000, 2_000_000),
            ("0m", "lte", 1000, 950, 3_000_000),
            ("20m", "lte", 1000, 800, 5_000_000),
        ];
        let records = runs
            .into_iter()
            .map(|(distance, technology, tx, rx, delay)| {
                let labels = ExperimentLabels::new()
                    .with("distance", distance)
                    .with("technology", technology);
                compute_metrics(&store(tx, rx, delay), labels, 20.0)
            })
            .collect();
        ResultTable::build(
            records,
            &[LabelSpec::numeric("distance"), LabelSpec::text("technology")],
        )
        .unwrap()
    }
}
