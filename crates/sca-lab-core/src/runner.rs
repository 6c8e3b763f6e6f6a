use crate::error::TableError;
use crate::extractor::compute_metrics;
use crate::table::ResultTable;
use sca_lab_abstract::{
    AnalysisConfig, CatalogueEntry, ExperimentCatalogue, ExperimentLabels, LabelSpec,
    MetricRecord,
};
use sca_lab_loader::{TraceError, parse_file};
use serde::Serialize;
use std::path::PathBuf;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// A catalogue entry that produced no record.
#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    pub labels: ExperimentLabels,
    pub path: PathBuf,
    pub reason: String,
}

impl RunFailure {
    fn new(entry: &CatalogueEntry, reason: impl ToString) -> Self {
        Self {
            labels: entry.labels.clone(),
            path: entry.path.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Result of running a whole catalogue: successful records in catalogue order plus failures.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub records: Vec<MetricRecord>,
    pub failures: Vec<RunFailure>,
    pub total: usize,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    /// Tabulate the successful runs. Fails with [`TableError::EmptyBatch`] if there are none.
    pub fn into_table(self, specs: &[LabelSpec]) -> Result<ResultTable, TableError> {
        ResultTable::build(self.records, specs)
    }
}

/// Parse one entry's trace and derive its metrics.
pub fn run_entry(
    entry: &CatalogueEntry,
    simulation_time_seconds: f64,
) -> Result<MetricRecord, TraceError> {
    let store = parse_file(&entry.path)?;
    Ok(compute_metrics(
        &store,
        entry.labels.clone(),
        simulation_time_seconds,
    ))
}

/// Process every entry in catalogue order. A failing entry is recorded and skipped.
pub fn run_all(catalogue: &ExperimentCatalogue, config: &AnalysisConfig) -> BatchOutcome {
    let total = catalogue.len();
    let mut outcome = BatchOutcome {
        total,
        ..Default::default()
    };

    for (idx, entry) in catalogue.iter().enumerate() {
        info!("[{}/{}] {}", idx + 1, total, entry.labels);
        match run_entry(entry, config.simulation_time_seconds) {
            Ok(record) => {
                log_record(&record);
                outcome.records.push(record);
            }
            Err(err) => {
                warn!("Failed to process {}: {}", entry.labels, err);
                outcome.failures.push(RunFailure::new(entry, err));
            }
        }
    }

    log_outcome(&outcome);
    outcome
}

/// Same contract as [`run_all`], with up to `jobs` traces parsed at once on the blocking
/// pool. Results come back in catalogue order whatever order the workers finish in.
pub async fn run_all_concurrent(
    catalogue: &ExperimentCatalogue,
    config: &AnalysisConfig,
    jobs: usize,
) -> BatchOutcome {
    let total = catalogue.len();
    let jobs = jobs.max(1);
    let simulation_time = config.simulation_time_seconds;

    let mut slots: Vec<Option<Result<MetricRecord, String>>> = (0..total).map(|_| None).collect();
    let mut pending = catalogue.entries.iter().cloned().enumerate();
    let mut workers = JoinSet::new();
    let mut done = 0usize;

    loop {
        while workers.len() < jobs {
            let Some((idx, entry)) = pending.next() else {
                break;
            };
            workers.spawn(async move {
                let labels = entry.labels.clone();
                let result =
                    match tokio::task::spawn_blocking(move || run_entry(&entry, simulation_time))
                        .await
                    {
                        Ok(result) => result.map_err(|err| err.to_string()),
                        Err(err) => Err(format!("worker failed: {err}")),
                    };
                (idx, labels, result)
            });
        }

        let Some(joined) = workers.join_next().await else {
            break;
        };
        match joined {
            Ok((idx, labels, result)) => {
                done += 1;
                info!("[{}/{}] {}", done, total, labels);
                if let Some(slot) = slots.get_mut(idx) {
                    *slot = Some(result);
                }
            }
            Err(err) => warn!("Worker task did not complete: {}", err),
        }
    }

    let mut outcome = BatchOutcome {
        total,
        ..Default::default()
    };
    for (entry, slot) in catalogue.iter().zip(slots) {
        match slot {
            Some(Ok(record)) => {
                log_record(&record);
                outcome.records.push(record);
            }
            Some(Err(reason)) => {
                warn!("Failed to process {}: {}", entry.labels, reason);
                outcome.failures.push(RunFailure::new(entry, reason));
            }
            None => outcome
                .failures
                .push(RunFailure::new(entry, "worker did not report a result")),
        }
    }

    log_outcome(&outcome);
    outcome
}

fn log_record(record: &MetricRecord) {
    info!(
        "{}: throughput {:.2} Kbps, delay {:.2} ms, PLR {:.4}",
        record.labels, record.avg_throughput_kbps, record.avg_delay_ms, record.packet_loss_ratio
    );
}

fn log_outcome(outcome: &BatchOutcome) {
    info!(
        "{} of {} catalogue entries succeeded",
        outcome.succeeded(),
        outcome.total
    );
}
