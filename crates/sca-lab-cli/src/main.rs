use anyhow::{Context, Result, ensure};
use clap::{ArgGroup, Parser};
use regex::Regex;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sca_lab_abstract::{
    AnalysisConfig, AnalysisConfigOverride, ExperimentCatalogue, ExperimentLabels, LabelSpec,
};
use sca_lab_core::{BatchOutcome, ResultTable, run_all, run_all_concurrent};
use sca_lab_loader::spec::{parse_comparison, parse_label_pair, parse_label_spec};
use sca_lab_loader::{discover_catalogue, load_catalogue};
use sca_lab_report::{
    Comparison, SummaryOptions, write_batch_failures, write_csv, write_json, write_summary,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Derive throughput, delay and packet loss from simulator scalar traces"
)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["trace", "catalogue", "discover"])
))]
struct Args {
    /// Analyse a single trace file.
    #[arg(long)]
    trace: Option<PathBuf>,

    /// TOML catalogue listing labelled trace files.
    #[arg(long)]
    catalogue: Option<PathBuf>,

    /// Directory whose trace file names carry the labels (requires --pattern).
    #[arg(long, requires = "pattern")]
    discover: Option<PathBuf>,

    /// File name regex with one named capture group per --label-spec.
    #[arg(long, requires = "discover")]
    pattern: Option<String>,

    /// Label declaration for --discover, `name` or `name:numeric`.
    #[arg(long = "label-spec")]
    label_specs: Vec<String>,

    /// Label of the single run, `name=value`.
    #[arg(long = "label")]
    labels: Vec<String>,

    /// Simulated duration in seconds; overrides the catalogue value.
    #[arg(long)]
    sim_time: Option<f64>,

    /// Number of traces parsed concurrently.
    #[arg(long, default_value_t = 1)]
    jobs: usize,

    /// Split the statistics block by this label.
    #[arg(long)]
    group_by: Option<String>,

    /// Compare two groups, `label=baseline,candidate`.
    #[arg(long)]
    compare: Option<String>,

    /// Write the result table as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the result table as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();
    info!("sca-lab starting…");

    let (catalogue, mut config) = args.load_source()?;
    AnalysisConfigOverride {
        simulation_time_seconds: args.sim_time,
    }
    .apply_to(&mut config);
    ensure!(
        config.has_valid_time(),
        "Simulation time must be a positive number of seconds, got {}",
        config.simulation_time_seconds
    );
    let options = args.summary_options()?;

    info!(
        "Analysing {} trace(s) over {} s",
        catalogue.len(),
        config.simulation_time_seconds
    );
    let outcome = run_batch(&catalogue, &config, args.jobs)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.trace.is_none() || !outcome.failures.is_empty() {
        write_batch_failures(&outcome.failures, outcome.total, &mut out)?;
    }
    let table = outcome
        .into_table(&catalogue.labels)
        .context("Cannot build the result table")?;
    write_summary(&table, &options, &mut out)?;
    out.flush()?;

    if let Some(path) = &args.csv {
        export(path, &table, |t, w| write_csv(t, w))?;
    }
    if let Some(path) = &args.json {
        export(path, &table, |t, w| write_json(t, w))?;
    }

    Ok(())
}

impl Args {
    fn load_source(&self) -> Result<(ExperimentCatalogue, AnalysisConfig)> {
        if let Some(path) = &self.catalogue {
            return load_catalogue(path);
        }

        if let Some(dir) = &self.discover {
            let pattern = self.pattern.as_deref().context("--discover requires --pattern")?;
            let pattern = Regex::new(pattern)
                .with_context(|| format!("Invalid file name pattern '{pattern}'"))?;
            let specs = self
                .label_specs
                .iter()
                .map(|s| parse_label_spec(s))
                .collect::<Result<Vec<_>>>()?;
            let catalogue = discover_catalogue(dir, &pattern, specs)?;
            ensure!(
                !catalogue.is_empty(),
                "No trace file in {} matches '{}'",
                dir.display(),
                pattern
            );
            return Ok((catalogue, AnalysisConfig::default()));
        }

        let path = self
            .trace
            .as_ref()
            .context("One of --trace, --catalogue or --discover is required")?;
        let mut labels = ExperimentLabels::new();
        let mut specs = Vec::new();
        for pair in &self.labels {
            let (name, value) = parse_label_pair(pair)?;
            specs.push(LabelSpec::text(name.clone()));
            labels.set(name, value);
        }
        let mut catalogue = ExperimentCatalogue::new(specs);
        catalogue.push(labels, path.clone());
        Ok((catalogue, AnalysisConfig::default()))
    }

    fn summary_options(&self) -> Result<SummaryOptions> {
        let compare = self
            .compare
            .as_deref()
            .map(parse_comparison)
            .transpose()?
            .map(|(label, baseline, candidate)| Comparison {
                label,
                baseline,
                candidate,
            });
        Ok(SummaryOptions {
            group_by: self.group_by.clone(),
            compare,
        })
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_batch(
    catalogue: &ExperimentCatalogue,
    config: &AnalysisConfig,
    jobs: usize,
) -> Result<BatchOutcome> {
    if jobs <= 1 {
        return Ok(run_all(catalogue, config));
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the worker runtime")?;
    Ok(runtime.block_on(run_all_concurrent(catalogue, config, jobs)))
}

fn export<F, E>(path: &Path, table: &ResultTable, write: F) -> Result<()>
where
    F: FnOnce(&ResultTable, &mut BufWriter<File>) -> Result<(), E>,
    E: std::error::Error + Send + Sync + 'static,
{
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write(table, &mut writer).with_context(|| format!("Failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}
