use anyhow::{Context, Result, ensure};
use regex::Regex;
use sca_lab_abstract::{
    AnalysisConfig, AnalysisConfigOverride, ExperimentCatalogue, ExperimentLabels, LabelSpec,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension of the scalar result files picked up by discovery.
pub const TRACE_EXTENSION: &str = "sca";

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct CatalogueFile {
    name: Option<String>,
    simulation_time_seconds: Option<f64>,
    #[serde(default)]
    labels: Vec<LabelSpec>,
    #[serde(default)]
    entries: Vec<EntryFile>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct EntryFile {
    path: PathBuf,
    #[serde(default)]
    labels: BTreeMap<String, LabelValue>,
}

/// Label values may be written bare (`users = 10`) or quoted (`users = "users_10"`).
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum LabelValue {
    Integer(i64),
    Text(String),
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelValue::Integer(v) => write!(f, "{v}"),
            LabelValue::Text(v) => f.write_str(v),
        }
    }
}

/// Load a TOML catalogue. Relative trace paths resolve against the catalogue's directory.
pub fn load_catalogue(path: &Path) -> Result<(ExperimentCatalogue, AnalysisConfig)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalogue file {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let (catalogue, config) = parse_catalogue(&content, base_dir)
        .with_context(|| format!("Invalid catalogue file {}", path.display()))?;
    info!(
        "Loaded catalogue {} with {} entries",
        catalogue.name.as_deref().unwrap_or("<unnamed>"),
        catalogue.len()
    );
    Ok((catalogue, config))
}

pub fn parse_catalogue(
    content: &str,
    base_dir: &Path,
) -> Result<(ExperimentCatalogue, AnalysisConfig)> {
    let file: CatalogueFile = toml::from_str(content).context("Failed to parse catalogue")?;

    let mut config = AnalysisConfig::default();
    AnalysisConfigOverride {
        simulation_time_seconds: file.simulation_time_seconds,
    }
    .apply_to(&mut config);
    ensure!(
        config.has_valid_time(),
        "simulation_time_seconds must be a positive number, got {}",
        config.simulation_time_seconds
    );

    check_unique_labels(&file.labels)?;

    let mut catalogue = ExperimentCatalogue::new(file.labels);
    catalogue.name = file.name;

    for (idx, entry) in file.entries.into_iter().enumerate() {
        let labels = order_labels(&catalogue.labels, entry.labels)
            .with_context(|| format!("Entry #{} ({})", idx + 1, entry.path.display()))?;
        let path = if entry.path.is_relative() {
            base_dir.join(&entry.path)
        } else {
            entry.path
        };
        catalogue.push(labels, path);
    }

    Ok((catalogue, config))
}

fn check_unique_labels(specs: &[LabelSpec]) -> Result<()> {
    let mut seen = HashSet::new();
    for spec in specs {
        ensure!(!spec.name.is_empty(), "Label declarations need a name");
        ensure!(
            seen.insert(spec.name.as_str()),
            "Label '{}' is declared twice",
            spec.name
        );
    }
    Ok(())
}

/// Arrange an entry's labels in declaration order, rejecting missing or undeclared ones.
fn order_labels(
    specs: &[LabelSpec],
    mut values: BTreeMap<String, LabelValue>,
) -> Result<ExperimentLabels> {
    let mut labels = ExperimentLabels::new();
    for spec in specs {
        let value = values
            .remove(&spec.name)
            .with_context(|| format!("missing label '{}'", spec.name))?;
        labels.set(spec.name.clone(), value.to_string());
    }
    if let Some(extra) = values.keys().next() {
        anyhow::bail!("undeclared label '{extra}'");
    }
    Ok(labels)
}

/// Build a catalogue from the trace files in `dir` whose names match `pattern`.
///
/// Every declared label must be a named capture group of the pattern. Files are taken in
/// file-name order; files that do not match are skipped.
pub fn discover_catalogue(
    dir: &Path,
    pattern: &Regex,
    specs: Vec<LabelSpec>,
) -> Result<ExperimentCatalogue> {
    check_unique_labels(&specs)?;
    let groups: HashSet<&str> = pattern.capture_names().flatten().collect();
    for spec in &specs {
        ensure!(
            groups.contains(spec.name.as_str()),
            "Pattern has no capture group named '{}'",
            spec.name
        );
    }

    let mut files = Vec::new();
    for item in fs::read_dir(dir)
        .with_context(|| format!("Failed to list trace directory {}", dir.display()))?
    {
        let path = item?.path();
        if path.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(TRACE_EXTENSION)
        {
            files.push(path);
        }
    }
    files.sort();

    let mut catalogue = ExperimentCatalogue::new(specs);
    for path in files {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(captures) = pattern.captures(file_name) else {
            debug!("Skipping {}: name does not match pattern", file_name);
            continue;
        };

        let mut labels = ExperimentLabels::new();
        for spec in &catalogue.labels {
            if let Some(value) = captures.name(&spec.name) {
                labels.set(spec.name.clone(), value.as_str());
            }
        }
        if labels.len() != catalogue.labels.len() {
            debug!("Skipping {}: not every label was captured", file_name);
            continue;
        }
        catalogue.push(labels, path.clone());
    }

    info!(
        "Discovered {} trace files in {}",
        catalogue.len(),
        dir.display()
    );
    Ok(catalogue)
}
