use anyhow::{Context, Result};
use sca_lab_abstract::LabelSpec;

/// Parse a label assignment of the form `name=value`.
pub fn parse_label_pair(spec: &str) -> Result<(String, String)> {
    let (name, value) = spec
        .split_once('=')
        .context("Label should be provided as name=value")?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        anyhow::bail!("Label '{spec}' needs both a name and a value");
    }
    Ok((name.to_string(), value.to_string()))
}

/// Parse a label declaration: `distance:numeric` or plain `technology`.
pub fn parse_label_spec(spec: &str) -> Result<LabelSpec> {
    let (name, kind) = match spec.split_once(':') {
        Some((name, kind)) => (name.trim(), Some(kind.trim())),
        None => (spec.trim(), None),
    };
    if name.is_empty() {
        anyhow::bail!("Label declaration '{spec}' has no name");
    }
    match kind {
        None | Some("text") => Ok(LabelSpec::text(name)),
        Some("numeric") => Ok(LabelSpec::numeric(name)),
        Some(other) => anyhow::bail!("Unknown label kind '{other}'. Try 'numeric' or 'text'."),
    }
}

/// Parse a group comparison of the form `label=baseline,candidate`.
pub fn parse_comparison(spec: &str) -> Result<(String, String, String)> {
    let (label, groups) = parse_label_pair(spec)?;
    let (baseline, candidate) = groups
        .split_once(',')
        .context("Comparison should be provided as label=baseline,candidate")?;
    Ok((label, baseline.trim().to_string(), candidate.trim().to_string()))
}
