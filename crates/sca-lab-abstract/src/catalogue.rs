use crate::record::ExperimentLabels;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Declaration of one experiment label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub name: String,
    /// Numeric labels (`"150m"`, `"users_20"`) carry a number used for ordering results.
    #[serde(default)]
    pub numeric: bool,
}

impl LabelSpec {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            numeric: true,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            numeric: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub labels: ExperimentLabels,
    pub path: PathBuf,
}

/// Ordered list of runs to analyse: label tuple to trace file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentCatalogue {
    pub name: Option<String>,
    pub labels: Vec<LabelSpec>,
    pub entries: Vec<CatalogueEntry>,
}

impl ExperimentCatalogue {
    pub fn new(labels: Vec<LabelSpec>) -> Self {
        Self {
            name: None,
            labels,
            entries: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn push(&mut self, labels: ExperimentLabels, path: impl Into<PathBuf>) {
        self.entries.push(CatalogueEntry {
            labels,
            path: path.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogueEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
