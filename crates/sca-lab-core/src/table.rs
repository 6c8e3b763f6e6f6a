use crate::error::TableError;
use crate::stats::Summary;
use lazy_static::lazy_static;
use regex::Regex;
use sca_lab_abstract::{LabelSpec, METRIC_FIELDS, MetricRecord, ScalarValue};
use serde::Serialize;

lazy_static! {
    static ref DIGITS: Regex = Regex::new(r"[0-9]+").expect("digit pattern is valid");
}

/// Suffix of the columns holding the number extracted from a numeric label.
pub const NUMERIC_SUFFIX: &str = "_numeric";

/// First run of ASCII digits in a label value: `"90m"` is 90, `"users_20"` is 20.
/// Runs too long for a `u64` saturate at `u64::MAX`.
pub fn extract_number(value: &str) -> Option<u64> {
    DIGITS
        .find(value)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
}

/// Which way a metric improves, for group comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Label value of the group, `None` for the whole table.
    pub group: Option<String>,
    pub summary: Summary,
}

/// One exported row: `(column, value)` pairs in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TableRow {
    pub cells: Vec<(String, ScalarValue)>,
}

impl TableRow {
    pub fn get(&self, column: &str) -> Option<&ScalarValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone)]
struct Row {
    record: MetricRecord,
    /// Extracted numbers of the numeric labels, in declaration order.
    keys: Vec<u64>,
}

/// Per-run metric records of one batch, ordered by their numeric labels.
#[derive(Debug, Clone)]
pub struct ResultTable {
    specs: Vec<LabelSpec>,
    rows: Vec<Row>,
}

impl ResultTable {
    /// Order records ascending by their numeric labels (in declaration order), breaking ties
    /// on the remaining labels. The incoming order only matters for fully equal keys.
    pub fn build(records: Vec<MetricRecord>, specs: &[LabelSpec]) -> Result<Self, TableError> {
        if records.is_empty() {
            return Err(TableError::EmptyBatch);
        }

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let mut keys = Vec::new();
            for spec in specs.iter().filter(|s| s.numeric) {
                let value = record.labels.get(&spec.name).ok_or_else(|| {
                    TableError::MissingLabel {
                        label: spec.name.clone(),
                        run: record.labels.to_string(),
                    }
                })?;
                let key = extract_number(value).ok_or_else(|| TableError::LabelFormat {
                    label: spec.name.clone(),
                    value: value.to_string(),
                })?;
                keys.push(key);
            }
            rows.push(Row { record, keys });
        }

        let text_labels: Vec<&str> = specs
            .iter()
            .filter(|s| !s.numeric)
            .map(|s| s.name.as_str())
            .collect();
        rows.sort_by(|a, b| {
            a.keys.cmp(&b.keys).then_with(|| {
                text_labels
                    .iter()
                    .map(|name| a.record.labels.get(name).cmp(&b.record.labels.get(name)))
                    .find(|ord| ord.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        Ok(Self {
            specs: specs.to_vec(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn label_specs(&self) -> &[LabelSpec] {
        &self.specs
    }

    pub fn records(&self) -> impl Iterator<Item = &MetricRecord> {
        self.rows.iter().map(|row| &row.record)
    }

    /// Column names of [`Self::to_ordered_rows`], in order.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.specs.iter().map(|s| s.name.clone()).collect();
        names.extend(
            self.specs
                .iter()
                .filter(|s| s.numeric)
                .map(|s| format!("{}{}", s.name, NUMERIC_SUFFIX)),
        );
        names.extend(METRIC_FIELDS.iter().map(|f| f.to_string()));
        names
    }

    /// Every numeric value of a column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        if METRIC_FIELDS.contains(&name) {
            return Some(
                self.rows
                    .iter()
                    .filter_map(|row| row.record.metric(name))
                    .collect(),
            );
        }
        let label = name.strip_suffix(NUMERIC_SUFFIX)?;
        let position = self
            .specs
            .iter()
            .filter(|s| s.numeric)
            .position(|s| s.name == label)?;
        Some(self.rows.iter().map(|row| row.keys[position] as f64).collect())
    }

    /// Distinct values of a label in row order.
    pub fn distinct_values(&self, label: &str) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for row in &self.rows {
            if let Some(value) = row.record.labels.get(label)
                && !values.iter().any(|v| v == value)
            {
                values.push(value.to_string());
            }
        }
        values
    }

    /// Mean, extremes and sample standard deviation of a column, over the whole table or per
    /// value of `group_by` (groups in first-seen row order).
    pub fn summary_statistics(
        &self,
        column: &str,
        group_by: Option<&str>,
    ) -> Result<Vec<GroupSummary>, TableError> {
        if self.column(column).is_none() {
            return Err(TableError::UnknownColumn(column.to_string()));
        }

        let Some(label) = group_by else {
            let values = self.column_values(column, |_| true);
            return Ok(Summary::from_values(&values)
                .map(|summary| GroupSummary {
                    group: None,
                    summary,
                })
                .into_iter()
                .collect());
        };
        self.check_label(label)?;

        Ok(self
            .distinct_values(label)
            .into_iter()
            .filter_map(|group| {
                let values = self.column_values(column, |row| {
                    row.record.labels.get(label) == Some(group.as_str())
                });
                Summary::from_values(&values).map(|summary| GroupSummary {
                    group: Some(group),
                    summary,
                })
            })
            .collect())
    }

    /// Mean of a column over the rows whose `label` equals `value`.
    pub fn group_mean(&self, column: &str, label: &str, value: &str) -> Option<f64> {
        let values =
            self.column_values(column, |row| row.record.labels.get(label) == Some(value));
        Summary::from_values(&values).map(|s| s.mean)
    }

    /// Relative improvement in percent of the `candidate` group mean over the `baseline`
    /// group mean. `None` when either group is empty or the baseline mean is zero.
    pub fn compare_groups(
        &self,
        column: &str,
        label: &str,
        baseline: &str,
        candidate: &str,
        direction: Direction,
    ) -> Result<Option<f64>, TableError> {
        if self.column(column).is_none() {
            return Err(TableError::UnknownColumn(column.to_string()));
        }
        self.check_label(label)?;

        let (Some(base), Some(cand)) = (
            self.group_mean(column, label, baseline),
            self.group_mean(column, label, candidate),
        ) else {
            return Ok(None);
        };
        if base == 0.0 {
            return Ok(None);
        }
        let change = match direction {
            Direction::HigherIsBetter => cand - base,
            Direction::LowerIsBetter => base - cand,
        };
        Ok(Some(change / base * 100.0))
    }

    /// Rows for reporters: labels, then numeric label keys, then every metric field.
    pub fn to_ordered_rows(&self) -> Vec<TableRow> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(self.specs.len() * 2 + METRIC_FIELDS.len());
                for spec in &self.specs {
                    let value = row.record.labels.get(&spec.name).unwrap_or_default();
                    cells.push((spec.name.clone(), ScalarValue::Text(value.to_string())));
                }
                for (spec, key) in self.specs.iter().filter(|s| s.numeric).zip(&row.keys) {
                    cells.push((
                        format!("{}{}", spec.name, NUMERIC_SUFFIX),
                        ScalarValue::Integer(i64::try_from(*key).unwrap_or(i64::MAX)),
                    ));
                }
                cells.push((
                    "tx_packets".to_string(),
                    ScalarValue::Integer(row.record.tx_packets),
                ));
                cells.push((
                    "rx_packets".to_string(),
                    ScalarValue::Integer(row.record.rx_packets),
                ));
                for field in METRIC_FIELDS.iter().skip(2) {
                    if let Some(value) = row.record.metric(field) {
                        cells.push((field.to_string(), ScalarValue::Float(value)));
                    }
                }
                TableRow { cells }
            })
            .collect()
    }

    fn column_values(&self, column: &str, keep: impl Fn(&Row) -> bool) -> Vec<f64> {
        let all = self.column(column).unwrap_or_default();
        self.rows
            .iter()
            .zip(all)
            .filter(|(row, _)| keep(row))
            .map(|(_, value)| value)
            .collect()
    }

    fn check_label(&self, label: &str) -> Result<(), TableError> {
        if self.specs.iter().any(|s| s.name == label) {
            Ok(())
        } else {
            Err(TableError::UnknownLabel(label.to_string()))
        }
    }
}
