use crate::error::ReportError;
use sca_lab_core::{Direction, GroupSummary, ResultTable, RunFailure};
use std::io::Write;

/// Metrics shown in the statistics and comparison blocks.
const SUMMARY_METRICS: [(&str, &str, Direction); 3] = [
    ("avg_throughput_kbps", "Throughput (Kbps)", Direction::HigherIsBetter),
    ("avg_delay_ms", "Delay (ms)", Direction::LowerIsBetter),
    ("packet_loss_percentage", "PLR (%)", Direction::LowerIsBetter),
];

const RULE_WIDTH: usize = 78;

/// Two values of one label to compare, e.g. `technology=wifi,lte`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub label: String,
    pub baseline: String,
    pub candidate: String,
}

#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    /// Label whose values split the statistics block into groups.
    pub group_by: Option<String>,
    pub compare: Option<Comparison>,
}

/// Human-readable report: batch header, per-run details, statistics and an optional
/// group comparison.
pub fn write_summary<W: Write>(
    table: &ResultTable,
    options: &SummaryOptions,
    mut out: W,
) -> Result<(), ReportError> {
    let simulation_time = table
        .records()
        .next()
        .map(|r| r.simulation_time_seconds)
        .unwrap_or_default();

    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "Simulation time: {simulation_time} s")?;
    writeln!(out, "Scenarios: {}", table.len())?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    writeln!(
        out,
        "{:<32} {:>12} {:>10} {:>8} {:>6} {:>6}",
        "Scenario", "Thr (Kbps)", "Delay (ms)", "PLR (%)", "Tx", "Rx"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for record in table.records() {
        writeln!(
            out,
            "{:<32} {:>12.2} {:>10.3} {:>8.2} {:>6} {:>6}",
            record.labels.to_string(),
            record.avg_throughput_kbps,
            record.avg_delay_ms,
            record.packet_loss_percentage,
            record.tx_packets,
            record.rx_packets
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Statistics")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for (column, title, _) in SUMMARY_METRICS {
        let groups = table.summary_statistics(column, options.group_by.as_deref())?;
        writeln!(out, "{title}")?;
        for group in &groups {
            write_group(&mut out, group)?;
        }
    }

    if let Some(comparison) = &options.compare {
        writeln!(out)?;
        writeln!(
            out,
            "Improvement of {label}={cand} over {label}={base}",
            label = comparison.label,
            cand = comparison.candidate,
            base = comparison.baseline
        )?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        for (column, title, direction) in SUMMARY_METRICS {
            let change = table.compare_groups(
                column,
                &comparison.label,
                &comparison.baseline,
                &comparison.candidate,
                direction,
            )?;
            match change {
                Some(percent) => writeln!(out, "  {title:<20} {percent:+.2}%")?,
                None => writeln!(out, "  {title:<20} n/a")?,
            }
        }
    }

    Ok(())
}

fn write_group<W: Write>(out: &mut W, group: &GroupSummary) -> Result<(), ReportError> {
    let name = group.group.as_deref().unwrap_or("all");
    let s = &group.summary;
    writeln!(
        out,
        "  {:<16} n={:<4} mean={:.3} max={:.3} min={:.3} stddev={:.3}",
        name, s.count, s.mean, s.max, s.min, s.stddev
    )?;
    Ok(())
}

/// "N of M entries succeeded" followed by the entries that did not.
pub fn write_batch_failures<W: Write>(
    failures: &[RunFailure],
    total: usize,
    mut out: W,
) -> Result<(), ReportError> {
    let succeeded = total.saturating_sub(failures.len());
    writeln!(out, "{succeeded} of {total} entries succeeded")?;
    for failure in failures {
        writeln!(
            out,
            "  failed: {} ({}): {}",
            failure.labels,
            failure.path.display(),
            failure.reason
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::technology_table;
    use sca_lab_abstract::ExperimentLabels;
    use sca_lab_core::TableError;
    use std::path::PathBuf;

    fn render(options: &SummaryOptions) -> String {
        let mut buf = Vec::new();
        write_summary(&technology_table(), options, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn summary_lists_runs_in_table_order() {
        let text = render(&SummaryOptions::default());
        assert!(text.contains("Simulation time: 20 s"));
        assert!(text.contains("Scenarios: 4"));

        let first = text.find("distance=0m, technology=lte").unwrap();
        let last = text.find("distance=20m, technology=wifi").unwrap();
        assert!(first < last);
        assert_eq!(text.matches("  all ").count(), 3);
    }

    #[test]
    fn grouped_summary_has_one_line_per_group() {
        let text = render(&SummaryOptions {
            group_by: Some("technology".to_string()),
            compare: None,
        });
        assert_eq!(text.matches("  lte ").count(), 3);
        assert_eq!(text.matches("  wifi ").count(), 3);
        assert!(!text.contains("Improvement"));
    }

    #[test]
    fn comparison_block_reports_signed_percentages() {
        let text = render(&SummaryOptions {
            group_by: None,
            compare: Some(Comparison {
                label: "technology".to_string(),
                baseline: "lte".to_string(),
                candidate: "wifi".to_string(),
            }),
        });
        assert!(text.contains("Improvement of technology=wifi over technology=lte"));
        // lte: mean rx 875, wifi: mean rx 950.
        assert!(text.contains("Throughput (Kbps)    +8.57%"));
        // lte delay mean 4 ms, wifi 3 ms.
        assert!(text.contains("Delay (ms)           +25.00%"));
    }

    #[test]
    fn unknown_comparison_label_is_an_error() {
        let options = SummaryOptions {
            group_by: None,
            compare: Some(Comparison {
                label: "protocol".to_string(),
                baseline: "a".to_string(),
                candidate: "b".to_string(),
            }),
        };
        let err = write_summary(&technology_table(), &options, Vec::new()).unwrap_err();
        assert!(matches!(err, ReportError::Table(TableError::UnknownLabel(_))));
    }

    #[test]
    fn failures_are_counted_and_listed() {
        let failures = vec![RunFailure {
            labels: ExperimentLabels::new().with("distance", "90m"),
            path: PathBuf::from("QuestionB/DataOfUser1-90m-.sca"),
            reason: "trace file not found".to_string(),
        }];
        let mut buf = Vec::new();
        write_batch_failures(&failures, 5, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("4 of 5 entries succeeded\n"));
        assert!(text.contains("failed: distance=90m (QuestionB/DataOfUser1-90m-.sca)"));
    }
}
