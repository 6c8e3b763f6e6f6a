use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered tags identifying one simulation run, e.g. `distance=90m, users=users_20`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentLabels(Vec<(String, String)>);

impl ExperimentLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a label, replacing the value in place if the name already exists.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ExperimentLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<unlabelled>");
        }
        for (idx, (name, value)) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Stable names of every numeric field of [`MetricRecord`], in export order.
pub const METRIC_FIELDS: [&str; 18] = [
    "tx_packets",
    "rx_packets",
    "avg_packet_size_bytes",
    "delay_average_ns",
    "delay_max_ns",
    "delay_min_ns",
    "simulation_time_seconds",
    "bit_rate_kbps",
    "avg_throughput_kbps",
    "avg_delay_seconds",
    "avg_delay_ms",
    "max_delay_seconds",
    "max_delay_ms",
    "min_delay_seconds",
    "min_delay_ms",
    "packet_loss_ratio",
    "packet_loss_percentage",
    "efficiency_percent",
];

/// Derived performance metrics of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub labels: ExperimentLabels,

    // Inputs, after defaults were applied.
    pub tx_packets: i64,
    pub rx_packets: i64,
    /// Mean packet size in bytes
    pub avg_packet_size_bytes: f64,
    pub delay_average_ns: f64,
    pub delay_max_ns: f64,
    pub delay_min_ns: f64,
    pub simulation_time_seconds: f64,

    pub bit_rate_kbps: f64,
    pub avg_throughput_kbps: f64,
    pub avg_delay_seconds: f64,
    pub avg_delay_ms: f64,
    pub max_delay_seconds: f64,
    pub max_delay_ms: f64,
    pub min_delay_seconds: f64,
    pub min_delay_ms: f64,
    /// Not clamped: more received than transmitted packets gives a negative ratio.
    pub packet_loss_ratio: f64,
    pub packet_loss_percentage: f64,
    /// Throughput as a share of the offered bit rate, in percent.
    pub efficiency_percent: f64,
}

impl MetricRecord {
    /// Look up a numeric field by its stable name (see [`METRIC_FIELDS`]).
    pub fn metric(&self, name: &str) -> Option<f64> {
        let value = match name {
            "tx_packets" => self.tx_packets as f64,
            "rx_packets" => self.rx_packets as f64,
            "avg_packet_size_bytes" => self.avg_packet_size_bytes,
            "delay_average_ns" => self.delay_average_ns,
            "delay_max_ns" => self.delay_max_ns,
            "delay_min_ns" => self.delay_min_ns,
            "simulation_time_seconds" => self.simulation_time_seconds,
            "bit_rate_kbps" => self.bit_rate_kbps,
            "avg_throughput_kbps" => self.avg_throughput_kbps,
            "avg_delay_seconds" => self.avg_delay_seconds,
            "avg_delay_ms" => self.avg_delay_ms,
            "max_delay_seconds" => self.max_delay_seconds,
            "max_delay_ms" => self.max_delay_ms,
            "min_delay_seconds" => self.min_delay_seconds,
            "min_delay_ms" => self.min_delay_ms,
            "packet_loss_ratio" => self.packet_loss_ratio,
            "packet_loss_percentage" => self.packet_loss_percentage,
            "efficiency_percent" => self.efficiency_percent,
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_keep_insertion_order_and_replace_in_place() {
        let labels = ExperimentLabels::new()
            .with("technology", "WiFi6")
            .with("distance", "30m")
            .with("technology", "WiFi7");

        assert_eq!(labels.len(), 2);
        assert_eq!(labels.get("technology"), Some("WiFi7"));
        assert_eq!(labels.to_string(), "technology=WiFi7, distance=30m");
    }

    #[test]
    fn every_stable_field_name_resolves() {
        let record = MetricRecord {
            labels: ExperimentLabels::new(),
            tx_packets: 1,
            rx_packets: 1,
            avg_packet_size_bytes: 1.0,
            delay_average_ns: 0.0,
            delay_max_ns: 0.0,
            delay_min_ns: 0.0,
            simulation_time_seconds: 1.0,
            bit_rate_kbps: 0.0,
            avg_throughput_kbps: 0.0,
            avg_delay_seconds: 0.0,
            avg_delay_ms: 0.0,
            max_delay_seconds: 0.0,
            max_delay_ms: 0.0,
            min_delay_seconds: 0.0,
            min_delay_ms: 0.0,
            packet_loss_ratio: 0.0,
            packet_loss_percentage: 0.0,
            efficiency_percent: 0.0,
        };
        for name in METRIC_FIELDS {
            assert!(record.metric(name).is_some(), "{name} is not exposed");
        }
        assert_eq!(record.metric("jitter"), None);
    }

    #[test]
    fn empty_labels_display() {
        assert_eq!(ExperimentLabels::new().to_string(), "<unlabelled>");
    }
}
