use sca_lab_abstract::{
    ExperimentLabels, MetricRecord, RawRecordStore, STATISTICS_SCOPE, TOP_LEVEL_SCOPE,
};
use tracing::debug;

pub const SENDER_SCOPE: &str = "node[0]";
pub const RECEIVER_SCOPE: &str = "node[1]";
pub const TX_PACKETS: &str = "sender-tx-packets";
pub const RX_PACKETS: &str = "receiver-rx-packets";
/// Field of the packet-size statistic carrying the mean size in bytes.
pub const PACKET_SIZE_MEAN: &str = "mean";
pub const DELAY_AVERAGE: &str = "delay-average";
pub const DELAY_MAX: &str = "delay-max";
pub const DELAY_MIN: &str = "delay-min";

pub const DEFAULT_PACKET_SIZE_BYTES: f64 = 1000.0;

const NS_PER_SECOND: f64 = 1e9;
const NS_PER_MS: f64 = 1e6;
const BITS_PER_BYTE: f64 = 8.0;
const BITS_PER_KBIT: f64 = 1000.0;

/// Derive the performance metrics of one run.
///
/// Never fails: absent or textual inputs fall back to zero (packet counts, delays) or
/// [`DEFAULT_PACKET_SIZE_BYTES`]. `simulation_time_seconds` is expected to be positive.
pub fn compute_metrics(
    store: &RawRecordStore,
    labels: ExperimentLabels,
    simulation_time_seconds: f64,
) -> MetricRecord {
    let tx_packets = packet_count(store, SENDER_SCOPE, TX_PACKETS);
    let rx_packets = packet_count(store, RECEIVER_SCOPE, RX_PACKETS);
    let avg_packet_size_bytes = store
        .number(STATISTICS_SCOPE, PACKET_SIZE_MEAN)
        .unwrap_or(DEFAULT_PACKET_SIZE_BYTES);

    let delay_average_ns = store.number(TOP_LEVEL_SCOPE, DELAY_AVERAGE).unwrap_or(0.0);
    let delay_max_ns = store.number(TOP_LEVEL_SCOPE, DELAY_MAX).unwrap_or(0.0);
    let delay_min_ns = store.number(TOP_LEVEL_SCOPE, DELAY_MIN).unwrap_or(0.0);

    debug!(
        "{}: tx={} rx={} packet size={} bytes",
        labels, tx_packets, rx_packets, avg_packet_size_bytes
    );

    let bits_transmitted = tx_packets as f64 * avg_packet_size_bytes * BITS_PER_BYTE;
    let bit_rate_kbps = bits_transmitted / simulation_time_seconds / BITS_PER_KBIT;

    let bits_received = rx_packets as f64 * avg_packet_size_bytes * BITS_PER_BYTE;
    let avg_throughput_kbps = bits_received / simulation_time_seconds / BITS_PER_KBIT;

    let packet_loss_ratio = if tx_packets > 0 {
        (tx_packets as f64 - rx_packets as f64) / tx_packets as f64
    } else {
        0.0
    };

    let efficiency_percent = if bit_rate_kbps > 0.0 {
        avg_throughput_kbps / bit_rate_kbps * 100.0
    } else {
        0.0
    };

    MetricRecord {
        labels,
        tx_packets,
        rx_packets,
        avg_packet_size_bytes,
        delay_average_ns,
        delay_max_ns,
        delay_min_ns,
        simulation_time_seconds,
        bit_rate_kbps,
        avg_throughput_kbps,
        avg_delay_seconds: scale_delay(delay_average_ns, NS_PER_SECOND),
        avg_delay_ms: scale_delay(delay_average_ns, NS_PER_MS),
        max_delay_seconds: scale_delay(delay_max_ns, NS_PER_SECOND),
        max_delay_ms: scale_delay(delay_max_ns, NS_PER_MS),
        min_delay_seconds: scale_delay(delay_min_ns, NS_PER_SECOND),
        min_delay_ms: scale_delay(delay_min_ns, NS_PER_MS),
        packet_loss_ratio,
        packet_loss_percentage: packet_loss_ratio * 100.0,
        efficiency_percent,
    }
}

fn packet_count(store: &RawRecordStore, scope: &str, name: &str) -> i64 {
    // Fractional counts are truncated before they reach the rate formulas.
    store
        .get(scope, name)
        .and_then(|value| value.as_i64())
        .unwrap_or(0)
}

fn scale_delay(ns: f64, divisor: f64) -> f64 {
    if ns > 0.0 { ns / divisor } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sca_lab_abstract::ScalarValue;

    fn store(tx: i64, rx: i64, size: f64) -> RawRecordStore {
        let mut store = RawRecordStore::new();
        store.insert(SENDER_SCOPE, TX_PACKETS, ScalarValue::Integer(tx));
        store.insert(RECEIVER_SCOPE, RX_PACKETS, ScalarValue::Integer(rx));
        store.insert(STATISTICS_SCOPE, PACKET_SIZE_MEAN, ScalarValue::Float(size));
        store
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn rates_and_loss() {
        let record = compute_metrics(&store(1000, 950, 1000.0), ExperimentLabels::new(), 20.0);

        assert!(close(record.bit_rate_kbps, 400.0));
        assert!(close(record.avg_throughput_kbps, 380.0));
        assert!(close(record.packet_loss_ratio, 0.05));
        assert!(close(record.packet_loss_percentage, 5.0));
        assert!(close(record.efficiency_percent, 95.0));
    }

    #[test]
    fn no_transmissions_means_no_loss() {
        let record = compute_metrics(&store(0, 0, 1000.0), ExperimentLabels::new(), 20.0);
        assert_eq!(record.packet_loss_ratio, 0.0);
        assert_eq!(record.bit_rate_kbps, 0.0);
        assert_eq!(record.efficiency_percent, 0.0);
    }

    #[test]
    fn delays_convert_from_nanoseconds() {
        let mut store = RawRecordStore::new();
        store.insert(TOP_LEVEL_SCOPE, DELAY_AVERAGE, ScalarValue::Integer(1_500_000));
        store.insert(TOP_LEVEL_SCOPE, DELAY_MAX, ScalarValue::Float(4.2e7));
        store.insert(TOP_LEVEL_SCOPE, DELAY_MIN, ScalarValue::Integer(-5));

        let record = compute_metrics(&store, ExperimentLabels::new(), 20.0);
        assert!(close(record.avg_delay_seconds, 0.0015));
        assert!(close(record.avg_delay_ms, 1.5));
        assert!(close(record.max_delay_seconds, 0.042));
        assert!(close(record.max_delay_ms, 42.0));
        assert_eq!(record.min_delay_seconds, 0.0);
        assert_eq!(record.min_delay_ms, 0.0);
    }

    #[test]
    fn empty_store_uses_defaults() {
        let labels = ExperimentLabels::new().with("distance", "0m");
        let record = compute_metrics(&RawRecordStore::new(), labels.clone(), 20.0);

        assert_eq!(record.labels, labels);
        assert_eq!(record.tx_packets, 0);
        assert_eq!(record.rx_packets, 0);
        assert_eq!(record.avg_packet_size_bytes, DEFAULT_PACKET_SIZE_BYTES);
        assert_eq!(record.avg_throughput_kbps, 0.0);
        assert_eq!(record.avg_delay_ms, 0.0);
    }

    #[test]
    fn textual_counts_are_treated_as_absent() {
        let mut store = store(1000, 950, 1000.0);
        store.insert(SENDER_SCOPE, TX_PACKETS, ScalarValue::Text("n/a".into()));

        let record = compute_metrics(&store, ExperimentLabels::new(), 20.0);
        assert_eq!(record.tx_packets, 0);
        assert_eq!(record.packet_loss_ratio, 0.0);
    }

    #[test]
    fn more_received_than_sent_is_not_clamped() {
        let record = compute_metrics(&store(100, 110, 1000.0), ExperimentLabels::new(), 20.0);
        assert!(close(record.packet_loss_ratio, -0.1));
    }

    #[test]
    fn extreme_counts_do_not_overflow() {
        let labels = ExperimentLabels::new();
        let record = compute_metrics(&store(10, i64::MIN, 1000.0), labels.clone(), 20.0);
        assert!(record.packet_loss_ratio > 0.0);
        assert!(record.packet_loss_ratio.is_finite());

        let record = compute_metrics(&store(i64::MAX, -1, 1000.0), labels, 20.0);
        assert!(close(record.packet_loss_ratio, 1.0));
    }

    #[test]
    fn fractional_counts_are_truncated() {
        let mut store = store(1000, 950, 1000.0);
        store.insert(SENDER_SCOPE, TX_PACKETS, ScalarValue::Float(1000.9));

        let record = compute_metrics(&store, ExperimentLabels::new(), 20.0);
        assert_eq!(record.tx_packets, 1000);
        assert!(close(record.bit_rate_kbps, 400.0));
    }
}
