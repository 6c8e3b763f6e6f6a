use crate::error::ReportError;
use sca_lab_core::ResultTable;
use serde_json::{Map, Value};
use std::io::Write;
use tracing::debug;

/// One header line of stable column names, then one line per row in table order.
pub fn write_csv<W: Write>(table: &ResultTable, out: W) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(table.column_names())?;
    for row in table.to_ordered_rows() {
        writer.write_record(row.cells.iter().map(|(_, value)| value.to_string()))?;
    }
    writer.flush()?;
    debug!("Wrote {} CSV rows", table.len());
    Ok(())
}

/// Pretty JSON array with one object per row; keys keep column order.
pub fn write_json<W: Write>(table: &ResultTable, mut out: W) -> Result<(), ReportError> {
    let rows = table
        .to_ordered_rows()
        .into_iter()
        .map(|row| {
            let mut object = Map::new();
            for (column, value) in row.cells {
                object.insert(column, serde_json::to_value(value)?);
            }
            Ok(Value::Object(object))
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()?;

    serde_json::to_writer_pretty(&mut out, &rows)?;
    writeln!(out)?;
    debug!("Wrote {} JSON rows", rows.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::technology_table;
    use sca_lab_abstract::METRIC_FIELDS;

    #[test]
    fn csv_header_lists_every_column() {
        let table = technology_table();
        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let header: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        assert_eq!(&header[..3], ["distance", "technology", "distance_numeric"]);
        for field in METRIC_FIELDS {
            assert!(header.iter().any(|h| h == field), "missing {field}");
        }

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[0][0], "0m");
        assert_eq!(&rows[0][1], "lte");
        assert_eq!(&rows[3][0], "20m");
        assert_eq!(&rows[3][1], "wifi");
        assert!(rows.iter().all(|r| r.len() == header.len()));
    }

    #[test]
    fn csv_values_read_back_as_numbers() {
        let table = technology_table();
        let mut buf = Vec::new();
        write_csv(&table, &mut buf).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let header = reader.headers().unwrap().clone();
        let rx_column = header.iter().position(|h| h == "rx_packets").unwrap();
        let rx: Vec<f64> = reader
            .records()
            .map(|r| r.unwrap()[rx_column].parse().unwrap())
            .collect();
        assert_eq!(rx, table.column("rx_packets").unwrap());
    }

    #[test]
    fn json_rows_are_objects_in_table_order() {
        let table = technology_table();
        let mut buf = Vec::new();
        write_json(&table, &mut buf).unwrap();

        let value: Value = serde_json::from_slice(&buf).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["technology"], "lte");
        assert_eq!(rows[0]["distance_numeric"], 0);
        assert_eq!(rows[1]["tx_packets"], 1000);
        assert_eq!(rows[2]["distance_numeric"], 20);
        assert_eq!(rows[3]["packet_loss_ratio"], 0.1);
    }

    #[test]
    fn csv_writes_to_a_file() {
        let table = technology_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        write_csv(&table, std::fs::File::create(&path).unwrap()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 5);
        assert!(content.starts_with("distance,technology,distance_numeric,tx_packets"));
    }
}
