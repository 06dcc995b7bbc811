use std::path::Path;

use super::ExportRow;
use crate::error::{ReadyRsError, Result};

fn csv_error(e: ::csv::Error) -> ReadyRsError {
    if e.is_io_error() {
        match e.into_kind() {
            ::csv::ErrorKind::Io(io) => ReadyRsError::Io(io),
            other => ReadyRsError::Serialization(format!("{:?}", other)),
        }
    } else {
        ReadyRsError::Serialization(e.to_string())
    }
}

/// Write rows as CSV with a header line; absent values are empty cells
pub fn write_rows<P: AsRef<Path>>(rows: &[ExportRow], output_path: P) -> Result<()> {
    let mut writer = ::csv::Writer::from_path(output_path).map_err(csv_error)?;

    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read rows back from a CSV export
pub fn read_rows<P: AsRef<Path>>(input_path: P) -> Result<Vec<ExportRow>> {
    let mut reader = ::csv::Reader::from_path(input_path).map_err(csv_error)?;

    reader
        .deserialize()
        .map(|row| row.map_err(csv_error))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::build_rows;
    use crate::models::{DailyMetrics, DateRange};
    use crate::readiness::ReadinessCalculator;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn test_csv_export_keeps_empty_cells() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.csv");

        let day = DailyMetrics {
            acwr: Some(1.1),
            resting_hr: Some(48),
            ..DailyMetrics::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        };
        let range = DateRange::new(day.date, day.date).unwrap();
        let rows = build_rows(&range, &[day], &ReadinessCalculator::new(), 7);
        write_rows(&rows, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("date,watch_worn,readiness_score"));

        let line = lines.next().unwrap();
        assert!(line.starts_with("2024-03-01,false,100,PRIME,,"));

        let back = read_rows(&path).unwrap();
        assert_eq!(back, rows);
    }
}
