use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::ExportRow;
use crate::error::{ReadyRsError, Result};

/// Write rows as a pretty-printed JSON array
pub fn write_rows<P: AsRef<Path>>(rows: &[ExportRow], output_path: P) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), rows)
        .map_err(|e| ReadyRsError::Serialization(e.to_string()))
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
    fn test_json_export_uses_null_for_absent_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.json");

        let day = DailyMetrics::new(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        let range = DateRange::new(day.date, day.date).unwrap();
        let rows = build_rows(&range, &[day], &ReadinessCalculator::new(), 7);
        write_rows(&rows, &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["date"], "2024-03-02");
        assert!(value[0]["readiness_score"].is_null());
        assert!(value[0]["sleep_hours"].is_null());
    }
}
