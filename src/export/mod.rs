//! Export of stored daily records
//!
//! Each exported row is the stored record flattened, plus the readiness
//! computed for that day against its trailing window of stored history.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ReadyRsError, Result};
use crate::models::{DailyMetrics, DateRange};
use crate::readiness::ReadinessCalculator;

pub mod csv;
pub mod json;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Format from a file extension, defaulting to CSV
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// File name used under the export directory when no output path is given
pub fn default_output_path<P: AsRef<Path>>(export_dir: P, range: &DateRange, format: ExportFormat) -> PathBuf {
    export_dir.as_ref().join(format!(
        "readiness_{}_{}.{}",
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d"),
        format.extension()
    ))
}

impl std::str::FromStr for ExportFormat {
    type Err = ReadyRsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ReadyRsError::Validation(format!("Unsupported export format: {}", s))),
        }
    }
}

/// One flattened export row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub date: String,
    pub watch_worn: bool,
    pub readiness_score: Option<u8>,
    pub readiness_level: Option<String>,
    pub device_readiness_score: Option<u8>,
    pub device_readiness_level: Option<String>,
    pub device_recovery_minutes: Option<u32>,
    pub device_readiness_sleep_score: Option<u8>,
    pub device_readiness_sleep_history: Option<u8>,
    pub device_readiness_hrv_status: Option<String>,
    pub device_readiness_stress_history: Option<u8>,
    pub device_readiness_acute_load: Option<f64>,
    pub training_status: Option<String>,
    pub training_feedback: Option<String>,
    pub status_since: Option<String>,
    pub vo2_max: Option<f64>,
    pub vo2_max_date: Option<String>,
    pub acute_load: Option<f64>,
    pub chronic_load: Option<f64>,
    pub acwr: Option<f64>,
    pub acwr_status: Option<String>,
    pub acwr_percent: Option<u16>,
    pub aerobic_low: Option<f64>,
    pub aerobic_low_target_min: Option<f64>,
    pub aerobic_low_target_max: Option<f64>,
    pub aerobic_high: Option<f64>,
    pub aerobic_high_target_min: Option<f64>,
    pub aerobic_high_target_max: Option<f64>,
    pub anaerobic: Option<f64>,
    pub anaerobic_target_min: Option<f64>,
    pub anaerobic_target_max: Option<f64>,
    pub balance_feedback: Option<String>,
    pub hrv_last_night: Option<f64>,
    pub hrv_weekly_avg: Option<f64>,
    pub hrv_status: Option<String>,
    pub sleep_score: Option<u8>,
    pub sleep_hours: Option<f64>,
    pub deep_sleep_mins: Option<f64>,
    pub light_sleep_mins: Option<f64>,
    pub rem_sleep_mins: Option<f64>,
    pub awake_mins: Option<f64>,
    pub sleep_start: Option<String>,
    pub sleep_end: Option<String>,
    pub resting_hr: Option<u16>,
    pub max_hr: Option<u16>,
    pub min_hr: Option<u16>,
    pub body_battery_charged: Option<u8>,
    pub body_battery_drained: Option<u8>,
    pub avg_stress: Option<u8>,
    pub max_stress: Option<u8>,
}

/// Flatten the records of `history` that fall inside `range`, scoring each
/// against its `window_days` trailing window of `history`
pub fn build_rows(
    range: &DateRange,
    history: &[DailyMetrics],
    calculator: &ReadinessCalculator,
    window_days: u32,
) -> Vec<ExportRow> {
    history
        .iter()
        .filter(|day| range.contains(day.date))
        .map(|day| {
            let readiness = calculator.assess_in_history(day, history, window_days);
            ExportRow {
                date: day.date.format("%Y-%m-%d").to_string(),
                watch_worn: readiness.watch_worn,
                readiness_score: readiness.score(),
                readiness_level: readiness.level().map(|l| l.label().to_string()),
                device_readiness_score: day.device_readiness_score,
                device_readiness_level: day.device_readiness_level.clone(),
                device_recovery_minutes: day.device_recovery_minutes,
                device_readiness_sleep_score: day.device_readiness_sleep_score,
                device_readiness_sleep_history: day.device_readiness_sleep_history,
                device_readiness_hrv_status: day.device_readiness_hrv_status.clone(),
                device_readiness_stress_history: day.device_readiness_stress_history,
                device_readiness_acute_load: day.device_readiness_acute_load,
                training_status: day.training_status.map(|s| s.label()),
                training_feedback: day.training_feedback.clone(),
                status_since: day.status_since.map(|d| d.format("%Y-%m-%d").to_string()),
                vo2_max: day.vo2_max,
                vo2_max_date: day.vo2_max_date.map(|d| d.format("%Y-%m-%d").to_string()),
                acute_load: day.acute_load,
                chronic_load: day.chronic_load,
                acwr: day.acwr,
                acwr_status: day.acwr_status.clone(),
                acwr_percent: day.acwr_percent,
                aerobic_low: day.aerobic_low,
                aerobic_low_target_min: day.aerobic_low_target_min,
                aerobic_low_target_max: day.aerobic_low_target_max,
                aerobic_high: day.aerobic_high,
                aerobic_high_target_min: day.aerobic_high_target_min,
                aerobic_high_target_max: day.aerobic_high_target_max,
                anaerobic: day.anaerobic,
                anaerobic_target_min: day.anaerobic_target_min,
                anaerobic_target_max: day.anaerobic_target_max,
                balance_feedback: day.balance_feedback.clone(),
                hrv_last_night: day.hrv_last_night,
                hrv_weekly_avg: day.hrv_weekly_avg,
                hrv_status: day.hrv_status.clone(),
                sleep_score: day.sleep_score,
                sleep_hours: day.sleep_hours,
                deep_sleep_mins: day.deep_sleep_mins,
                light_sleep_mins: day.light_sleep_mins,
                rem_sleep_mins: day.rem_sleep_mins,
                awake_mins: day.awake_mins,
                sleep_start: day.sleep_start.map(|t| t.format("%H:%M:%S").to_string()),
                sleep_end: day.sleep_end.map(|t| t.format("%H:%M:%S").to_string()),
                resting_hr: day.resting_hr,
                max_hr: day.max_hr,
                min_hr: day.min_hr,
                body_battery_charged: day.body_battery_charged,
                body_battery_drained: day.body_battery_drained,
                avg_stress: day.avg_stress,
                max_stress: day.max_stress,
            }
        })
        .collect()
}

/// Write the days of `range` to `output_path` in the given format, scored
/// against `history`. Returns the row count.
pub fn export_daily_metrics<P: AsRef<Path>>(
    range: &DateRange,
    history: &[DailyMetrics],
    calculator: &ReadinessCalculator,
    window_days: u32,
    format: ExportFormat,
    output_path: P,
) -> Result<usize> {
    let rows = build_rows(range, history, calculator, window_days);

    if let Some(parent) = output_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match format {
        ExportFormat::Csv => csv::write_rows(&rows, &output_path)?,
        ExportFormat::Json => json::write_rows(&rows, &output_path)?,
    }

    info!(
        rows = rows.len(),
        format = ?format,
        path = %output_path.as_ref().display(),
        "Exported daily metrics"
    );

    Ok(rows.len())
}
