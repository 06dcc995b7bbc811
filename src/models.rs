use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ReadyRsError, Result};

/// Longest trailing window, in days, accepted for trends and baselines
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Device training status, decoded from the provider's numeric status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainingStatus {
    NotApplicable,
    Detraining,
    Recovery,
    Maintaining,
    Productive,
    Peaking,
    Overreaching,
    Unproductive,
    /// Code outside the known table, kept verbatim
    Unknown(i32),
}

impl TrainingStatus {
    /// Decode the provider status code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => TrainingStatus::NotApplicable,
            1 => TrainingStatus::Detraining,
            2 => TrainingStatus::Recovery,
            3 => TrainingStatus::Maintaining,
            4 => TrainingStatus::Productive,
            5 => TrainingStatus::Peaking,
            6 => TrainingStatus::Overreaching,
            7 => TrainingStatus::Unproductive,
            other => TrainingStatus::Unknown(other),
        }
    }

    /// Parse the stored label back into a status
    pub fn from_label(label: &str) -> Self {
        match label {
            "NOT_APPLICABLE" => TrainingStatus::NotApplicable,
            "DETRAINING" => TrainingStatus::Detraining,
            "RECOVERY" => TrainingStatus::Recovery,
            "MAINTAINING" => TrainingStatus::Maintaining,
            "PRODUCTIVE" => TrainingStatus::Productive,
            "PEAKING" => TrainingStatus::Peaking,
            "OVERREACHING" => TrainingStatus::Overreaching,
            "UNPRODUCTIVE" => TrainingStatus::Unproductive,
            other => TrainingStatus::Unknown(other.parse().unwrap_or(-1)),
        }
    }

    pub fn label(&self) -> String {
        match self {
            TrainingStatus::NotApplicable => "NOT_APPLICABLE".to_string(),
            TrainingStatus::Detraining => "DETRAINING".to_string(),
            TrainingStatus::Recovery => "RECOVERY".to_string(),
            TrainingStatus::Maintaining => "MAINTAINING".to_string(),
            TrainingStatus::Productive => "PRODUCTIVE".to_string(),
            TrainingStatus::Peaking => "PEAKING".to_string(),
            TrainingStatus::Overreaching => "OVERREACHING".to_string(),
            TrainingStatus::Unproductive => "UNPRODUCTIVE".to_string(),
            TrainingStatus::Unknown(code) => code.to_string(),
        }
    }
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One calendar day of wearable telemetry.
///
/// Every field other than `date` is optional: a value that the provider did
/// not report (or that failed to fetch) is `None`, which is distinct from a
/// reported zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyMetrics {
    /// Calendar date, unique key of the record
    pub date: NaiveDate,

    // Device training readiness (as reported, not computed)
    pub device_readiness_score: Option<u8>,
    pub device_readiness_level: Option<String>,
    pub device_recovery_minutes: Option<u32>,
    // Contributing factors behind the device readiness score
    pub device_readiness_sleep_score: Option<u8>,
    pub device_readiness_sleep_history: Option<u8>,
    pub device_readiness_hrv_status: Option<String>,
    pub device_readiness_stress_history: Option<u8>,
    pub device_readiness_acute_load: Option<f64>,

    // Training status
    pub training_status: Option<TrainingStatus>,
    pub training_feedback: Option<String>,
    /// First day of the current training status
    pub status_since: Option<NaiveDate>,
    pub vo2_max: Option<f64>,
    /// Day the VO2 max estimate was last updated
    pub vo2_max_date: Option<NaiveDate>,

    // Training load
    /// Acute (7-day) training load
    pub acute_load: Option<f64>,
    /// Chronic (28-day) training load
    pub chronic_load: Option<f64>,
    /// Acute:chronic workload ratio
    pub acwr: Option<f64>,
    pub acwr_status: Option<String>,
    /// Position of the ACWR on the device gauge, percent
    pub acwr_percent: Option<u16>,

    // Monthly training load balance
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

    // HRV
    /// Overnight HRV average in milliseconds
    pub hrv_last_night: Option<f64>,
    /// Device-supplied 7-day HRV baseline in milliseconds
    pub hrv_weekly_avg: Option<f64>,
    pub hrv_status: Option<String>,

    // Sleep
    /// Device sleep score (0-100)
    pub sleep_score: Option<u8>,
    pub sleep_hours: Option<f64>,
    pub deep_sleep_mins: Option<f64>,
    pub light_sleep_mins: Option<f64>,
    pub rem_sleep_mins: Option<f64>,
    pub awake_mins: Option<f64>,
    /// Local wall-clock time the main sleep started
    pub sleep_start: Option<NaiveTime>,
    pub sleep_end: Option<NaiveTime>,

    // Heart rate
    pub resting_hr: Option<u16>,
    pub max_hr: Option<u16>,
    pub min_hr: Option<u16>,

    // Body battery
    /// Energy restored, percentage points
    pub body_battery_charged: Option<u8>,
    /// Energy consumed, percentage points
    pub body_battery_drained: Option<u8>,

    // Stress
    pub avg_stress: Option<u8>,
    pub max_stress: Option<u8>,
}

impl DailyMetrics {
    /// Empty record for a date
    pub fn new(date: NaiveDate) -> Self {
        DailyMetrics {
            date,
            ..Default::default()
        }
    }

    /// Number of populated optional fields, used for import logging
    pub fn populated_fields(&self) -> usize {
        let options = [
            self.device_readiness_score.is_some(),
            self.device_readiness_level.is_some(),
            self.device_recovery_minutes.is_some(),
            self.device_readiness_sleep_score.is_some(),
            self.device_readiness_sleep_history.is_some(),
            self.device_readiness_hrv_status.is_some(),
            self.device_readiness_stress_history.is_some(),
            self.device_readiness_acute_load.is_some(),
            self.training_status.is_some(),
            self.training_feedback.is_some(),
            self.status_since.is_some(),
            self.vo2_max.is_some(),
            self.vo2_max_date.is_some(),
            self.acute_load.is_some(),
            self.chronic_load.is_some(),
            self.acwr.is_some(),
            self.acwr_status.is_some(),
            self.acwr_percent.is_some(),
            self.aerobic_low.is_some(),
            self.aerobic_low_target_min.is_some(),
            self.aerobic_low_target_max.is_some(),
            self.aerobic_high.is_some(),
            self.aerobic_high_target_min.is_some(),
            self.aerobic_high_target_max.is_some(),
            self.anaerobic.is_some(),
            self.anaerobic_target_min.is_some(),
            self.anaerobic_target_max.is_some(),
            self.balance_feedback.is_some(),
            self.hrv_last_night.is_some(),
            self.hrv_weekly_avg.is_some(),
            self.hrv_status.is_some(),
            self.sleep_score.is_some(),
            self.sleep_hours.is_some(),
            self.deep_sleep_mins.is_some(),
            self.light_sleep_mins.is_some(),
            self.rem_sleep_mins.is_some(),
            self.awake_mins.is_some(),
            self.sleep_start.is_some(),
            self.sleep_end.is_some(),
            self.resting_hr.is_some(),
            self.max_hr.is_some(),
            self.min_hr.is_some(),
            self.body_battery_charged.is_some(),
            self.body_battery_drained.is_some(),
            self.avg_stress.is_some(),
            self.max_stress.is_some(),
        ];
        options.iter().filter(|present| **present).count()
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting one whose end precedes its start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(ReadyRsError::Validation(format!(
                "date range end {} precedes start {}",
                end, start
            )));
        }
        Ok(DateRange { start, end })
    }

    /// The `days`-long window ending on (and including) `end`
    pub fn trailing(end: NaiveDate, days: u32) -> Result<Self> {
        if days == 0 || days > MAX_WINDOW_DAYS {
            return Err(ReadyRsError::Validation(format!(
                "trailing window must span 1 to {} days, got {}",
                MAX_WINDOW_DAYS, days
            )));
        }
        let start = end
            .checked_sub_signed(Duration::days(i64::from(days) - 1))
            .ok_or_else(|| {
                ReadyRsError::Validation(format!("{}-day window ending {} is out of range", days, end))
            })?;
        DateRange::new(start, end)
    }

    /// This range extended backwards so its first day also has a full
    /// `window_days` trailing window of history
    pub fn with_lookback(&self, window_days: u32) -> Result<Self> {
        let lookback = DateRange::trailing(self.start, window_days)?;
        DateRange::new(lookback.start, self.end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every date in the range, oldest first
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .collect()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
