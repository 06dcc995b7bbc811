//! Multi-day readiness trend
//!
//! Builds per-day rows and window averages over a trailing window of daily
//! records. Days without overnight wear are kept in the rows but marked, and
//! their overnight values (resting HR, HRV, Body Battery) are left out of the
//! averages so that an unworn night does not bias them. Load, ACWR and sleep
//! do not depend on overnight wear and average over every day that has them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{DailyMetrics, DateRange};
use crate::readiness::{ReadinessCalculator, ReadinessLevel};
use crate::wear::watch_worn;

/// Trend window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Window length in days (default: 7)
    pub window_days: u32,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig { window_days: 7 }
    }
}

/// One day of the trend table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRow {
    pub date: NaiveDate,

    /// False when the day's overnight factors were excluded
    pub watch_worn: bool,

    /// True when the store had a record for the day
    pub has_record: bool,

    pub acute_load: Option<f64>,
    pub acwr: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub sleep_score: Option<u8>,

    // Overnight values, `None` on unworn days
    pub resting_hr: Option<u16>,
    pub hrv: Option<f64>,
    pub body_battery: Option<u8>,

    /// Computed readiness, when determined
    pub readiness: Option<u8>,
    pub level: Option<ReadinessLevel>,
}

/// Window averages; `None` means no eligible day had the value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAverages {
    pub acute_load: Option<f64>,
    pub acwr: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub resting_hr: Option<f64>,
    pub hrv: Option<f64>,
    pub body_battery: Option<f64>,
    pub readiness: Option<f64>,
}

/// Trend over a date window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub range: DateRange,

    /// One row per calendar day in the window, oldest first
    pub rows: Vec<TrendRow>,

    pub averages: TrendAverages,

    /// Days whose overnight values were kept out of the averages
    pub excluded_days: usize,
}

impl TrendReport {
    pub fn worn_days(&self) -> usize {
        self.rows.len() - self.excluded_days
    }
}

/// Arithmetic mean, `None` for an empty input
fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Builds trend reports from stored daily records
pub struct TrendAnalyzer {
    calculator: ReadinessCalculator,
    /// Trailing window each row is scored against
    window_days: u32,
}

impl TrendAnalyzer {
    pub fn new(calculator: ReadinessCalculator, window_days: u32) -> Self {
        TrendAnalyzer {
            calculator,
            window_days,
        }
    }

    /// Build the trend for `range` from whatever records are available.
    ///
    /// Only days inside `range` get rows. Records before it serve as history
    /// for the trailing window of the first rows, and records after it are
    /// ignored. A later record for the same date replaces an earlier one.
    /// Calendar days without a record still get a row and count as unworn.
    pub fn analyze(&self, range: DateRange, records: &[DailyMetrics]) -> TrendReport {
        let by_date: BTreeMap<NaiveDate, &DailyMetrics> = records
            .iter()
            .filter(|r| r.date <= range.end)
            .map(|r| (r.date, r))
            .collect();

        let history: Vec<DailyMetrics> = by_date.values().map(|r| (*r).clone()).collect();

        let rows: Vec<TrendRow> = range
            .days()
            .into_iter()
            .map(|date| match by_date.get(&date) {
                Some(day) => self.row_for(day, &history, true),
                None => self.row_for(&DailyMetrics::new(date), &history, false),
            })
            .collect();

        let averages = Self::averages(&rows);
        let excluded_days = rows.iter().filter(|r| !r.watch_worn).count();

        debug!(
            range = %range,
            records = rows.iter().filter(|r| r.has_record).count(),
            window_days = self.window_days,
            excluded_days,
            "Built readiness trend"
        );

        TrendReport {
            range,
            rows,
            averages,
            excluded_days,
        }
    }

    fn row_for(&self, day: &DailyMetrics, history: &[DailyMetrics], has_record: bool) -> TrendRow {
        let worn = watch_worn(day);
        let readiness = self
            .calculator
            .assess_in_history(day, history, self.window_days);

        TrendRow {
            date: day.date,
            watch_worn: worn,
            has_record,
            acute_load: day.acute_load,
            acwr: day.acwr,
            sleep_hours: day.sleep_hours,
            sleep_score: day.sleep_score,
            resting_hr: day.resting_hr.filter(|_| worn),
            hrv: day.hrv_last_night.filter(|_| worn),
            body_battery: day.body_battery_charged.filter(|_| worn),
            readiness: readiness.score(),
            level: readiness.level(),
        }
    }

    /// Averages over the rows. Overnight values are already gated by wear.
    pub fn averages(rows: &[TrendRow]) -> TrendAverages {
        TrendAverages {
            acute_load: mean(rows.iter().filter_map(|r| r.acute_load)),
            acwr: mean(rows.iter().filter_map(|r| r.acwr)),
            sleep_hours: mean(rows.iter().filter_map(|r| r.sleep_hours)),
            resting_hr: mean(
                rows.iter()
                    .filter(|r| r.watch_worn)
                    .filter_map(|r| r.resting_hr.map(f64::from)),
            ),
            hrv: mean(rows.iter().filter(|r| r.watch_worn).filter_map(|r| r.hrv)),
            body_battery: mean(
                rows.iter()
                    .filter(|r| r.watch_worn)
                    .filter_map(|r| r.body_battery.map(f64::from)),
            ),
            readiness: mean(rows.iter().filter_map(|r| r.readiness.map(f64::from))),
        }
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new(ReadinessCalculator::new(), TrendConfig::default().window_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn week() -> DateRange {
        DateRange::new(date(1), date(7)).unwrap()
    }

    fn worn_day(d: u32, hrv: f64) -> DailyMetrics {
        DailyMetrics {
            acute_load: Some(400.0 + f64::from(d)),
            acwr: Some(1.0),
            sleep_hours: Some(7.0),
            sleep_score: Some(80),
            hrv_last_night: Some(hrv),
            hrv_weekly_avg: Some(50.0),
            resting_hr: Some(45),
            body_battery_charged: Some(70),
            body_battery_drained: Some(50),
            ..DailyMetrics::new(date(d))
        }
    }

    fn unworn_day(d: u32) -> DailyMetrics {
        DailyMetrics {
            acute_load: Some(400.0 + f64::from(d)),
            acwr: Some(1.2),
            sleep_hours: Some(5.0),
            // raw overnight values present, but no HRV
            resting_hr: Some(70),
            body_battery_charged: Some(10),
            body_battery_drained: Some(0),
            ..DailyMetrics::new(date(d))
        }
    }

    #[test]
    fn test_hrv_average_uses_worn_days_only() {
        let mut records = Vec::new();
        for d in 1..=7 {
            if d == 2 || d == 5 {
                records.push(unworn_day(d));
            } else {
                records.push(worn_day(d, 40.0 + f64::from(d)));
            }
        }

        let report = TrendAnalyzer::default().analyze(week(), &records);

        assert_eq!(report.rows.len(), 7);
        assert_eq!(report.excluded_days, 2);
        assert_eq!(report.worn_days(), 5);

        // worn HRVs: 41, 43, 44, 46, 47
        assert!((report.averages.hrv.unwrap() - 44.2).abs() < 1e-9);
        assert_eq!(report.averages.resting_hr, Some(45.0));
        assert_eq!(report.averages.body_battery, Some(70.0));
    }

    #[test]
    fn test_load_and_sleep_average_all_days() {
        let records = vec![worn_day(1, 50.0), unworn_day(2)];
        let report = TrendAnalyzer::default().analyze(week(), &records);

        assert_eq!(report.averages.sleep_hours, Some(6.0));
        assert!((report.averages.acwr.unwrap() - 1.1).abs() < 1e-9);
        assert_eq!(report.averages.acute_load, Some(401.5));
    }

    #[test]
    fn test_all_unworn_window_has_undefined_overnight_averages() {
        let records: Vec<DailyMetrics> = (1..=7).map(unworn_day).collect();
        let report = TrendAnalyzer::default().analyze(week(), &records);

        assert_eq!(report.excluded_days, 7);
        assert_eq!(report.averages.hrv, None);
        assert_eq!(report.averages.resting_hr, None);
        assert_eq!(report.averages.body_battery, None);
        assert!(report.averages.sleep_hours.is_some());
    }

    #[test]
    fn test_unworn_rows_hide_overnight_values() {
        let report = TrendAnalyzer::default().analyze(week(), &[unworn_day(3)]);
        let row = &report.rows[2];

        assert_eq!(row.date, date(3));
        assert!(!row.watch_worn);
        assert!(row.has_record);
        assert_eq!(row.resting_hr, None);
        assert_eq!(row.body_battery, None);
        assert_eq!(row.acwr, Some(1.2));
        // scored from ACWR and sleep only
        assert!(row.readiness.is_some());
    }

    #[test]
    fn test_missing_days_fill_window() {
        let report = TrendAnalyzer::default().analyze(week(), &[worn_day(4, 50.0)]);

        assert_eq!(report.rows.len(), 7);
        assert_eq!(report.excluded_days, 6);
        assert!(!report.rows[0].has_record);
        assert_eq!(report.rows[0].readiness, None);
        assert!(report.rows[3].watch_worn);
    }

    #[test]
    fn test_records_outside_range_ignored() {
        let mut outside = worn_day(1, 90.0);
        outside.date = date(20);

        let report = TrendAnalyzer::default().analyze(week(), &[outside, worn_day(1, 50.0)]);
        assert_eq!(report.averages.hrv, Some(50.0));
    }

    #[test]
    fn test_rows_score_against_trailing_window() {
        // no device weekly average, so baselines come from earlier nights
        let records: Vec<DailyMetrics> = (1..=7)
            .map(|d| {
                let mut day = worn_day(d, if d <= 3 { 40.0 } else { 70.0 });
                day.hrv_weekly_avg = None;
                day
            })
            .collect();

        let calculator = ReadinessCalculator::new();
        let report = TrendAnalyzer::new(calculator.clone(), 7).analyze(week(), &records);

        for (row, day) in report.rows.iter().zip(&records) {
            let window = crate::readiness::trailing_window(day.date, &records, 7);
            assert_eq!(row.readiness, calculator.assess(day, &window).score(), "{}", day.date);
        }

        // day 3 compares 40ms with the 40ms of days 1-2, not with days 4-7
        let day3 = calculator.assess(&records[2], &records[..2]);
        assert_eq!(report.rows[2].readiness, day3.score());
    }

    #[test]
    fn test_history_before_range_feeds_first_rows() {
        let mut records: Vec<DailyMetrics> = (1..=7)
            .map(|d| {
                let mut day = worn_day(d, 60.0);
                day.hrv_weekly_avg = None;
                day
            })
            .collect();
        records[4].hrv_last_night = Some(30.0);

        let range = DateRange::new(date(5), date(7)).unwrap();
        let report = TrendAnalyzer::default().analyze(range, &records);

        assert_eq!(report.rows.len(), 3);
        // day 5 has days 1-4 (60ms) as its baseline even though they are not rows
        let expected = ReadinessCalculator::new().assess(&records[4], &records[..4]);
        assert_eq!(report.rows[0].readiness, expected.score());
        assert_eq!(report.averages.hrv, Some(50.0));
    }

    #[test]
    fn test_empty_window() {
        let report = TrendAnalyzer::default().analyze(week(), &[]);
        assert_eq!(report.averages, TrendAverages::default());
        assert_eq!(report.averages.readiness, None);
    }
}
