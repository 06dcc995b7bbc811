//! Telemetry provider collection
//!
//! The wearable provider exposes one daily summary per category (readiness,
//! training status, HRV, sleep, heart rate, Body Battery, stress). Each
//! category is fetched independently: a failed fetch is logged and leaves
//! that category's fields empty without affecting the others.
//!
//! [`JsonDumpProvider`] reads provider exports from disk, laid out as
//! `<root>/<YYYY-MM-DD>/<category>.json`. Payload structs mirror the
//! provider's camelCase field names and only keep what the daily record uses.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::database::Database;
use crate::error::ProviderError;
use crate::models::{DailyMetrics, DateRange, TrainingStatus};

/// Provider summary categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TrainingReadiness,
    TrainingStatus,
    Hrv,
    Sleep,
    HeartRate,
    BodyBattery,
    Stress,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::TrainingReadiness,
        Category::TrainingStatus,
        Category::Hrv,
        Category::Sleep,
        Category::HeartRate,
        Category::BodyBattery,
        Category::Stress,
    ];

    /// File stem used by the JSON dump layout
    pub fn file_stem(&self) -> &'static str {
        match self {
            Category::TrainingReadiness => "training_readiness",
            Category::TrainingStatus => "training_status",
            Category::Hrv => "hrv",
            Category::Sleep => "sleep",
            Category::HeartRate => "heart_rate",
            Category::BodyBattery => "body_battery",
            Category::Stress => "stress",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

// Provider payloads

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReadinessPayload {
    pub score: Option<i64>,
    pub level_key: Option<String>,
    pub level: Option<String>,
    pub recovery_time_in_minutes: Option<i64>,
    // Contributing factors
    pub sleep_score: Option<i64>,
    pub sleep_history_score: Option<i64>,
    /// Reported as a label or a number depending on firmware
    pub hrv_status: Option<serde_json::Value>,
    pub stress_history_score: Option<i64>,
    pub acute_training_load: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStatusPayload {
    #[serde(rename = "mostRecentVO2Max")]
    pub most_recent_vo2_max: Option<Vo2MaxPayload>,
    pub most_recent_training_status: Option<LatestTrainingStatus>,
    pub most_recent_training_load_balance: Option<LatestLoadBalance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Vo2MaxPayload {
    pub generic: Option<Vo2MaxGeneric>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vo2MaxGeneric {
    pub vo2_max_precise_value: Option<f64>,
    pub vo2_max_value: Option<f64>,
    pub calendar_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestTrainingStatus {
    /// Keyed by device id
    pub latest_training_status_data: Option<BTreeMap<String, DeviceTrainingStatus>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTrainingStatus {
    pub training_status: Option<i32>,
    pub training_status_feedback_phrase: Option<String>,
    pub since_date: Option<String>,
    #[serde(rename = "acuteTrainingLoadDTO")]
    pub acute_training_load: Option<AcuteTrainingLoad>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcuteTrainingLoad {
    pub daily_training_load_acute: Option<f64>,
    pub daily_training_load_chronic: Option<f64>,
    pub daily_acute_chronic_workload_ratio: Option<f64>,
    pub acwr_status: Option<String>,
    pub acwr_percent: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestLoadBalance {
    /// Keyed by device id
    #[serde(rename = "metricsTrainingLoadBalanceDTOMap")]
    pub metrics_training_load_balance: Option<BTreeMap<String, DeviceLoadBalance>>,
}

/// Monthly load per intensity bucket with the device's target band
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceLoadBalance {
    pub monthly_load_aerobic_low: Option<f64>,
    pub monthly_load_aerobic_low_target_min: Option<f64>,
    pub monthly_load_aerobic_low_target_max: Option<f64>,
    pub monthly_load_aerobic_high: Option<f64>,
    pub monthly_load_aerobic_high_target_min: Option<f64>,
    pub monthly_load_aerobic_high_target_max: Option<f64>,
    pub monthly_load_anaerobic: Option<f64>,
    pub monthly_load_anaerobic_target_min: Option<f64>,
    pub monthly_load_anaerobic_target_max: Option<f64>,
    pub training_balance_feedback_phrase: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrvPayload {
    pub hrv_summary: Option<HrvSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HrvSummary {
    pub last_night_avg: Option<f64>,
    pub weekly_avg: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepPayload {
    #[serde(rename = "dailySleepDTO")]
    pub daily_sleep: Option<DailySleep>,
    pub sleep_scores: Option<SleepScores>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySleep {
    pub sleep_time_seconds: Option<f64>,
    pub deep_sleep_seconds: Option<f64>,
    pub light_sleep_seconds: Option<f64>,
    pub rem_sleep_seconds: Option<f64>,
    pub awake_sleep_seconds: Option<f64>,
    /// Epoch milliseconds of the local wall-clock time
    pub sleep_start_timestamp_local: Option<i64>,
    pub sleep_end_timestamp_local: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SleepScores {
    pub overall: Option<ScoreValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreValue {
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartRatePayload {
    pub resting_heart_rate: Option<i64>,
    pub max_heart_rate: Option<i64>,
    pub min_heart_rate: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BodyBatteryDay {
    pub charged: Option<i64>,
    pub drained: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressPayload {
    pub overall_stress_level: Option<i64>,
    pub max_stress_level: Option<i64>,
}

/// Source of daily provider summaries.
///
/// `Ok(None)` means the provider has no data for the date; `Err` is a fetch
/// failure for that category only.
pub trait TelemetryProvider {
    fn training_readiness(&self, date: NaiveDate) -> Result<Option<TrainingReadinessPayload>, ProviderError>;
    fn training_status(&self, date: NaiveDate) -> Result<Option<TrainingStatusPayload>, ProviderError>;
    fn hrv(&self, date: NaiveDate) -> Result<Option<HrvPayload>, ProviderError>;
    fn sleep(&self, date: NaiveDate) -> Result<Option<SleepPayload>, ProviderError>;
    fn heart_rate(&self, date: NaiveDate) -> Result<Option<HeartRatePayload>, ProviderError>;
    fn body_battery(&self, date: NaiveDate) -> Result<Option<Vec<BodyBatteryDay>>, ProviderError>;
    fn stress(&self, date: NaiveDate) -> Result<Option<StressPayload>, ProviderError>;
}

/// Provider backed by a directory of JSON exports
pub struct JsonDumpProvider {
    root: PathBuf,
}

impl JsonDumpProvider {
    /// Open an export directory
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, ProviderError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ProviderError::Unavailable { path: root });
        }
        Ok(JsonDumpProvider { root })
    }

    pub fn path_for(&self, date: NaiveDate, category: Category) -> PathBuf {
        self.root
            .join(date.format("%Y-%m-%d").to_string())
            .join(format!("{}.json", category.file_stem()))
    }

    fn load<T: DeserializeOwned>(&self, date: NaiveDate, category: Category) -> Result<Option<T>, ProviderError> {
        let path = self.path_for(date, category);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| ProviderError::ReadFailed {
            category: category.to_string(),
            date: date.to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str::<Option<T>>(&content).map_err(|e| ProviderError::Malformed {
            category: category.to_string(),
            date: date.to_string(),
            reason: e.to_string(),
        })
    }
}

impl TelemetryProvider for JsonDumpProvider {
    fn training_readiness(&self, date: NaiveDate) -> Result<Option<TrainingReadinessPayload>, ProviderError> {
        self.load(date, Category::TrainingReadiness)
    }

    fn training_status(&self, date: NaiveDate) -> Result<Option<TrainingStatusPayload>, ProviderError> {
        self.load(date, Category::TrainingStatus)
    }

    fn hrv(&self, date: NaiveDate) -> Result<Option<HrvPayload>, ProviderError> {
        self.load(date, Category::Hrv)
    }

    fn sleep(&self, date: NaiveDate) -> Result<Option<SleepPayload>, ProviderError> {
        self.load(date, Category::Sleep)
    }

    fn heart_rate(&self, date: NaiveDate) -> Result<Option<HeartRatePayload>, ProviderError> {
        self.load(date, Category::HeartRate)
    }

    fn body_battery(&self, date: NaiveDate) -> Result<Option<Vec<BodyBatteryDay>>, ProviderError> {
        self.load(date, Category::BodyBattery)
    }

    fn stress(&self, date: NaiveDate) -> Result<Option<StressPayload>, ProviderError> {
        self.load(date, Category::Stress)
    }
}

/// Per-category outcome of collecting one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionReport {
    /// Categories that returned data
    pub fetched: Vec<Category>,
    /// Categories the provider had nothing for
    pub empty: Vec<Category>,
    /// Categories whose fetch failed, with the reason
    pub failed: Vec<(Category, String)>,
}

impl CollectionReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A collected day and how its categories fared
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedDay {
    pub metrics: DailyMetrics,
    pub report: CollectionReport,
}

fn to_u8(value: Option<i64>) -> Option<u8> {
    value.and_then(|v| u8::try_from(v).ok())
}

fn to_u16(value: Option<i64>) -> Option<u16> {
    value.and_then(|v| u16::try_from(v).ok())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Provider dates are `YYYY-MM-DD`, sometimes with a time suffix
fn to_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| s.get(..10).and_then(|d| d.parse().ok()))
}

/// Local-clock epoch milliseconds to a time of day, whole seconds
fn local_millis_to_time(millis: Option<i64>) -> Option<NaiveTime> {
    millis
        .and_then(DateTime::from_timestamp_millis)
        .and_then(|dt| dt.time().with_nanosecond(0))
}

/// A label that may arrive as a string or a number
fn to_label(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Seconds to rounded units, treating zero as "not reported"
fn seconds_to(seconds: Option<f64>, per_unit: f64, decimals: i32) -> Option<f64> {
    seconds
        .filter(|s| *s > 0.0)
        .map(|s| round_to(s / per_unit, decimals))
}

/// Builds [`DailyMetrics`] from a provider, one isolated category at a time
pub struct DailyMetricsCollector<P: TelemetryProvider> {
    provider: P,
}

impl<P: TelemetryProvider> DailyMetricsCollector<P> {
    pub fn new(provider: P) -> Self {
        DailyMetricsCollector { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Collect every category for a date
    pub fn collect(&self, date: NaiveDate) -> CollectedDay {
        let mut metrics = DailyMetrics::new(date);
        let mut report = CollectionReport::default();

        if let Some(p) = Self::fetch(Category::TrainingReadiness, date, &mut report, || {
            self.provider.training_readiness(date)
        }) {
            apply_training_readiness(&mut metrics, p);
        }
        if let Some(p) = Self::fetch(Category::TrainingStatus, date, &mut report, || {
            self.provider.training_status(date)
        }) {
            apply_training_status(&mut metrics, p);
        }
        if let Some(p) = Self::fetch(Category::Hrv, date, &mut report, || self.provider.hrv(date)) {
            apply_hrv(&mut metrics, p);
        }
        if let Some(p) = Self::fetch(Category::Sleep, date, &mut report, || self.provider.sleep(date)) {
            apply_sleep(&mut metrics, p);
        }
        if let Some(p) = Self::fetch(Category::HeartRate, date, &mut report, || {
            self.provider.heart_rate(date)
        }) {
            apply_heart_rate(&mut metrics, p);
        }
        if let Some(p) = Self::fetch(Category::BodyBattery, date, &mut report, || {
            self.provider.body_battery(date)
        }) {
            apply_body_battery(&mut metrics, p);
        }
        if let Some(p) = Self::fetch(Category::Stress, date, &mut report, || self.provider.stress(date)) {
            apply_stress(&mut metrics, p);
        }

        debug!(
            date = %date,
            fields = metrics.populated_fields(),
            failed = report.failed.len(),
            "Collected daily metrics"
        );

        CollectedDay { metrics, report }
    }

    fn fetch<T, F>(category: Category, date: NaiveDate, report: &mut CollectionReport, fetch: F) -> Option<T>
    where
        F: FnOnce() -> Result<Option<T>, ProviderError>,
    {
        match fetch() {
            Ok(Some(payload)) => {
                report.fetched.push(category);
                Some(payload)
            }
            Ok(None) => {
                report.empty.push(category);
                None
            }
            Err(e) => {
                warn!(category = %category, date = %date, error = %e, "Category fetch failed, leaving it empty");
                report.failed.push((category, e.to_string()));
                None
            }
        }
    }
}

/// Outcome of importing a date range into the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Days written to the store
    pub stored: usize,
    /// Days stored with at least one failed category
    pub partial: usize,
    /// Days the provider had nothing for
    pub skipped: usize,
    /// Days that could not be written, with the reason
    pub failed: Vec<(NaiveDate, String)>,
}

/// Collect every day of `range` and upsert it into the store.
///
/// Days with no data at all are skipped. A failed write is recorded and the
/// import moves on to the next day. `on_day` is called after each day.
pub fn import_range<P, F>(
    collector: &DailyMetricsCollector<P>,
    db: &mut Database,
    range: &DateRange,
    mut on_day: F,
) -> ImportSummary
where
    P: TelemetryProvider,
    F: FnMut(&CollectedDay),
{
    let mut summary = ImportSummary::default();

    for date in range.days() {
        let collected = collector.collect(date);

        if collected.metrics.populated_fields() == 0 {
            debug!(date = %date, "No provider data, skipping day");
            summary.skipped += 1;
        } else {
            match db.upsert_daily_metrics(&collected.metrics) {
                Ok(()) => {
                    summary.stored += 1;
                    if !collected.report.is_complete() {
                        summary.partial += 1;
                    }
                }
                Err(e) => {
                    warn!(date = %date, error = %e, "Failed to store daily metrics");
                    summary.failed.push((date, e.to_string()));
                }
            }
        }

        on_day(&collected);
    }

    summary
}

fn apply_training_readiness(m: &mut DailyMetrics, p: TrainingReadinessPayload) {
    m.device_readiness_score = to_u8(p.score);
    m.device_readiness_level = p.level_key.or(p.level);
    m.device_recovery_minutes = p.recovery_time_in_minutes.and_then(|v| u32::try_from(v).ok());
    m.device_readiness_sleep_score = to_u8(p.sleep_score);
    m.device_readiness_sleep_history = to_u8(p.sleep_history_score);
    m.device_readiness_hrv_status = to_label(p.hrv_status);
    m.device_readiness_stress_history = to_u8(p.stress_history_score);
    m.device_readiness_acute_load = p.acute_training_load;
}

fn apply_training_status(m: &mut DailyMetrics, p: TrainingStatusPayload) {
    if let Some(generic) = p.most_recent_vo2_max.and_then(|v| v.generic) {
        m.vo2_max = generic
            .vo2_max_precise_value
            .filter(|v| *v > 0.0)
            .or(generic.vo2_max_value);
        m.vo2_max_date = to_date(generic.calendar_date);
    }

    // First device in the map
    let device = p
        .most_recent_training_status
        .and_then(|s| s.latest_training_status_data)
        .and_then(|data| data.into_values().next());

    if let Some(device) = device {
        m.training_status = device.training_status.map(TrainingStatus::from_code);
        m.training_feedback = device.training_status_feedback_phrase;
        m.status_since = to_date(device.since_date);

        if let Some(load) = device.acute_training_load {
            m.acute_load = load.daily_training_load_acute;
            m.chronic_load = load.daily_training_load_chronic;
            m.acwr = load.daily_acute_chronic_workload_ratio;
            m.acwr_status = load.acwr_status;
            m.acwr_percent = to_u16(load.acwr_percent);
        }
    }

    let balance = p
        .most_recent_training_load_balance
        .and_then(|b| b.metrics_training_load_balance)
        .and_then(|data| data.into_values().next());

    if let Some(balance) = balance {
        m.aerobic_low = balance.monthly_load_aerobic_low;
        m.aerobic_low_target_min = balance.monthly_load_aerobic_low_target_min;
        m.aerobic_low_target_max = balance.monthly_load_aerobic_low_target_max;
        m.aerobic_high = balance.monthly_load_aerobic_high;
        m.aerobic_high_target_min = balance.monthly_load_aerobic_high_target_min;
        m.aerobic_high_target_max = balance.monthly_load_aerobic_high_target_max;
        m.anaerobic = balance.monthly_load_anaerobic;
        m.anaerobic_target_min = balance.monthly_load_anaerobic_target_min;
        m.anaerobic_target_max = balance.monthly_load_anaerobic_target_max;
        m.balance_feedback = balance.training_balance_feedback_phrase;
    }
}

fn apply_hrv(m: &mut DailyMetrics, p: HrvPayload) {
    if let Some(summary) = p.hrv_summary {
        m.hrv_last_night = summary.last_night_avg;
        m.hrv_weekly_avg = summary.weekly_avg;
        m.hrv_status = summary.status;
    }
}

fn apply_sleep(m: &mut DailyMetrics, p: SleepPayload) {
    if let Some(daily) = p.daily_sleep {
        m.sleep_hours = seconds_to(daily.sleep_time_seconds, 3600.0, 2);
        m.deep_sleep_mins = seconds_to(daily.deep_sleep_seconds, 60.0, 1);
        m.light_sleep_mins = seconds_to(daily.light_sleep_seconds, 60.0, 1);
        m.rem_sleep_mins = seconds_to(daily.rem_sleep_seconds, 60.0, 1);
        m.awake_mins = seconds_to(daily.awake_sleep_seconds, 60.0, 1);
        m.sleep_start = local_millis_to_time(daily.sleep_start_timestamp_local);
        m.sleep_end = local_millis_to_time(daily.sleep_end_timestamp_local);
    }
    m.sleep_score = to_u8(p.sleep_scores.and_then(|s| s.overall).and_then(|o| o.value));
}

fn apply_heart_rate(m: &mut DailyMetrics, p: HeartRatePayload) {
    m.resting_hr = to_u16(p.resting_heart_rate);
    m.max_hr = to_u16(p.max_heart_rate);
    m.min_hr = to_u16(p.min_heart_rate);
}

fn apply_body_battery(m: &mut DailyMetrics, days: Vec<BodyBatteryDay>) {
    if let Some(day) = days.into_iter().next() {
        m.body_battery_charged = to_u8(day.charged);
        m.body_battery_drained = to_u8(day.drained);
    }
}

fn apply_stress(m: &mut DailyMetrics, p: StressPayload) {
    // negative levels mean "not enough data" on the provider side
    m.avg_stress = to_u8(p.overall_stress_level);
    m.max_stress = to_u8(p.max_stress_level);
}
