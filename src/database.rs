use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

use crate::models::{DailyMetrics, DateRange, TrainingStatus};

/// Database error types
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Stored columns, in insert order. `report_date` is the key.
const DAILY_METRICS_COLUMNS: [&str; 47] = [
    "report_date",
    "device_readiness_score",
    "device_readiness_level",
    "device_recovery_minutes",
    "readiness_sleep_score",
    "readiness_sleep_history",
    "readiness_hrv_status",
    "readiness_stress_history",
    "readiness_acute_load",
    "training_status",
    "training_feedback",
    "status_since",
    "vo2_max",
    "vo2_max_date",
    "acute_load",
    "chronic_load",
    "acwr_ratio",
    "acwr_status",
    "acwr_percent",
    "aerobic_low",
    "aerobic_low_target_min",
    "aerobic_low_target_max",
    "aerobic_high",
    "aerobic_high_target_min",
    "aerobic_high_target_max",
    "anaerobic",
    "anaerobic_target_min",
    "anaerobic_target_max",
    "balance_feedback",
    "hrv_last_night",
    "hrv_weekly_avg",
    "hrv_status",
    "sleep_score",
    "sleep_hours",
    "deep_sleep_mins",
    "light_sleep_mins",
    "rem_sleep_mins",
    "awake_mins",
    "sleep_start",
    "sleep_end",
    "resting_hr",
    "max_hr",
    "min_hr",
    "body_battery_charged",
    "body_battery_drained",
    "avg_stress",
    "max_stress",
];

const TIME_FORMAT: &str = "%H:%M:%S";

fn select_columns() -> String {
    DAILY_METRICS_COLUMNS.join(", ")
}

/// `INSERT ... ON CONFLICT DO UPDATE` over every column
fn upsert_sql() -> String {
    let placeholders: Vec<String> = (1..=DAILY_METRICS_COLUMNS.len())
        .map(|i| format!("?{}", i))
        .collect();
    let updates: Vec<String> = DAILY_METRICS_COLUMNS[1..]
        .iter()
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();

    format!(
        "INSERT INTO daily_metrics ({}) VALUES ({}) ON CONFLICT (report_date) DO UPDATE SET {}, updated_at = CURRENT_TIMESTAMP",
        select_columns(),
        placeholders.join(", "),
        updates.join(", ")
    )
}

/// Daily metrics store backed by SQLite
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create or open a database at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, DatabaseError> {
        let conn = Connection::open(db_path)?;
        let mut db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open a throwaway in-memory database
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema with tables and indexes
    fn init_schema(&mut self) -> Result<(), DatabaseError> {
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;

        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS daily_metrics (
                report_date TEXT PRIMARY KEY,

                -- Device readiness
                device_readiness_score INTEGER,
                device_readiness_level TEXT,
                device_recovery_minutes INTEGER,
                readiness_sleep_score INTEGER,
                readiness_sleep_history INTEGER,
                readiness_hrv_status TEXT,
                readiness_stress_history INTEGER,
                readiness_acute_load REAL,

                -- Training status
                training_status TEXT,
                training_feedback TEXT,
                status_since TEXT,
                vo2_max REAL,
                vo2_max_date TEXT,

                -- Training load
                acute_load REAL,
                chronic_load REAL,
                acwr_ratio REAL,
                acwr_status TEXT,
                acwr_percent INTEGER,

                -- Monthly load balance
                aerobic_low REAL,
                aerobic_low_target_min REAL,
                aerobic_low_target_max REAL,
                aerobic_high REAL,
                aerobic_high_target_min REAL,
                aerobic_high_target_max REAL,
                anaerobic REAL,
                anaerobic_target_min REAL,
                anaerobic_target_max REAL,
                balance_feedback TEXT,

                -- HRV
                hrv_last_night REAL,
                hrv_weekly_avg REAL,
                hrv_status TEXT,

                -- Sleep
                sleep_score INTEGER,
                sleep_hours REAL,
                deep_sleep_mins REAL,
                light_sleep_mins REAL,
                rem_sleep_mins REAL,
                awake_mins REAL,
                sleep_start TEXT,
                sleep_end TEXT,

                -- Heart rate
                resting_hr INTEGER,
                max_hr INTEGER,
                min_hr INTEGER,

                -- Body battery
                body_battery_charged INTEGER,
                body_battery_drained INTEGER,

                -- Stress
                avg_stress INTEGER,
                max_stress INTEGER,

                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        Ok(())
    }

    /// Insert a day, or overwrite the stored record for the same date
    pub fn upsert_daily_metrics(&mut self, day: &DailyMetrics) -> Result<(), DatabaseError> {
        let tx = self.conn.transaction()?;

        tx.execute(
            &upsert_sql(),
            params![
                day.date.to_string(),
                day.device_readiness_score,
                day.device_readiness_level,
                day.device_recovery_minutes,
                day.device_readiness_sleep_score,
                day.device_readiness_sleep_history,
                day.device_readiness_hrv_status,
                day.device_readiness_stress_history,
                day.device_readiness_acute_load,
                day.training_status.map(|s| s.label()),
                day.training_feedback,
                day.status_since.map(|d| d.to_string()),
                day.vo2_max,
                day.vo2_max_date.map(|d| d.to_string()),
                day.acute_load,
                day.chronic_load,
                day.acwr,
                day.acwr_status,
                day.acwr_percent,
                day.aerobic_low,
                day.aerobic_low_target_min,
                day.aerobic_low_target_max,
                day.aerobic_high,
                day.aerobic_high_target_min,
                day.aerobic_high_target_max,
                day.anaerobic,
                day.anaerobic_target_min,
                day.anaerobic_target_max,
                day.balance_feedback,
                day.hrv_last_night,
                day.hrv_weekly_avg,
                day.hrv_status,
                day.sleep_score,
                day.sleep_hours,
                day.deep_sleep_mins,
                day.light_sleep_mins,
                day.rem_sleep_mins,
                day.awake_mins,
                day.sleep_start.map(|t| t.format(TIME_FORMAT).to_string()),
                day.sleep_end.map(|t| t.format(TIME_FORMAT).to_string()),
                day.resting_hr,
                day.max_hr,
                day.min_hr,
                day.body_battery_charged,
                day.body_battery_drained,
                day.avg_stress,
                day.max_stress,
            ],
        )?;

        tx.commit()?;
        debug!(date = %day.date, "Stored daily metrics");
        Ok(())
    }

    /// Load the record for one date
    pub fn get_daily_metrics(&self, date: NaiveDate) -> Result<Option<DailyMetrics>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM daily_metrics WHERE report_date = ?1",
            select_columns()
        ))?;

        let day = stmt
            .query_row(params![date.to_string()], Self::daily_metrics_from_row)
            .optional()?;

        Ok(day)
    }

    /// Load every record in an inclusive date range, oldest first
    pub fn query_range(&self, range: &DateRange) -> Result<Vec<DailyMetrics>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM daily_metrics WHERE report_date >= ?1 AND report_date <= ?2 ORDER BY report_date ASC",
            select_columns()
        ))?;

        let rows = stmt.query_map(
            params![range.start.to_string(), range.end.to_string()],
            Self::daily_metrics_from_row,
        )?;

        let mut days = Vec::new();
        for row in rows {
            days.push(row?);
        }
        Ok(days)
    }

    /// Number of stored days
    pub fn count(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM daily_metrics", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Most recent stored date
    pub fn latest_date(&self) -> Result<Option<NaiveDate>, DatabaseError> {
        let latest: Option<String> = self
            .conn
            .query_row("SELECT MAX(report_date) FROM daily_metrics", [], |row| row.get(0))?;

        latest
            .map(|s| parse_date(&s))
            .transpose()
    }

    fn daily_metrics_from_row(row: &Row) -> rusqlite::Result<DailyMetrics> {
        let date_str: String = row.get("report_date")?;
        let date = parse_date(&date_str).map_err(|e| conversion_failure(0, e))?;
        let training_status: Option<String> = row.get("training_status")?;

        Ok(DailyMetrics {
            date,
            device_readiness_score: row.get("device_readiness_score")?,
            device_readiness_level: row.get("device_readiness_level")?,
            device_recovery_minutes: row.get("device_recovery_minutes")?,
            device_readiness_sleep_score: row.get("readiness_sleep_score")?,
            device_readiness_sleep_history: row.get("readiness_sleep_history")?,
            device_readiness_hrv_status: row.get("readiness_hrv_status")?,
            device_readiness_stress_history: row.get("readiness_stress_history")?,
            device_readiness_acute_load: row.get("readiness_acute_load")?,
            training_status: training_status.map(|s| TrainingStatus::from_label(&s)),
            training_feedback: row.get("training_feedback")?,
            status_since: optional_date(row, "status_since")?,
            vo2_max: row.get("vo2_max")?,
            vo2_max_date: optional_date(row, "vo2_max_date")?,
            acute_load: row.get("acute_load")?,
            chronic_load: row.get("chronic_load")?,
            acwr: row.get("acwr_ratio")?,
            acwr_status: row.get("acwr_status")?,
            acwr_percent: row.get("acwr_percent")?,
            aerobic_low: row.get("aerobic_low")?,
            aerobic_low_target_min: row.get("aerobic_low_target_min")?,
            aerobic_low_target_max: row.get("aerobic_low_target_max")?,
            aerobic_high: row.get("aerobic_high")?,
            aerobic_high_target_min: row.get("aerobic_high_target_min")?,
            aerobic_high_target_max: row.get("aerobic_high_target_max")?,
            anaerobic: row.get("anaerobic")?,
            anaerobic_target_min: row.get("anaerobic_target_min")?,
            anaerobic_target_max: row.get("anaerobic_target_max")?,
            balance_feedback: row.get("balance_feedback")?,
            hrv_last_night: row.get("hrv_last_night")?,
            hrv_weekly_avg: row.get("hrv_weekly_avg")?,
            hrv_status: row.get("hrv_status")?,
            sleep_score: row.get("sleep_score")?,
            sleep_hours: row.get("sleep_hours")?,
            deep_sleep_mins: row.get("deep_sleep_mins")?,
            light_sleep_mins: row.get("light_sleep_mins")?,
            rem_sleep_mins: row.get("rem_sleep_mins")?,
            awake_mins: row.get("awake_mins")?,
            sleep_start: optional_time(row, "sleep_start")?,
            sleep_end: optional_time(row, "sleep_end")?,
            resting_hr: row.get("resting_hr")?,
            max_hr: row.get("max_hr")?,
            min_hr: row.get("min_hr")?,
            body_battery_charged: row.get("body_battery_charged")?,
            body_battery_drained: row.get("body_battery_drained")?,
            avg_stress: row.get("avg_stress")?,
            max_stress: row.get("max_stress")?,
        })
    }
}

fn conversion_failure(index: usize, e: DatabaseError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
}

fn column_index(column: &str) -> usize {
    DAILY_METRICS_COLUMNS
        .iter()
        .position(|c| *c == column)
        .unwrap_or(0)
}

fn optional_date(row: &Row, column: &str) -> rusqlite::Result<Option<NaiveDate>> {
    let value: Option<String> = row.get(column)?;
    value
        .map(|s| parse_date(&s).map_err(|e| conversion_failure(column_index(column), e)))
        .transpose()
}

fn optional_time(row: &Row, column: &str) -> rusqlite::Result<Option<NaiveTime>> {
    let value: Option<String> = row.get(column)?;
    value
        .map(|s| {
            NaiveTime::parse_from_str(&s, TIME_FORMAT).map_err(|e| {
                conversion_failure(
                    column_index(column),
                    DatabaseError::SerializationError(format!("Invalid stored time {}: {}", s, e)),
                )
            })
        })
        .transpose()
}

fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::SerializationError(format!("Invalid stored date {}: {}", s, e)))
}
