use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use readyrs::config::AppConfig;
use readyrs::database::Database;
use readyrs::export::{self, ExportFormat};
use readyrs::models::{DailyMetrics, DateRange};
use readyrs::provider::{import_range, DailyMetricsCollector, JsonDumpProvider};
use readyrs::readiness::{trailing_window, Factor, FactorStatus, ReadinessCalculator, ReadinessLevel};
use readyrs::report;
use readyrs::trend::TrendAnalyzer;

/// Integration tests covering import, storage, scoring and reporting together

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn week() -> DateRange {
    DateRange::new(day(1), day(7)).unwrap()
}

fn write_category(root: &Path, date: NaiveDate, stem: &str, body: &str) {
    let dir = root.join(date.format("%Y-%m-%d").to_string());
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.json", stem)), body).unwrap();
}

/// Seven days of provider exports. Days 3 and 6 have no HRV export.
fn write_week_dump(root: &Path) {
    for d in 1..=7 {
        let date = day(d);

        write_category(
            root,
            date,
            "training_status",
            r#"{"mostRecentTrainingStatus": {"latestTrainingStatusData": {"1": {
                "trainingStatus": 3,
                "acuteTrainingLoadDTO": {
                    "dailyTrainingLoadAcute": 500,
                    "dailyTrainingLoadChronic": 500,
                    "dailyAcuteChronicWorkloadRatio": 1.0
                }
            }}}}"#,
        );
        write_category(
            root,
            date,
            "sleep",
            r#"{"dailySleepDTO": {"sleepTimeSeconds": 27000}, "sleepScores": {"overall": {"value": 85}}}"#,
        );
        write_category(root, date, "heart_rate", r#"{"restingHeartRate": 46}"#);
        write_category(root, date, "body_battery", r#"[{"charged": 75, "drained": 40}]"#);

        if d != 3 && d != 6 {
            write_category(
                root,
                date,
                "hrv",
                r#"{"hrvSummary": {"lastNightAvg": 55, "weeklyAvg": 50, "status": "BALANCED"}}"#,
            );
        }
    }
}

fn imported_week() -> (tempfile::TempDir, Database) {
    let dir = tempdir().unwrap();
    let dump = dir.path().join("dump");
    write_week_dump(&dump);

    let collector = DailyMetricsCollector::new(JsonDumpProvider::open(&dump).unwrap());
    let mut db = Database::new(dir.path().join("readyrs.db")).unwrap();

    let summary = import_range(&collector, &mut db, &week(), |_| {});
    assert_eq!(summary.stored, 7);
    assert_eq!(summary.partial, 0);

    (dir, db)
}

#[test]
fn test_import_then_score_full_day() {
    let (_dir, db) = imported_week();

    let window = db.query_range(&DateRange::trailing(day(7), 7).unwrap()).unwrap();
    let record = db.get_daily_metrics(day(7)).unwrap().unwrap();

    assert_eq!(record.sleep_hours, Some(7.5));
    assert_eq!(window.len(), 7);

    let result = ReadinessCalculator::new().assess(&record, &window);

    assert!(result.watch_worn);
    let sub = result.sub_scores();
    assert_eq!(sub[&Factor::Acwr], 100.0);
    assert_eq!(sub[&Factor::Sleep], 85.0);
    assert_eq!(sub[&Factor::Hrv], 100.0);
    assert_eq!(sub[&Factor::RestingHr], 90.0);
    assert_eq!(sub[&Factor::BodyBattery], 92.5);

    let total = result.total.unwrap();
    assert!((total.weighted - 93.625).abs() < 1e-9);
    assert_eq!(total.score, 94);
    assert_eq!(total.level, ReadinessLevel::Prime);
}

#[test]
fn test_unworn_day_scores_from_load_and_sleep() {
    let (_dir, db) = imported_week();

    let record = db.get_daily_metrics(day(3)).unwrap().unwrap();
    // raw overnight values are stored even though the day is unworn
    assert_eq!(record.resting_hr, Some(46));

    let result = ReadinessCalculator::new().assess(&record, &[]);

    assert!(!result.watch_worn);
    for factor in [Factor::Hrv, Factor::RestingHr, Factor::BodyBattery] {
        assert_eq!(result.factor(factor).unwrap().status, FactorStatus::NoWatchData);
    }
    // (100 * 25 + 85 * 25) / 50 = 92.5
    assert_eq!(result.score(), Some(93));
}

#[test]
fn test_trend_excludes_unworn_nights() {
    let (_dir, db) = imported_week();

    let records = db.query_range(&week()).unwrap();
    let trend = TrendAnalyzer::default().analyze(week(), &records);

    assert_eq!(trend.rows.len(), 7);
    assert_eq!(trend.excluded_days, 2);
    assert_eq!(trend.averages.hrv, Some(55.0));
    assert_eq!(trend.averages.resting_hr, Some(46.0));
    assert_eq!(trend.averages.sleep_hours, Some(7.5));
    assert_eq!(trend.averages.acwr, Some(1.0));

    let text = report::render_trend(&trend).unwrap();
    assert_eq!(text.matches("(not worn)").count(), 2);
    assert!(text.contains("2 of 7 day(s) excluded"));

    let json: serde_json::Value = serde_json::from_str(&report::to_json(&trend).unwrap()).unwrap();
    assert_eq!(json["excluded_days"], 2);
    assert_eq!(json["rows"][2]["watch_worn"], false);
    assert!(json["rows"][2]["hrv"].is_null());
}

#[test]
fn test_reimport_is_idempotent() {
    let (dir, mut db) = imported_week();

    let collector = DailyMetricsCollector::new(JsonDumpProvider::open(dir.path().join("dump")).unwrap());
    import_range(&collector, &mut db, &week(), |_| {});

    assert_eq!(db.count().unwrap(), 7);
    assert_eq!(db.latest_date().unwrap(), Some(day(7)));
}

#[test]
fn test_day_without_record_is_undetermined() {
    let (_dir, db) = imported_week();

    assert!(db.get_daily_metrics(day(20)).unwrap().is_none());

    let result = ReadinessCalculator::new().assess(&DailyMetrics::new(day(20)), &[]);
    assert!(!result.is_determined());

    let text = report::render_readiness(&result, false).unwrap();
    assert!(text.contains("Not enough data to compute readiness"));
}

#[test]
fn test_config_weights_drive_scoring() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
        [readiness.weights]
        acwr = 0.0
        sleep = 1.0
        hrv = 0.0
        rhr = 0.0
        bb = 0.0
        "#,
    )
    .unwrap();

    let config = AppConfig::load_or_default(Some(&config_path)).unwrap();
    let calculator = ReadinessCalculator::with_config(config.readiness).unwrap();

    let record = DailyMetrics {
        acwr: Some(2.0),
        sleep_score: Some(64),
        ..DailyMetrics::new(day(1))
    };

    let result = calculator.assess(&record, &[]);
    assert_eq!(result.score(), Some(64));
    assert_eq!(result.level(), Some(ReadinessLevel::Moderate));
}

#[test]
fn test_export_stored_week_to_csv() {
    let (dir, db) = imported_week();
    let output = dir.path().join("exports").join("week.csv");

    let records = db.query_range(&week()).unwrap();
    let rows = export::export_daily_metrics(
        &week(),
        &records,
        &ReadinessCalculator::new(),
        7,
        ExportFormat::from_path(&output),
        &output,
    )
    .unwrap();
    assert_eq!(rows, 7);

    let back = export::csv::read_rows(&output).unwrap();
    assert_eq!(back.len(), 7);
    assert_eq!(back[0].date, "2024-03-01");
    assert_eq!(back[0].readiness_score, Some(94));
    assert!(!back[2].watch_worn);
    assert_eq!(back[2].training_status.as_deref(), Some("MAINTAINING"));
}

/// Seven stored days without a device weekly HRV average: weaker nights on
/// days 1-3, stronger ones on days 4-7.
fn stored_week_without_weekly_hrv() -> Database {
    let mut db = Database::in_memory().unwrap();
    for d in 1..=7 {
        let record = DailyMetrics {
            acwr: Some(1.0),
            sleep_score: Some(80),
            hrv_last_night: Some(if d <= 3 { 40.0 } else { 70.0 }),
            resting_hr: Some(46),
            body_battery_charged: Some(70),
            body_battery_drained: Some(45),
            ..DailyMetrics::new(day(d))
        };
        db.upsert_daily_metrics(&record).unwrap();
    }
    db
}

#[test]
fn test_same_day_scores_identically_across_commands() {
    let db = stored_week_without_weekly_hrv();
    let calculator = ReadinessCalculator::new();
    let window_days = AppConfig::default().trend.window_days;

    // readiness command: trailing window ending on the day
    let history = db.query_range(&DateRange::trailing(day(3), window_days).unwrap()).unwrap();
    let record = db.get_daily_metrics(day(3)).unwrap().unwrap();
    let single = calculator.assess_in_history(&record, &history, window_days);

    // trend and export over the whole week, history looked back from its start
    let all = db.query_range(&week().with_lookback(window_days).unwrap()).unwrap();
    let trend = TrendAnalyzer::new(calculator.clone(), window_days).analyze(week(), &all);
    let rows = export::build_rows(&week(), &all, &calculator, window_days);

    let expected = calculator.assess(&record, &trailing_window(day(3), &all, window_days));
    assert_eq!(single, expected);
    assert_eq!(trend.rows[2].readiness, expected.score());
    assert_eq!(rows[2].readiness_score, expected.score());

    // days 4-7 did not pull the baseline up: 40ms against 40ms scores 80 for HRV
    assert_eq!(expected.sub_scores()[&Factor::Hrv], 80.0);

    for (row, export_row) in trend.rows.iter().zip(&rows) {
        let stored = db.get_daily_metrics(row.date).unwrap().unwrap();
        let window = trailing_window(row.date, &all, window_days);
        let score = calculator.assess(&stored, &window).score();
        assert_eq!(row.readiness, score);
        assert_eq!(export_row.readiness_score, score);
    }
}
