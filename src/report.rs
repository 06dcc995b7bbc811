//! Text and JSON rendering of readiness and trend reports

use colored::Colorize;
use serde::Serialize;
use std::fmt::{self, Write};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::{ReadyRsError, Result};
use crate::readiness::{FactorStatus, ReadinessLevel, ReadinessResult};
use crate::trend::{TrendReport, TrendRow};

const PLACEHOLDER: &str = "-";
const NO_WATCH: &str = "no watch";

/// Colour a level label for terminal output
pub fn colorize_level(level: ReadinessLevel) -> String {
    match level {
        ReadinessLevel::Prime => level.label().green().bold().to_string(),
        ReadinessLevel::Moderate => level.label().yellow().bold().to_string(),
        ReadinessLevel::Low => level.label().truecolor(255, 140, 0).bold().to_string(),
        ReadinessLevel::Poor => level.label().red().bold().to_string(),
    }
}

/// Single-day readiness report
pub fn render_readiness(result: &ReadinessResult, color: bool) -> Result<String> {
    let mut out = String::new();
    write_readiness(&mut out, result, color).map_err(render_error)?;
    Ok(out)
}

fn render_error(e: fmt::Error) -> ReadyRsError {
    ReadyRsError::Serialization(format!("Failed to render report: {}", e))
}

/// Write the single-day report to any formatter sink
pub fn write_readiness<W: Write>(out: &mut W, result: &ReadinessResult, color: bool) -> fmt::Result {
    let title = format!("TRAINING READINESS {}", result.date.format("%Y-%m-%d"));
    if color {
        writeln!(out, "{}", title.bold())?;
    } else {
        writeln!(out, "{}", title)?;
    }
    writeln!(out, "{:=<48}", "")?;

    match result.total {
        Some(total) => {
            let level = if color {
                colorize_level(total.level)
            } else {
                total.level.label().to_string()
            };
            writeln!(out, "Score: {}/100  {}", total.score, level)?;
            writeln!(out, "{}", total.level.advice())?;
        }
        None => {
            writeln!(out, "Not enough data to compute readiness")?;
        }
    }

    if !result.watch_worn {
        writeln!(out, "Watch not worn overnight: HRV, resting HR and Body Battery excluded")?;
    }

    writeln!(out)?;
    writeln!(out, "{:<22} {:>6}  {}", "Factor", "Score", "Detail")?;
    writeln!(out, "{:-<48}", "")?;

    for breakdown in &result.factors {
        let (score, detail) = match &breakdown.status {
            FactorStatus::Scored(s) => (format!("{:.0}", s.score), s.detail.clone()),
            FactorStatus::NoWatchData => (PLACEHOLDER.to_string(), "no watch data".to_string()),
            FactorStatus::Missing => (PLACEHOLDER.to_string(), "no data".to_string()),
        };
        writeln!(out, "{:<22} {:>6}  {}", breakdown.factor.label(), score, detail)?;
    }

    Ok(())
}

/// One rendered line of the trend table
#[derive(Tabled)]
struct TrendTableRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Load")]
    load: String,
    #[tabled(rename = "ACWR")]
    acwr: String,
    #[tabled(rename = "Sleep h")]
    sleep: String,
    #[tabled(rename = "RHR")]
    rhr: String,
    #[tabled(rename = "HRV")]
    hrv: String,
    #[tabled(rename = "BB")]
    body_battery: String,
    #[tabled(rename = "Readiness")]
    readiness: String,
}

fn fmt_opt<T, F: Fn(T) -> String>(value: Option<T>, f: F) -> String {
    value.map(f).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Overnight cell: "no watch" on unworn days that had a record
fn overnight<T, F: Fn(T) -> String>(row: &TrendRow, value: Option<T>, f: F) -> String {
    if !row.watch_worn && row.has_record {
        NO_WATCH.to_string()
    } else {
        fmt_opt(value, f)
    }
}

impl From<&TrendRow> for TrendTableRow {
    fn from(row: &TrendRow) -> Self {
        let mut date = row.date.format("%a %Y-%m-%d").to_string();
        if !row.has_record {
            date.push_str(" (no record)");
        } else if !row.watch_worn {
            date.push_str(" (not worn)");
        }

        TrendTableRow {
            date,
            load: fmt_opt(row.acute_load, |v| format!("{:.0}", v)),
            acwr: fmt_opt(row.acwr, |v| format!("{:.2}", v)),
            sleep: fmt_opt(row.sleep_hours, |v| format!("{:.1}", v)),
            rhr: overnight(row, row.resting_hr, |v| v.to_string()),
            hrv: overnight(row, row.hrv, |v| format!("{:.0}", v)),
            body_battery: overnight(row, row.body_battery, |v| v.to_string()),
            readiness: match (row.readiness, row.level) {
                (Some(score), Some(level)) => format!("{} {}", score, level.label()),
                _ => PLACEHOLDER.to_string(),
            },
        }
    }
}

/// Multi-day trend table with its averages footer
pub fn render_trend(report: &TrendReport) -> Result<String> {
    let mut out = String::new();
    write_trend(&mut out, report).map_err(render_error)?;
    Ok(out)
}

/// Write the trend table and footer to any formatter sink
pub fn write_trend<W: Write>(out: &mut W, report: &TrendReport) -> fmt::Result {
    writeln!(out, "READINESS TREND {}", report.range)?;

    let rows: Vec<TrendTableRow> = report.rows.iter().map(TrendTableRow::from).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    writeln!(out, "{}", table)?;

    let avg = &report.averages;
    writeln!(out, "Window averages:")?;
    writeln!(
        out,
        "  Load {}  ACWR {}  Sleep {} h",
        fmt_opt(avg.acute_load, |v| format!("{:.0}", v)),
        fmt_opt(avg.acwr, |v| format!("{:.2}", v)),
        fmt_opt(avg.sleep_hours, |v| format!("{:.1}", v)),
    )?;
    writeln!(
        out,
        "  RHR {}  HRV {}  Body Battery {}  (worn days only)",
        fmt_opt(avg.resting_hr, |v| format!("{:.1}", v)),
        fmt_opt(avg.hrv, |v| format!("{:.1}", v)),
        fmt_opt(avg.body_battery, |v| format!("{:.1}", v)),
    )?;
    writeln!(
        out,
        "  Readiness {}",
        fmt_opt(avg.readiness, |v| format!("{:.0}", v))
    )?;

    if report.excluded_days > 0 {
        writeln!(
            out,
            "{} of {} day(s) excluded from overnight averages (watch not worn or no record)",
            report.excluded_days,
            report.rows.len()
        )?;
    }

    Ok(())
}

/// Pretty JSON for any report structure
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ReadyRsError::Serialization(e.to_string()))
}
