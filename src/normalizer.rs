//! Signal normalization
//!
//! Each physiological signal is mapped onto a 0-100 sub-score with a fixed,
//! piecewise-linear function. The mappings are pure and independent of each
//! other; every one also returns a short detail string describing the raw
//! value, for display next to the score.
//!
//! # Mappings
//!
//! - **ACWR**: 100 inside the optimal band (default 0.8-1.3), a linear ramp
//!   from 0 below it and a linear decay above it. Undertraining and
//!   overreaching both lower the score.
//! - **Sleep**: the device sleep score when present, otherwise an hours-based
//!   ramp that never drops below 10 once any sleep was recorded.
//! - **HRV**: last night's HRV relative to a baseline (the device's weekly
//!   average, or a caller-supplied fallback). Without any baseline a neutral
//!   score is used.
//! - **Resting HR**: elevation above a personal baseline costs 5 points per
//!   beat, floored at 10.
//! - **Body Battery**: overnight charge, floored at 5.

use serde::{Deserialize, Serialize};

use crate::readiness::ReadinessConfig;

/// A normalized sub-score together with its display detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    /// Sub-score in the 0-100 range
    pub score: f64,

    /// Human-readable description of the raw value
    pub detail: String,
}

impl FactorScore {
    fn new(score: f64, detail: impl Into<String>) -> Self {
        FactorScore {
            score: score.clamp(0.0, 100.0),
            detail: detail.into(),
        }
    }
}

/// Linear interpolation of `value` from `[from_lo, from_hi]` onto `[to_lo, to_hi]`
fn ramp(value: f64, from_lo: f64, from_hi: f64, to_lo: f64, to_hi: f64) -> f64 {
    to_lo + (value - from_lo) / (from_hi - from_lo) * (to_hi - to_lo)
}

/// Pure mapping functions from raw telemetry to sub-scores
pub struct SignalNormalizer;

impl SignalNormalizer {
    /// Score the acute:chronic workload ratio against the optimal band
    pub fn acwr_score(acwr: f64, config: &ReadinessConfig) -> FactorScore {
        let low = config.acwr_optimal_low;
        let high = config.acwr_optimal_high;

        let (score, zone) = if acwr < low {
            ((acwr / low * 100.0).max(0.0), "undertrained")
        } else if acwr <= high {
            (100.0, "optimal")
        } else {
            (
                (100.0 - (acwr - high) / config.acwr_decay_span * 100.0).max(0.0),
                "overreaching",
            )
        };

        FactorScore::new(
            score,
            format!("{:.2} ({}, target {:.1}-{:.1})", acwr, zone, low, high),
        )
    }

    /// Score sleep from the device score, falling back to sleep duration.
    ///
    /// Returns `None` when neither a device score nor any recorded sleep is
    /// available.
    pub fn sleep_score(sleep_score: Option<u8>, sleep_hours: Option<f64>) -> Option<FactorScore> {
        if let Some(device_score) = sleep_score {
            let capped = f64::from(device_score).min(100.0);
            let detail = match sleep_hours {
                Some(hours) if hours > 0.0 => format!("score {} ({:.1}h)", device_score, hours),
                _ => format!("score {}", device_score),
            };
            return Some(FactorScore::new(capped, detail));
        }

        let hours = sleep_hours.filter(|h| h.is_finite() && *h > 0.0)?;
        Some(FactorScore::new(
            Self::sleep_hours_score(hours),
            format!("{:.1}h (no device score)", hours),
        ))
    }

    /// Hours-based sleep ramp used when the device gives no score
    pub fn sleep_hours_score(hours: f64) -> f64 {
        if hours >= 8.0 {
            100.0
        } else if hours >= 7.0 {
            ramp(hours, 7.0, 8.0, 65.0, 100.0)
        } else if hours >= 6.0 {
            ramp(hours, 6.0, 7.0, 40.0, 65.0)
        } else {
            (hours / 6.0 * 40.0).max(10.0)
        }
    }

    /// Score last night's HRV relative to a baseline.
    ///
    /// `baseline` is the device weekly average when known, otherwise whatever
    /// fallback the caller derived. A missing or non-positive baseline yields
    /// the configured neutral score instead of dropping the factor.
    pub fn hrv_score(last_night: f64, baseline: Option<f64>, config: &ReadinessConfig) -> FactorScore {
        let baseline = match baseline.filter(|b| b.is_finite() && *b > 0.0) {
            Some(b) => b,
            None => {
                return FactorScore::new(
                    config.hrv_neutral_score,
                    format!("{:.0}ms (no baseline)", last_night),
                );
            }
        };

        let ratio = last_night / baseline;
        let score = if ratio >= 1.1 {
            100.0
        } else if ratio >= 0.9 {
            ramp(ratio, 0.9, 1.1, 60.0, 100.0)
        } else {
            (ratio / 0.9 * 60.0).max(10.0)
        };

        FactorScore::new(
            score,
            format!(
                "{:.0}ms vs {:.0}ms avg ({:.0}%)",
                last_night,
                baseline,
                ratio * 100.0
            ),
        )
    }

    /// Score resting heart rate against the configured baseline
    pub fn resting_hr_score(resting_hr: u16, config: &ReadinessConfig) -> FactorScore {
        let diff = f64::from(resting_hr) - config.rhr_baseline;

        let score = if diff <= 0.0 {
            100.0
        } else if diff <= 4.0 {
            100.0 - diff * 5.0
        } else if diff <= 8.0 {
            80.0 - (diff - 4.0) * 5.0
        } else if diff <= 12.0 {
            60.0 - (diff - 8.0) * 5.0
        } else {
            (40.0 - (diff - 12.0) * 5.0).max(10.0)
        };

        FactorScore::new(
            score,
            format!(
                "{} bpm ({:+.0} vs baseline {:.0})",
                resting_hr, diff, config.rhr_baseline
            ),
        )
    }

    /// Score overnight Body Battery charge
    pub fn body_battery_score(charged: u8) -> FactorScore {
        let bb = f64::from(charged);

        let score = if bb >= 80.0 {
            100.0
        } else if bb >= 60.0 {
            ramp(bb, 60.0, 80.0, 70.0, 100.0)
        } else if bb >= 40.0 {
            ramp(bb, 40.0, 60.0, 40.0, 70.0)
        } else {
            (bb / 40.0 * 40.0).max(5.0)
        };

        FactorScore::new(score, format!("+{} charged", charged))
    }
}
