//! Training readiness scoring
//!
//! Combines the normalized sub-scores of up to five factors into a single
//! 0-100 readiness score and classifies it into a [`ReadinessLevel`].
//!
//! # Factors and weights
//!
//! | Factor        | Default weight | Needs overnight wear |
//! |---------------|----------------|----------------------|
//! | ACWR          | 25             | no                   |
//! | Sleep         | 25             | no                   |
//! | HRV           | 20             | yes                  |
//! | Resting HR    | 15             | yes                  |
//! | Body Battery  | 15             | yes                  |
//!
//! Weights are renormalized over the factors actually available for the day,
//! so a day scored only from ACWR and sleep uses a 50/50 split instead of
//! being penalized for the absent weight. When no factor is available the
//! readiness is undetermined and no score is produced.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::{CalculationError, Result};
use crate::models::DailyMetrics;
use crate::normalizer::{FactorScore, SignalNormalizer};
use crate::wear::watch_worn;

/// Readiness factors, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Acwr,
    Sleep,
    Hrv,
    RestingHr,
    BodyBattery,
}

impl Factor {
    /// All factors in fixed display order
    pub const ALL: [Factor; 5] = [
        Factor::Acwr,
        Factor::Sleep,
        Factor::Hrv,
        Factor::RestingHr,
        Factor::BodyBattery,
    ];

    /// Short key used in configuration and JSON output
    pub fn key(&self) -> &'static str {
        match self {
            Factor::Acwr => "acwr",
            Factor::Sleep => "sleep",
            Factor::Hrv => "hrv",
            Factor::RestingHr => "rhr",
            Factor::BodyBattery => "bb",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Factor::Acwr => "Training Load (ACWR)",
            Factor::Sleep => "Sleep",
            Factor::Hrv => "HRV",
            Factor::RestingHr => "Resting HR",
            Factor::BodyBattery => "Body Battery",
        }
    }

    /// Whether the factor can only be measured with the watch worn overnight
    pub fn requires_wear(&self) -> bool {
        matches!(self, Factor::Hrv | Factor::RestingHr | Factor::BodyBattery)
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Relative factor weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorWeights {
    pub acwr: f64,
    pub sleep: f64,
    pub hrv: f64,
    pub rhr: f64,
    pub bb: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        FactorWeights {
            acwr: 25.0,
            sleep: 25.0,
            hrv: 20.0,
            rhr: 15.0,
            bb: 15.0,
        }
    }
}

impl FactorWeights {
    pub fn weight(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Acwr => self.acwr,
            Factor::Sleep => self.sleep,
            Factor::Hrv => self.hrv,
            Factor::RestingHr => self.rhr,
            Factor::BodyBattery => self.bb,
        }
    }

    pub fn set_weight(&mut self, factor: Factor, weight: f64) {
        match factor {
            Factor::Acwr => self.acwr = weight,
            Factor::Sleep => self.sleep = weight,
            Factor::Hrv => self.hrv = weight,
            Factor::RestingHr => self.rhr = weight,
            Factor::BodyBattery => self.bb = weight,
        }
    }

    /// Reject negative, non-finite, or all-zero weights
    pub fn validate(&self) -> std::result::Result<(), CalculationError> {
        for factor in Factor::ALL {
            let value = self.weight(factor);
            if !value.is_finite() || value < 0.0 {
                return Err(CalculationError::InvalidWeight {
                    factor: factor.key().to_string(),
                    value,
                });
            }
        }

        let total: f64 = Factor::ALL.iter().map(|f| self.weight(*f)).sum();
        if total <= 0.0 {
            return Err(CalculationError::ZeroWeights);
        }

        Ok(())
    }
}

/// Readiness scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Factor weights
    pub weights: FactorWeights,

    /// Personal resting heart rate baseline in bpm (default: 44)
    pub rhr_baseline: f64,

    /// HRV score used when a reading exists but no baseline does (default: 60)
    pub hrv_neutral_score: f64,

    /// Lower bound of the optimal ACWR band (default: 0.8)
    pub acwr_optimal_low: f64,

    /// Upper bound of the optimal ACWR band (default: 1.3)
    pub acwr_optimal_high: f64,

    /// ACWR distance above the band at which the score reaches zero (default: 0.7)
    pub acwr_decay_span: f64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        ReadinessConfig {
            weights: FactorWeights::default(),
            rhr_baseline: 44.0,
            hrv_neutral_score: 60.0,
            acwr_optimal_low: 0.8,
            acwr_optimal_high: 1.3,
            acwr_decay_span: 0.7,
        }
    }
}

impl ReadinessConfig {
    pub fn validate(&self) -> std::result::Result<(), CalculationError> {
        self.weights.validate()?;

        if !self.rhr_baseline.is_finite() || self.rhr_baseline <= 0.0 {
            return Err(invalid("rhr_baseline", self.rhr_baseline, "must be a positive bpm value"));
        }
        if !(0.0..=100.0).contains(&self.hrv_neutral_score) {
            return Err(invalid("hrv_neutral_score", self.hrv_neutral_score, "must be within 0-100"));
        }
        if !self.acwr_optimal_low.is_finite() || self.acwr_optimal_low <= 0.0 {
            return Err(invalid("acwr_optimal_low", self.acwr_optimal_low, "must be positive"));
        }
        if !self.acwr_optimal_high.is_finite() || self.acwr_optimal_high < self.acwr_optimal_low {
            return Err(invalid(
                "acwr_optimal_high",
                self.acwr_optimal_high,
                "must not be below acwr_optimal_low",
            ));
        }
        if !self.acwr_decay_span.is_finite() || self.acwr_decay_span <= 0.0 {
            return Err(invalid("acwr_decay_span", self.acwr_decay_span, "must be positive"));
        }

        Ok(())
    }
}

fn invalid(parameter: &str, value: f64, reason: &str) -> CalculationError {
    CalculationError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Qualitative readiness classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessLevel {
    Prime,    // 80 and above
    Moderate, // 60 to 79
    Low,      // 40 to 59
    Poor,     // below 40
}

impl ReadinessLevel {
    /// Classify a rounded readiness score. Each band includes its lower bound.
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            ReadinessLevel::Prime
        } else if score >= 60 {
            ReadinessLevel::Moderate
        } else if score >= 40 {
            ReadinessLevel::Low
        } else {
            ReadinessLevel::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadinessLevel::Prime => "PRIME",
            ReadinessLevel::Moderate => "MODERATE",
            ReadinessLevel::Low => "LOW",
            ReadinessLevel::Poor => "POOR",
        }
    }

    /// Training advice for the level
    pub fn advice(&self) -> &'static str {
        match self {
            ReadinessLevel::Prime => "Ready to train hard",
            ReadinessLevel::Moderate => "OK for normal training, avoid max efforts",
            ReadinessLevel::Low => "Fatigued, keep it light or rest",
            ReadinessLevel::Poor => "Consider a rest day",
        }
    }
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Availability of one factor for a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FactorStatus {
    /// Factor participated in the weighted score
    Scored(FactorScore),
    /// Overnight factor excluded because the watch was not worn
    NoWatchData,
    /// Input absent for any other reason
    Missing,
}

/// One line of the factor breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub factor: Factor,
    pub weight: f64,
    pub status: FactorStatus,
}

impl FactorBreakdown {
    pub fn score(&self) -> Option<f64> {
        match &self.status {
            FactorStatus::Scored(s) => Some(s.score),
            _ => None,
        }
    }
}

/// A determined readiness score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessTotal {
    /// Weighted composite rounded to the nearest integer
    pub score: u8,

    /// Unrounded weighted composite
    pub weighted: f64,

    pub level: ReadinessLevel,
}

/// Readiness for one day. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessResult {
    pub date: NaiveDate,

    /// Whether the watch was worn overnight
    pub watch_worn: bool,

    /// Breakdown of all five factors in display order
    pub factors: Vec<FactorBreakdown>,

    /// `None` when no factor was available ("not enough data")
    pub total: Option<ReadinessTotal>,
}

impl ReadinessResult {
    pub fn is_determined(&self) -> bool {
        self.total.is_some()
    }

    pub fn score(&self) -> Option<u8> {
        self.total.map(|t| t.score)
    }

    pub fn level(&self) -> Option<ReadinessLevel> {
        self.total.map(|t| t.level)
    }

    /// Sub-scores of the factors that participated
    pub fn sub_scores(&self) -> BTreeMap<Factor, f64> {
        self.factors
            .iter()
            .filter_map(|b| b.score().map(|s| (b.factor, s)))
            .collect()
    }

    pub fn factor(&self, factor: Factor) -> Option<&FactorBreakdown> {
        self.factors.iter().find(|b| b.factor == factor)
    }
}

/// Weighted mean of the available sub-scores, renormalized over their weights.
///
/// Returns `None` when nothing is available or the available weights sum to zero.
pub fn combine_scores(scores: &[(Factor, f64)], weights: &FactorWeights) -> Option<f64> {
    let weight_sum: f64 = scores.iter().map(|(f, _)| weights.weight(*f)).sum();
    if scores.is_empty() || weight_sum <= 0.0 {
        return None;
    }

    let weighted: f64 = scores
        .iter()
        .map(|(f, score)| score * weights.weight(*f))
        .sum();

    Some(weighted / weight_sum)
}

/// Records of `history` dated within the `window_days` days ending on `day`
/// (inclusive), in their original order.
pub fn trailing_window(day: NaiveDate, history: &[DailyMetrics], window_days: u32) -> Vec<DailyMetrics> {
    history
        .iter()
        .filter(|d| d.date <= day && (day - d.date).num_days() < i64::from(window_days))
        .cloned()
        .collect()
}

/// Readiness scoring engine
#[derive(Debug, Clone)]
pub struct ReadinessCalculator {
    config: ReadinessConfig,
}

impl ReadinessCalculator {
    /// Create a calculator with default configuration
    pub fn new() -> Self {
        ReadinessCalculator {
            config: ReadinessConfig::default(),
        }
    }

    /// Create a calculator with a custom configuration, validating it first
    pub fn with_config(config: ReadinessConfig) -> Result<Self> {
        config.validate()?;
        Ok(ReadinessCalculator { config })
    }

    pub fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    /// Score one day.
    ///
    /// `window` holds the days before it (see [`trailing_window`]) and is
    /// only used to derive an HRV baseline when the device did not report a
    /// weekly average. It may be empty.
    pub fn assess(&self, day: &DailyMetrics, window: &[DailyMetrics]) -> ReadinessResult {
        let worn = watch_worn(day);
        let weights = &self.config.weights;

        let factors: Vec<FactorBreakdown> = Factor::ALL
            .iter()
            .map(|factor| {
                let status = if factor.requires_wear() && !worn {
                    FactorStatus::NoWatchData
                } else {
                    match self.score_factor(*factor, day, window) {
                        Some(score) => FactorStatus::Scored(score),
                        None => FactorStatus::Missing,
                    }
                };
                FactorBreakdown {
                    factor: *factor,
                    weight: weights.weight(*factor),
                    status,
                }
            })
            .collect();

        let available: Vec<(Factor, f64)> = factors
            .iter()
            .filter_map(|b| b.score().map(|s| (b.factor, s)))
            .collect();

        let total = combine_scores(&available, weights).map(|weighted| {
            let score = weighted.round().clamp(0.0, 100.0) as u8;
            ReadinessTotal {
                score,
                weighted,
                level: ReadinessLevel::from_score(score),
            }
        });

        debug!(
            date = %day.date,
            watch_worn = worn,
            factors = available.len(),
            score = ?total.map(|t| t.score),
            "Assessed readiness"
        );

        ReadinessResult {
            date: day.date,
            watch_worn: worn,
            factors,
            total,
        }
    }

    fn score_factor(&self, factor: Factor, day: &DailyMetrics, window: &[DailyMetrics]) -> Option<FactorScore> {
        match factor {
            Factor::Acwr => day
                .acwr
                .filter(|v| v.is_finite())
                .map(|acwr| SignalNormalizer::acwr_score(acwr, &self.config)),
            Factor::Sleep => SignalNormalizer::sleep_score(day.sleep_score, day.sleep_hours),
            Factor::Hrv => day.hrv_last_night.map(|hrv| {
                let baseline = Self::hrv_baseline(day, window);
                SignalNormalizer::hrv_score(hrv, baseline, &self.config)
            }),
            Factor::RestingHr => day
                .resting_hr
                .map(|rhr| SignalNormalizer::resting_hr_score(rhr, &self.config)),
            Factor::BodyBattery => day
                .body_battery_charged
                .map(SignalNormalizer::body_battery_score),
        }
    }

    /// Score `day` against the `window_days` trailing window of `history`
    /// ending on it
    pub fn assess_in_history(&self, day: &DailyMetrics, history: &[DailyMetrics], window_days: u32) -> ReadinessResult {
        let window = trailing_window(day.date, history, window_days);
        self.assess(day, &window)
    }

    /// HRV baseline for a day: the device weekly average, or else the mean of
    /// last-night HRV over the worn days of the trailing window before it.
    /// The scored day and anything after it never contribute.
    pub fn hrv_baseline(day: &DailyMetrics, window: &[DailyMetrics]) -> Option<f64> {
        if let Some(avg) = day.hrv_weekly_avg.filter(|v| v.is_finite() && *v > 0.0) {
            return Some(avg);
        }

        let values: Vec<f64> = window
            .iter()
            .filter(|d| d.date < day.date && watch_worn(d))
            .filter_map(|d| d.hrv_last_night)
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }
}

impl Default for ReadinessCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn full_day() -> DailyMetrics {
        DailyMetrics {
            acwr: Some(1.0),
            sleep_score: Some(85),
            hrv_last_night: Some(55.0),
            hrv_weekly_avg: Some(50.0),
            resting_hr: Some(46),
            body_battery_charged: Some(75),
            body_battery_drained: Some(60),
            ..DailyMetrics::new(date(7))
        }
    }

    #[test]
    fn test_full_day_scores_all_factors() {
        let result = ReadinessCalculator::new().assess(&full_day(), &[]);
        let subs = result.sub_scores();

        assert!(result.watch_worn);
        assert_eq!(subs.len(), 5);
        assert_eq!(subs[&Factor::Acwr], 100.0);
        assert_eq!(subs[&Factor::Sleep], 85.0);
        assert_eq!(subs[&Factor::Hrv], 100.0);
        assert_eq!(subs[&Factor::RestingHr], 90.0);
        assert!((subs[&Factor::BodyBattery] - 92.5).abs() < 1e-9);

        // (100*25 + 85*25 + 100*20 + 90*15 + 92.5*15) / 100
        let total = result.total.unwrap();
        assert!((total.weighted - 93.625).abs() < 1e-9);
        assert_eq!(total.score, 94);
        assert_eq!(total.level, ReadinessLevel::Prime);
    }

    #[test]
    fn test_renormalizes_over_available_weights() {
        let weights = FactorWeights::default();
        let total = combine_scores(&[(Factor::Acwr, 100.0), (Factor::Sleep, 50.0)], &weights).unwrap();
        assert_eq!(total, 75.0);
    }

    #[test]
    fn test_combine_nothing_available() {
        assert!(combine_scores(&[], &FactorWeights::default()).is_none());

        let mut weights = FactorWeights::default();
        weights.acwr = 0.0;
        assert!(combine_scores(&[(Factor::Acwr, 90.0)], &weights).is_none());
    }

    #[test]
    fn test_no_data_is_undetermined() {
        let result = ReadinessCalculator::new().assess(&DailyMetrics::new(date(7)), &[]);

        assert!(!result.is_determined());
        assert_eq!(result.score(), None);
        assert_eq!(result.level(), None);
        assert!(result.sub_scores().is_empty());
        assert_eq!(result.factors.len(), 5);
    }

    #[test]
    fn test_unworn_day_excludes_overnight_factors() {
        let mut day = full_day();
        day.body_battery_drained = Some(0);

        let result = ReadinessCalculator::new().assess(&day, &[]);
        assert!(!result.watch_worn);

        let subs = result.sub_scores();
        assert_eq!(subs.len(), 2);
        assert!(!subs.contains_key(&Factor::Hrv));
        assert!(!subs.contains_key(&Factor::RestingHr));
        assert!(!subs.contains_key(&Factor::BodyBattery));

        for factor in [Factor::Hrv, Factor::RestingHr, Factor::BodyBattery] {
            assert_eq!(result.factor(factor).unwrap().status, FactorStatus::NoWatchData);
        }

        // ACWR 100 and sleep 85, equal weights
        let total = result.total.unwrap();
        assert!((total.weighted - 92.5).abs() < 1e-9);
        assert_eq!(total.score, 93);
    }

    #[test]
    fn test_missing_factor_distinct_from_unworn() {
        let mut day = full_day();
        day.resting_hr = None;

        let result = ReadinessCalculator::new().assess(&day, &[]);
        assert!(result.watch_worn);
        assert_eq!(result.factor(Factor::RestingHr).unwrap().status, FactorStatus::Missing);
        assert_eq!(result.sub_scores().len(), 4);
    }

    #[test]
    fn test_breakdown_order_is_fixed() {
        let result = ReadinessCalculator::new().assess(&full_day(), &[]);
        let order: Vec<Factor> = result.factors.iter().map(|b| b.factor).collect();
        assert_eq!(order, Factor::ALL.to_vec());
    }

    #[test]
    fn test_level_boundaries() {
        assert_eq!(ReadinessLevel::from_score(100), ReadinessLevel::Prime);
        assert_eq!(ReadinessLevel::from_score(80), ReadinessLevel::Prime);
        assert_eq!(ReadinessLevel::from_score(79), ReadinessLevel::Moderate);
        assert_eq!(ReadinessLevel::from_score(60), ReadinessLevel::Moderate);
        assert_eq!(ReadinessLevel::from_score(59), ReadinessLevel::Low);
        assert_eq!(ReadinessLevel::from_score(40), ReadinessLevel::Low);
        assert_eq!(ReadinessLevel::from_score(39), ReadinessLevel::Poor);
        assert_eq!(ReadinessLevel::from_score(0), ReadinessLevel::Poor);
    }

    #[test]
    fn test_level_uses_rounded_score() {
        // ACWR 100, sleep 59 => 79.5, rounds to 80
        let day = DailyMetrics {
            acwr: Some(1.0),
            sleep_score: Some(59),
            ..DailyMetrics::new(date(7))
        };
        let total = ReadinessCalculator::new().assess(&day, &[]).total.unwrap();
        assert_eq!(total.score, 80);
        assert_eq!(total.level, ReadinessLevel::Prime);
    }

    #[test]
    fn test_hrv_baseline_from_window() {
        let mut day = full_day();
        day.hrv_weekly_avg = None;
        day.hrv_last_night = Some(50.0);

        let mut window = Vec::new();
        for d in 1..7 {
            let mut prior = DailyMetrics::new(date(d));
            prior.hrv_last_night = Some(if d == 3 { 200.0 } else { 50.0 });
            prior.body_battery_drained = Some(if d == 3 { 0 } else { 40 });
            window.push(prior);
        }

        // The unworn day 3 is ignored
        let baseline = ReadinessCalculator::hrv_baseline(&day, &window).unwrap();
        assert_eq!(baseline, 50.0);

        let result = ReadinessCalculator::new().assess(&day, &window);
        assert!((result.sub_scores()[&Factor::Hrv] - 80.0).abs() < 1e-9);
    }

    fn hrv_only_day(d: u32, hrv: f64) -> DailyMetrics {
        DailyMetrics {
            acwr: Some(1.0),
            sleep_score: Some(80),
            hrv_last_night: Some(hrv),
            body_battery_drained: Some(40),
            ..DailyMetrics::new(date(d))
        }
    }

    #[test]
    fn test_trailing_window_bounds() {
        let history: Vec<DailyMetrics> = (1..=10).map(|d| hrv_only_day(d, 50.0)).collect();

        let window = trailing_window(date(8), &history, 7);
        let dates: Vec<NaiveDate> = window.iter().map(|d| d.date).collect();
        assert_eq!(dates, (2..=8).map(date).collect::<Vec<_>>());

        assert!(trailing_window(date(8), &history, 0).is_empty());
        assert_eq!(trailing_window(date(8), &history, 1).len(), 1);
    }

    #[test]
    fn test_later_days_never_shift_the_baseline() {
        // weaker nights first, stronger nights after the scored day
        let history: Vec<DailyMetrics> = (1..=7)
            .map(|d| hrv_only_day(d, if d <= 3 { 40.0 } else { 70.0 }))
            .collect();
        let calculator = ReadinessCalculator::new();

        let in_history = calculator.assess_in_history(&history[2], &history, 7);
        let prior_only = calculator.assess(&history[2], &history[..2]);
        assert_eq!(in_history, prior_only);

        // baseline 40 from days 1-2, ratio 1.0
        assert_eq!(in_history.sub_scores()[&Factor::Hrv], 80.0);

        // the whole week passed directly still ignores days 4-7
        assert_eq!(calculator.assess(&history[2], &history), in_history);
    }

    #[test]
    fn test_hrv_without_any_baseline_is_neutral() {
        let mut day = full_day();
        day.hrv_weekly_avg = None;

        // The scored day never serves as its own baseline
        let window = vec![day.clone()];
        assert_eq!(ReadinessCalculator::hrv_baseline(&day, &window), None);

        let result = ReadinessCalculator::new().assess(&day, &window);
        let hrv = result.factor(Factor::Hrv).unwrap();
        assert_eq!(hrv.score(), Some(60.0));
    }

    #[test]
    fn test_hrv_neutral_score_is_configurable() {
        let mut config = ReadinessConfig::default();
        config.hrv_neutral_score = 50.0;
        let calculator = ReadinessCalculator::with_config(config).unwrap();

        let mut day = full_day();
        day.hrv_weekly_avg = Some(f64::NAN);
        let result = calculator.assess(&day, &[]);
        assert_eq!(result.sub_scores()[&Factor::Hrv], 50.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ReadinessConfig::default();
        config.weights.hrv = -5.0;
        assert!(ReadinessCalculator::with_config(config).is_err());

        let mut config = ReadinessConfig::default();
        config.weights = FactorWeights {
            acwr: 0.0,
            sleep: 0.0,
            hrv: 0.0,
            rhr: 0.0,
            bb: 0.0,
        };
        assert!(matches!(config.validate(), Err(CalculationError::ZeroWeights)));

        let mut config = ReadinessConfig::default();
        config.acwr_optimal_high = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_weights() {
        let mut config = ReadinessConfig::default();
        config.weights.sleep = 75.0;
        let calculator = ReadinessCalculator::with_config(config).unwrap();

        let day = DailyMetrics {
            acwr: Some(1.0),
            sleep_score: Some(60),
            ..DailyMetrics::new(date(7))
        };
        // (100*25 + 60*75) / 100
        assert_eq!(calculator.assess(&day, &[]).score(), Some(70));
    }
}
