//! Watch-worn detection
//!
//! HRV can only be captured with skin contact overnight, so a day without an
//! HRV reading is treated as "watch not worn". A Body Battery drain of exactly
//! zero alongside an HRV value is also treated as unworn: a device on the
//! wrist always drains something during the day.
//!
//! When a day is unworn, the overnight factors (HRV, resting HR, Body
//! Battery) are excluded from scoring and trend averages even if the record
//! happens to carry raw values for them.

use serde::{Deserialize, Serialize};

use crate::models::DailyMetrics;

/// Outcome of the wear heuristic for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WearStatus {
    Worn,
    NotWorn,
}

impl WearStatus {
    pub fn is_worn(&self) -> bool {
        matches!(self, WearStatus::Worn)
    }
}

/// Classify a day from its HRV and Body Battery drain values.
///
/// Worn iff HRV is present and the drain is either unknown or positive.
pub fn detect_wear(hrv_last_night: Option<f64>, body_battery_drained: Option<u8>) -> WearStatus {
    let hrv_present = hrv_last_night.is_some();
    let drain_ok = match body_battery_drained {
        None => true,
        Some(drained) => drained > 0,
    };

    if hrv_present && drain_ok {
        WearStatus::Worn
    } else {
        WearStatus::NotWorn
    }
}

/// Convenience wrapper over a full daily record
pub fn watch_worn(day: &DailyMetrics) -> bool {
    detect_wear(day.hrv_last_night, day.body_battery_drained).is_worn()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_hrv_with_drain_is_worn() {
        assert_eq!(detect_wear(Some(52.0), Some(38)), WearStatus::Worn);
    }

    #[test]
    fn test_hrv_without_drain_is_worn() {
        assert_eq!(detect_wear(Some(52.0), None), WearStatus::Worn);
    }

    #[test]
    fn test_missing_hrv_is_not_worn() {
        assert_eq!(detect_wear(None, Some(40)), WearStatus::NotWorn);
        assert_eq!(detect_wear(None, None), WearStatus::NotWorn);
    }

    #[test]
    fn test_zero_drain_is_not_worn() {
        assert_eq!(detect_wear(Some(52.0), Some(0)), WearStatus::NotWorn);
    }

    #[test]
    fn test_watch_worn_on_record() {
        let mut day = DailyMetrics::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(!watch_worn(&day));

        day.hrv_last_night = Some(47.0);
        day.body_battery_drained = Some(55);
        assert!(watch_worn(&day));
    }
}
