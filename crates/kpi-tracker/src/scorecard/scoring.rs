use super::domain::{CountData, KpiRecord, Measurement, RatioData, StageData, TimeData};
use super::numeric::{format_percent, parse_datetime, parse_number, round_half_up_2};
use serde::{Serialize, Serializer};
use std::fmt;

/// Percentage points lost for each day (or part of a day) past the target date.
pub const DAILY_LATE_PENALTY: f64 = 0.27;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Achievement of a record against its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    /// Inputs are missing or unusable; rendered as `-`.
    Unscored,
    /// Clamped to `0.0..=100.0`.
    Achieved(f64),
}

impl Score {
    fn capped(percent: f64) -> Self {
        if percent.is_finite() {
            Self::Achieved(percent.clamp(0.0, 100.0))
        } else {
            Self::Unscored
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Achieved(value) => Some(value),
            Self::Unscored => None,
        }
    }

    pub fn met_target(self) -> bool {
        matches!(self, Self::Achieved(value) if value >= 100.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unscored => f.write_str("-"),
            Self::Achieved(value) => f.write_str(&format_percent(*value)),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn score(record: &KpiRecord) -> Score {
    score_measurement(&record.target, &record.measurement)
}

pub fn score_measurement(target: &str, measurement: &Measurement) -> Score {
    match measurement {
        Measurement::Count(data) => score_count(target, data),
        Measurement::Ratio(data) => score_ratio(target, data),
        Measurement::MinimumRatio(data) => score_minimum_ratio(target, data),
        Measurement::Time(data) => score_time(target, data),
        Measurement::StageProgress(data) => score_stage(data),
        Measurement::Unrecognized { .. } => Score::Unscored,
    }
}

pub fn score_count(target: &str, data: &CountData) -> Score {
    let (Some(target), Some(achieved)) = (parse_number(target), parse_number(&data.achieved))
    else {
        return Score::Unscored;
    };
    if target <= 0.0 {
        return Score::Unscored;
    }
    Score::capped(achieved / target * 100.0)
}

/// `x / y` as a percentage, when `y` is positive and both sides parse.
pub fn ratio_actual(data: &RatioData) -> Option<f64> {
    let denominator = parse_number(&data.denominator)?;
    let numerator = parse_number(&data.numerator)?;
    if denominator <= 0.0 {
        return None;
    }
    Some(numerator / denominator * 100.0)
}

/// Higher is better. With a positive target, reaching the target is full marks.
pub fn score_ratio(target: &str, data: &RatioData) -> Score {
    let Some(raw) = ratio_actual(data) else {
        return Score::Unscored;
    };
    match parse_number(target) {
        Some(target) if target > 0.0 => {
            if raw >= target {
                Score::capped(100.0)
            } else {
                Score::capped(raw / target * 100.0)
            }
        }
        _ => Score::capped(raw),
    }
}

/// Lower is better: spending up to `target` percent of the allocation is full
/// marks, and the score falls linearly to zero as spend approaches 100%.
///
/// A target of 100 or more leaves no penalty band, so anything over the
/// target scores zero.
pub fn score_minimum_ratio(target: &str, data: &RatioData) -> Score {
    let (Some(actual), Some(target)) = (ratio_actual(data), parse_number(target)) else {
        return Score::Unscored;
    };
    if actual <= target {
        return Score::capped(100.0);
    }
    if target >= 100.0 {
        return Score::capped(0.0);
    }
    let margin = 100.0 - target;
    let excess = actual - target;
    let penalty_ratio = excess / margin;
    Score::capped(round_half_up_2((1.0 - penalty_ratio) * 100.0).max(0.0))
}

pub fn score_time(target: &str, data: &TimeData) -> Score {
    let (Some(due), Some(achieved)) = (parse_datetime(target), parse_datetime(&data.achieved_date))
    else {
        return Score::Unscored;
    };
    let late_ms = (achieved - due).num_milliseconds();
    if late_ms <= 0 {
        return Score::capped(100.0);
    }
    let days_late = (late_ms as f64 / MS_PER_DAY).ceil();
    Score::capped(100.0 - days_late * DAILY_LATE_PENALTY)
}

pub fn score_stage(data: &StageData) -> Score {
    data.selected_stage()
        .and_then(|stage| parse_number(&stage.percent))
        .map(Score::capped)
        .unwrap_or(Score::Unscored)
}
