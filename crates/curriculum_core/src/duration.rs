//! Duration parsing, unit conversion and normalization.
//!
//! # Responsibility
//! - Parse `"<number> <Unit>"` duration text.
//! - Pick the nicest unit for a typed value and convert between units.
//!
//! # Invariants
//! - Values are rounded to one decimal place.
//! - Normalization is idempotent: normalizing its own output is a no-op.
//! - Empty, non-numeric or non-positive input clears the duration (`None`),
//!   as does input that rounds to zero or overflows.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+)?|\.\d+)\s*([A-Za-z]+)\s*$").expect("valid duration regex")
});

/// Supported duration units, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DurationUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 4] = [
        DurationUnit::Minutes,
        DurationUnit::Hours,
        DurationUnit::Days,
        DurationUnit::Weeks,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minutes => "Minutes",
            Self::Hours => "Hours",
            Self::Days => "Days",
            Self::Weeks => "Weeks",
        }
    }

    /// Parses a unit name: case-insensitive, singular or plural, common
    /// abbreviations (`min`, `hr`, `wk`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "minute" | "minutes" | "min" | "mins" => Some(Self::Minutes),
            "hour" | "hours" | "hr" | "hrs" => Some(Self::Hours),
            "day" | "days" => Some(Self::Days),
            "week" | "weeks" | "wk" | "wks" => Some(Self::Weeks),
            _ => None,
        }
    }

    /// Length of one unit in minutes.
    pub fn minutes(self) -> f64 {
        match self {
            Self::Minutes => 1.0,
            Self::Hours => 60.0,
            Self::Days => 1_440.0,
            Self::Weeks => 10_080.0,
        }
    }

    fn larger(self) -> Option<Self> {
        match self {
            Self::Minutes => Some(Self::Hours),
            Self::Hours => Some(Self::Days),
            Self::Days => Some(Self::Weeks),
            Self::Weeks => None,
        }
    }
}

/// A numeric duration in one unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationValue {
    pub value: f64,
    pub unit: DurationUnit,
}

impl DurationValue {
    pub fn total_minutes(&self) -> f64 {
        self.value * self.unit.minutes()
    }
}

impl Display for DurationValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", round_one_decimal(self.value), self.unit.as_str())
    }
}

/// Rounds to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Parses stored duration text such as `"1.5 Hours"`.
pub fn parse_duration(text: &str) -> Option<DurationValue> {
    let captures = DURATION_RE.captures(text)?;
    let value = captures.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = DurationUnit::parse(captures.get(2)?.as_str())?;
    Some(DurationValue { value, unit })
}

/// Converts `value` between units, rounded to one decimal.
pub fn convert_duration(value: f64, from: DurationUnit, to: DurationUnit) -> f64 {
    round_one_decimal(value * from.minutes() / to.minutes())
}

/// Re-expresses `value` in the nicest unit: the largest unit the value
/// reaches at least once (weeks from 10080 minutes).
pub fn normalize(value: f64, unit: DurationUnit) -> DurationValue {
    let total = value * unit.minutes();
    let mut chosen = DurationUnit::ALL
        .into_iter()
        .rev()
        .find(|candidate| total >= candidate.minutes())
        .unwrap_or(DurationUnit::Minutes);
    let mut rounded = round_one_decimal(total / chosen.minutes());

    // Rounding can land exactly on the next unit (59.97 minutes -> 60.0).
    if let Some(next) = chosen.larger() {
        if rounded * chosen.minutes() >= next.minutes() {
            rounded = round_one_decimal(rounded * chosen.minutes() / next.minutes());
            chosen = next;
        }
    }

    DurationValue {
        value: rounded,
        unit: chosen,
    }
}

/// Normalizes raw editor input typed against `unit`.
///
/// Accepts a bare number (`"90"`) or a number with its own unit
/// (`"90 minutes"`). Returns `None` to clear the field.
pub fn normalize_input(raw: &str, unit: DurationUnit) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let typed = match trimmed.parse::<f64>() {
        Ok(value) => DurationValue { value, unit },
        Err(_) => parse_duration(trimmed)?,
    };
    if !typed.value.is_finite() || typed.value <= 0.0 {
        return None;
    }
    // Rounding can reach zero and unit scaling can overflow.
    let normalized = normalize(typed.value, typed.unit);
    if !normalized.value.is_finite() || normalized.value <= 0.0 {
        return None;
    }
    Some(normalized.to_string())
}

/// Normalizes stored duration text; `None` when it does not parse.
pub fn normalize_text(text: &str) -> Option<String> {
    let parsed = parse_duration(text)?;
    normalize_input(&parsed.value.to_string(), parsed.unit)
}

/// Re-expresses stored duration text in `to` after an explicit unit change.
pub fn change_unit(text: &str, to: DurationUnit) -> Option<String> {
    let parsed = parse_duration(text)?;
    let value = convert_duration(parsed.value, parsed.unit, to);
    Some(DurationValue { value, unit: to }.to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        change_unit, convert_duration, normalize_input, normalize_text, parse_duration,
        DurationUnit,
    };

    #[test]
    fn ninety_minutes_becomes_hours() {
        assert_eq!(
            normalize_input("90", DurationUnit::Minutes).as_deref(),
            Some("1.5 Hours")
        );
    }

    #[test]
    fn large_minute_counts_become_weeks() {
        assert_eq!(
            normalize_input("10080", DurationUnit::Minutes).as_deref(),
            Some("1 Weeks")
        );
        assert_eq!(
            normalize_input("36", DurationUnit::Hours).as_deref(),
            Some("1.5 Days")
        );
    }

    #[test]
    fn small_values_step_down() {
        assert_eq!(
            normalize_input("0.5", DurationUnit::Hours).as_deref(),
            Some("30 Minutes")
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        assert_eq!(normalize_text("2 Hours").as_deref(), Some("2 Hours"));
        for raw in ["59.97", "90", "1439.99", "10070", "45"] {
            let once = normalize_input(raw, DurationUnit::Minutes).unwrap();
            assert_eq!(normalize_text(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn rounding_onto_next_unit_bumps_the_unit() {
        assert_eq!(
            normalize_input("59.97", DurationUnit::Minutes).as_deref(),
            Some("1 Hours")
        );
    }

    #[test]
    fn empty_or_non_numeric_input_clears() {
        assert_eq!(normalize_input("", DurationUnit::Minutes), None);
        assert_eq!(normalize_input("  ", DurationUnit::Hours), None);
        assert_eq!(normalize_input("soon", DurationUnit::Hours), None);
        assert_eq!(normalize_input("0", DurationUnit::Hours), None);
        assert_eq!(normalize_input("0.01", DurationUnit::Minutes), None);
        assert_eq!(normalize_input("1e308", DurationUnit::Weeks), None);
        assert_eq!(normalize_text("0.04 Minutes"), None);
    }

    #[test]
    fn parse_accepts_singular_and_case_variants() {
        let parsed = parse_duration("1 hour").unwrap();
        assert_eq!(parsed.unit, DurationUnit::Hours);
        assert_eq!(parsed.value, 1.0);
        assert!(parse_duration("2 semesters").is_none());
    }

    #[test]
    fn explicit_unit_change_converts_without_normalizing() {
        assert_eq!(convert_duration(90.0, DurationUnit::Minutes, DurationUnit::Hours), 1.5);
        assert_eq!(
            change_unit("2 Hours", DurationUnit::Minutes).as_deref(),
            Some("120 Minutes")
        );
        assert_eq!(
            change_unit("1 Days", DurationUnit::Weeks).as_deref(),
            Some("0.1 Weeks")
        );
    }
}
