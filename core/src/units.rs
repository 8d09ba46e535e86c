//! Conversions between canonical pounds and every display representation.
//!
//! Pounds are the only stored quantity. Stones, decimal stones and kilograms are
//! always derived from them and never written back.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

pub const POUNDS_PER_STONE: f64 = 14.0;
pub const KG_PER_LB: f64 = 0.453_592;

/// Display unit selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Imperial,
    Metric,
}

impl Unit {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Imperial => "imperial",
            Self::Metric => "metric",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "imperial" | "st" | "stones" => Ok(Self::Imperial),
            "metric" | "kg" => Ok(Self::Metric),
            _ => bail!("Invalid unit '{s}'. Use 'imperial' or 'metric'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatStyle {
    #[default]
    Short,
    Long,
}

/// A canonical pounds value split into whole stones and remaining pounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StonesAndPounds {
    pub stones: i64,
    pub pounds: f64,
}

#[must_use]
pub fn stones_to_pounds(stones: f64, pounds: f64) -> f64 {
    stones * POUNDS_PER_STONE + pounds
}

/// `pounds` is always in `[0, 14)` and `stones * 14 + pounds == total`, including for
/// negative input (which decomposes towards negative infinity).
#[must_use]
pub fn pounds_to_stones(total: f64) -> StonesAndPounds {
    let mut pounds = total.rem_euclid(POUNDS_PER_STONE);
    // rem_euclid may round up to the divisor for tiny negative inputs
    if pounds >= POUNDS_PER_STONE {
        pounds = 0.0;
    }
    let stones = ((total - pounds) / POUNDS_PER_STONE).round() as i64;
    StonesAndPounds { stones, pounds }
}

#[must_use]
pub fn pounds_to_kg(total: f64) -> f64 {
    total * KG_PER_LB
}

/// Decimal stones rounded to two places, half-up (towards positive infinity).
#[must_use]
pub fn pounds_to_decimal_stones(total: f64) -> f64 {
    round_half_up(total / POUNDS_PER_STONE * 100.0) / 100.0
}

fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

#[must_use]
pub fn format_weight(total: f64, unit: Unit, style: FormatStyle) -> String {
    match (unit, style) {
        (Unit::Metric, FormatStyle::Short) => format!("{:.1} kg", pounds_to_kg(total)),
        (Unit::Metric, FormatStyle::Long) => format!("{:.2} kg", pounds_to_kg(total)),
        (Unit::Imperial, FormatStyle::Short) => {
            let sp = pounds_to_stones(total);
            format!("{} st {:.0} lbs", sp.stones, sp.pounds)
        }
        (Unit::Imperial, FormatStyle::Long) => {
            let sp = pounds_to_stones(total);
            format!("{} stones {:.1} pounds", sp.stones, sp.pounds)
        }
    }
}

/// The scalar plotted for a weight in the given unit: kilograms for metric, decimal
/// stones for imperial. Series points and the goal overlay share this projection.
#[must_use]
pub fn chart_value(total: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Metric => pounds_to_kg(total),
        Unit::Imperial => pounds_to_decimal_stones(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_stones_to_pounds() {
        assert!((stones_to_pounds(12.0, 5.5) - 173.5).abs() < EPS);
        assert!((stones_to_pounds(0.0, 0.0)).abs() < EPS);
        assert!((stones_to_pounds(1.0, 0.0) - 14.0).abs() < EPS);
    }

    #[test]
    fn test_pounds_to_stones_exact_multiple() {
        let sp = pounds_to_stones(28.0);
        assert_eq!(sp.stones, 2);
        assert_eq!(sp.pounds.to_bits(), 0.0_f64.to_bits());
    }

    #[test]
    fn test_pounds_to_stones_remainder() {
        let sp = pounds_to_stones(170.0);
        assert_eq!(sp.stones, 12);
        assert!((sp.pounds - 2.0).abs() < EPS);
    }

    #[test]
    fn test_pounds_to_stones_negative_does_not_panic() {
        let sp = pounds_to_stones(-1.0);
        assert_eq!(sp.stones, -1);
        assert!((sp.pounds - 13.0).abs() < EPS);
        assert!((stones_to_pounds(sp.stones as f64, sp.pounds) + 1.0).abs() < EPS);

        let tiny = pounds_to_stones(-1e-20);
        assert!((0.0..14.0).contains(&tiny.pounds));
    }

    #[test]
    fn test_pounds_to_stones_just_below_multiple() {
        let sp = pounds_to_stones(28.0 - 1e-12);
        assert_eq!(sp.stones, 1);
        assert!(sp.pounds < 14.0);
    }

    #[test]
    fn test_pounds_to_kg() {
        assert_eq!(pounds_to_kg(0.0), 0.0);
        assert!((pounds_to_kg(14.0) - 6.35029).abs() < 0.001);
        assert!((pounds_to_kg(1.0) - 0.453_592).abs() < EPS);
    }

    #[test]
    fn test_pounds_to_decimal_stones() {
        assert!((pounds_to_decimal_stones(14.0) - 1.00).abs() < EPS);
        assert!((pounds_to_decimal_stones(7.0) - 0.50).abs() < EPS);
        assert!((pounds_to_decimal_stones(170.0) - 12.14).abs() < EPS);
        // 0.125 st rounds half-up
        assert!((pounds_to_decimal_stones(1.75) - 0.13).abs() < EPS);
    }

    #[test]
    fn test_format_weight_metric() {
        assert_eq!(format_weight(14.0, Unit::Metric, FormatStyle::Short), "6.4 kg");
        assert_eq!(format_weight(14.0, Unit::Metric, FormatStyle::Long), "6.35 kg");
    }

    #[test]
    fn test_format_weight_imperial() {
        assert_eq!(
            format_weight(173.5, Unit::Imperial, FormatStyle::Long),
            "12 stones 5.5 pounds"
        );
        assert_eq!(
            format_weight(170.0, Unit::Imperial, FormatStyle::Short),
            "12 st 2 lbs"
        );
    }

    #[test]
    fn test_remainder_just_below_a_stone() {
        let sp = pounds_to_stones(stones_to_pounds(12.0, 13.999));
        assert_eq!(sp.stones, 12);
        assert!((sp.pounds - 13.999).abs() < EPS);
        let sp = pounds_to_stones(stones_to_pounds(12.0, 13.96));
        assert_eq!(sp.stones, 12);
        assert!((sp.pounds - 13.96).abs() < EPS);
    }

    #[test]
    fn test_chart_value() {
        assert!((chart_value(14.0, Unit::Imperial) - 1.0).abs() < EPS);
        assert!((chart_value(14.0, Unit::Metric) - 6.350_288).abs() < EPS);
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("imperial".parse::<Unit>().unwrap(), Unit::Imperial);
        assert_eq!("Metric".parse::<Unit>().unwrap(), Unit::Metric);
        assert_eq!("kg".parse::<Unit>().unwrap(), Unit::Metric);
        assert!("furlongs".parse::<Unit>().is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trip(stones in 0u32..60, pounds in 0.0f64..14.0) {
            let total = stones_to_pounds(f64::from(stones), pounds);
            let sp = pounds_to_stones(total);
            prop_assert_eq!(sp.stones, i64::from(stones));
            prop_assert!((sp.pounds - pounds).abs() < EPS);
        }

        #[test]
        fn prop_remainder_in_range(total in 0.0f64..10_000.0) {
            let sp = pounds_to_stones(total);
            prop_assert!(sp.pounds >= 0.0 && sp.pounds < 14.0);
            prop_assert!((stones_to_pounds(sp.stones as f64, sp.pounds) - total).abs() < EPS);
        }
    }
}
