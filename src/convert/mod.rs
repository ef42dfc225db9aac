//! Measurement conversion between US cups, Belgian (metric) cups, and
//! millilitres. Pure arithmetic: 1 US cup = 240 ml, 1 Belgian cup = 250 ml.

use serde::{Deserialize, Serialize};

pub const US_CUP_ML: f64 = 240.0;
pub const BELGIAN_CUP_ML: f64 = 250.0;

/// Units accepted by the converter surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Unit {
    UsCup,
    BelgianCup,
    Millilitre,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::UsCup => "US cups",
            Unit::BelgianCup => "Belgian cups",
            Unit::Millilitre => "ml",
        }
    }

    fn to_millilitres(&self, amount: f64) -> f64 {
        match self {
            Unit::UsCup => amount * US_CUP_ML,
            Unit::BelgianCup => amount * BELGIAN_CUP_ML,
            Unit::Millilitre => amount,
        }
    }

    fn from_millilitres(&self, millilitres: f64) -> f64 {
        match self {
            Unit::UsCup => millilitres / US_CUP_ML,
            Unit::BelgianCup => millilitres / BELGIAN_CUP_ML,
            Unit::Millilitre => millilitres,
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "us" | "us-cup" | "us-cups" => Ok(Unit::UsCup),
            "belgian" | "belgian-cup" | "belgian-cups" => Ok(Unit::BelgianCup),
            "ml" | "millilitre" | "milliliter" => Ok(Unit::Millilitre),
            other => Err(format!("Unknown unit: {other}")),
        }
    }
}

/// Convert an amount between two units, via millilitres.
pub fn convert(amount: f64, from: Unit, to: Unit) -> f64 {
    to.from_millilitres(from.to_millilitres(amount))
}

pub fn metric_to_us_cups(millilitres: f64) -> f64 {
    millilitres / US_CUP_ML
}

pub fn us_cups_to_metric(cups: f64) -> f64 {
    cups * US_CUP_ML
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn test_belgian_cup_in_us_cups() {
        // 1 Belgian cup of 250 ml is a little over one US cup
        let us = convert(1.0, Unit::BelgianCup, Unit::UsCup);
        assert!((us - 250.0 / 240.0).abs() < TOLERANCE);
        assert!((us - 1.0417).abs() < 1e-4);
    }

    #[test]
    fn test_metric_us_round_trip() {
        let original = 375.0;
        let round_tripped = us_cups_to_metric(metric_to_us_cups(original));
        assert!((round_tripped - original).abs() < TOLERANCE);
    }

    #[test]
    fn test_cross_standard_round_trip() {
        let original = 2.5;
        let there = convert(original, Unit::UsCup, Unit::BelgianCup);
        let back = convert(there, Unit::BelgianCup, Unit::UsCup);
        assert!((back - original).abs() < TOLERANCE);
    }

    #[test]
    fn test_identity_conversion() {
        assert_eq!(convert(3.0, Unit::Millilitre, Unit::Millilitre), 3.0);
    }
}
