// ABOUTME: Body-mass-index resolution from provider body-composition entries
// ABOUTME: Latest reported BMI wins, otherwise weight over stored height squared within plausible bounds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use squad_core::constants::bmi::{GRAMS_THRESHOLD, MAX_PLAUSIBLE, MIN_PLAUSIBLE};

/// One body-composition measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightEntry {
    /// Day of the measurement
    pub date: NaiveDate,
    /// BMI reported by the provider
    pub bmi: Option<f64>,
    /// Weight in kilograms, or grams when above 500
    pub weight: Option<f64>,
}

/// Resolve a BMI from measurements in any order
///
/// Entries are scanned chronologically: the latest strictly-positive reported
/// BMI wins. Without one, the most recent positive weight is divided by
/// `height_m` squared; computed values outside (10, 60) are discarded.
/// Missing data yields `None`, never an error.
#[must_use]
pub fn resolve_bmi(entries: &[WeightEntry], height_m: Option<f64>) -> Option<f64> {
    let mut sorted: Vec<&WeightEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.date);

    let reported = sorted
        .iter()
        .rev()
        .filter_map(|entry| entry.bmi)
        .find(|bmi| bmi.is_finite() && *bmi > 0.0);
    if reported.is_some() {
        return reported;
    }

    let height = height_m.filter(|h| h.is_finite() && *h > 0.0)?;
    let weight = sorted
        .iter()
        .rev()
        .filter_map(|entry| entry.weight)
        .find(|w| w.is_finite() && *w > 0.0)?;

    let kg = if weight > GRAMS_THRESHOLD {
        weight / 1000.0
    } else {
        weight
    };
    let bmi = kg / (height * height);

    (bmi > MIN_PLAUSIBLE && bmi < MAX_PLAUSIBLE).then_some(bmi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn entry(d: u32, bmi: Option<f64>, weight: Option<f64>) -> WeightEntry {
        WeightEntry {
            date: day(d),
            bmi,
            weight,
        }
    }

    #[test]
    fn test_latest_reported_bmi_wins_regardless_of_input_order() {
        let entries = [
            entry(20, Some(23.9), None),
            entry(3, Some(24.4), Some(80.0)),
            entry(25, Some(0.0), Some(79.0)),
        ];
        assert_eq!(resolve_bmi(&entries, Some(1.8)), Some(23.9));
    }

    #[test]
    fn test_computes_from_grams_weight() {
        let entries = [entry(1, None, Some(81_000.0)), entry(9, None, Some(72_900.0))];
        let bmi = resolve_bmi(&entries, Some(1.8)).unwrap();
        assert!((bmi - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_discards_implausible_and_missing() {
        // 200 kg at 1.5 m is ~88.9
        assert_eq!(resolve_bmi(&[entry(1, None, Some(200.0))], Some(1.5)), None);
        assert_eq!(resolve_bmi(&[entry(1, None, Some(70.0))], None), None);
        assert_eq!(resolve_bmi(&[], Some(1.7)), None);
    }
}
