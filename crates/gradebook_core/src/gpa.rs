//! Credit-weighted grade average engine.
//!
//! # Responsibility
//! - Compute per-semester and overall weighted averages and credit totals.
//! - Format averages as two-decimal strings.
//!
//! # Invariants
//! - All functions are pure; malformed inputs are excluded, never fatal.
//! - Rounding is half-away-from-zero at two fraction digits.
//! - A zero credit total always yields `"0.00"`.

use crate::model::semester::{EntryMode, SemesterRecord};
use crate::store::SemesterStore;

/// Running sums of credits and `credits * grade`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedTotals {
    pub credits: f64,
    pub weighted: f64,
}

impl WeightedTotals {
    fn add(&mut self, credits: f64, grade: f64) {
        self.credits += credits;
        self.weighted += credits * grade;
    }

    fn merge(&mut self, other: WeightedTotals) {
        self.credits += other.credits;
        self.weighted += other.weighted;
    }

    /// Weighted average, or `None` when no credits were accumulated.
    pub fn average(&self) -> Option<f64> {
        (self.credits > 0.0).then(|| self.weighted / self.credits)
    }

    /// Average formatted to two decimals, `"0.00"` when empty.
    pub fn formatted_average(&self) -> String {
        format_two_decimals(self.average().unwrap_or(0.0))
    }
}

/// Weighted contribution of one semester to the overall average.
///
/// - Detailed: every subject with credits > 0 and a whole grade in 1..=9.
/// - Manual: one contribution of `(manual credits, manual average)` when
///   both parse and the credits are positive.
pub fn semester_contribution(record: &SemesterRecord) -> WeightedTotals {
    let mut totals = WeightedTotals::default();
    match record.mode {
        EntryMode::Manual => {
            let gpa = record.manual_gpa.as_number();
            let credits = record.manual_total_credits.as_number();
            if let (Some(gpa), Some(credits)) = (gpa, credits) {
                if credits > 0.0 {
                    totals.add(credits, gpa);
                }
            }
        }
        EntryMode::Detailed => {
            for (credits, grade) in record.subjects.iter().filter_map(|s| s.weighted_pair()) {
                totals.add(credits, grade);
            }
        }
    }
    totals
}

/// Semester average as a two-decimal string.
///
/// Manual mode reports the entered average as-is (no range clamp) and
/// does not require a credit total.
pub fn semester_gpa(record: &SemesterRecord) -> String {
    match record.mode {
        EntryMode::Manual => format_two_decimals(record.manual_gpa.as_number().unwrap_or(0.0)),
        EntryMode::Detailed => semester_contribution(record).formatted_average(),
    }
}

/// Semester credit total.
///
/// Detailed mode counts every subject with positive credits, graded or
/// not; manual mode reports the entered total, `0` when unparsable.
pub fn semester_total_credits(record: &SemesterRecord) -> f64 {
    match record.mode {
        EntryMode::Manual => record.manual_total_credits.as_number().unwrap_or(0.0),
        EntryMode::Detailed => record
            .subjects
            .iter()
            .filter_map(|subject| subject.valid_credits())
            .sum(),
    }
}

/// Accumulated contributions of every semester in the store.
pub fn overall_totals(store: &SemesterStore) -> WeightedTotals {
    let mut totals = WeightedTotals::default();
    for (_, record) in store.iter() {
        totals.merge(semester_contribution(record));
    }
    totals
}

/// Overall average across all semesters as a two-decimal string.
pub fn overall_gpa(store: &SemesterStore) -> String {
    overall_totals(store).formatted_average()
}

/// Credits that counted toward the overall average.
pub fn overall_total_credits(store: &SemesterStore) -> f64 {
    overall_totals(store).credits
}

/// Formats `value` with two fraction digits, rounding half away from zero.
pub fn format_two_decimals(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        // Magnitudes this large carry no fraction digits to round.
        return format!("{value:.2}");
    }
    let rounded = scaled.round() / 100.0;
    // Avoid printing `-0.00`.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.2}")
}
