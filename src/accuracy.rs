use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::prediction::{Confidence, GamePrediction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierAccuracy {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// 0–100; zero for an empty tier.
    pub accuracy_pct: f64,
}

impl TierAccuracy {
    fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
    }

    fn finish(mut self) -> Self {
        self.accuracy_pct = if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        };
        self
    }
}

/// Summary over checked predictions. Derived on demand, never persisted as
/// the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub overall: TierAccuracy,
    pub high: TierAccuracy,
    pub medium: TierAccuracy,
    pub low: TierAccuracy,
    pub by_week: BTreeMap<u32, TierAccuracy>,
    /// Mean of |Δhome| + |Δaway| per game.
    pub mean_score_error: f64,
    /// Brier score of the Elo home-win probability (ties count as 0.5).
    pub elo_brier: f64,
}

impl AccuracyReport {
    pub fn tier(&self, confidence: Confidence) -> &TierAccuracy {
        match confidence {
            Confidence::High => &self.high,
            Confidence::Medium => &self.medium,
            Confidence::Low => &self.low,
        }
    }
}

pub fn calculate_accuracy(predictions: &[GamePrediction]) -> AccuracyReport {
    let mut report = AccuracyReport::default();
    let mut error_sum = 0u64;
    let mut brier_sum = 0.0_f64;

    for p in predictions.iter().filter(|p| p.checked) {
        let Some(actual) = p.actual.as_ref() else {
            continue;
        };
        report.overall.record(actual.correct);
        match p.confidence {
            Confidence::High => report.high.record(actual.correct),
            Confidence::Medium => report.medium.record(actual.correct),
            Confidence::Low => report.low.record(actual.correct),
        }
        report.by_week.entry(p.week).or_default().record(actual.correct);
        error_sum += u64::from(actual.score_error);

        let outcome = match actual.score.home.cmp(&actual.score.away) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Less => 0.0,
            std::cmp::Ordering::Equal => 0.5,
        };
        brier_sum += (p.models.elo.home_win_prob - outcome).powi(2);
    }

    let n = report.overall.total;
    if n > 0 {
        report.mean_score_error = error_sum as f64 / n as f64;
        report.elo_brier = brier_sum / n as f64;
    }
    report.overall = report.overall.finish();
    report.high = report.high.finish();
    report.medium = report.medium.finish();
    report.low = report.low.finish();
    for tier in report.by_week.values_mut() {
        *tier = tier.finish();
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_all_zero() {
        let r = calculate_accuracy(&[]);
        assert_eq!(r.overall.total, 0);
        assert_eq!(r.overall.accuracy_pct, 0.0);
        assert_eq!(r.high.accuracy_pct, 0.0);
        assert_eq!(r.mean_score_error, 0.0);
        assert!(!r.elo_brier.is_nan());
    }

    #[test]
    fn tier_percentage() {
        let mut t = TierAccuracy::default();
        t.record(true);
        t.record(false);
        t.record(true);
        let t = t.finish();
        assert_eq!((t.total, t.correct, t.incorrect), (3, 2, 1));
        assert!((t.accuracy_pct - 66.666_666).abs() < 1e-3);
    }
}
