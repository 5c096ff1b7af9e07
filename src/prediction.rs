use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::games::Score;

/// Discrete confidence tier. Ordered `Low < Medium < High`, so the stricter
/// of two tiers is simply `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub const ALL: [Confidence; 3] = [Confidence::High, Confidence::Medium, Confidence::Low];

    pub fn label(self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// Tier for an absolute gap against `(high, medium)` thresholds.
    pub fn from_gap(gap: f64, high: f64, medium: f64) -> Self {
        let gap = gap.abs();
        if gap >= high {
            Confidence::High
        } else if gap >= medium {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloBreakdown {
    pub winner: String,
    pub score: Score,
    pub confidence: Confidence,
    pub home_win_prob: f64,
    pub away_win_prob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyBreakdown {
    pub winner: String,
    pub score: Score,
    pub confidence: Confidence,
    pub home_rating: f64,
    pub away_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBreakdown {
    pub elo: EloBreakdown,
    pub efficiency: EfficiencyBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualResult {
    /// `None` when the game ended level.
    pub winner: Option<String>,
    pub score: Score,
    pub correct: bool,
    /// |Δhome| + |Δaway| between predicted and actual score.
    pub score_error: u32,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePrediction {
    pub game_id: String,
    pub week: u32,
    pub date: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
    pub predicted_winner: String,
    pub predicted_score: Score,
    /// Home minus away.
    pub spread: i32,
    pub confidence: Confidence,
    pub created_at: DateTime<Utc>,
    pub models: ModelBreakdown,
    #[serde(default)]
    pub injury_notes: Vec<String>,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub actual: Option<ActualResult>,
}

impl GamePrediction {
    pub fn is_correct(&self) -> Option<bool> {
        self.actual.as_ref().map(|a| a.correct)
    }
}
