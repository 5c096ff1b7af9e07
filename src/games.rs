use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stat_normalize::TeamStatLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// |Δhome| + |Δaway|.
    pub fn manhattan_distance(&self, other: &Score) -> u32 {
        self.home.abs_diff(other.home) + self.away.abs_diff(other.away)
    }

    pub fn spread(&self) -> i32 {
        self.home as i32 - self.away as i32
    }
}

/// A finished game with both box-score blocks attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedGame {
    pub id: String,
    pub date: DateTime<Utc>,
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
    pub score: Score,
    #[serde(default)]
    pub home_stats: TeamStatLine,
    #[serde(default)]
    pub away_stats: TeamStatLine,
}

impl CompletedGame {
    /// `(winner, loser, winner_score, loser_score)`, or `None` for a tie.
    pub fn decided(&self) -> Option<(&str, &str, u32, u32)> {
        if self.score.home > self.score.away {
            Some((&self.home_team, &self.away_team, self.score.home, self.score.away))
        } else if self.score.away > self.score.home {
            Some((&self.away_team, &self.home_team, self.score.away, self.score.home))
        } else {
            None
        }
    }

    pub fn matchup(&self) -> UpcomingGame {
        UpcomingGame {
            id: self.id.clone(),
            date: self.date,
            week: self.week,
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingGame {
    pub id: String,
    pub date: DateTime<Utc>,
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryReport {
    pub team: String,
    pub player: String,
    pub status: String,
    #[serde(default)]
    pub body_part: Option<String>,
}
