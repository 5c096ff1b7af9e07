use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ForecastError;
use crate::games::Score;
use crate::prediction::Confidence;
use crate::teams;

const FAVORITE_DAMPING: f64 = 2.2;
const FAVORITE_DAMPING_SCALE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloConfig {
    pub base_rating: f64,
    pub k: f64,
    /// Share of last season's deviation from base that carries over.
    pub regression_factor: f64,
    pub mov_coefficient: f64,
    pub home_adv_elo: f64,
    /// Elo points per game point when turning a rating gap into a score.
    pub elo_per_point: f64,
    pub baseline_points: f64,
    pub high_gap: f64,
    pub medium_gap: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            base_rating: 1500.0,
            k: 20.0,
            regression_factor: 1.0 / 3.0,
            mov_coefficient: 1.0,
            home_adv_elo: 25.0,
            elo_per_point: 25.0,
            baseline_points: 23.0,
            high_gap: 100.0,
            medium_gap: 50.0,
        }
    }
}

/// Expected score of A against B.
pub fn win_probability(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((rating_b - rating_a) / 400.0))
}

/// Margin-of-victory multiplier. Blowouts by the favorite are damped so
/// predictable results do not inflate ratings; upsets are left undamped.
pub fn mov_multiplier(margin: f64, rating_winner: f64, rating_loser: f64, cfg: &EloConfig) -> f64 {
    let base = (margin.abs() + 1.0).ln() * cfg.mov_coefficient;
    let gap = rating_winner - rating_loser;
    if gap > 0.0 {
        base * (FAVORITE_DAMPING / (FAVORITE_DAMPING_SCALE * gap + FAVORITE_DAMPING))
    } else {
        base
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EloPrediction {
    pub winner: String,
    pub home_win_prob: f64,
    pub away_win_prob: f64,
    pub confidence: Confidence,
    pub score: Score,
    /// Home rating (with home advantage) minus away rating.
    pub rating_gap: f64,
}

/// One rating per registry team, keyed by canonical name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EloTable {
    ratings: BTreeMap<String, f64>,
}

impl EloTable {
    /// Fresh season table. With a prior table every rating is pulled toward
    /// base by `regression_factor`; teams missing from it start at base.
    pub fn initialize(previous: Option<&EloTable>, cfg: &EloConfig) -> Self {
        let ratings = teams::all()
            .map(|t| {
                let rating = previous
                    .and_then(|p| p.ratings.get(t.name))
                    .map(|prior| cfg.base_rating + (prior - cfg.base_rating) * cfg.regression_factor)
                    .unwrap_or(cfg.base_rating);
                (t.name.to_string(), rating)
            })
            .collect();
        Self { ratings }
    }

    pub fn rating(&self, team: &str) -> Option<f64> {
        let name = teams::canonical_name(team)?;
        self.ratings.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ratings.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Teams best-first.
    pub fn standings(&self) -> Vec<(&str, f64)> {
        let mut rows: Vec<(&str, f64)> = self.iter().collect();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(b.0)));
        rows
    }

    /// Apply one result and return the next table. The exchange is zero-sum.
    /// An unknown team leaves the table as it was.
    pub fn update(
        &self,
        winner: &str,
        loser: &str,
        winner_score: u32,
        loser_score: u32,
        cfg: &EloConfig,
    ) -> EloTable {
        let (Some(w_name), Some(l_name)) = (teams::canonical_name(winner), teams::canonical_name(loser)) else {
            error!(%winner, %loser, "elo update skipped: unknown team");
            return self.clone();
        };
        let (Some(rw), Some(rl)) = (self.ratings.get(w_name).copied(), self.ratings.get(l_name).copied()) else {
            error!(%winner, %loser, "elo update skipped: team missing from rating table");
            return self.clone();
        };

        let margin = f64::from(winner_score) - f64::from(loser_score);
        let expected = win_probability(rw, rl);
        let change = cfg.k * mov_multiplier(margin, rw, rl, cfg) * (1.0 - expected);

        let mut next = self.clone();
        next.ratings.insert(w_name.to_string(), rw + change);
        next.ratings.insert(l_name.to_string(), rl - change);
        next
    }

    pub fn predict(&self, home: &str, away: &str, cfg: &EloConfig) -> Result<EloPrediction, ForecastError> {
        let home_rating = self
            .rating(home)
            .ok_or_else(|| ForecastError::UnknownTeam(home.to_string()))?;
        let away_rating = self
            .rating(away)
            .ok_or_else(|| ForecastError::UnknownTeam(away.to_string()))?;

        let adjusted_home = home_rating + cfg.home_adv_elo;
        let home_win_prob = win_probability(adjusted_home, away_rating);
        let away_win_prob = 1.0 - home_win_prob;
        let rating_gap = adjusted_home - away_rating;
        let confidence = Confidence::from_gap(rating_gap, cfg.high_gap, cfg.medium_gap);

        let point_diff = rating_gap / cfg.elo_per_point;
        let score = Score::new(
            round_points(cfg.baseline_points + point_diff / 2.0),
            round_points(cfg.baseline_points - point_diff / 2.0),
        );
        let winner = if home_win_prob >= 0.5 { home } else { away };

        Ok(EloPrediction {
            winner: teams::canonical_name(winner).unwrap_or(winner).to_string(),
            home_win_prob,
            away_win_prob,
            confidence,
            score,
            rating_gap,
        })
    }
}

pub(crate) fn round_points(points: f64) -> u32 {
    points.max(0.0).round() as u32
}
