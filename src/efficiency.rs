use serde::{Deserialize, Serialize};

use crate::aggregate::{LeagueAverage, TeamSeasonAggregate};
use crate::elo::round_points;
use crate::error::ForecastError;
use crate::games::Score;
use crate::prediction::Confidence;
use crate::rankings::{RankCategory, Rankings};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyConfig {
    pub home_adv_points: f64,
    pub matchup_weight: f64,
    /// Rank assumed for a team missing from a ranking (the median of 32).
    pub default_rank: u32,
    pub default_third_down_pct: f64,
    pub default_red_zone_pct: f64,
    pub third_down_weight: f64,
    pub red_zone_weight: f64,
    pub high_diff: f64,
    pub medium_diff: f64,
    pub offense_weight: f64,
    pub defense_weight: f64,
    pub scoring_weight: f64,
    pub rating_scale: f64,
    /// Rating reported for a team that has not played yet.
    pub neutral_rating: f64,
    pub points_for_weight: f64,
    pub points_against_weight: f64,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self {
            home_adv_points: 2.5,
            matchup_weight: 0.15,
            default_rank: 16,
            default_third_down_pct: 40.0,
            default_red_zone_pct: 50.0,
            third_down_weight: 0.05,
            red_zone_weight: 0.03,
            high_diff: 10.0,
            medium_diff: 6.0,
            offense_weight: 0.35,
            defense_weight: 0.35,
            scoring_weight: 0.30,
            rating_scale: 1000.0,
            neutral_rating: 1500.0,
            points_for_weight: 0.5,
            points_against_weight: 0.3,
        }
    }
}

// Team figure relative to the league; a league figure that is not positive
// counts as parity.
fn ratio(team: f64, league: f64) -> f64 {
    if league.is_finite() && league > 0.0 { team / league } else { 1.0 }
}

/// Composite efficiency rating; 1000 is a league-average team.
pub fn rating(team: &TeamSeasonAggregate, league: &LeagueAverage, cfg: &EfficiencyConfig) -> f64 {
    let Some(avg) = team.averages.as_ref().filter(|_| team.games > 0) else {
        return cfg.neutral_rating;
    };
    let offense = ratio(avg.total_yards, league.total_yards);
    // A shutout defense would divide by zero; one point a game is the floor.
    let defense = league.points_against / avg.points_against.max(1.0);
    let scoring = ratio(avg.points_for, league.points_for);
    (offense * cfg.offense_weight + defense * cfg.defense_weight + scoring * cfg.scoring_weight)
        * cfg.rating_scale
}

/// Points gained by `team`'s rushing attack against `opponent`'s pass defense
/// ranking. Positive when the team's rush rank is better than the opponent's
/// pass-defense rank.
pub fn matchup_advantage(
    team: &str,
    opponent: &str,
    rankings: &Rankings,
    default_rank: u32,
    weight: f64,
) -> f64 {
    let team_rush = rankings.rank_or(RankCategory::RushOffense, team, default_rank);
    let opp_pass_def = rankings.rank_or(RankCategory::PassDefense, opponent, default_rank);
    (f64::from(opp_pass_def) - f64::from(team_rush)) * weight
}

/// Third-down and red-zone edge of `team` over `opponent`. Missing
/// percentages take the configured defaults.
pub fn situational_adjustment(
    team: &TeamSeasonAggregate,
    opponent: &TeamSeasonAggregate,
    cfg: &EfficiencyConfig,
) -> f64 {
    let third = |a: &TeamSeasonAggregate| {
        a.averages
            .and_then(|avg| avg.third_down_pct)
            .unwrap_or(cfg.default_third_down_pct)
    };
    let red = |a: &TeamSeasonAggregate| {
        a.averages
            .and_then(|avg| avg.red_zone_pct)
            .unwrap_or(cfg.default_red_zone_pct)
    };
    (third(team) - third(opponent)) * cfg.third_down_weight
        + (red(team) - red(opponent)) * cfg.red_zone_weight
}

#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyPrediction {
    pub winner: String,
    pub score: Score,
    pub confidence: Confidence,
    pub home_rating: f64,
    pub away_rating: f64,
}

/// Project a score from season aggregates. A team that has not played yet is
/// projected from league averages.
pub fn predict_game(
    home: Option<&TeamSeasonAggregate>,
    away: Option<&TeamSeasonAggregate>,
    league: Option<&LeagueAverage>,
    rankings: &Rankings,
    cfg: &EfficiencyConfig,
) -> Result<EfficiencyPrediction, ForecastError> {
    let league = league.ok_or(ForecastError::MissingLeagueAverage)?;
    let home = home.ok_or_else(|| ForecastError::MissingAggregate("home".to_string()))?;
    let away = away.ok_or_else(|| ForecastError::MissingAggregate("away".to_string()))?;

    let per_game = |a: &TeamSeasonAggregate| match a.averages {
        Some(avg) if a.games > 0 => (avg.points_for, avg.points_against),
        _ => (league.points_for, league.points_against),
    };
    let (home_pf, home_pa) = per_game(home);
    let (away_pf, away_pa) = per_game(away);

    let side = |pf: f64, opp_pa: f64, team: &TeamSeasonAggregate, opp: &TeamSeasonAggregate| {
        league.points_for + cfg.points_for_weight * (pf - league.points_for)
            - cfg.points_against_weight * (opp_pa - league.points_against)
            + matchup_advantage(&team.team, &opp.team, rankings, cfg.default_rank, cfg.matchup_weight)
            + situational_adjustment(team, opp, cfg)
    };

    let home_points = side(home_pf, away_pa, home, away) + cfg.home_adv_points;
    let away_points = side(away_pf, home_pa, away, home);
    let score = Score::new(round_points(home_points), round_points(away_points));
    let confidence = Confidence::from_gap(f64::from(score.spread()), cfg.high_diff, cfg.medium_diff);
    // Level projections go to the home side; home advantage is already in.
    let winner = if score.home >= score.away { &home.team } else { &away.team };

    Ok(EfficiencyPrediction {
        winner: winner.clone(),
        score,
        confidence,
        home_rating: rating(home, league, cfg),
        away_rating: rating(away, league, cfg),
    })
}
