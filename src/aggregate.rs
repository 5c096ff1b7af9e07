use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::games::CompletedGame;
use crate::stat_normalize::{StatField, TeamStatLine};
use crate::teams;

/// Per-team season aggregates keyed by canonical team name.
pub type SeasonAggregates = BTreeMap<String, TeamSeasonAggregate>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonAggregate {
    pub team: String,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub passing_yards: f64,
    pub rushing_yards: f64,
    pub total_yards: f64,
    pub turnovers: f64,
    pub sacks: f64,
    pub possession_seconds: f64,
    pub passing_yards_allowed: f64,
    pub rushing_yards_allowed: f64,
    pub total_yards_allowed: f64,
    pub third_down_made: f64,
    pub third_down_attempts: f64,
    pub red_zone_made: f64,
    pub red_zone_attempts: f64,
    pub points_for: u32,
    pub points_against: u32,
    /// Only present once the team has played.
    pub averages: Option<SeasonAverages>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonAverages {
    pub total_yards: f64,
    pub passing_yards: f64,
    pub rushing_yards: f64,
    pub points_for: f64,
    pub points_against: f64,
    pub turnovers: f64,
    pub sacks: f64,
    pub possession_seconds: f64,
    pub passing_yards_allowed: f64,
    pub rushing_yards_allowed: f64,
    pub total_yards_allowed: f64,
    /// `None` while no third-down attempts are on record.
    pub third_down_pct: Option<f64>,
    pub red_zone_pct: Option<f64>,
}

impl TeamSeasonAggregate {
    fn empty(team: &str) -> Self {
        Self {
            team: team.to_string(),
            ..Self::default()
        }
    }

    pub fn record(&self) -> String {
        if self.ties > 0 {
            format!("{}-{}-{}", self.wins, self.losses, self.ties)
        } else {
            format!("{}-{}", self.wins, self.losses)
        }
    }

    fn absorb(&mut self, own: &TeamStatLine, opp: &TeamStatLine, points_for: u32, points_against: u32) {
        self.games += 1;

        self.passing_yards += own.number(StatField::PassingYards).unwrap_or(0.0);
        self.rushing_yards += own.number(StatField::RushingYards).unwrap_or(0.0);
        self.total_yards += own.number(StatField::TotalYards).unwrap_or(0.0);
        self.turnovers += own.number(StatField::Turnovers).unwrap_or(0.0);
        self.possession_seconds += own.number(StatField::PossessionTime).unwrap_or(0.0);
        // "Sacks-Yards Lost" arrives as a pair; the count is the first half.
        self.sacks += own
            .number(StatField::Sacks)
            .or_else(|| own.ratio(StatField::Sacks).map(|r| r.made))
            .unwrap_or(0.0);

        self.passing_yards_allowed += opp.number(StatField::PassingYards).unwrap_or(0.0);
        self.rushing_yards_allowed += opp.number(StatField::RushingYards).unwrap_or(0.0);
        self.total_yards_allowed += opp.number(StatField::TotalYards).unwrap_or(0.0);

        if let Some(r) = own.ratio(StatField::ThirdDownEfficiency) {
            self.third_down_made += r.made;
            self.third_down_attempts += r.attempts;
        }
        if let Some(r) = own.ratio(StatField::RedZoneEfficiency) {
            self.red_zone_made += r.made;
            self.red_zone_attempts += r.attempts;
        }

        self.points_for += points_for;
        self.points_against += points_against;
        if points_for > points_against {
            self.wins += 1;
        } else if points_for < points_against {
            self.losses += 1;
        } else {
            self.ties += 1;
        }
    }

    fn derive_averages(&self) -> Option<SeasonAverages> {
        if self.games == 0 {
            return None;
        }
        let g = self.games as f64;
        let pct = |made: f64, attempts: f64| (attempts > 0.0).then(|| made / attempts * 100.0);
        Some(SeasonAverages {
            total_yards: self.total_yards / g,
            passing_yards: self.passing_yards / g,
            rushing_yards: self.rushing_yards / g,
            points_for: self.points_for as f64 / g,
            points_against: self.points_against as f64 / g,
            turnovers: self.turnovers / g,
            sacks: self.sacks / g,
            possession_seconds: self.possession_seconds / g,
            passing_yards_allowed: self.passing_yards_allowed / g,
            rushing_yards_allowed: self.rushing_yards_allowed / g,
            total_yards_allowed: self.total_yards_allowed / g,
            third_down_pct: pct(self.third_down_made, self.third_down_attempts),
            red_zone_pct: pct(self.red_zone_made, self.red_zone_attempts),
        })
    }
}

/// Fold completed games into season aggregates for every registry team.
///
/// Teams without games keep zero counters and no averages. Team names that
/// the registry cannot resolve are logged and that side of the game is
/// skipped. Game order is irrelevant.
pub fn aggregate_season(games: &[CompletedGame]) -> SeasonAggregates {
    let mut out: SeasonAggregates = teams::all()
        .map(|t| (t.name.to_string(), TeamSeasonAggregate::empty(t.name)))
        .collect();

    for game in games {
        let sides = [
            (&game.home_team, &game.home_stats, &game.away_stats, game.score.home, game.score.away),
            (&game.away_team, &game.away_stats, &game.home_stats, game.score.away, game.score.home),
        ];
        for (raw_name, own, opp, pf, pa) in sides {
            let Some(name) = teams::canonical_name(raw_name) else {
                warn!(game_id = %game.id, team = %raw_name, "unknown team in game record, skipping");
                continue;
            };
            if let Some(agg) = out.get_mut(name) {
                agg.absorb(own, opp, pf, pa);
            }
        }
    }

    for agg in out.values_mut() {
        agg.averages = agg.derive_averages();
    }
    out
}

/// League-wide mean of the per-game averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeagueAverage {
    pub total_yards: f64,
    pub points_for: f64,
    pub points_against: f64,
    pub passing_yards: f64,
    pub rushing_yards: f64,
    /// Number of teams that contributed; zero means the fallback is in use.
    pub teams: usize,
}

impl LeagueAverage {
    pub const FALLBACK: LeagueAverage = LeagueAverage {
        total_yards: 350.0,
        points_for: 23.0,
        points_against: 23.0,
        passing_yards: 230.0,
        rushing_yards: 120.0,
        teams: 0,
    };
}

pub fn league_averages(aggregates: &SeasonAggregates) -> LeagueAverage {
    let played: Vec<&SeasonAverages> = aggregates
        .values()
        .filter_map(|a| a.averages.as_ref())
        .collect();
    if played.is_empty() {
        return LeagueAverage::FALLBACK;
    }
    let n = played.len() as f64;
    // A field nobody reported (box scores missing) keeps its fallback value,
    // so league figures are always usable as divisors.
    let mean = |f: fn(&SeasonAverages) -> f64, fallback: f64| {
        let m = played.iter().map(|a| f(a)).sum::<f64>() / n;
        if m.is_finite() && m > 0.0 { m } else { fallback }
    };
    let fb = LeagueAverage::FALLBACK;
    LeagueAverage {
        total_yards: mean(|a| a.total_yards, fb.total_yards),
        points_for: mean(|a| a.points_for, fb.points_for),
        points_against: mean(|a| a.points_against, fb.points_against),
        passing_yards: mean(|a| a.passing_yards, fb.passing_yards),
        rushing_yards: mean(|a| a.rushing_yards, fb.rushing_yards),
        teams: played.len(),
    }
}
