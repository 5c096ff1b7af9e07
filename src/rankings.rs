use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::{SeasonAggregates, SeasonAverages};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankCategory {
    /// Total yards per game, most first.
    OffenseYards,
    /// Points allowed per game, fewest first.
    DefensePoints,
    /// Rushing yards per game, most first.
    RushOffense,
    /// Passing yards allowed per game, fewest first.
    PassDefense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    HigherBetter,
    LowerBetter,
}

impl RankCategory {
    fn metric(self, avg: &SeasonAverages) -> f64 {
        match self {
            RankCategory::OffenseYards => avg.total_yards,
            RankCategory::DefensePoints => avg.points_against,
            RankCategory::RushOffense => avg.rushing_yards,
            RankCategory::PassDefense => avg.passing_yards_allowed,
        }
    }

    fn direction(self) -> Direction {
        match self {
            RankCategory::OffenseYards | RankCategory::RushOffense => Direction::HigherBetter,
            RankCategory::DefensePoints | RankCategory::PassDefense => Direction::LowerBetter,
        }
    }
}

/// Ordinal ranks (1 = best) per category. Teams without games are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rankings {
    pub offense_yards: HashMap<String, u32>,
    pub defense_points: HashMap<String, u32>,
    pub rush_offense: HashMap<String, u32>,
    pub pass_defense: HashMap<String, u32>,
}

impl Rankings {
    fn table(&self, category: RankCategory) -> &HashMap<String, u32> {
        match category {
            RankCategory::OffenseYards => &self.offense_yards,
            RankCategory::DefensePoints => &self.defense_points,
            RankCategory::RushOffense => &self.rush_offense,
            RankCategory::PassDefense => &self.pass_defense,
        }
    }

    pub fn rank(&self, category: RankCategory, team: &str) -> Option<u32> {
        self.table(category).get(team).copied()
    }

    pub fn rank_or(&self, category: RankCategory, team: &str, default: u32) -> u32 {
        self.rank(category, team).unwrap_or(default)
    }

    pub fn ranked_teams(&self) -> usize {
        self.offense_yards.len()
    }
}

pub fn rank(aggregates: &SeasonAggregates) -> Rankings {
    let played: Vec<(&str, &SeasonAverages)> = aggregates
        .values()
        .filter(|a| a.games > 0)
        .filter_map(|a| a.averages.as_ref().map(|avg| (a.team.as_str(), avg)))
        .collect();

    Rankings {
        offense_yards: rank_category(&played, RankCategory::OffenseYards),
        defense_points: rank_category(&played, RankCategory::DefensePoints),
        rush_offense: rank_category(&played, RankCategory::RushOffense),
        pass_defense: rank_category(&played, RankCategory::PassDefense),
    }
}

// `sort_by` is stable, so equal values keep input order.
fn rank_category(played: &[(&str, &SeasonAverages)], category: RankCategory) -> HashMap<String, u32> {
    let mut order: Vec<(&str, f64)> = played
        .iter()
        .map(|(team, avg)| (*team, category.metric(avg)))
        .collect();
    order.sort_by(|a, b| match category.direction() {
        Direction::HigherBetter => b.1.total_cmp(&a.1),
        Direction::LowerBetter => a.1.total_cmp(&b.1),
    });
    order
        .into_iter()
        .enumerate()
        .map(|(idx, (team, _))| (team.to_string(), idx as u32 + 1))
        .collect()
}
