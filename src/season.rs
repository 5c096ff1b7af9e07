use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use crate::aggregate::{aggregate_season, league_averages};
use crate::config::ModelParams;
use crate::elo::{EloConfig, EloTable};
use crate::games::{CompletedGame, InjuryReport};
use crate::prediction::GamePrediction;
use crate::predictor::{PredictionContext, check_prediction};
use crate::rankings::rank;

/// Fold results into the rating table in kickoff order. Ties carry no
/// margin and leave ratings untouched.
pub fn build_elo(games: &[CompletedGame], start: EloTable, cfg: &EloConfig) -> EloTable {
    let mut ordered: Vec<&CompletedGame> = games.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    ordered.into_iter().fold(start, |table, game| match game.decided() {
        Some((winner, loser, ws, ls)) => table.update(winner, loser, ws, ls, cfg),
        None => {
            debug!(game_id = %game.id, "tie, no rating change");
            table
        }
    })
}

/// Rebuild every derived input from the season's completed games.
pub fn build_context(
    games: &[CompletedGame],
    prior_season: Option<&EloTable>,
    injuries: Vec<InjuryReport>,
    params: &ModelParams,
) -> PredictionContext {
    let start = EloTable::initialize(prior_season, &params.elo);
    let elo = build_elo(games, start, &params.elo);
    let aggregates = aggregate_season(games);
    let league = league_averages(&aggregates);
    let rankings = rank(&aggregates);
    info!(
        games = games.len(),
        ranked_teams = rankings.ranked_teams(),
        regressed = prior_season.is_some(),
        "season context rebuilt"
    );
    PredictionContext {
        elo,
        aggregates,
        league: Some(league),
        rankings,
        injuries,
    }
}

/// Check every pending prediction whose game has finished. Returns the
/// updated list (same order) and the number newly checked.
pub fn reconcile(predictions: &[GamePrediction], results: &[CompletedGame]) -> (Vec<GamePrediction>, usize) {
    let by_id: HashMap<&str, &CompletedGame> = results.iter().map(|g| (g.id.as_str(), g)).collect();
    let mut newly_checked = 0usize;
    let out = predictions
        .iter()
        .map(|p| {
            if p.checked {
                return p.clone();
            }
            match by_id.get(p.game_id.as_str()) {
                Some(game) => {
                    newly_checked += 1;
                    check_prediction(p, game.score)
                }
                None => p.clone(),
            }
        })
        .collect();
    (out, newly_checked)
}

/// Fold a fresh batch into the stored predictions. Checked predictions are
/// final; an unchecked one is replaced when the same game is predicted again.
pub fn merge_predictions(existing: Vec<GamePrediction>, fresh: Vec<GamePrediction>) -> Vec<GamePrediction> {
    let mut by_id: BTreeMap<String, GamePrediction> =
        existing.into_iter().map(|p| (p.game_id.clone(), p)).collect();
    for p in fresh {
        match by_id.get(&p.game_id) {
            Some(stored) if stored.checked => {
                debug!(game_id = %p.game_id, "keeping checked prediction");
            }
            _ => {
                by_id.insert(p.game_id.clone(), p);
            }
        }
    }
    let mut out: Vec<GamePrediction> = by_id.into_values().collect();
    out.sort_by(|a, b| a.date.cmp(&b.date).then(a.game_id.cmp(&b.game_id)));
    out
}
