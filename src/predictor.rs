use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::aggregate::{LeagueAverage, SeasonAggregates};
use crate::config::ModelParams;
use crate::efficiency::{self, EfficiencyPrediction};
use crate::elo::{EloPrediction, EloTable, round_points};
use crate::error::ForecastError;
use crate::games::{InjuryReport, Score, UpcomingGame};
use crate::injuries::injury_notes;
use crate::prediction::{ActualResult, EfficiencyBreakdown, EloBreakdown, GamePrediction, ModelBreakdown};
use crate::rankings::Rankings;
use crate::teams;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendConfig {
    pub elo_weight: f64,
    pub efficiency_weight: f64,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            elo_weight: 0.6,
            efficiency_weight: 0.4,
        }
    }
}

/// Everything both engines need for one round of predictions.
#[derive(Debug, Clone)]
pub struct PredictionContext {
    pub elo: EloTable,
    pub aggregates: SeasonAggregates,
    pub league: Option<LeagueAverage>,
    pub rankings: Rankings,
    pub injuries: Vec<InjuryReport>,
}

fn resolve(raw: &str) -> Result<&'static str, ForecastError> {
    teams::canonical_name(raw).ok_or_else(|| ForecastError::UnknownTeam(raw.to_string()))
}

fn blend(elo: u32, eff: u32, cfg: &BlendConfig) -> u32 {
    round_points(f64::from(elo) * cfg.elo_weight + f64::from(eff) * cfg.efficiency_weight)
}

// Level blended scores: trust the more confident sub-model, and Elo (the
// heavier weight) when both are equally confident.
fn tie_break_winner(elo: &EloPrediction, eff: &EfficiencyPrediction) -> String {
    if eff.confidence > elo.confidence {
        eff.winner.clone()
    } else {
        elo.winner.clone()
    }
}

pub fn predict_game(
    game: &UpcomingGame,
    ctx: &PredictionContext,
    params: &ModelParams,
) -> Result<GamePrediction, ForecastError> {
    let home = resolve(&game.home_team)?;
    let away = resolve(&game.away_team)?;

    let elo = ctx.elo.predict(home, away, &params.elo)?;
    let eff = efficiency::predict_game(
        ctx.aggregates.get(home),
        ctx.aggregates.get(away),
        ctx.league.as_ref(),
        &ctx.rankings,
        &params.efficiency,
    )
    .map_err(|e| match e {
        ForecastError::MissingAggregate(_) => {
            let missing = if ctx.aggregates.contains_key(home) { away } else { home };
            ForecastError::MissingAggregate(missing.to_string())
        }
        other => other,
    })?;

    let predicted_score = Score::new(
        blend(elo.score.home, eff.score.home, &params.blend),
        blend(elo.score.away, eff.score.away, &params.blend),
    );
    let predicted_winner = if predicted_score.home > predicted_score.away {
        home.to_string()
    } else if predicted_score.away > predicted_score.home {
        away.to_string()
    } else {
        tie_break_winner(&elo, &eff)
    };
    let confidence = elo.confidence.min(eff.confidence);

    Ok(GamePrediction {
        game_id: game.id.clone(),
        week: game.week,
        date: game.date,
        home_team: home.to_string(),
        away_team: away.to_string(),
        predicted_winner,
        predicted_score,
        spread: predicted_score.spread(),
        confidence,
        created_at: Utc::now(),
        models: ModelBreakdown {
            elo: EloBreakdown {
                winner: elo.winner,
                score: elo.score,
                confidence: elo.confidence,
                home_win_prob: elo.home_win_prob,
                away_win_prob: elo.away_win_prob,
            },
            efficiency: EfficiencyBreakdown {
                winner: eff.winner,
                score: eff.score,
                confidence: eff.confidence,
                home_rating: eff.home_rating,
                away_rating: eff.away_rating,
            },
        },
        injury_notes: injury_notes(home, away, &ctx.injuries),
        checked: false,
        actual: None,
    })
}

/// Predict every game independently. Games that cannot be predicted are
/// logged and left out; the rest of the batch still runs.
pub fn predict_games(
    games: &[UpcomingGame],
    ctx: &PredictionContext,
    params: &ModelParams,
) -> Vec<GamePrediction> {
    games
        .iter()
        .filter_map(|game| match predict_game(game, ctx, params) {
            Ok(p) => Some(p),
            Err(err) => {
                error!(
                    game_id = %game.id,
                    home = %game.home_team,
                    away = %game.away_team,
                    error = %err,
                    "prediction failed, skipping game"
                );
                None
            }
        })
        .collect()
}

/// Compare a prediction with the final score. Returns the checked copy; a
/// prediction that was already checked comes back unchanged.
pub fn check_prediction(prediction: &GamePrediction, actual: Score) -> GamePrediction {
    if prediction.checked {
        debug!(game_id = %prediction.game_id, "prediction already checked");
        return prediction.clone();
    }
    let winner = if actual.home > actual.away {
        Some(prediction.home_team.clone())
    } else if actual.away > actual.home {
        Some(prediction.away_team.clone())
    } else {
        None
    };
    let correct = winner.as_deref() == Some(prediction.predicted_winner.as_str());
    let score_error = prediction.predicted_score.manhattan_distance(&actual);

    GamePrediction {
        checked: true,
        actual: Some(ActualResult {
            winner,
            score: actual,
            correct,
            score_error,
            checked_at: Utc::now(),
        }),
        ..prediction.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_season;
    use crate::prediction::Confidence;
    use chrono::TimeZone;

    fn upcoming(id: &str, home: &str, away: &str) -> UpcomingGame {
        UpcomingGame {
            id: id.to_string(),
            date: Utc.with_ymd_and_hms(2024, 10, 6, 17, 0, 0).unwrap(),
            week: 5,
            home_team: home.to_string(),
            away_team: away.to_string(),
        }
    }

    fn empty_context(params: &ModelParams) -> PredictionContext {
        let aggregates = aggregate_season(&[]);
        PredictionContext {
            elo: EloTable::initialize(None, &params.elo),
            league: Some(crate::aggregate::league_averages(&aggregates)),
            aggregates,
            rankings: Rankings::default(),
            injuries: Vec::new(),
        }
    }

    #[test]
    fn blends_scores_and_takes_stricter_confidence() {
        let params = ModelParams::default();
        let ctx = empty_context(&params);
        let p = predict_game(&upcoming("g1", "KC", "BAL"), &ctx, &params).unwrap();
        // Elo 24-23, efficiency 26-23 (league-average fallback plus 2.5).
        assert_eq!(p.models.elo.score, Score::new(24, 23));
        assert_eq!(p.models.efficiency.score, Score::new(26, 23));
        assert_eq!(p.predicted_score, Score::new(25, 23));
        assert_eq!(p.spread, 2);
        assert_eq!(p.predicted_winner, "Kansas City Chiefs");
        assert_eq!(p.confidence, Confidence::Low);
        assert!(p.confidence <= p.models.elo.confidence.min(p.models.efficiency.confidence));
        assert!(!p.checked);
    }

    #[test]
    fn batch_skips_unknown_teams() {
        let params = ModelParams::default();
        let ctx = empty_context(&params);
        let games = vec![
            upcoming("g1", "KC", "BAL"),
            upcoming("g2", "London Monarchs", "BAL"),
            upcoming("g3", "SF", "SEA"),
        ];
        let out = predict_games(&games, &ctx, &params);
        let ids: Vec<_> = out.iter().map(|p| p.game_id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "g3"]);
    }

    #[test]
    fn missing_league_average_fails() {
        let params = ModelParams::default();
        let mut ctx = empty_context(&params);
        ctx.league = None;
        assert_eq!(
            predict_game(&upcoming("g1", "KC", "BAL"), &ctx, &params),
            Err(ForecastError::MissingLeagueAverage)
        );
    }

    #[test]
    fn wrong_winner_scores_manhattan_error() {
        let params = ModelParams::default();
        let ctx = empty_context(&params);
        let mut p = predict_game(&upcoming("g1", "KC", "BAL"), &ctx, &params).unwrap();
        p.predicted_score = Score::new(24, 20);
        p.predicted_winner = p.home_team.clone();

        let checked = check_prediction(&p, Score::new(20, 24));
        let actual = checked.actual.as_ref().unwrap();
        assert!(checked.checked);
        assert!(!actual.correct);
        assert_eq!(actual.score_error, 8);
        assert_eq!(actual.winner.as_deref(), Some("Baltimore Ravens"));
        // The input is left alone.
        assert!(!p.checked);

        let again = check_prediction(&checked, Score::new(30, 0));
        assert_eq!(again, checked);
    }

    #[test]
    fn tied_result_is_never_correct() {
        let params = ModelParams::default();
        let ctx = empty_context(&params);
        let p = predict_game(&upcoming("g1", "KC", "BAL"), &ctx, &params).unwrap();
        let checked = check_prediction(&p, Score::new(17, 17));
        assert_eq!(checked.actual.as_ref().and_then(|a| a.winner.clone()), None);
        assert_eq!(checked.is_correct(), Some(false));
    }

    #[test]
    fn level_blend_defers_to_more_confident_model() {
        let elo = EloPrediction {
            winner: "Home".to_string(),
            home_win_prob: 0.55,
            away_win_prob: 0.45,
            confidence: Confidence::Low,
            score: Score::new(24, 23),
            rating_gap: 30.0,
        };
        let eff = EfficiencyPrediction {
            winner: "Away".to_string(),
            score: Score::new(17, 28),
            confidence: Confidence::High,
            home_rating: 900.0,
            away_rating: 1100.0,
        };
        assert_eq!(tie_break_winner(&elo, &eff), "Away");
        let even = EfficiencyPrediction {
            confidence: Confidence::Low,
            ..eff
        };
        assert_eq!(tie_break_winner(&elo, &even), "Home");
    }
}
