use std::fs;
use std::path::PathBuf;

use gridiron_forecast::accuracy::calculate_accuracy;
use gridiron_forecast::config::ModelParams;
use gridiron_forecast::games::{CompletedGame, UpcomingGame};
use gridiron_forecast::predictor::predict_games;
use gridiron_forecast::rankings::RankCategory;
use gridiron_forecast::season::{build_context, merge_predictions, reconcile};
use gridiron_forecast::store::{JsonFileStore, StateStore, predictions_key};

fn read_season() -> Vec<CompletedGame> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("season_sample.json");
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should parse")
}

fn weeks_before(games: &[CompletedGame], week: u32) -> Vec<CompletedGame> {
    games.iter().filter(|g| g.week < week).cloned().collect()
}

fn slate(games: &[CompletedGame], week: u32) -> Vec<UpcomingGame> {
    games.iter().filter(|g| g.week == week).map(CompletedGame::matchup).collect()
}

#[test]
fn context_counts_ties_and_ranks_only_active_teams() {
    let games = read_season();
    let params = ModelParams::default();
    let ctx = build_context(&games, None, Vec::new(), &params);

    let bills = &ctx.aggregates["Buffalo Bills"];
    assert_eq!(bills.games, 4);
    assert_eq!(bills.record(), "2-1-1");
    assert_eq!(ctx.aggregates["Dallas Cowboys"].games, 0);
    assert!(ctx.aggregates["Dallas Cowboys"].averages.is_none());

    assert_eq!(ctx.rankings.ranked_teams(), 8);
    assert_eq!(ctx.rankings.rank(RankCategory::OffenseYards, "Dallas Cowboys"), None);
    let mut ranks: Vec<u32> = ctx.rankings.offense_yards.values().copied().collect();
    ranks.sort_unstable();
    assert_eq!(ranks, (1..=8).collect::<Vec<_>>());

    let total: f64 = ctx.elo.iter().map(|(_, r)| r).sum();
    assert!((total - 32.0 * params.elo.base_rating).abs() < 1e-6);
    let league = ctx.league.expect("league average from played teams");
    assert_eq!(league.teams, 8);
}

#[test]
fn predict_then_reconcile_a_week() {
    let games = read_season();
    let params = ModelParams::default();
    let ctx = build_context(&weeks_before(&games, 4), None, Vec::new(), &params);

    let predictions = predict_games(&slate(&games, 4), &ctx, &params);
    assert_eq!(predictions.len(), 4);
    for p in &predictions {
        assert!(!p.checked);
        assert!(p.predicted_winner == p.home_team || p.predicted_winner == p.away_team);
        assert_eq!(p.spread, p.predicted_score.spread());
        assert!(p.confidence <= p.models.elo.confidence.min(p.models.efficiency.confidence));
    }

    let (checked, newly) = reconcile(&predictions, &games);
    assert_eq!(newly, 4);
    assert!(checked.iter().all(|p| p.checked && p.actual.is_some()));

    let report = calculate_accuracy(&checked);
    assert_eq!(report.overall.total, 4);
    assert_eq!(report.overall.correct + report.overall.incorrect, 4);
    assert_eq!(
        report.high.total + report.medium.total + report.low.total,
        report.overall.total
    );
    assert_eq!(report.by_week[&4].total, 4);
    assert!(report.mean_score_error > 0.0);
}

#[test]
fn stored_predictions_survive_a_second_run() {
    let games = read_season();
    let params = ModelParams::default();
    let dir = std::env::temp_dir().join(format!("gridiron_pipeline_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    let store = JsonFileStore::new(&dir);
    let key = predictions_key(2024);

    let ctx = build_context(&weeks_before(&games, 3), None, Vec::new(), &params);
    let first = predict_games(&slate(&games, 3), &ctx, &params);
    store
        .update(&key, Vec::new(), |existing| merge_predictions(existing, first))
        .expect("store write");

    store
        .update(&key, Vec::new(), |existing| reconcile(&existing, &games).0)
        .expect("store write");

    // Re-predicting a finished week does not overwrite the checked entries.
    let again = predict_games(&slate(&games, 3), &ctx, &params);
    let stored = store
        .update(&key, Vec::new(), |existing| merge_predictions(existing, again))
        .expect("store write");
    assert_eq!(stored.len(), 4);
    assert!(stored.iter().all(|p| p.checked));

    let tie = stored
        .iter()
        .find(|p| p.home_team == "Green Bay Packers")
        .expect("tied game predicted");
    let actual = tie.actual.as_ref().expect("checked");
    assert_eq!(actual.winner, None);
    assert!(!actual.correct);
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn predictions_without_box_scores_reload_from_store() {
    let mut games = read_season();
    for g in &mut games {
        g.home_stats = Default::default();
        g.away_stats = Default::default();
    }
    let params = ModelParams::default();
    let ctx = build_context(&weeks_before(&games, 4), None, Vec::new(), &params);
    let league = ctx.league.expect("league average");
    assert!(league.total_yards > 0.0);

    let predictions = predict_games(&slate(&games, 4), &ctx, &params);
    assert_eq!(predictions.len(), 4);
    for p in &predictions {
        assert!(p.models.efficiency.home_rating.is_finite());
        assert!(p.models.efficiency.away_rating.is_finite());
    }

    let dir = std::env::temp_dir().join(format!("gridiron_bare_stats_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    let store = JsonFileStore::new(&dir);
    let key = predictions_key(2024);
    store.save(&key, &predictions).expect("store write");
    let reloaded: Vec<gridiron_forecast::prediction::GamePrediction> = store
        .load(&key)
        .expect("snapshot readable")
        .expect("snapshot present");
    assert_eq!(reloaded.len(), predictions.len());
    let _ = fs::remove_dir_all(dir);
}
