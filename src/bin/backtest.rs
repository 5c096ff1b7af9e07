use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use gridiron_forecast::accuracy::calculate_accuracy;
use gridiron_forecast::config::ModelParams;
use gridiron_forecast::games::{CompletedGame, UpcomingGame};
use gridiron_forecast::predictor::{check_prediction, predict_games};
use gridiron_forecast::season::build_context;

// Replays a recorded season offline: every week is predicted from the weeks
// before it, then scored against the real result.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/season_sample.json"));
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let games: Vec<CompletedGame> =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    let params = ModelParams::from_env();

    let weeks: BTreeSet<u32> = games.iter().map(|g| g.week).collect();
    let mut checked = Vec::new();
    for week in weeks {
        let history: Vec<CompletedGame> = games.iter().filter(|g| g.week < week).cloned().collect();
        let slate: Vec<&CompletedGame> = games.iter().filter(|g| g.week == week).collect();
        let ctx = build_context(&history, None, Vec::new(), &params);
        let matchups: Vec<UpcomingGame> = slate.iter().map(|g| g.matchup()).collect();

        for prediction in predict_games(&matchups, &ctx, &params) {
            let Some(game) = slate.iter().find(|g| g.id == prediction.game_id) else {
                continue;
            };
            let result = check_prediction(&prediction, game.score);
            let mark = if result.is_correct() == Some(true) { "ok " } else { "   " };
            println!(
                "{mark} week {:>2}  {} @ {}  predicted {}-{}  actual {}-{}",
                week,
                result.away_team,
                result.home_team,
                result.predicted_score.home,
                result.predicted_score.away,
                game.score.home,
                game.score.away
            );
            checked.push(result);
        }
    }

    let report = calculate_accuracy(&checked);
    println!();
    println!(
        "Games: {}  correct: {} ({:.1}%)",
        report.overall.total, report.overall.correct, report.overall.accuracy_pct
    );
    println!(
        "High {:.1}%  Medium {:.1}%  Low {:.1}%",
        report.high.accuracy_pct, report.medium.accuracy_pct, report.low.accuracy_pct
    );
    println!(
        "Mean score error: {:.2}  Elo Brier: {:.3}",
        report.mean_score_error, report.elo_brier
    );
    Ok(())
}
