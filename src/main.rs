use std::ops::RangeInclusive;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gridiron_forecast::accuracy::{AccuracyReport, calculate_accuracy};
use gridiron_forecast::config::{AppConfig, ModelParams};
use gridiron_forecast::elo::EloTable;
use gridiron_forecast::espn::{EspnSource, GameSource};
use gridiron_forecast::games::CompletedGame;
use gridiron_forecast::prediction::{Confidence, GamePrediction};
use gridiron_forecast::predictor::predict_games;
use gridiron_forecast::season::{build_context, merge_predictions, reconcile};
use gridiron_forecast::store::{JsonFileStore, StateStore, elo_key, predictions_key, results_key};

#[derive(Parser)]
#[command(name = "gridiron_forecast")]
#[command(about = "NFL game forecasts blending Elo and season efficiency", long_about = None)]
struct Cli {
    /// Season to work on (defaults to FORECAST_SEASON, then the current season)
    #[arg(long, global = true, value_parser = clap::value_parser!(i32).range(1920..=2100))]
    season: Option<i32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch completed games, rebuild ratings and check pending predictions
    Update {
        /// Regular-season weeks to fetch, e.g. `1-18` or `5`
        #[arg(long, default_value = "1-18", value_parser = parse_weeks)]
        weeks: RangeInclusive<u32>,
    },
    /// Predict the upcoming slate and store the predictions
    Predict,
    /// Accuracy of the checked predictions
    Report,
    /// Current Elo standings
    Ratings,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut cfg = AppConfig::from_env();
    if let Some(season) = cli.season {
        cfg.season = season;
    }
    let params = ModelParams::from_env();
    let store = JsonFileStore::new(&cfg.data_dir);
    info!(season = cfg.season, data_dir = %cfg.data_dir.display(), "starting");

    match cli.command {
        Commands::Update { weeks } => {
            let source = EspnSource::new(&cfg)?;
            update(&source, &store, &cfg, &params, weeks)
        }
        Commands::Predict => {
            let source = EspnSource::new(&cfg)?;
            predict(&source, &store, &cfg, &params)
        }
        Commands::Report => report(&store, &cfg),
        Commands::Ratings => ratings(&store, &cfg),
    }
}

fn update(
    source: &impl GameSource,
    store: &JsonFileStore,
    cfg: &AppConfig,
    params: &ModelParams,
    weeks: RangeInclusive<u32>,
) -> Result<()> {
    let games = source.completed_games(weeks)?;
    store.save(&results_key(cfg.season), &games)?;

    let prior: Option<EloTable> = store.load(&elo_key(cfg.season - 1))?;
    let ctx = build_context(&games, prior.as_ref(), Vec::new(), params);
    store.save(&elo_key(cfg.season), &ctx.elo)?;

    let mut newly_checked = 0;
    store.update(
        &predictions_key(cfg.season),
        Vec::<GamePrediction>::new(),
        |predictions| {
            let (out, n) = reconcile(&predictions, &games);
            newly_checked = n;
            out
        },
    )?;
    println!(
        "Stored {} completed games; checked {} prediction(s).",
        games.len(),
        newly_checked
    );
    Ok(())
}

fn predict(
    source: &impl GameSource,
    store: &JsonFileStore,
    cfg: &AppConfig,
    params: &ModelParams,
) -> Result<()> {
    let games: Vec<CompletedGame> = store.load(&results_key(cfg.season))?.unwrap_or_default();
    if games.is_empty() {
        warn!(season = cfg.season, "no stored results; run `update` first for season form");
    }
    let prior: Option<EloTable> = store.load(&elo_key(cfg.season - 1))?;
    let injuries = source.injuries().unwrap_or_else(|err| {
        warn!(error = %err, "injury report unavailable");
        Vec::new()
    });
    let ctx = build_context(&games, prior.as_ref(), injuries, params);

    let upcoming = source.upcoming_games()?;
    let fresh = predict_games(&upcoming, &ctx, params);
    for p in &fresh {
        print_prediction(p);
    }
    store.update(&predictions_key(cfg.season), Vec::new(), |existing| {
        merge_predictions(existing, fresh)
    })?;
    Ok(())
}

fn report(store: &JsonFileStore, cfg: &AppConfig) -> Result<()> {
    let predictions: Vec<GamePrediction> =
        store.load(&predictions_key(cfg.season))?.unwrap_or_default();
    print_report(&calculate_accuracy(&predictions));
    Ok(())
}

fn ratings(store: &JsonFileStore, cfg: &AppConfig) -> Result<()> {
    let Some(table) = store.load::<EloTable>(&elo_key(cfg.season))? else {
        bail!("no ratings stored for {}; run `update` first", cfg.season);
    };
    for (idx, (team, rating)) in table.standings().into_iter().enumerate() {
        println!("{:>2}. {team:<24} {rating:>7.1}", idx + 1);
    }
    Ok(())
}

fn print_prediction(p: &GamePrediction) {
    println!(
        "Week {:>2}  {} @ {}  ->  {} {}-{} ({})",
        p.week,
        p.away_team,
        p.home_team,
        p.predicted_winner,
        p.predicted_score.home,
        p.predicted_score.away,
        p.confidence.label()
    );
    for note in &p.injury_notes {
        println!("          {note}");
    }
}

fn print_report(report: &AccuracyReport) {
    let o = &report.overall;
    println!(
        "Overall: {}/{} ({:.1}%)  mean score error {:.1}  Elo Brier {:.3}",
        o.correct, o.total, o.accuracy_pct, report.mean_score_error, report.elo_brier
    );
    for confidence in Confidence::ALL {
        let t = report.tier(confidence);
        println!(
            "  {:<6} {}/{} ({:.1}%)",
            confidence.label(),
            t.correct,
            t.total,
            t.accuracy_pct
        );
    }
    for (week, t) in &report.by_week {
        println!("  week {week:>2}: {}/{} ({:.1}%)", t.correct, t.total, t.accuracy_pct);
    }
}

const MAX_WEEK: u32 = 22;

/// `N` or `A-B` with `1 <= A <= B <= 22`.
fn parse_weeks(raw: &str) -> Result<RangeInclusive<u32>, String> {
    let week = |v: &str| -> Result<u32, String> {
        let w = v
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("`{}` is not a week number", v.trim()))?;
        if (1..=MAX_WEEK).contains(&w) {
            Ok(w)
        } else {
            Err(format!("week {w} is outside 1-{MAX_WEEK}"))
        }
    };
    match raw.split_once('-') {
        Some((a, b)) => {
            let (a, b) = (week(a)?, week(b)?);
            if a <= b {
                Ok(a..=b)
            } else {
                Err(format!("week range {a}-{b} runs backwards"))
            }
        }
        None => week(raw).map(|w| w..=w),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn week_ranges() {
        assert_eq!(parse_weeks("1-18"), Ok(1..=18));
        assert_eq!(parse_weeks(" 5 "), Ok(5..=5));
        assert!(parse_weeks("5-3").is_err());
        assert!(parse_weeks("abc").is_err());
        assert!(parse_weeks("0-4").is_err());
        assert!(parse_weeks("1-40").is_err());
    }

    #[test]
    fn bad_flags_are_rejected() {
        let parse = |args: &[&str]| Cli::try_parse_from(args.iter().copied());
        assert!(parse(&["gridiron_forecast", "update", "--weeks=5-3"]).is_err());
        assert!(parse(&["gridiron_forecast", "update", "--weeks=abc"]).is_err());
        assert!(parse(&["gridiron_forecast", "report", "--season=abc"]).is_err());
        assert!(parse(&["gridiron_forecast", "report", "--seasn=2023"]).is_err());
        assert!(parse(&["gridiron_forecast", "predict", "--weeks=1-3"]).is_err());
        assert!(parse(&["gridiron_forecast"]).is_err());
    }

    #[test]
    fn good_flags_parse() {
        let cli = Cli::try_parse_from(["gridiron_forecast", "update", "--season=2023", "--weeks=2-4"])
            .unwrap();
        assert_eq!(cli.season, Some(2023));
        assert!(matches!(cli.command, Commands::Update { weeks } if weeks == (2..=4)));

        let cli = Cli::try_parse_from(["gridiron_forecast", "--season", "2022", "ratings"]).unwrap();
        assert_eq!(cli.season, Some(2022));
        assert!(matches!(cli.command, Commands::Ratings));

        let cli = Cli::try_parse_from(["gridiron_forecast", "update"]).unwrap();
        assert!(matches!(cli.command, Commands::Update { weeks } if weeks == (1..=18)));
    }
}
