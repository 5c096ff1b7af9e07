use std::env;
use std::path::PathBuf;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::efficiency::EfficiencyConfig;
use crate::elo::EloConfig;
use crate::http_client::RetryPolicy;
use crate::predictor::BlendConfig;

const DATA_DIR: &str = "gridiron_forecast";

/// Every tunable constant of the rating models, grouped by engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub elo: EloConfig,
    pub efficiency: EfficiencyConfig,
    pub blend: BlendConfig,
}

impl ModelParams {
    /// Defaults overridden by any parseable `FORECAST_*` variable.
    pub fn from_env() -> Self {
        let d = ModelParams::default();
        let elo = EloConfig {
            base_rating: env_f64("FORECAST_ELO_BASE", d.elo.base_rating),
            k: env_f64("FORECAST_K_FACTOR", d.elo.k),
            regression_factor: env_f64("FORECAST_ELO_REGRESSION", d.elo.regression_factor),
            mov_coefficient: env_f64("FORECAST_MOV_COEFFICIENT", d.elo.mov_coefficient),
            home_adv_elo: env_f64("FORECAST_HOME_FIELD_ELO", d.elo.home_adv_elo),
            elo_per_point: env_f64("FORECAST_ELO_PER_POINT", d.elo.elo_per_point),
            baseline_points: env_f64("FORECAST_BASELINE_POINTS", d.elo.baseline_points),
            high_gap: env_f64("FORECAST_ELO_HIGH_GAP", d.elo.high_gap),
            medium_gap: env_f64("FORECAST_ELO_MEDIUM_GAP", d.elo.medium_gap),
        };
        let efficiency = EfficiencyConfig {
            home_adv_points: env_f64("FORECAST_HOME_FIELD_POINTS", d.efficiency.home_adv_points),
            matchup_weight: env_f64("FORECAST_MATCHUP_WEIGHT", d.efficiency.matchup_weight),
            default_rank: env_u32("FORECAST_DEFAULT_RANK", d.efficiency.default_rank),
            default_third_down_pct: env_f64(
                "FORECAST_DEFAULT_THIRD_DOWN_PCT",
                d.efficiency.default_third_down_pct,
            ),
            default_red_zone_pct: env_f64(
                "FORECAST_DEFAULT_RED_ZONE_PCT",
                d.efficiency.default_red_zone_pct,
            ),
            high_diff: env_f64("FORECAST_SCORE_HIGH_DIFF", d.efficiency.high_diff),
            medium_diff: env_f64("FORECAST_SCORE_MEDIUM_DIFF", d.efficiency.medium_diff),
            ..d.efficiency
        };
        let blend = BlendConfig {
            elo_weight: env_f64("FORECAST_ELO_WEIGHT", d.blend.elo_weight),
            efficiency_weight: env_f64("FORECAST_EFFICIENCY_WEIGHT", d.blend.efficiency_weight),
        };
        Self {
            elo,
            efficiency,
            blend,
        }
    }
}

/// Runtime settings for the binaries: where snapshots live, which season to
/// work on, and how hard to lean on the upstream API.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub season: i32,
    pub retry: RetryPolicy,
    pub fetch_parallelism: usize,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir = env::var("FORECAST_DATA_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let season = env::var("FORECAST_SEASON")
            .ok()
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or_else(current_season);
        let retry = RetryPolicy {
            max_attempts: env_u32("HTTP_MAX_ATTEMPTS", RetryPolicy::default().max_attempts).max(1),
            base_delay_ms: env::var("HTTP_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(RetryPolicy::default().base_delay_ms),
        };
        let fetch_parallelism = env::var("FETCH_PARALLELISM")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(6)
            .clamp(2, 32);
        let request_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10)
            .max(1);
        Self {
            data_dir,
            season,
            retry,
            fetch_parallelism,
            request_timeout_secs,
        }
    }
}

/// NFL seasons start in September and run into February of the next year.
pub fn current_season() -> i32 {
    let today = Utc::now().date_naive();
    if today.month() >= 3 {
        today.year()
    } else {
        today.year() - 1
    }
}

fn default_data_dir() -> PathBuf {
    if let Ok(base) = env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return PathBuf::from(base).join(DATA_DIR);
    }
    match env::var("HOME") {
        Ok(home) if !home.trim().is_empty() => {
            PathBuf::from(home).join(".local").join("share").join(DATA_DIR)
        }
        _ => PathBuf::from(".").join(DATA_DIR),
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let p = ModelParams::default();
        assert_eq!(p.elo.base_rating, 1500.0);
        assert_eq!(p.elo.k, 20.0);
        assert!((p.elo.regression_factor - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(p.elo.mov_coefficient, 1.0);
        assert_eq!(p.elo.home_adv_elo, 25.0);
        assert_eq!(p.elo.high_gap, 100.0);
        assert_eq!(p.elo.medium_gap, 50.0);
        assert_eq!(p.efficiency.home_adv_points, 2.5);
        assert_eq!(p.efficiency.matchup_weight, 0.15);
        assert_eq!(p.efficiency.default_rank, 16);
        assert_eq!(p.efficiency.default_third_down_pct, 40.0);
        assert_eq!(p.efficiency.default_red_zone_pct, 50.0);
        assert_eq!(p.efficiency.high_diff, 10.0);
        assert_eq!(p.efficiency.medium_diff, 6.0);
        assert_eq!(p.blend.elo_weight, 0.6);
        assert_eq!(p.blend.efficiency_weight, 0.4);
    }
}
