use std::ops::RangeInclusive;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rayon::prelude::*;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::games::{CompletedGame, InjuryReport, Score, UpcomingGame};
use crate::http_client::{RetryPolicy, fetch_text_with_retry, http_client};
use crate::stat_normalize::{RawValue, TeamStatLine};
use crate::teams;

const ESPN_BASE: &str = "https://site.api.espn.com/apis/site/v2/sports/football/nfl";
const REGULAR_SEASON: u32 = 2;

/// Where completed games, the upcoming slate and injury reports come from.
pub trait GameSource {
    fn completed_games(&self, weeks: RangeInclusive<u32>) -> Result<Vec<CompletedGame>>;
    fn upcoming_games(&self) -> Result<Vec<UpcomingGame>>;
    fn injuries(&self) -> Result<Vec<InjuryReport>>;
}

/// One row of the scoreboard feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreboardEvent {
    pub id: String,
    pub date: DateTime<Utc>,
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
    pub score: Option<Score>,
    pub completed: bool,
}

impl ScoreboardEvent {
    pub fn upcoming(&self) -> UpcomingGame {
        UpcomingGame {
            id: self.id.clone(),
            date: self.date,
            week: self.week,
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxScore {
    pub home: TeamStatLine,
    pub away: TeamStatLine,
}

/// Parses ESPN timestamps, which drop the seconds ("2024-09-06T00:20Z").
pub fn parse_espn_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%MZ", "%Y-%m-%dT%H:%M:%SZ"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn canonical_team(team: &Value) -> Option<String> {
    let raw = team
        .get("displayName")
        .and_then(Value::as_str)
        .or_else(|| team.get("abbreviation").and_then(Value::as_str))?;
    Some(
        teams::canonical_name(raw)
            .map(str::to_string)
            .unwrap_or_else(|| raw.to_string()),
    )
}

fn parse_points(value: &Value) -> Option<u32> {
    match value {
        Value::String(s) => s.trim().parse::<u32>().ok(),
        Value::Number(n) => n.as_f64().filter(|v| *v >= 0.0).map(|v| v.round() as u32),
        Value::Object(_) => value.get("value").and_then(parse_points),
        _ => None,
    }
}

fn parse_event(event: &Value) -> Option<ScoreboardEvent> {
    let id = event.get("id").and_then(Value::as_str)?.to_string();
    let competition = event.get("competitions")?.as_array()?.first()?;
    let date = competition
        .get("date")
        .or_else(|| event.get("date"))
        .and_then(Value::as_str)
        .and_then(parse_espn_date)?;
    let week = event
        .pointer("/week/number")
        .and_then(Value::as_u64)
        .and_then(|w| u32::try_from(w).ok())
        .unwrap_or(0);
    let completed = competition
        .pointer("/status/type/completed")
        .or_else(|| event.pointer("/status/type/completed"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut home = None;
    let mut away = None;
    for competitor in competition.get("competitors")?.as_array()? {
        let name = competitor.get("team").and_then(canonical_team)?;
        let points = competitor.get("score").and_then(parse_points);
        match competitor.get("homeAway").and_then(Value::as_str) {
            Some("home") => home = Some((name, points)),
            Some("away") => away = Some((name, points)),
            _ => {}
        }
    }
    let (home_team, home_points) = home?;
    let (away_team, away_points) = away?;
    let score = match (home_points, away_points) {
        (Some(h), Some(a)) => Some(Score::new(h, a)),
        _ => None,
    };

    Some(ScoreboardEvent {
        id,
        date,
        week,
        home_team,
        away_team,
        score,
        completed,
    })
}

/// Events that cannot be read (no id, date or sides) are logged and dropped.
pub fn parse_scoreboard_json(raw: &str) -> Result<Vec<ScoreboardEvent>> {
    let root: Value = serde_json::from_str(raw).context("invalid scoreboard json")?;
    let Some(events) = root.get("events").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    Ok(events
        .iter()
        .filter_map(|event| {
            let parsed = parse_event(event);
            if parsed.is_none() {
                let id = event.get("id").and_then(Value::as_str).unwrap_or("?");
                warn!(event_id = %id, "unreadable scoreboard event");
            }
            parsed
        })
        .collect())
}

fn parse_stat_block(team: &Value) -> TeamStatLine {
    let mut line = TeamStatLine::default();
    let Some(stats) = team.get("statistics").and_then(Value::as_array) else {
        return line;
    };
    for stat in stats {
        let label = stat
            .get("name")
            .and_then(Value::as_str)
            .or_else(|| stat.get("label").and_then(Value::as_str));
        let value = match stat.get("displayValue") {
            Some(Value::String(s)) => Some(RawValue::from(s.as_str())),
            Some(Value::Number(n)) => n.as_f64().map(RawValue::from),
            _ => None,
        };
        if let (Some(label), Some(value)) = (label, value) {
            line.insert(label, &value);
        }
    }
    line
}

/// Team box scores from a game summary. Without `homeAway` markers the feed
/// lists the away team first.
pub fn parse_boxscore_json(raw: &str) -> Result<Option<BoxScore>> {
    let root: Value = serde_json::from_str(raw).context("invalid summary json")?;
    let Some(teams) = root.pointer("/boxscore/teams").and_then(Value::as_array) else {
        return Ok(None);
    };
    if teams.len() < 2 {
        return Ok(None);
    }
    let side_of = |t: &Value| t.get("homeAway").and_then(Value::as_str).map(str::to_string);
    let home = teams
        .iter()
        .find(|t| side_of(t).as_deref() == Some("home"))
        .unwrap_or(&teams[1]);
    let away = teams
        .iter()
        .find(|t| side_of(t).as_deref() == Some("away"))
        .unwrap_or(&teams[0]);
    Ok(Some(BoxScore {
        home: parse_stat_block(home),
        away: parse_stat_block(away),
    }))
}

pub fn parse_injuries_json(raw: &str) -> Result<Vec<InjuryReport>> {
    let root: Value = serde_json::from_str(raw).context("invalid injuries json")?;
    let Some(groups) = root.get("injuries").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for group in groups {
        let Some(team) = group.get("displayName").and_then(Value::as_str) else {
            continue;
        };
        let Some(entries) = group.get("injuries").and_then(Value::as_array) else {
            continue;
        };
        for entry in entries {
            let player = entry.pointer("/athlete/displayName").and_then(Value::as_str);
            let status = entry.get("status").and_then(Value::as_str);
            let (Some(player), Some(status)) = (player, status) else {
                continue;
            };
            let body_part = entry
                .pointer("/details/type")
                .and_then(Value::as_str)
                .map(str::to_string);
            out.push(InjuryReport {
                team: teams::canonical_name(team).unwrap_or(team).to_string(),
                player: player.to_string(),
                status: status.to_string(),
                body_part,
            });
        }
    }
    Ok(out)
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .ok()
}

fn with_fetch_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

pub struct EspnSource {
    season: i32,
    client: &'static Client,
    retry: RetryPolicy,
    pool: Option<rayon::ThreadPool>,
}

impl EspnSource {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        Ok(Self {
            season: cfg.season,
            client: http_client(cfg.request_timeout_secs)?,
            retry: cfg.retry,
            pool: build_fetch_pool(cfg.fetch_parallelism),
        })
    }

    fn get(&self, url: &str) -> Result<String> {
        fetch_text_with_retry(self.client, url, &self.retry)
    }

    fn scoreboard_week(&self, week: u32) -> Result<Vec<ScoreboardEvent>> {
        let url = format!(
            "{ESPN_BASE}/scoreboard?dates={}&seasontype={REGULAR_SEASON}&week={week}",
            self.season
        );
        let raw = self
            .get(&url)
            .with_context(|| format!("scoreboard for week {week}"))?;
        parse_scoreboard_json(&raw)
    }

    fn box_score(&self, event_id: &str) -> Result<BoxScore> {
        let url = format!("{ESPN_BASE}/summary?event={event_id}");
        let raw = self.get(&url)?;
        parse_boxscore_json(&raw)?.with_context(|| format!("no box score in summary {event_id}"))
    }
}

impl GameSource for EspnSource {
    fn completed_games(&self, weeks: RangeInclusive<u32>) -> Result<Vec<CompletedGame>> {
        let mut finished = Vec::new();
        for week in weeks {
            finished.extend(
                self.scoreboard_week(week)?
                    .into_iter()
                    .filter(|e| e.completed)
                    .filter_map(|e| e.score.map(|score| (e, score))),
            );
        }

        let games: Vec<CompletedGame> = with_fetch_pool(&self.pool, || {
            finished
                .par_iter()
                .map(|(event, score)| {
                    // A missing box score still leaves a usable result for Elo.
                    let stats = self.box_score(&event.id).unwrap_or_else(|err| {
                        warn!(game_id = %event.id, error = %err, "box score unavailable");
                        BoxScore::default()
                    });
                    CompletedGame {
                        id: event.id.clone(),
                        date: event.date,
                        week: event.week,
                        home_team: event.home_team.clone(),
                        away_team: event.away_team.clone(),
                        score: *score,
                        home_stats: stats.home,
                        away_stats: stats.away,
                    }
                })
                .collect()
        });
        info!(season = self.season, games = games.len(), "completed games fetched");
        Ok(games)
    }

    fn upcoming_games(&self) -> Result<Vec<UpcomingGame>> {
        let raw = self
            .get(&format!("{ESPN_BASE}/scoreboard"))
            .context("current scoreboard")?;
        let games: Vec<UpcomingGame> = parse_scoreboard_json(&raw)?
            .iter()
            .filter(|e| !e.completed)
            .map(ScoreboardEvent::upcoming)
            .collect();
        info!(games = games.len(), "upcoming games fetched");
        Ok(games)
    }

    fn injuries(&self) -> Result<Vec<InjuryReport>> {
        let raw = self
            .get(&format!("{ESPN_BASE}/injuries"))
            .context("injury report")?;
        parse_injuries_json(&raw)
    }
}
