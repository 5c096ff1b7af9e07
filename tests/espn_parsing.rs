use std::fs;
use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use gridiron_forecast::espn::{parse_boxscore_json, parse_injuries_json, parse_scoreboard_json};
use gridiron_forecast::games::Score;
use gridiron_forecast::injuries::injury_notes;
use gridiron_forecast::stat_normalize::{StatField, StatValue};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_scoreboard_fixture() {
    let raw = read_fixture("espn_scoreboard.json");
    let events = parse_scoreboard_json(&raw).expect("fixture should parse");
    // The event without competitions is dropped.
    assert_eq!(events.len(), 3);

    let opener = &events[0];
    assert_eq!(opener.id, "401671789");
    assert_eq!(opener.week, 1);
    assert_eq!(opener.date, Utc.with_ymd_and_hms(2024, 9, 6, 0, 20, 0).unwrap());
    assert_eq!(opener.home_team, "Kansas City Chiefs");
    assert_eq!(opener.away_team, "Baltimore Ravens");
    assert_eq!(opener.score, Some(Score::new(27, 20)));
    assert!(opener.completed);

    // Competitor order in the feed does not decide the side.
    assert_eq!(events[1].home_team, "Philadelphia Eagles");
    assert_eq!(events[1].score, Some(Score::new(34, 29)));

    assert!(!events[2].completed);
    assert_eq!(events[2].upcoming().home_team, "Buffalo Bills");
}

#[test]
fn parses_summary_box_scores() {
    let raw = read_fixture("espn_summary.json");
    let box_score = parse_boxscore_json(&raw)
        .expect("fixture should parse")
        .expect("fixture has both teams");

    let bal = &box_score.away;
    assert_eq!(bal.number(StatField::TotalYards), Some(452.0));
    assert_eq!(bal.number(StatField::PassingYards), Some(273.0));
    let third = bal.ratio(StatField::ThirdDownEfficiency).unwrap();
    assert_eq!((third.made, third.attempts), (5.0, 11.0));
    let fourth = bal.ratio(StatField::FourthDownEfficiency).unwrap();
    assert_eq!(fourth.percentage, 0.0);
    assert_eq!(bal.number(StatField::PossessionTime), Some(34.0 * 60.0 + 16.0));
    assert_eq!(
        bal.extra.get("defensiveTouchdowns"),
        Some(&StatValue::Number(0.0))
    );

    let kc = &box_score.home;
    assert_eq!(kc.ratio(StatField::Sacks).map(|r| r.made), Some(3.0));
    assert_eq!(kc.ratio(StatField::RedZoneEfficiency).map(|r| r.percentage), Some(100.0));
}

#[test]
fn summary_without_boxscore_is_none() {
    let parsed = parse_boxscore_json(r#"{"header": {"id": "1"}}"#).expect("valid json");
    assert!(parsed.is_none());
    assert!(parse_boxscore_json("not json").is_err());
}

#[test]
fn parses_injury_report_and_tags_matchup() {
    let raw = read_fixture("espn_injuries.json");
    let reports = parse_injuries_json(&raw).expect("fixture should parse");
    // The entry without an athlete is skipped.
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].team, "Kansas City Chiefs");
    assert_eq!(reports[0].body_part.as_deref(), Some("Fibula"));

    let notes = injury_notes("Kansas City Chiefs", "Baltimore Ravens", &reports);
    assert_eq!(
        notes,
        vec![
            "KC: Isiah Pacheco (Injured Reserve, Fibula)".to_string(),
            "BAL: Kyle Van Noy (Out)".to_string(),
        ]
    );
}
