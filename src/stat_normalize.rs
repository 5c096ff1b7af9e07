use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical box-score fields understood by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    FirstDowns,
    ThirdDownEfficiency,
    FourthDownEfficiency,
    TotalPlays,
    TotalYards,
    PassingYards,
    RushingYards,
    CompletionAttempts,
    RushingAttempts,
    RedZoneEfficiency,
    Sacks,
    Penalties,
    Turnovers,
    FumblesLost,
    Interceptions,
    PossessionTime,
}

// Keys are labels after `label_key`: no whitespace, no dashes, lower-case.
const SYNONYMS: &[(&str, StatField)] = &[
    ("firstdowns", StatField::FirstDowns),
    ("1stdowns", StatField::FirstDowns),
    ("thirddowneff", StatField::ThirdDownEfficiency),
    ("thirddownefficiency", StatField::ThirdDownEfficiency),
    ("3rddowneff", StatField::ThirdDownEfficiency),
    ("3rddownefficiency", StatField::ThirdDownEfficiency),
    ("fourthdowneff", StatField::FourthDownEfficiency),
    ("fourthdownefficiency", StatField::FourthDownEfficiency),
    ("4thdowneff", StatField::FourthDownEfficiency),
    ("4thdownefficiency", StatField::FourthDownEfficiency),
    ("totaloffensiveplays", StatField::TotalPlays),
    ("totalplays", StatField::TotalPlays),
    ("totalyards", StatField::TotalYards),
    ("totaloffense", StatField::TotalYards),
    ("netpassingyards", StatField::PassingYards),
    ("passingyards", StatField::PassingYards),
    ("passing", StatField::PassingYards),
    ("rushingyards", StatField::RushingYards),
    ("rushing", StatField::RushingYards),
    ("completionattempts", StatField::CompletionAttempts),
    ("compatt", StatField::CompletionAttempts),
    ("rushingattempts", StatField::RushingAttempts),
    ("redzoneattempts", StatField::RedZoneEfficiency),
    ("redzoneefficiency", StatField::RedZoneEfficiency),
    ("redzone(madeatt)", StatField::RedZoneEfficiency),
    ("sacksyardslost", StatField::Sacks),
    ("sacks", StatField::Sacks),
    ("totalpenaltiesyards", StatField::Penalties),
    ("penalties", StatField::Penalties),
    ("turnovers", StatField::Turnovers),
    ("fumbleslost", StatField::FumblesLost),
    ("interceptions", StatField::Interceptions),
    ("interceptionsthrown", StatField::Interceptions),
    ("possessiontime", StatField::PossessionTime),
    ("possession", StatField::PossessionTime),
    ("timeofpossession", StatField::PossessionTime),
];

/// Where a raw label landed after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatKey {
    Known(StatField),
    /// Labels missing from the synonym table keep their original spelling.
    Other(String),
}

/// Value as delivered by the upstream feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ratio {
    pub made: f64,
    pub attempts: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Ratio(Ratio),
    /// Unparseable upstream text, kept verbatim. Numeric accessors skip it.
    Text(String),
}

fn label_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn normalize_label(raw: &str) -> StatKey {
    let key = label_key(raw);
    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == key)
        .map(|(_, field)| StatKey::Known(*field))
        .unwrap_or_else(|| StatKey::Other(raw.to_string()))
}

pub fn parse_value(raw: &RawValue) -> StatValue {
    match raw {
        RawValue::Number(n) => StatValue::Number(*n),
        RawValue::Text(s) => parse_text(s),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_text(raw: &str) -> StatValue {
    let s = raw.trim();

    if let Some((made, attempts)) = s.split_once('-')
        && is_digits(made)
        && is_digits(attempts)
        && let (Ok(m), Ok(a)) = (made.parse::<f64>(), attempts.parse::<f64>())
    {
        let percentage = if attempts == "0" || a == 0.0 { 0.0 } else { m / a * 100.0 };
        return StatValue::Ratio(Ratio {
            made: m,
            attempts: a,
            percentage,
        });
    }

    if let Some(pct) = s.strip_suffix('%')
        && let Ok(n) = pct.trim().parse::<f64>()
    {
        return StatValue::Number(n);
    }

    if let Some((mm, ss)) = s.split_once(':')
        && is_digits(mm)
        && is_digits(ss)
        && let (Ok(m), Ok(sec)) = (mm.parse::<f64>(), ss.parse::<f64>())
    {
        return StatValue::Number(m * 60.0 + sec);
    }

    match s.replace(',', "").parse::<f64>() {
        Ok(n) if n.is_finite() => StatValue::Number(n),
        _ => StatValue::Text(raw.to_string()),
    }
}

/// One team's normalized box-score block for a single game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStatLine {
    #[serde(default)]
    pub fields: BTreeMap<StatField, StatValue>,
    #[serde(default)]
    pub extra: BTreeMap<String, StatValue>,
}

impl TeamStatLine {
    pub fn from_raw<I, L>(raw: I) -> Self
    where
        I: IntoIterator<Item = (L, RawValue)>,
        L: AsRef<str>,
    {
        let mut line = TeamStatLine::default();
        for (label, value) in raw {
            line.insert(label.as_ref(), &value);
        }
        line
    }

    pub fn insert(&mut self, label: &str, value: &RawValue) {
        let parsed = parse_value(value);
        match normalize_label(label) {
            StatKey::Known(field) => {
                self.fields.insert(field, parsed);
            }
            StatKey::Other(name) => {
                self.extra.insert(name, parsed);
            }
        }
    }

    pub fn get(&self, field: StatField) -> Option<&StatValue> {
        self.fields.get(&field)
    }

    /// Scalar value of a field; ratios and text yield `None`.
    pub fn number(&self, field: StatField) -> Option<f64> {
        match self.fields.get(&field)? {
            StatValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Structured made/attempts value of a field; scalars and text yield `None`.
    pub fn ratio(&self, field: StatField) -> Option<Ratio> {
        match self.fields.get(&field)? {
            StatValue::Ratio(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> StatValue {
        parse_value(&RawValue::from(s))
    }

    #[test]
    fn labels_map_through_synonyms() {
        assert_eq!(
            normalize_label("3rd down efficiency"),
            StatKey::Known(StatField::ThirdDownEfficiency)
        );
        assert_eq!(
            normalize_label("Red Zone (Made-Att)"),
            StatKey::Known(StatField::RedZoneEfficiency)
        );
        assert_eq!(normalize_label("thirdDownEff"), StatKey::Known(StatField::ThirdDownEfficiency));
        assert_eq!(normalize_label("Sacks-Yards Lost"), StatKey::Known(StatField::Sacks));
        assert_eq!(
            normalize_label("Defensive / Special Teams TDs"),
            StatKey::Other("Defensive / Special Teams TDs".to_string())
        );
    }

    #[test]
    fn made_attempts_become_ratio() {
        match text("5-12") {
            StatValue::Ratio(r) => {
                assert_eq!(r.made, 5.0);
                assert_eq!(r.attempts, 12.0);
                assert!((r.percentage - 41.666_666).abs() < 1e-3);
            }
            other => panic!("expected ratio, got {other:?}"),
        }
    }

    #[test]
    fn zero_attempts_has_zero_percentage() {
        assert_eq!(
            text("0-0"),
            StatValue::Ratio(Ratio {
                made: 0.0,
                attempts: 0.0,
                percentage: 0.0
            })
        );
    }

    #[test]
    fn percent_clock_and_plain_numbers() {
        assert_eq!(text("45%"), StatValue::Number(45.0));
        assert_eq!(text("31:24"), StatValue::Number(31.0 * 60.0 + 24.0));
        assert_eq!(text("412"), StatValue::Number(412.0));
        assert_eq!(text("-3"), StatValue::Number(-3.0));
        assert_eq!(text("1,204"), StatValue::Number(1204.0));
        assert_eq!(parse_value(&RawValue::Number(7.5)), StatValue::Number(7.5));
    }

    #[test]
    fn malformed_text_passes_through() {
        assert_eq!(text("n/a"), StatValue::Text("n/a".to_string()));
        assert_eq!(text("3-"), StatValue::Text("3-".to_string()));
    }

    #[test]
    fn stat_line_accessors_ignore_wrong_shapes() {
        let line = TeamStatLine::from_raw([
            ("Total Yards", RawValue::from("388")),
            ("3rd down efficiency", RawValue::from("6-13")),
            ("Possession", RawValue::from("--")),
            ("Kick Return Yards", RawValue::from("44")),
        ]);
        assert_eq!(line.number(StatField::TotalYards), Some(388.0));
        assert!(line.number(StatField::ThirdDownEfficiency).is_none());
        assert_eq!(line.ratio(StatField::ThirdDownEfficiency).map(|r| r.made), Some(6.0));
        assert!(line.number(StatField::PossessionTime).is_none());
        assert_eq!(
            line.extra.get("Kick Return Yards"),
            Some(&StatValue::Number(44.0))
        );
    }
}
