use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Conference {
    Afc,
    Nfc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Division {
    East,
    North,
    South,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    /// Canonical full name; the identity key used by every other module.
    pub name: &'static str,
    pub abbreviation: &'static str,
    pub location: &'static str,
    pub display_name: &'static str,
    pub conference: Conference,
    pub division: Division,
    /// Historical names and abbreviations still seen in upstream feeds.
    pub alternates: &'static [&'static str],
}

impl Team {
    fn matches(&self, raw: &str) -> bool {
        self.name.eq_ignore_ascii_case(raw)
            || self.abbreviation.eq_ignore_ascii_case(raw)
            || self.display_name.eq_ignore_ascii_case(raw)
            || self.alternates.iter().any(|alt| alt.eq_ignore_ascii_case(raw))
    }
}

const fn team(
    name: &'static str,
    abbreviation: &'static str,
    location: &'static str,
    display_name: &'static str,
    conference: Conference,
    division: Division,
    alternates: &'static [&'static str],
) -> Team {
    Team {
        name,
        abbreviation,
        location,
        display_name,
        conference,
        division,
        alternates,
    }
}

use Conference::{Afc, Nfc};
use Division::{East, North, South, West};

pub const TEAMS: [Team; 32] = [
    team("Arizona Cardinals", "ARI", "Arizona", "Cardinals", Nfc, West, &["ARZ", "Phoenix Cardinals"]),
    team("Atlanta Falcons", "ATL", "Atlanta", "Falcons", Nfc, South, &[]),
    team("Baltimore Ravens", "BAL", "Baltimore", "Ravens", Afc, North, &["BLT"]),
    team("Buffalo Bills", "BUF", "Buffalo", "Bills", Afc, East, &[]),
    team("Carolina Panthers", "CAR", "Carolina", "Panthers", Nfc, South, &[]),
    team("Chicago Bears", "CHI", "Chicago", "Bears", Nfc, North, &[]),
    team("Cincinnati Bengals", "CIN", "Cincinnati", "Bengals", Afc, North, &[]),
    team("Cleveland Browns", "CLE", "Cleveland", "Browns", Afc, North, &["CLV"]),
    team("Dallas Cowboys", "DAL", "Dallas", "Cowboys", Nfc, East, &[]),
    team("Denver Broncos", "DEN", "Denver", "Broncos", Afc, West, &[]),
    team("Detroit Lions", "DET", "Detroit", "Lions", Nfc, North, &[]),
    team("Green Bay Packers", "GB", "Green Bay", "Packers", Nfc, North, &["GNB"]),
    team("Houston Texans", "HOU", "Houston", "Texans", Afc, South, &["HST"]),
    team("Indianapolis Colts", "IND", "Indianapolis", "Colts", Afc, South, &[]),
    team("Jacksonville Jaguars", "JAX", "Jacksonville", "Jaguars", Afc, South, &["JAC"]),
    team("Kansas City Chiefs", "KC", "Kansas City", "Chiefs", Afc, West, &["KAN"]),
    team("Las Vegas Raiders", "LV", "Las Vegas", "Raiders", Afc, West, &["LVR", "OAK", "Oakland Raiders"]),
    team("Los Angeles Chargers", "LAC", "Los Angeles", "Chargers", Afc, West, &["LA Chargers", "SD", "San Diego Chargers"]),
    team("Los Angeles Rams", "LAR", "Los Angeles", "Rams", Nfc, West, &["LA", "LA Rams", "STL", "St. Louis Rams"]),
    team("Miami Dolphins", "MIA", "Miami", "Dolphins", Afc, East, &[]),
    team("Minnesota Vikings", "MIN", "Minnesota", "Vikings", Nfc, North, &[]),
    team("New England Patriots", "NE", "New England", "Patriots", Afc, East, &["NWE"]),
    team("New Orleans Saints", "NO", "New Orleans", "Saints", Nfc, South, &["NOR"]),
    team("New York Giants", "NYG", "New York", "Giants", Nfc, East, &["NY Giants"]),
    team("New York Jets", "NYJ", "New York", "Jets", Afc, East, &["NY Jets"]),
    team("Philadelphia Eagles", "PHI", "Philadelphia", "Eagles", Nfc, East, &[]),
    team("Pittsburgh Steelers", "PIT", "Pittsburgh", "Steelers", Afc, North, &[]),
    team("San Francisco 49ers", "SF", "San Francisco", "49ers", Nfc, West, &["SFO", "Niners"]),
    team("Seattle Seahawks", "SEA", "Seattle", "Seahawks", Nfc, West, &[]),
    team("Tampa Bay Buccaneers", "TB", "Tampa Bay", "Buccaneers", Nfc, South, &["TAM", "Bucs"]),
    team("Tennessee Titans", "TEN", "Tennessee", "Titans", Afc, South, &[]),
    team(
        "Washington Commanders",
        "WSH",
        "Washington",
        "Commanders",
        Nfc,
        East,
        &["WAS", "Washington", "Washington Football Team", "Washington Redskins"],
    ),
];

/// Resolve any known spelling (full name, abbreviation, nickname, historical
/// name) to the registry entry. Matching is ASCII case-insensitive.
pub fn resolve(raw: &str) -> Option<&'static Team> {
    let key = raw.trim();
    if key.is_empty() {
        return None;
    }
    TEAMS.iter().find(|t| t.matches(key))
}

/// Canonical name for a raw spelling, if the team is known.
pub fn canonical_name(raw: &str) -> Option<&'static str> {
    resolve(raw).map(|t| t.name)
}

pub fn all() -> impl Iterator<Item = &'static Team> {
    TEAMS.iter()
}
