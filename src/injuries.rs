use crate::games::InjuryReport;
use crate::teams;

// Statuses worth flagging next to a prediction. Questionable players usually
// suit up, so they are left out.
const NOTABLE_STATUSES: &[&str] = &["out", "doubtful", "injured reserve", "ir", "suspended"];

fn is_notable(status: &str) -> bool {
    let s = status.trim().to_ascii_lowercase();
    NOTABLE_STATUSES.iter().any(|n| s == *n)
}

/// Coarse injury tags for both sides of a matchup, home team first.
/// Reports for teams the registry cannot resolve are ignored.
pub fn injury_notes(home: &str, away: &str, reports: &[InjuryReport]) -> Vec<String> {
    let mut out = Vec::new();
    for side in [home, away] {
        let Some(team) = teams::resolve(side) else {
            continue;
        };
        for report in reports {
            if teams::canonical_name(&report.team) != Some(team.name) || !is_notable(&report.status) {
                continue;
            }
            let detail = match report.body_part.as_deref().map(str::trim) {
                Some(part) if !part.is_empty() => format!("{}, {}", report.status.trim(), part),
                _ => report.status.trim().to_string(),
            };
            out.push(format!("{}: {} ({})", team.abbreviation, report.player.trim(), detail));
        }
    }
    out
}
