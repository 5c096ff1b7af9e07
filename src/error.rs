use thiserror::Error;

/// Failures inside the rating and prediction core. Batch callers log these
/// and drop the affected game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastError {
    #[error("unknown team `{0}`")]
    UnknownTeam(String),

    #[error("no season aggregate for `{0}`")]
    MissingAggregate(String),

    #[error("league averages have not been computed")]
    MissingLeagueAverage,
}
