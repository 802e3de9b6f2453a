use thiserror::Error;
use volley_combat::CombatError;

/// Failure while loading or applying a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scenario: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Combat(#[from] CombatError),
    #[error("timeline refers to unknown entity '{0}'")]
    UnknownEntity(String),
}
