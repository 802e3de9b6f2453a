//! Errors surfaced while setting up or starting an attack controller.

use thiserror::Error;
use volley_core::error::ConfigError;
use volley_pool::PoolError;

#[derive(Debug, Error)]
pub enum CombatError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("an attack cycle is already running")]
    CycleAlreadyRunning,
}
