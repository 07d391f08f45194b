//! This module defines the error types used by the `mechsim-dynamics` crate.

use mechsim_motor::MotorError;
use thiserror::Error;

/// Error type for simulation setup and result access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A configuration field is out of its valid range.
    #[error("Invalid configuration: `{field}` {reason}")]
    InvalidConfig {
        /// Name of the offending `SimulationConfig` field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
    /// The motor nameplate data could not be turned into a model.
    #[error(transparent)]
    Motor(#[from] MotorError),
    /// The trajectory has no samples (the simulator has not been run).
    #[error("No data points: the simulation has not been run")]
    NoData,
}
