#![warn(missing_docs)]
#![doc = "Longitudinal dynamics of a DC-motor-driven mechanism."]
#![doc = ""]
#![doc = "A [`Simulator`] takes a [`mechsim_motor::MotorModel`] and a [`SimulationConfig`]"]
#![doc = "(drivetrain, elevator or arm) and integrates the equations of motion with Heun's"]
#![doc = "method, accounting for current and voltage limits, battery sag, traction slip and"]
#![doc = "brownout. The result is a deterministic sequence of [`DataPoint`] samples."]
#![doc = ""]
#![doc = "Simulators own all of their state, so independent runs can be spread across"]
#![doc = "threads without any coordination."]

pub mod config;
pub mod data;
pub mod error;
pub mod simulator;
pub mod state;

pub use config::{MechanismKind, SimulationConfig};
pub use data::{DataField, DataPoint, chart_series};
pub use error::SimulationError;
pub use simulator::Simulator;
pub use state::{CurrentHistory, Latch, SimulationState};

/// Standard gravity used to turn mass into weight (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Bus voltage below which the robot controller browns out (V).
pub const BROWNOUT_VOLTAGE: f64 = 7.0;

/// Number of per-motor current samples averaged by the sustained current limit.
pub const CURRENT_HISTORY_LEN: usize = 20;
