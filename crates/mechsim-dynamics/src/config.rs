//! Simulation inputs: mechanism geometry, limits, friction, electrical and
//! integration parameters, plus the stock mechanism presets.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SimulationError;

/// Parameters for one simulation run. Immutable for the duration of the run.
///
/// Angles are in degrees, energy is reported in mAh, everything else is SI.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Gear ratio, driven/driving.
    pub gear_ratio: f64,
    /// Wheel, pulley or (2 × CG distance) diameter (m).
    pub effective_diameter: f64,
    /// Mass moved by the mechanism (kg).
    pub effective_mass: f64,
    /// Fraction of motor torque reaching the output, `0..=1`.
    pub gearbox_efficiency: f64,
    /// Incline of the direction of travel relative to the ground (deg).
    pub incline_angle: f64,

    /// Sustained current limit per motor (A).
    pub motor_current_limit: Option<f64>,
    /// Peak current limit per motor (A), applied every step.
    pub motor_peak_current_limit: Option<f64>,
    /// Voltage limit per motor (V).
    pub motor_voltage_limit: Option<f64>,

    /// Whether traction slip is modeled.
    pub check_for_slip: bool,
    /// Kinetic friction coefficient µk.
    pub coeff_kinetic_friction: f64,
    /// Static friction coefficient µs.
    pub coeff_static_friction: f64,

    /// Constant resistive force (N).
    pub k_resistance_static: f64,
    /// Velocity-proportional resistive force (N·s/m).
    pub k_resistance_viscous: f64,

    /// Open-circuit battery voltage (V).
    pub battery_voltage: f64,
    /// Resistance from the battery to the distribution panel (Ω).
    pub resistance_common: f64,
    /// Resistance from the distribution panel to each motor (Ω).
    pub resistance_individual: f64,

    /// Integration step (s).
    pub time_step: f64,
    /// Simulated time span (s).
    pub simulation_duration: f64,
    /// Distance at which the run stops early, `None` for unbounded (m).
    pub max_distance: Option<f64>,
    /// Starting position (m).
    pub initial_position: f64,
    /// Starting velocity (m/s).
    pub initial_velocity: f64,
    /// Starting acceleration (m/s²).
    pub initial_acceleration: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            gear_ratio: 10.0,
            effective_diameter: 0.15,
            effective_mass: 65.0,
            gearbox_efficiency: 0.7,
            incline_angle: 0.0,
            motor_current_limit: None,
            motor_peak_current_limit: None,
            motor_voltage_limit: None,
            check_for_slip: false,
            coeff_kinetic_friction: 0.8,
            coeff_static_friction: 1.0,
            k_resistance_static: 0.0,
            k_resistance_viscous: 0.0,
            battery_voltage: 12.5,
            resistance_common: 0.013,
            resistance_individual: 0.002,
            time_step: 0.01,
            simulation_duration: 20.0,
            max_distance: Some(5.0),
            initial_position: 0.0,
            initial_velocity: 0.0,
            initial_acceleration: 0.0,
        }
    }
}

fn invalid(field: &'static str, reason: &'static str) -> SimulationError {
    SimulationError::InvalidConfig { field, reason }
}

fn finite(field: &'static str, value: f64) -> Result<f64, SimulationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(field, "must be finite"))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), SimulationError> {
    if finite(field, value)? <= 0.0 {
        return Err(invalid(field, "must be positive"));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), SimulationError> {
    if finite(field, value)? < 0.0 {
        return Err(invalid(field, "must be non-negative"));
    }
    Ok(())
}

impl SimulationConfig {
    /// Check every field before a run.
    ///
    /// # Errors
    ///
    /// Returns `Err(SimulationError::InvalidConfig)` naming the first field that is
    /// non-finite or outside its range.
    pub fn validate(&self) -> Result<(), SimulationError> {
        positive("gear_ratio", self.gear_ratio)?;
        positive("effective_diameter", self.effective_diameter)?;
        positive("effective_mass", self.effective_mass)?;
        if !(0.0..=1.0).contains(&finite("gearbox_efficiency", self.gearbox_efficiency)?) {
            return Err(invalid("gearbox_efficiency", "must be within [0, 1]"));
        }
        finite("incline_angle", self.incline_angle)?;

        if let Some(limit) = self.motor_current_limit {
            non_negative("motor_current_limit", limit)?;
        }
        if let Some(limit) = self.motor_peak_current_limit {
            non_negative("motor_peak_current_limit", limit)?;
        }
        if let Some(limit) = self.motor_voltage_limit {
            positive("motor_voltage_limit", limit)?;
        }

        non_negative("coeff_kinetic_friction", self.coeff_kinetic_friction)?;
        non_negative("coeff_static_friction", self.coeff_static_friction)?;
        finite("k_resistance_static", self.k_resistance_static)?;
        finite("k_resistance_viscous", self.k_resistance_viscous)?;

        finite("battery_voltage", self.battery_voltage)?;
        finite("resistance_common", self.resistance_common)?;
        finite("resistance_individual", self.resistance_individual)?;

        positive("time_step", self.time_step)?;
        non_negative("simulation_duration", self.simulation_duration)?;
        if let Some(max) = self.max_distance {
            finite("max_distance", max)?;
        }
        finite("initial_position", self.initial_position)?;
        finite("initial_velocity", self.initial_velocity)?;
        finite("initial_acceleration", self.initial_acceleration)?;
        Ok(())
    }

    /// Radius the drive force acts at (m).
    pub fn effective_radius(&self) -> f64 {
        self.effective_diameter / 2.0
    }

    /// Incline converted to radians.
    pub fn incline_radians(&self) -> f64 {
        self.incline_angle.to_radians()
    }
}

/// The kinds of mechanism the simulator ships defaults for.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MechanismKind {
    /// A wheeled drivetrain; diameter is the wheel, mass is the robot.
    Drivetrain,
    /// A pulley-driven elevator carriage.
    Elevator,
    /// A rotating arm; diameter is twice the CG distance and position is in radians.
    Arm,
}

impl MechanismKind {
    /// Every kind, in display order.
    pub const ALL: [MechanismKind; 3] = [
        MechanismKind::Drivetrain,
        MechanismKind::Elevator,
        MechanismKind::Arm,
    ];

    /// Human readable name.
    pub const fn name(self) -> &'static str {
        match self {
            MechanismKind::Drivetrain => "Drivetrain",
            MechanismKind::Elevator => "Elevator",
            MechanismKind::Arm => "Arm",
        }
    }

    /// Unit the position output is expressed in.
    pub const fn distance_unit(self) -> &'static str {
        match self {
            MechanismKind::Drivetrain | MechanismKind::Elevator => "m",
            MechanismKind::Arm => "rad",
        }
    }

    /// Number of motors a new model of this kind starts with.
    pub const fn default_motor_count(self) -> u32 {
        match self {
            MechanismKind::Drivetrain => 4,
            MechanismKind::Elevator | MechanismKind::Arm => 2,
        }
    }

    /// Starting parameters for a new model of this kind.
    pub fn default_config(self) -> SimulationConfig {
        let (effective_diameter, effective_mass) = match self {
            MechanismKind::Drivetrain => (0.15, 65.0),
            MechanismKind::Elevator => (2.0 * 0.0254, 10.0),
            MechanismKind::Arm => (1.0, 10.0),
        };
        SimulationConfig {
            effective_diameter,
            effective_mass,
            simulation_duration: 10.0,
            max_distance: Some(8.0),
            ..SimulationConfig::default()
        }
    }
}

impl fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
