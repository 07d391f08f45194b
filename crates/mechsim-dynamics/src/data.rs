//! Output samples and the column metadata charting consumers need.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One sample of the trajectory.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    /// Elapsed time (s).
    pub time: f64,
    /// Distance travelled (m, or rad for an arm).
    pub position: f64,
    /// Speed.
    pub velocity: f64,
    /// Acceleration.
    pub acceleration: f64,
    /// Reserved, always zero.
    pub voltage_setpoint: f64,
    /// Current drawn by each motor (A).
    pub current_per_motor: f64,
    /// Current drawn by all motors (A).
    pub total_current: f64,
    /// Bus voltage after sag (V).
    pub system_voltage: f64,
    /// Charge drawn by one motor during the step (mAh).
    pub energy_per_motor: f64,
    /// Charge drawn by all motors since the start (mAh).
    pub total_energy: f64,
    /// Traction broken.
    pub slipping: bool,
    /// Bus voltage below the brownout threshold.
    pub brownout: bool,
    /// Gravity component along the direction of travel (N).
    pub gravity_force: f64,
}

impl DataPoint {
    /// Raw value of one column, flags as `0.0`/`1.0`.
    pub fn value(&self, field: DataField) -> f64 {
        match field {
            DataField::Time => self.time,
            DataField::Position => self.position,
            DataField::Velocity => self.velocity,
            DataField::Acceleration => self.acceleration,
            DataField::VoltageSetpoint => self.voltage_setpoint,
            DataField::Current => self.current_per_motor,
            DataField::TotalCurrent => self.total_current,
            DataField::SystemVoltage => self.system_voltage,
            DataField::Energy => self.energy_per_motor,
            DataField::TotalEnergy => self.total_energy,
            DataField::Slipping => f64::from(u8::from(self.slipping)),
            DataField::Brownout => f64::from(u8::from(self.brownout)),
            DataField::Gravity => self.gravity_force,
        }
    }

    /// Value divided by the column's display scale factor.
    pub fn scaled(&self, field: DataField) -> f64 {
        self.value(field) / field.scale_factor()
    }
}

/// Columns of a [`DataPoint`], in output order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataField {
    /// Elapsed time.
    Time,
    /// Position.
    Position,
    /// Velocity.
    Velocity,
    /// Acceleration.
    Acceleration,
    /// Reserved voltage setpoint.
    VoltageSetpoint,
    /// Per-motor current.
    Current,
    /// Current of all motors.
    TotalCurrent,
    /// Bus voltage.
    SystemVoltage,
    /// Per-motor charge for the step.
    Energy,
    /// Cumulative charge.
    TotalEnergy,
    /// Slip flag.
    Slipping,
    /// Brownout flag.
    Brownout,
    /// Gravity force.
    Gravity,
}

impl DataField {
    /// Every column, in output order.
    pub const ALL: [DataField; 13] = [
        DataField::Time,
        DataField::Position,
        DataField::Velocity,
        DataField::Acceleration,
        DataField::VoltageSetpoint,
        DataField::Current,
        DataField::TotalCurrent,
        DataField::SystemVoltage,
        DataField::Energy,
        DataField::TotalEnergy,
        DataField::Slipping,
        DataField::Brownout,
        DataField::Gravity,
    ];

    /// Short machine key.
    pub const fn key(self) -> &'static str {
        match self {
            DataField::Time => "time",
            DataField::Position => "pos",
            DataField::Velocity => "vel",
            DataField::Acceleration => "accel",
            DataField::VoltageSetpoint => "voltage",
            DataField::Current => "current",
            DataField::TotalCurrent => "total_current",
            DataField::SystemVoltage => "sys_voltage",
            DataField::Energy => "energy",
            DataField::TotalEnergy => "total_energy",
            DataField::Slipping => "slipping",
            DataField::Brownout => "brownout",
            DataField::Gravity => "gravity",
        }
    }

    /// Axis label, including the scale applied by [`DataPoint::scaled`].
    pub const fn header(self) -> &'static str {
        match self {
            DataField::Time => "Time (s)",
            DataField::Position => "Position (m)",
            DataField::Velocity => "Velocity (m/s)",
            DataField::Acceleration => "Acceleration (m/s/s)",
            DataField::VoltageSetpoint => "Voltage (V)",
            DataField::Current => "Current/10 (A)",
            DataField::TotalCurrent => "Total Current/100 (A)",
            DataField::SystemVoltage => "System Voltage (V)",
            DataField::Energy => "Energy (mAh)",
            DataField::TotalEnergy => "Total Energy/10 (mAh)",
            DataField::Slipping => "Slipping",
            DataField::Brownout => "Brownout",
            DataField::Gravity => "Force of Gravity (N)",
        }
    }

    /// Divisor applied before display.
    pub const fn scale_factor(self) -> f64 {
        match self {
            DataField::Current => 10.0,
            DataField::TotalCurrent => 100.0,
            DataField::Energy => 100.0,
            DataField::TotalEnergy => 10.0,
            _ => 1.0,
        }
    }

    /// Look a column up by its short key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

impl fmt::Display for DataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// `(time, scaled value)` pairs for one column, ready to plot.
pub fn chart_series(points: &[DataPoint], field: DataField) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|point| (point.time, point.scaled(field)))
        .collect()
}
