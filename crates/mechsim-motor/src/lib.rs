#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for brushed DC motor electrical models."]
#![doc = ""]
#![doc = "This crate turns motor nameplate data (stall/free operating points) into the"]
#![doc = "steady-state constants used by the mechanism simulator: winding resistance,"]
#![doc = "back-EMF constant and shaft torque constant."]

use core::f64::consts::PI;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub mod presets;

pub use error::MotorError;
pub use presets::MotorPreset;

/// Nameplate data for a single motor unit.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorSpec {
    /// Voltage at which the stall and free figures were measured (V).
    pub max_voltage: f64,
    /// Unloaded shaft speed at `max_voltage` (rpm).
    pub free_speed_rpm: f64,
    /// Torque with the shaft locked (N·m).
    pub stall_torque: f64,
    /// Current with the shaft locked (A).
    pub stall_current: f64,
    /// Current drawn at free speed (A).
    pub free_current: f64,
}

impl MotorSpec {
    /// Construct a new nameplate spec.
    ///
    /// # Arguments
    ///
    /// * `max_voltage`: Rated voltage (V).
    /// * `free_speed_rpm`: Free speed (rpm).
    /// * `stall_torque`: Stall torque (N·m).
    /// * `stall_current`: Stall current (A).
    /// * `free_current`: Free current (A).
    pub const fn new(
        max_voltage: f64,
        free_speed_rpm: f64,
        stall_torque: f64,
        stall_current: f64,
        free_current: f64,
    ) -> Self {
        MotorSpec {
            max_voltage,
            free_speed_rpm,
            stall_torque,
            stall_current,
            free_current,
        }
    }

    /// Free speed converted to rad/s.
    pub fn free_speed_rad_s(&self) -> f64 {
        self.free_speed_rpm * 2.0 * PI / 60.0
    }

    fn is_finite(&self) -> bool {
        self.max_voltage.is_finite()
            && self.free_speed_rpm.is_finite()
            && self.stall_torque.is_finite()
            && self.stall_current.is_finite()
            && self.free_current.is_finite()
    }
}

impl fmt::Display for MotorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.1} V, {:.0} rpm, {:.2} N·m @ {:.1} A, free {:.1} A)",
            self.max_voltage,
            self.free_speed_rpm,
            self.stall_torque,
            self.stall_current,
            self.free_current
        )
    }
}

/// Steady-state electrical model of `num_motors` identical motors sharing one shaft.
///
/// Immutable once derived. The torque constant already accounts for the motor
/// count; resistance and back-EMF constant are per motor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorModel {
    spec: MotorSpec,
    num_motors: u32,
    free_speed_rad_s: f64,
    k_r: f64,
    k_v: f64,
    k_t: f64,
}

impl MotorModel {
    /// Derive the electrical constants for `num_motors` units of `spec`.
    ///
    /// * `k_r = max_voltage / stall_current`
    /// * `k_v = free_speed_rad_s / (max_voltage - k_r * free_current)`
    /// * `k_t = num_motors * stall_torque / stall_current`
    ///
    /// # Errors
    ///
    /// Returns `Err(MotorError::InvalidMotorCount)` if `num_motors` is zero.
    /// Returns `Err(MotorError::NonFiniteParameter)` if any nameplate value is NaN or infinite.
    /// Returns `Err(MotorError::InvalidStallCurrent)` if `stall_current` is not positive.
    /// Returns `Err(MotorError::InvalidBackEmf)` if the free current is at or above stall.
    pub fn derive(spec: MotorSpec, num_motors: u32) -> Result<Self, MotorError> {
        if num_motors == 0 {
            return Err(MotorError::InvalidMotorCount("must be at least one"));
        }
        if !spec.is_finite() {
            return Err(MotorError::NonFiniteParameter("all values must be finite"));
        }
        if spec.stall_current <= 0.0 {
            return Err(MotorError::InvalidStallCurrent("must be positive"));
        }

        let free_speed_rad_s = spec.free_speed_rad_s();
        let k_r = spec.max_voltage / spec.stall_current;
        let back_emf_voltage = spec.max_voltage - k_r * spec.free_current;
        if back_emf_voltage <= 0.0 {
            return Err(MotorError::InvalidBackEmf(
                "free current must be below stall current",
            ));
        }
        let k_v = free_speed_rad_s / back_emf_voltage;
        let k_t = f64::from(num_motors) * spec.stall_torque / spec.stall_current;

        Ok(MotorModel {
            spec,
            num_motors,
            free_speed_rad_s,
            k_r,
            k_v,
            k_t,
        })
    }

    /// Returns the nameplate spec this model was derived from.
    pub fn spec(&self) -> &MotorSpec {
        &self.spec
    }

    /// Returns the number of motors driving the shaft.
    pub fn num_motors(&self) -> u32 {
        self.num_motors
    }

    /// Returns the free speed (rad/s).
    pub fn free_speed_rad_s(&self) -> f64 {
        self.free_speed_rad_s
    }

    /// Returns the winding resistance of one motor (Ω).
    pub fn k_r(&self) -> f64 {
        self.k_r
    }

    /// Returns the back-EMF constant (rad/s per volt).
    pub fn k_v(&self) -> f64 {
        self.k_v
    }

    /// Returns the combined torque constant of all motors (N·m per amp of per-motor current).
    pub fn k_t(&self) -> f64 {
        self.k_t
    }
}

impl fmt::Display for MotorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MotorModel (n: {}, k_r: {:.4} Ω, k_v: {:.2} rad/s/V, k_t: {:.4} N·m/A)",
            self.num_motors, self.k_r, self.k_v, self.k_t
        )
    }
}
