#![warn(missing_docs)]

//! Error types for the motor library.
//!
//! This module defines the errors returned when nameplate data cannot be
//! turned into a usable electrical model.

use core::fmt;

/// Errors that can occur while deriving a motor model.
#[derive(Debug, Clone, PartialEq)]
pub enum MotorError {
    /// Error for an invalid motor count.
    /// This variant is returned when zero motors are requested for a shaft.
    InvalidMotorCount(&'static str),
    /// Error for an invalid stall current.
    /// This variant is returned when the stall current is not strictly positive.
    InvalidStallCurrent(&'static str),
    /// Error for a degenerate back-EMF term.
    /// This variant is returned when `max_voltage - k_r * free_current` is not positive.
    InvalidBackEmf(&'static str),
    /// Error for NaN or infinite nameplate values.
    NonFiniteParameter(&'static str),
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::InvalidMotorCount(msg) => write!(f, "Invalid motor count: {}", msg),
            MotorError::InvalidStallCurrent(msg) => write!(f, "Invalid stall current: {}", msg),
            MotorError::InvalidBackEmf(msg) => write!(f, "Invalid back-EMF constant: {}", msg),
            MotorError::NonFiniteParameter(msg) => write!(f, "Non-finite nameplate value: {}", msg),
        }
    }
}

impl core::error::Error for MotorError {}
