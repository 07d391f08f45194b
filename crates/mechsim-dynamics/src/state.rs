//! Mutable per-run state of the simulator.

use std::collections::VecDeque;

use crate::{CURRENT_HISTORY_LEN, SimulationConfig};

/// Fixed-capacity window of the most recent per-motor current samples.
///
/// Pushing into a full window evicts the oldest sample.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentHistory {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl CurrentHistory {
    /// Create an empty window holding at most `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        CurrentHistory {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, dropping the oldest one when full.
    pub fn push(&mut self, current: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(current);
    }

    /// Mean of the retained samples, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().sum();
        Some(sum / self.samples.len() as f64)
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no samples have been pushed.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of retained samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.samples.iter()
    }
}

impl Default for CurrentHistory {
    fn default() -> Self {
        CurrentHistory::with_capacity(CURRENT_HISTORY_LEN)
    }
}

/// A boolean that can be set but never cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Latch(bool);

impl Latch {
    /// Set the latch. Returns `true` if this call tripped it.
    pub fn set(&mut self) -> bool {
        let tripped = !self.0;
        self.0 = true;
        tripped
    }

    /// Whether the latch has been set.
    pub fn is_set(&self) -> bool {
        self.0
    }
}

/// Kinematic and electrical state, owned by exactly one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// Elapsed time (s).
    pub time: f64,
    /// Distance travelled (m).
    pub position: f64,
    /// Speed (m/s).
    pub velocity: f64,
    /// Acceleration (m/s²).
    pub acceleration: f64,
    /// Voltage at the motors after battery and wiring sag (V).
    pub bus_voltage: f64,
    /// Current drawn by each motor (A).
    pub current_per_motor: f64,
    /// Charge drawn by one motor in the last step (mAh).
    pub energy_per_motor: f64,
    /// Charge drawn by all motors since the start (mAh).
    pub cumulative_energy: f64,
    /// Whether the drive force has broken traction.
    pub is_slipping: bool,
    /// Whether the bus voltage is below the brownout threshold.
    pub is_brownout: bool,
    /// Recent per-motor currents feeding the sustained current limit.
    pub current_history: CurrentHistory,
    /// Set once the sustained current limit has engaged.
    pub was_current_limited: Latch,
}

impl SimulationState {
    /// State at the configured initial conditions with a fully charged bus.
    pub fn initial(config: &SimulationConfig) -> Self {
        SimulationState {
            time: 0.0,
            position: config.initial_position,
            velocity: config.initial_velocity,
            acceleration: config.initial_acceleration,
            bus_voltage: config.battery_voltage,
            current_per_motor: 0.0,
            energy_per_motor: 0.0,
            cumulative_energy: 0.0,
            is_slipping: false,
            is_brownout: false,
            current_history: CurrentHistory::default(),
            was_current_limited: Latch::default(),
        }
    }
}
