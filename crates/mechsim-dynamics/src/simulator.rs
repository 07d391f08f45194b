//! Fixed-step Heun integration of a motor-driven mechanism.

use mechsim_motor::MotorModel;
use tracing::{debug, trace};

use crate::{
    BROWNOUT_VOLTAGE, DataPoint, STANDARD_GRAVITY, SimulationConfig, SimulationError,
    SimulationState,
};

/// Relative tolerance used to snap `duration / time_step` to an integer step count.
const STEP_RATIO_TOLERANCE: f64 = 1e-9;

/// Number of integration steps after the `t = 0` sample.
///
/// Equivalent to counting `k >= 1` with `k * time_step < duration + time_step`,
/// without letting rounding in the ratio add or drop a step.
fn step_count(duration: f64, time_step: f64) -> u64 {
    let ratio = duration / time_step;
    let nearest = ratio.round();
    if (ratio - nearest).abs() <= STEP_RATIO_TOLERANCE * nearest.max(1.0) {
        nearest as u64
    } else {
        ratio.ceil() as u64
    }
}

/// Simulates one mechanism driven by a [`MotorModel`].
///
/// A simulator is either unstarted (no samples) or complete after [`Simulator::run`].
/// Every call to `run` starts again from the configured initial conditions, so a
/// given motor and configuration always yield the same samples.
#[derive(Debug, Clone)]
pub struct Simulator {
    motor: MotorModel,
    config: SimulationConfig,
    effective_radius: f64,
    effective_weight: f64,
    state: SimulationState,
    data_points: Vec<DataPoint>,
}

impl Simulator {
    /// Create an unstarted simulator.
    ///
    /// # Errors
    ///
    /// Returns `Err(SimulationError::InvalidConfig)` if `config` fails
    /// [`SimulationConfig::validate`].
    pub fn new(motor: MotorModel, config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let effective_radius = config.effective_radius();
        let effective_weight = config.effective_mass * STANDARD_GRAVITY;
        let state = SimulationState::initial(&config);
        Ok(Simulator {
            motor,
            config,
            effective_radius,
            effective_weight,
            state,
            data_points: Vec::new(),
        })
    }

    /// Create a simulator and run it to completion.
    ///
    /// # Errors
    ///
    /// Same as [`Simulator::new`].
    pub fn simulate(motor: MotorModel, config: SimulationConfig) -> Result<Self, SimulationError> {
        let mut simulator = Self::new(motor, config)?;
        simulator.run();
        Ok(simulator)
    }

    /// Integrate from the initial conditions until the duration elapses or the
    /// mechanism reaches `max_distance`, returning every sample.
    pub fn run(&mut self) -> &[DataPoint] {
        self.state = SimulationState::initial(&self.config);
        self.data_points.clear();

        let time_step = self.config.time_step;
        let steps = step_count(self.config.simulation_duration, time_step);
        debug!(
            steps,
            time_step,
            num_motors = self.motor.num_motors(),
            "Starting simulation run"
        );

        self.state.acceleration = self.compute_acceleration(self.state.velocity);
        self.record();

        for step in 1..=steps {
            if let Some(max_distance) = self.config.max_distance {
                if self.state.position >= max_distance {
                    debug!(
                        position = self.state.position,
                        max_distance, "Reached max distance"
                    );
                    break;
                }
            }
            self.state.time = step as f64 * time_step;
            self.integrate_step();
            self.record();
        }

        debug!(
            samples = self.data_points.len(),
            time = self.state.time,
            position = self.state.position,
            velocity = self.state.velocity,
            total_energy = self.state.cumulative_energy,
            "Simulation run complete"
        );
        &self.data_points
    }

    /// One Heun predictor-corrector step, followed by energy and history bookkeeping.
    fn integrate_step(&mut self) {
        let dt = self.config.time_step;
        let velocity = self.state.velocity;
        let acceleration = self.state.acceleration;

        let v_predicted = velocity + acceleration * dt;
        let a_predicted = self.compute_acceleration(v_predicted);
        let v_corrected = velocity + (acceleration + a_predicted) / 2.0 * dt;

        self.state.position += (velocity + v_corrected) / 2.0 * dt;
        self.state.velocity = v_corrected;
        self.state.acceleration = self.compute_acceleration(v_corrected);

        // A·s to mAh, kept at the historical 1000/60 factor.
        self.state.energy_per_motor = self.state.current_per_motor * dt * 1000.0 / 60.0;
        self.state.cumulative_energy +=
            self.state.energy_per_motor * f64::from(self.motor.num_motors());

        self.state
            .current_history
            .push(self.state.current_per_motor);
    }

    /// Acceleration at `velocity` given the present electrical state.
    ///
    /// Not pure: updates the per-motor current, bus voltage, slip and brownout
    /// flags and may trip the current-limit latch. The corrector step relies on
    /// the bus voltage left behind by the predictor call.
    pub(crate) fn compute_acceleration(&mut self, velocity: f64) -> f64 {
        let config = &self.config;
        let state = &mut self.state;

        let motor_speed = velocity / self.effective_radius * config.gear_ratio;
        let available_voltage = match config.motor_voltage_limit {
            Some(limit) => state.bus_voltage.min(limit),
            None => state.bus_voltage,
        };
        let mut current = (available_voltage - motor_speed / self.motor.k_v()) / self.motor.k_r();

        if velocity > 0.0 {
            if let Some(limit) = config.motor_current_limit {
                let over_limit = state.current_history.mean().is_some_and(|mean| mean > limit);
                if over_limit || state.was_current_limited.is_set() {
                    if state.was_current_limited.set() {
                        debug!(time = state.time, limit, "Sustained current limit engaged");
                    }
                    current = current.min(limit);
                }
            }
        }
        if let Some(peak) = config.motor_peak_current_limit {
            current = current.min(peak);
        }
        state.current_per_motor = current;

        let torque_at_axle =
            config.gearbox_efficiency * self.motor.k_t() * current * config.gear_ratio;
        let mut force_at_axle = torque_at_axle / self.effective_radius;

        if config.check_for_slip {
            let normal_force = self.effective_weight * config.incline_radians().cos();
            let static_limit = normal_force * config.coeff_static_friction;
            let kinetic_limit = normal_force * config.coeff_kinetic_friction;
            if force_at_axle > static_limit {
                if !state.is_slipping {
                    trace!(time = state.time, force_at_axle, static_limit, "Traction lost");
                }
                state.is_slipping = true;
            } else if force_at_axle < kinetic_limit {
                if state.is_slipping {
                    trace!(time = state.time, force_at_axle, kinetic_limit, "Traction regained");
                }
                state.is_slipping = false;
            }
            if state.is_slipping {
                force_at_axle = kinetic_limit;
            }
        }

        let num_motors = f64::from(self.motor.num_motors());
        state.bus_voltage = config.battery_voltage
            - num_motors * current * config.resistance_individual
            - current * config.resistance_common;
        state.is_brownout = state.bus_voltage < BROWNOUT_VOLTAGE;

        let resistance = config.k_resistance_static + config.k_resistance_viscous * velocity;
        let gravity_force = self.effective_weight * config.incline_radians().sin();
        let mut net_force = force_at_axle - resistance - gravity_force;

        // One-sided stop at the origin.
        if net_force < 0.0 && state.position <= 0.0 {
            net_force = 0.0;
        }

        net_force / config.effective_mass
    }

    fn record(&mut self) {
        let num_motors = f64::from(self.motor.num_motors());
        let gravity_force = self.gravity_force();
        let state = &self.state;
        self.data_points.push(DataPoint {
            time: state.time,
            position: state.position,
            velocity: state.velocity,
            acceleration: state.acceleration,
            voltage_setpoint: 0.0,
            current_per_motor: state.current_per_motor,
            total_current: state.current_per_motor * num_motors,
            system_voltage: state.bus_voltage,
            energy_per_motor: state.energy_per_motor,
            total_energy: state.cumulative_energy,
            slipping: state.is_slipping,
            brownout: state.is_brownout,
            gravity_force,
        });
    }

    /// Every sample of the last run, in time order. Empty before [`Simulator::run`].
    pub fn data_points(&self) -> &[DataPoint] {
        &self.data_points
    }

    /// Consume the simulator, keeping only the samples.
    pub fn into_data_points(self) -> Vec<DataPoint> {
        self.data_points
    }

    /// The last sample of the run.
    ///
    /// # Errors
    ///
    /// Returns `Err(SimulationError::NoData)` if the simulator has not been run.
    pub fn final_point(&self) -> Result<&DataPoint, SimulationError> {
        self.data_points.last().ok_or(SimulationError::NoData)
    }

    /// Whether [`Simulator::run`] has produced samples.
    pub fn is_complete(&self) -> bool {
        !self.data_points.is_empty()
    }

    /// State left behind by the last run (initial conditions if unstarted).
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The motor model driving the mechanism.
    pub fn motor(&self) -> &MotorModel {
        &self.motor
    }

    /// The configuration of this simulator.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Half the effective diameter (m).
    pub fn effective_radius(&self) -> f64 {
        self.effective_radius
    }

    /// Effective mass times standard gravity (N).
    pub fn effective_weight(&self) -> f64 {
        self.effective_weight
    }

    /// Gravity component opposing travel along the incline (N).
    pub fn gravity_force(&self) -> f64 {
        self.effective_weight * self.config.incline_radians().sin()
    }

    /// Gravity component pressing into the incline (N).
    pub fn normal_force(&self) -> f64 {
        self.effective_weight * self.config.incline_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mechsim_motor::{MotorPreset, MotorSpec};
    const EPSILON: f64 = 1e-9;

    fn four_cims() -> MotorModel {
        MotorModel::derive(MotorPreset::Cim.spec(), 4).unwrap()
    }

    fn simulator(config: SimulationConfig) -> Simulator {
        Simulator::new(four_cims(), config).unwrap()
    }

    #[test]
    fn test_step_count() {
        assert_eq!(step_count(20.0, 0.01), 2000);
        assert_eq!(step_count(1.0, 0.3), 4);
        assert_eq!(step_count(0.0, 0.01), 0);
        assert_eq!(step_count(0.3, 0.1), 3);
        assert_eq!(step_count(0.005, 0.01), 1);
    }

    #[test]
    fn test_derived_geometry() {
        let sim = simulator(SimulationConfig {
            effective_diameter: 0.2,
            effective_mass: 10.0,
            incline_angle: 30.0,
            ..SimulationConfig::default()
        });
        assert!((sim.effective_radius() - 0.1).abs() < EPSILON);
        assert!((sim.effective_weight() - 98.0665).abs() < EPSILON);
        assert!((sim.gravity_force() - 98.0665 * 0.5).abs() < 1e-6);
        assert!((sim.normal_force() - 98.0665 * 3f64.sqrt() / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_stall_acceleration_at_rest() {
        let mut sim = simulator(SimulationConfig::default());
        let motor = four_cims();
        let accel = sim.compute_acceleration(0.0);

        let current = 12.5 / motor.k_r();
        let force = 0.7 * motor.k_t() * current * 10.0 / 0.075;
        assert!((sim.state().current_per_motor - current).abs() < EPSILON);
        assert!((accel - force / 65.0).abs() < EPSILON);

        // Sag: 12.5 - 4 * I * 0.002 - I * 0.013
        let expected_bus = 12.5 - 4.0 * current * 0.002 - current * 0.013;
        assert!((sim.state().bus_voltage - expected_bus).abs() < EPSILON);
        assert!(!sim.state().is_brownout);
    }

    #[test]
    fn test_voltage_limit_caps_available_voltage() {
        let mut sim = simulator(SimulationConfig {
            motor_voltage_limit: Some(6.0),
            ..SimulationConfig::default()
        });
        sim.compute_acceleration(0.0);
        assert!((sim.state().current_per_motor - 6.0 / four_cims().k_r()).abs() < EPSILON);
    }

    #[test]
    fn test_peak_limit_always_applies() {
        let mut sim = simulator(SimulationConfig {
            motor_peak_current_limit: Some(50.0),
            ..SimulationConfig::default()
        });
        // Applies even at zero velocity with no history.
        sim.compute_acceleration(0.0);
        assert_eq!(sim.state().current_per_motor, 50.0);
    }

    #[test]
    fn test_sustained_limit_needs_history_and_motion() {
        let mut sim = simulator(SimulationConfig {
            motor_current_limit: Some(40.0),
            ..SimulationConfig::default()
        });

        // Empty history: no limiting.
        sim.compute_acceleration(0.1);
        assert!(sim.state().current_per_motor > 40.0);
        assert!(!sim.state().was_current_limited.is_set());

        sim.state.current_history.push(120.0);

        // Not moving: history is ignored.
        sim.compute_acceleration(0.0);
        assert!(sim.state().current_per_motor > 40.0);
        assert!(!sim.state().was_current_limited.is_set());

        sim.compute_acceleration(0.1);
        assert_eq!(sim.state().current_per_motor, 40.0);
        assert!(sim.state().was_current_limited.is_set());
    }

    #[test]
    fn test_sustained_limit_is_sticky() {
        let mut sim = simulator(SimulationConfig {
            motor_current_limit: Some(40.0),
            ..SimulationConfig::default()
        });
        sim.state.current_history.push(120.0);
        sim.compute_acceleration(0.1);
        assert!(sim.state().was_current_limited.is_set());

        // History mean now far below the limit; the latch keeps clamping.
        for _ in 0..20 {
            sim.state.current_history.push(1.0);
        }
        sim.compute_acceleration(0.1);
        assert_eq!(sim.state().current_per_motor, 40.0);
    }

    #[test]
    fn test_slip_hysteresis() {
        let mut sim = simulator(SimulationConfig {
            check_for_slip: true,
            ..SimulationConfig::default()
        });
        let normal = sim.normal_force();
        let motor = four_cims();
        let force_per_amp = 0.7 * motor.k_t() * 10.0 / 0.075;
        let k_v = motor.k_v();
        let k_r = motor.k_r();
        let velocity_for_force = |force: f64, bus: f64| {
            let current = force / force_per_amp;
            (bus - current * k_r) * k_v * 0.075 / 10.0
        };

        // Stall force exceeds µs·N = 637 N.
        sim.compute_acceleration(0.0);
        assert!(sim.state().is_slipping);
        let kinetic = normal * 0.8;
        let accel = sim.compute_acceleration(0.0);
        assert!(sim.state().is_slipping);
        assert!((accel - kinetic / 65.0).abs() < EPSILON);

        // Inside the band (between µk·N and µs·N): stays slipping.
        sim.state.bus_voltage = 12.5;
        sim.compute_acceleration(velocity_for_force(normal * 0.9, 12.5));
        assert!(sim.state().is_slipping);

        // Below µk·N: traction regained.
        sim.state.bus_voltage = 12.5;
        sim.compute_acceleration(velocity_for_force(normal * 0.5, 12.5));
        assert!(!sim.state().is_slipping);

        // Back inside the band from below: stays gripping.
        sim.state.bus_voltage = 12.5;
        sim.compute_acceleration(velocity_for_force(normal * 0.9, 12.5));
        assert!(!sim.state().is_slipping);
    }

    #[test]
    fn test_origin_stop_blocks_backward_pull() {
        let mut sim = simulator(SimulationConfig {
            incline_angle: 90.0,
            ..SimulationConfig::default()
        });
        // Motors at free speed produce no force; gravity would pull below the origin.
        let free_velocity = 12.5 * four_cims().k_v() * 0.075 / 10.0;
        let accel = sim.compute_acceleration(free_velocity);
        assert_eq!(accel, 0.0);

        sim.state.position = 1.0;
        sim.state.bus_voltage = 12.5;
        let accel = sim.compute_acceleration(free_velocity);
        assert!(accel < 0.0);
    }

    #[test]
    fn test_brownout_flag() {
        let spec = MotorSpec::new(12.0, 5330.0, 2.41, 131.0, 2.7);
        let motor = MotorModel::derive(spec, 4).unwrap();
        let mut sim = Simulator::new(
            motor,
            SimulationConfig {
                resistance_common: 0.05,
                ..SimulationConfig::default()
            },
        )
        .unwrap();
        // 136 A per motor through 0.058 Ω of shared and per-motor wiring.
        sim.compute_acceleration(0.0);
        assert!(sim.state().bus_voltage < BROWNOUT_VOLTAGE);
        assert!(sim.state().is_brownout);
    }

    #[test]
    fn test_unstarted_has_no_final_point() {
        let sim = simulator(SimulationConfig::default());
        assert!(!sim.is_complete());
        assert!(sim.data_points().is_empty());
        assert!(matches!(sim.final_point(), Err(SimulationError::NoData)));
    }

    #[test]
    fn test_zero_duration_emits_initial_sample() {
        let sim = Simulator::simulate(
            four_cims(),
            SimulationConfig {
                simulation_duration: 0.0,
                ..SimulationConfig::default()
            },
        )
        .unwrap();
        assert_eq!(sim.data_points().len(), 1);
        let point = sim.final_point().unwrap();
        assert_eq!(point.time, 0.0);
        assert!(point.acceleration > 0.0);
        assert_eq!(point.total_energy, 0.0);
    }

    #[test]
    fn test_start_beyond_max_distance() {
        let sim = Simulator::simulate(
            four_cims(),
            SimulationConfig {
                initial_position: 6.0,
                max_distance: Some(5.0),
                ..SimulationConfig::default()
            },
        )
        .unwrap();
        assert_eq!(sim.data_points().len(), 1);
    }

    #[test]
    fn test_rerun_is_identical() {
        let mut sim = simulator(SimulationConfig {
            motor_current_limit: Some(60.0),
            check_for_slip: true,
            ..SimulationConfig::default()
        });
        let first = sim.run().to_vec();
        let second = sim.run().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Simulator::new(
            four_cims(),
            SimulationConfig {
                effective_mass: 0.0,
                ..SimulationConfig::default()
            },
        );
        assert!(matches!(
            result,
            Err(SimulationError::InvalidConfig { field: "effective_mass", .. })
        ));
    }
}
