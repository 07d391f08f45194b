use anyhow::{Context, anyhow};
use config::{Config, ConfigError, Environment, File, FileFormat};
use mechsim_dynamics::{MechanismKind, SimulationConfig};
use mechsim_motor::{MotorModel, MotorPreset, MotorSpec};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Top-level runner configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory receiving one CSV per mechanism. Nothing is written when unset.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    pub mechanisms: Vec<MechanismEntry>,
}

/// One named mechanism to simulate.
#[derive(Debug, Clone, Deserialize)]
pub struct MechanismEntry {
    pub name: String,
    pub kind: MechanismKind,
    pub motor: MotorSelection,
    /// Defaults to the kind's motor count.
    pub num_motors: Option<u32>,
    #[serde(default)]
    pub overrides: ConfigOverrides,
}

/// Either a catalogue name (`motor = "CIM"`) or inline nameplate data.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MotorSelection {
    Preset(String),
    Custom(MotorSpec),
}

impl MotorSelection {
    pub fn spec(&self) -> anyhow::Result<MotorSpec> {
        match self {
            MotorSelection::Preset(name) => MotorPreset::from_name(name)
                .map(MotorPreset::spec)
                .ok_or_else(|| anyhow!("unknown motor preset `{}`", name)),
            MotorSelection::Custom(spec) => Ok(*spec),
        }
    }
}

/// Fields replacing the kind's defaults. Anything left out keeps the default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub gear_ratio: Option<f64>,
    pub effective_diameter: Option<f64>,
    pub effective_mass: Option<f64>,
    pub gearbox_efficiency: Option<f64>,
    pub incline_angle: Option<f64>,
    pub motor_current_limit: Option<f64>,
    pub motor_peak_current_limit: Option<f64>,
    pub motor_voltage_limit: Option<f64>,
    pub check_for_slip: Option<bool>,
    pub coeff_kinetic_friction: Option<f64>,
    pub coeff_static_friction: Option<f64>,
    pub k_resistance_static: Option<f64>,
    pub k_resistance_viscous: Option<f64>,
    pub battery_voltage: Option<f64>,
    pub resistance_common: Option<f64>,
    pub resistance_individual: Option<f64>,
    pub time_step: Option<f64>,
    pub simulation_duration: Option<f64>,
    pub max_distance: Option<f64>,
    /// Run for the full duration regardless of distance travelled.
    pub unbounded_distance: bool,
    pub initial_position: Option<f64>,
    pub initial_velocity: Option<f64>,
    pub initial_acceleration: Option<f64>,
}

macro_rules! override_fields {
    ($overrides:expr, $config:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $overrides.$field {
                $config.$field = value;
            }
        )+
    };
}

macro_rules! override_limits {
    ($overrides:expr, $config:expr; $($field:ident),+ $(,)?) => {
        $(
            if $overrides.$field.is_some() {
                $config.$field = $overrides.$field;
            }
        )+
    };
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: SimulationConfig) -> SimulationConfig {
        override_fields!(self, config;
            gear_ratio,
            effective_diameter,
            effective_mass,
            gearbox_efficiency,
            incline_angle,
            check_for_slip,
            coeff_kinetic_friction,
            coeff_static_friction,
            k_resistance_static,
            k_resistance_viscous,
            battery_voltage,
            resistance_common,
            resistance_individual,
            time_step,
            simulation_duration,
            initial_position,
            initial_velocity,
            initial_acceleration,
        );
        override_limits!(self, config;
            motor_current_limit,
            motor_peak_current_limit,
            motor_voltage_limit,
            max_distance,
        );
        if self.unbounded_distance {
            config.max_distance = None;
        }
        config
    }
}

impl MechanismEntry {
    /// Derive the motor model and the final simulation parameters.
    pub fn build(&self) -> anyhow::Result<(MotorModel, SimulationConfig)> {
        let spec = self.motor.spec()?;
        let num_motors = self.num_motors.unwrap_or(self.kind.default_motor_count());
        let motor = MotorModel::derive(spec, num_motors)
            .with_context(|| format!("deriving motor model for `{}`", self.name))?;
        let config = self.overrides.apply(self.kind.default_config());
        config
            .validate()
            .with_context(|| format!("validating configuration for `{}`", self.name))?;
        Ok((motor, config))
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(Environment::with_prefix("MECHSIM").separator("__"))
        .build()
        .and_then(|config| config.try_deserialize::<AppConfig>());

    match settings {
        Ok(config) => {
            info!(
                mechanisms = config.mechanisms.len(),
                output_dir = ?config.output_dir,
                "Successfully loaded configuration"
            );
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
