use mechsim_dynamics::*;
use mechsim_motor::{MotorModel, MotorPreset};

fn main() {
    let kind = MechanismKind::Drivetrain;
    let motor = match MotorModel::derive(MotorPreset::Cim.spec(), kind.default_motor_count()) {
        Ok(motor) => motor,
        Err(e) => {
            eprintln!("Failed to derive motor model: {}", e);
            return;
        }
    };
    let config = SimulationConfig {
        check_for_slip: true,
        motor_current_limit: Some(60.0),
        ..kind.default_config()
    };

    println!("Initializing simulation...");
    println!("  Mechanism:    {}", kind);
    println!("  Motor:        {} x{}", MotorPreset::Cim, motor.num_motors());
    println!("  Model:        {}", motor);
    println!("  Gear Ratio:   {}:1", config.gear_ratio);
    println!("  Time Step:    {} s", config.time_step);
    println!("  Max Distance: {:?} {}", config.max_distance, kind.distance_unit());

    match Simulator::simulate(motor, config) {
        Ok(simulator) => {
            println!("\nSimulating...");
            // Print every 10th sample (every 0.1 s).
            for point in simulator.data_points().iter().step_by(10) {
                println!(
                    "t={:>5.2} s  x={:>6.3} m  v={:>6.3} m/s  I={:>6.1} A  V={:>5.2} V{}",
                    point.time,
                    point.position,
                    point.velocity,
                    point.current_per_motor,
                    point.system_voltage,
                    if point.slipping { "  (slipping)" } else { "" }
                );
            }
            if let Ok(last) = simulator.final_point() {
                println!("\nSimulation complete.");
                println!("Final: {:?}", last);
            }
        }
        Err(e) => {
            eprintln!("Failed to run simulation: {}", e);
        }
    }
}
