use anyhow::Context;
use mechsim_dynamics::{DataField, DataPoint, MechanismKind, Simulator};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Log the outcome of one run.
pub fn log_summary(name: &str, kind: MechanismKind, simulator: &Simulator) -> anyhow::Result<()> {
    let last = simulator
        .final_point()
        .with_context(|| format!("summarizing `{}`", name))?;
    let points = simulator.data_points();

    info!(
        mechanism = name,
        kind = %kind,
        samples = points.len(),
        time = last.time,
        position = last.position,
        unit = kind.distance_unit(),
        velocity = last.velocity,
        total_energy_mah = last.total_energy,
        current_limited = simulator.state().was_current_limited.is_set(),
        "Simulation finished"
    );

    if let Some(first) = points.iter().find(|point| point.slipping) {
        info!(mechanism = name, time = first.time, "Wheels slipped");
    }
    if let Some(first) = points.iter().find(|point| point.brownout) {
        warn!(
            mechanism = name,
            time = first.time,
            system_voltage = first.system_voltage,
            "Bus voltage browned out"
        );
    }
    Ok(())
}

/// Write all samples as CSV, one column per [`DataField`], unscaled.
pub fn write_csv(dir: &Path, name: &str, points: &[DataPoint]) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;
    let path = dir.join(format!("{}.csv", name));
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut csv = BufWriter::new(file);

    let header: Vec<&str> = DataField::ALL.iter().map(|field| field.header()).collect();
    writeln!(csv, "{}", header.join(","))?;
    for point in points {
        let row: Vec<String> = DataField::ALL
            .iter()
            .map(|field| format!("{:.6}", point.value(*field)))
            .collect();
        writeln!(csv, "{}", row.join(","))?;
    }
    csv.flush()?;

    info!(mechanism = name, path = %path.display(), rows = points.len(), "Wrote trajectory");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mechsim_dynamics::SimulationConfig;
    use mechsim_motor::{MotorModel, MotorPreset};

    #[test]
    fn test_write_csv() {
        let motor = MotorModel::derive(MotorPreset::Bag.spec(), 2).unwrap();
        let simulator = Simulator::simulate(
            motor,
            SimulationConfig {
                simulation_duration: 0.05,
                ..MechanismKind::Elevator.default_config()
            },
        )
        .unwrap();

        let dir = std::env::temp_dir().join(format!("mechsim-report-{}", std::process::id()));
        let path = write_csv(&dir, "lift", simulator.data_points()).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap().split(',').count(), DataField::ALL.len());
        assert_eq!(lines.count(), simulator.data_points().len());
        assert!(log_summary("lift", MechanismKind::Elevator, &simulator).is_ok());
        fs::remove_dir_all(&dir).unwrap();
    }
}
