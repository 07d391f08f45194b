mod config;
mod report;

use anyhow::{Context, bail};
use crate::config::MechanismEntry;
use mechsim_dynamics::{MechanismKind, Simulator};
use std::collections::BTreeMap;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

/// A finished run together with what it simulated.
struct MechanismRun {
    kind: MechanismKind,
    simulator: Simulator,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| crate::config::DEFAULT_CONFIG_PATH.to_string());
    let app = crate::config::load_config(&path)
        .with_context(|| format!("loading configuration from {}", path))?;

    let runs = match run_all(&app.mechanisms).await {
        Ok(runs) => runs,
        Err(e) => {
            error!("Simulation failed: {:?}", e);
            return Err(e);
        }
    };

    for (name, run) in &runs {
        report::log_summary(name, run.kind, &run.simulator)?;
        if let Some(dir) = &app.output_dir {
            report::write_csv(dir, name, run.simulator.data_points())?;
        }
    }
    info!(mechanisms = runs.len(), "All simulations finished");
    Ok(())
}

/// Run every mechanism as an independent blocking task and collect the results by name.
async fn run_all(entries: &[MechanismEntry]) -> anyhow::Result<BTreeMap<String, MechanismRun>> {
    let mut handles = Vec::with_capacity(entries.len());
    for entry in entries {
        if handles.iter().any(|(name, _, _)| name == &entry.name) {
            bail!("duplicate mechanism name `{}`", entry.name);
        }
        let (motor, config) = entry.build()?;
        info!(mechanism = %entry.name, kind = %entry.kind, %motor, "Spawning simulation");
        let handle = tokio::task::spawn_blocking(move || Simulator::simulate(motor, config));
        handles.push((entry.name.clone(), entry.kind, handle));
    }

    let mut runs = BTreeMap::new();
    for (name, kind, handle) in handles {
        let simulator = handle
            .await
            .with_context(|| format!("simulation task for `{}` panicked", name))?
            .with_context(|| format!("simulating `{}`", name))?;
        runs.insert(name, MechanismRun { kind, simulator });
    }
    Ok(runs)
}
