//! Aerodynamic load pipeline: polars, loadcases and the load envelope
//!
//! ```text
//! prop-loads <propeller.json> [output-dir] [--pressures]
//! ```

use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blade_loads::propeller::LoadSelector;
use solver_sessions::{PropellerConfig, SolverConfig, Xfoil, Xrotor};

fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    tracing::info!("Wrote {:?}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prop_loads=info,solver_sessions=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let pressures = args.iter().any(|a| a == "--pressures");
    let mut positional = args.iter().filter(|a| !a.starts_with("--"));
    let config_path = positional
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("propeller.json"));
    let output_dir = positional.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let solvers = SolverConfig::from_env()?;
    tracing::info!("Using XFOIL command: {:?}", solvers.xfoil);
    tracing::info!("Using XROTOR command: {:?}", solvers.xrotor);
    tracing::info!("Airfoil database: {:?}", solvers.airfoil_database);

    let config = PropellerConfig::read(&config_path)?;
    let xfoil = Xfoil::new(solvers.clone());
    let xrotor = Xrotor::new(solvers.clone());

    let mut propeller = config.build(&solvers.airfoil_database, &xfoil)?;
    propeller.calc_loads(&xrotor)?;
    propeller.set_load_envelope()?;
    tracing::info!(
        "{} loadcases solved, max {} rpm",
        propeller.loadcases().len(),
        propeller.max_rpm()?
    );

    std::fs::create_dir_all(&output_dir)?;
    let loadcases: Vec<_> = propeller
        .loadcases()
        .iter()
        .map(|(lc, results)| serde_json::json!({ "loadcase": lc, "results": results }))
        .collect();
    write_json(&output_dir.join("loadcases.json"), &loadcases)?;
    write_json(&output_dir.join("load_envelope.json"), propeller.load_envelope()?)?;

    if pressures {
        let stations = propeller.pressure_distribution(LoadSelector::Envelope, &xfoil)?;
        write_json(&output_dir.join("pressure_distribution.json"), &stations)?;
    }
    Ok(())
}
