use std::{
    error::Error,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{self, PathBuf},
};

use clap::Parser;
use grid_hydro::{
    boundary::BoundaryConditions, gas_law::GasLaw, grid::Grid, units::UnitConverter, Engine,
    Fluid, Hydrodynamics, InitialConditions,
};
use yaml_rust::YamlLoader;

#[derive(Parser)]
pub struct Cli {
    /// The path to the config file to read
    #[clap(parse(from_os_str))]
    pub config: path::PathBuf,
}

/// Write the primitive state of every real cell, one cell per line.
fn write_profile(fluid: &Fluid, path: &PathBuf) -> Result<(), Box<dyn Error>> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(
        writer,
        "# x\ty\tz\tdensity\tvelocity_x\tvelocity_y\tvelocity_z\tpressure\tpassive_scalar"
    )?;
    for (position, cell) in fluid.real_cells() {
        let w = &cell.primitives;
        let v = w.velocity();
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            position.x,
            position.y,
            position.z,
            w.density(),
            v.x,
            v.y,
            v.z,
            w.pressure(),
            w.passive_scalar()
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // parse command line parameters
    let args = Cli::parse();

    // read configuration
    let docs = YamlLoader::load_from_str(&fs::read_to_string(&args.config)?)?;
    let config = docs
        .first()
        .ok_or_else(|| format!("Empty configuration file: {}", args.config.display()))?;

    // Setup simulation
    let converter = UnitConverter::init(&config["units"])?;
    let mut hydro = Hydrodynamics::init(&config["hydrodynamics"], &converter)?;
    let gas_law: GasLaw = *hydro.constants().gas_law();

    let grid = Grid::init(&config["grid"])?;
    let boundaries = BoundaryConditions::init(&config["boundaries"])?;
    let mut fluid =
        InitialConditions::init(&config["initial_conditions"], grid, &gas_law)?.into_fluid(boundaries);
    hydro.init_source_terms(&config["wind"], &converter, &fluid)?;

    let mut engine = Engine::init(&config["time_integration"], hydro, &converter)?;

    // run
    let summary = engine.run(&mut fluid)?;

    if let Some(output) = config["output"].as_str() {
        write_profile(&fluid, &PathBuf::from(output))?;
        log::info!("Wrote final state to {output}");
    }
    log::info!(
        "Done after {} steps (t = {:.6e})",
        summary.steps,
        summary.time
    );
    Ok(())
}
