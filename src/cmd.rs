//! Command line interface

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use kdam::{tqdm, BarExt};

use crate::circuit::Circuit;
use crate::connect::{ConnectivityEngine, ProximityDomain, ValidationPolicy};
use crate::io::{read_sketch_file, write_sketch_file};
use crate::search::{CircuitEditProducer, ConnectionEnergy, EnergyFunction, Refiner};
use crate::sim::TruthTable;
use crate::sketch::stats::stats;
use crate::sketch::Sketch;

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Show a sketch and statistics about it
    ///
    /// Will print every shape with its type, confidence and connections, followed by
    /// the number of shapes, substrokes and connections.
    #[clap()]
    Show(ShowArgs),

    /// Compute the connections of a sketch
    ///
    /// Existing connections are discarded. Wires that touch each other are merged.
    #[clap()]
    Connect(ConnectArgs),

    /// Repair the interpretation of a sketch
    ///
    /// Runs a hill-climbing search over regroupings and relabelings of the shapes,
    /// maximizing the number of properly connected shapes.
    #[clap(alias = "opt")]
    Refine(RefineArgs),

    /// Compute the truth table of a sketched circuit
    ///
    /// Labels touching a wire driven by a gate are outputs, other labels are inputs.
    /// One row is printed per input combination:
    ///    A B | Y
    ///    0 1 | 0
    #[clap(alias = "sim")]
    Simulate(SimulateArgs),
}

fn read_or_exit(path: &Path) -> Sketch {
    match read_sketch_file(path) {
        Ok(sketch) => sketch,
        Err(err) => {
            println!("Could not read {}: {}", path.display(), err);
            std::process::exit(1);
        }
    }
}

fn write_or_exit(path: &Path, sketch: &Sketch) {
    if let Err(err) = write_sketch_file(path, sketch) {
        println!("Could not write {}: {}", path.display(), err);
        std::process::exit(1);
    }
}

fn policy(strict: bool) -> ValidationPolicy {
    if strict {
        ValidationPolicy::Strict
    } else {
        ValidationPolicy::Lenient
    }
}

/// Command arguments for sketch informations
#[derive(Args)]
pub struct ShowArgs {
    /// Sketch to show
    file: PathBuf,
}

impl ShowArgs {
    /// Run the command
    pub fn run(&self) {
        let sketch = read_or_exit(&self.file);
        println!("{}", sketch);
        println!("Sketch stats:\n{}", stats(&sketch));
    }
}

/// Command arguments for connectivity
#[derive(Args)]
pub struct ConnectArgs {
    /// Sketch to connect
    file: PathBuf,

    /// Output file for the connected sketch
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Distance under which an endpoint touches a shape
    #[arg(long, default_value_t = ProximityDomain::DEFAULT_RADIUS)]
    radius: f64,

    /// Abort on inconsistent connections instead of reporting them
    #[arg(long)]
    strict: bool,
}

impl ConnectArgs {
    /// Run the command
    pub fn run(&self) {
        let mut sketch = read_or_exit(&self.file);
        let domain = ProximityDomain::new(self.radius);
        let engine = ConnectivityEngine::new(&domain).with_policy(policy(self.strict));
        let before = sketch.nb_shapes();
        engine.connect_all(&mut sketch);
        let improper = sketch
            .shape_ids()
            .filter(|s| !engine.is_properly_connected(*s, &sketch))
            .count();
        println!(
            "Connected {} shapes ({} after merging wires), {} not properly connected",
            before,
            sketch.nb_shapes(),
            improper
        );
        write_or_exit(&self.output, &sketch);
    }
}

/// Command arguments for interpretation repair
#[derive(Args)]
pub struct RefineArgs {
    /// Sketch to refine
    file: PathBuf,

    /// Output file for the refined sketch
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Distance under which an endpoint touches a shape
    #[arg(long, default_value_t = ProximityDomain::DEFAULT_RADIUS)]
    radius: f64,

    /// Maximum number of modifications applied
    #[arg(long, default_value_t = crate::search::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Seed to break ties between equally good modifications at random
    #[arg(long)]
    seed: Option<u64>,

    /// Abort on inconsistent connections instead of reporting them
    #[arg(long)]
    strict: bool,
}

impl RefineArgs {
    /// Run the command
    pub fn run(&self) {
        let mut sketch = read_or_exit(&self.file);
        let domain = ProximityDomain::new(self.radius);
        let engine = ConnectivityEngine::new(&domain).with_policy(policy(self.strict));
        engine.connect_all(&mut sketch);

        let energy = ConnectionEnergy::new(&domain);
        let initial_energy = energy.energy(&sketch);
        let mut producer = CircuitEditProducer::new(engine, self.radius);
        let mut refiner =
            Refiner::new(&mut producer, &energy).with_max_iterations(self.max_iterations);
        if let Some(seed) = self.seed {
            refiner = refiner.with_seed(seed);
        }

        let mut progress = tqdm!(total = self.max_iterations);
        progress.set_description("Modifications applied");
        progress
            .write(format!(
                "Refining sketch with {} shapes, initial energy {:.3}",
                sketch.nb_shapes(),
                initial_energy
            ))
            .ok();
        while let Some(applied) = refiner.step(&mut sketch) {
            progress.set_postfix(format!("benefit={:.3}", applied.benefit));
            progress.write(applied.description).ok();
            progress.update_to(refiner.nb_iterations()).ok();
        }
        let converged = refiner.is_converged();
        let nb_iterations = refiner.nb_iterations();
        progress.update_to(self.max_iterations).ok();
        println!();
        if converged {
            println!("Converged after {} modifications", nb_iterations);
        } else {
            println!("Stopped after {} modifications", nb_iterations);
        }
        println!(
            "Energy {:.3} -> {:.3}",
            initial_energy,
            energy.energy(&sketch)
        );
        write_or_exit(&self.output, &sketch);
    }
}

/// Command arguments for simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Sketch to simulate
    file: PathBuf,

    /// Distance under which an endpoint touches a shape
    #[arg(long, default_value_t = ProximityDomain::DEFAULT_RADIUS)]
    radius: f64,

    /// Use the connections stored in the file instead of recomputing them
    #[arg(long)]
    keep_connections: bool,
}

impl SimulateArgs {
    /// Run the command
    pub fn run(&self) {
        let mut sketch = read_or_exit(&self.file);
        if !self.keep_connections {
            let domain = ProximityDomain::new(self.radius);
            ConnectivityEngine::new(&domain)
                .with_policy(ValidationPolicy::Lenient)
                .connect_all(&mut sketch);
        }
        let circuit = match Circuit::from_sketch(&sketch) {
            Ok(c) => c,
            Err(err) => {
                println!("Could not extract a circuit: {}", err);
                std::process::exit(1);
            }
        };
        let input_names = circuit.input_names().join(" ");
        let output_names = circuit.output_names().join(" ");
        let table = TruthTable::new(circuit);
        let rows = match table.rows() {
            Ok(rows) => rows,
            Err(err) => {
                println!("Could not simulate the circuit: {}", err);
                std::process::exit(1);
            }
        };
        println!("{} | {}", input_names, output_names);
        for (inputs, outputs) in rows {
            let fmt = |v: &[bool]| {
                v.iter()
                    .map(|b| if *b { "1" } else { "0" })
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            println!("{} | {}", fmt(inputs), fmt(outputs));
        }
        std::process::exit(0);
    }
}
