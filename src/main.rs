use std::str::FromStr;

use clap::Parser;
use log::LevelFilter;

use inkcircuit::cmd::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    match cli.command {
        Commands::Show(a) => a.run(),
        Commands::Connect(a) => a.run(),
        Commands::Refine(a) => a.run(),
        Commands::Simulate(a) => a.run(),
    }
}
