use clap::Parser;

/// The probe takes no arguments; clap only supplies `--help` and `--version`.
#[derive(Debug, Clone, Parser)]
#[command(name = "adot-healthcheck", version)]
#[command(about = "Checks the collector health endpoint at http://localhost:13133")]
pub struct Cli {}
