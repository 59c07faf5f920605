//! Sonoprint CLI - capture spectral transforms from audio pairs and replay them.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sonoprint")]
#[command(author, version, about = "Spectral transform capture and replay", long_about = None)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture the transform between a reference and an altered recording
    Capture(commands::capture::CaptureArgs),

    /// Apply a captured transform to an audio file
    Apply(commands::apply::ApplyArgs),

    /// Show the contents of a transform file
    Info(commands::info::InfoArgs),

    /// Manage the user transform library
    Library(commands::library::LibraryArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Capture(args) => commands::capture::run(args),
        Commands::Apply(args) => commands::apply::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Library(args) => commands::library::run(args),
    }
}
