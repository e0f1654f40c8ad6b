//! Keepsake CLI - retention decisions from the command line.

use clap::Parser;
use keepsake_cli::{commands, Cli, Command, Formatter};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; RUST_LOG overrides the -v level
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> keepsake_cli::Result<()> {
    let formatter = Formatter::new(cli.format, !cli.no_color);

    let output = match cli.command {
        Command::Decide(args) => commands::execute_decide(args, &formatter)?,
        Command::Tier(args) => commands::execute_tier(args, &formatter)?,
        Command::Preset(args) => commands::execute_preset(args, &formatter)?,
    };

    println!("{}", output);
    Ok(())
}
