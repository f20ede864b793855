use std::process::ExitCode;

use clap::Parser;
use permcheck::{
    cli::{Cli, Command},
    commands,
    config::Config,
    logging::init_logging,
    output::ReportWriter,
};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.no_color);

    let config = Config::from_cli(cli)?;

    log::debug!("Configuration: {:?}", config);

    let ctx = config.load_context();
    let writer = ReportWriter::new(config.output_mode(), config.no_color);

    let code = match &config.command {
        Command::CheckBoundaries { .. } => commands::check_boundaries(&ctx, &writer)?,
        Command::CheckOverlap { manifest, .. } => {
            commands::check_overlap(&ctx, manifest, &writer)?
        }
    };

    Ok(ExitCode::from(code))
}
