use colored::control::set_override;
use env_logger::Builder;
use log::LevelFilter;

/// Log level for this crate's own messages.
fn crate_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initializes the stderr logger.
///
/// Dependencies only log warnings and errors; `--verbose` raises this crate's
/// own messages to debug level.
pub fn init_logging(verbose: bool, no_color: bool) {
    // Disable colors globally if requested
    if no_color {
        set_override(false);
    }

    Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_CRATE_NAME"), crate_level(verbose))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
