use s5_core::domain::Diagnostic;
use s5_core::profile::{ShaperConfig, load_shaper_config};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use super::CliError;

/// Installs the stderr `tracing` subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub(super) fn shaper_config(path: Option<&Path>) -> Result<ShaperConfig, CliError> {
    match path {
        Some(path) => Ok(load_shaper_config(path)?),
        None => Ok(ShaperConfig::default()),
    }
}

pub(super) fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic.diagnostic_line());
    }
}
