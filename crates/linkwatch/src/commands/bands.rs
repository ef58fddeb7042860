//! `bands`: show the compiled band table.

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let resolver = config::resolve_settings(global)?.resolver()?;
    output::print_output(&output::render_bands(resolver.bands()));
    Ok(())
}
