//! `check`: resolve once, print, and report the link state as exit code.

use tracing::debug;

use linkwatch_core::ProbeSource;

use crate::cli::{CheckArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &CheckArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve_settings(global)?;
    let resolver = resolved.resolver()?;
    let source = config::build_source(global, resolver.config())?;
    debug!(source = %source.describe(), "single check");

    let state = resolver.tick(&source).await?;

    let rendered = if args.json {
        output::render_json_pretty(&state)?
    } else {
        output::indicator_line(&state, resolver.bands(), output::should_color(global.color))
    };
    output::print_output(&rendered);

    if state.level.is_none() {
        return Err(CliError::LinkDown {
            band: state.band,
            tooltip: state.tooltip,
            url: source.describe(),
        });
    }
    Ok(())
}
