//! Config subcommand handlers.

use linkwatch_config::save_settings;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::settings_path(global).display().to_string());
            Ok(())
        }

        ConfigCommand::Show => {
            let resolved = config::resolve_settings(global)?;
            let rendered = toml::to_string_pretty(&resolved.settings)?;
            output::print_output(rendered.trim_end());
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let resolved = config::resolve_settings(global)?;
            if resolved.path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!(
                        "{} already exists; pass --force to overwrite",
                        resolved.path.display()
                    ),
                });
            }

            // Refuse to persist settings that would fail on the next start.
            resolved.resolver()?;

            save_settings(&resolved.settings, &resolved.path)
                .map_err(|e| CliError::config(e, &resolved.path))?;
            output::print_output(&format!("Wrote {}", resolved.path.display()));
            Ok(())
        }
    }
}
