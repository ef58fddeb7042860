//! Subcommand handlers.

pub mod bands;
pub mod check;
pub mod config_cmd;
pub mod watch;
