//! `watch`: run the monitor and print one indicator line per tick.
//!
//! Exit triggers are `q` on stdin and Ctrl-C. An empty line or `r` on
//! stdin requests an immediate refresh.

use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use linkwatch_core::Monitor;

use crate::cli::GlobalOpts;
use crate::config::{self, Source};
use crate::error::CliError;
use crate::output;

/// A line typed on stdin, as understood by the watch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StdinCommand {
    Refresh,
    Quit,
    Unknown,
}

impl StdinCommand {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" | "r" | "refresh" => Self::Refresh,
            "q" | "quit" | "exit" => Self::Quit,
            _ => Self::Unknown,
        }
    }
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve_settings(global)?;
    let resolver = resolved.resolver()?;
    let source = config::build_source(global, resolver.config())?;
    let color = output::should_color(global.color);

    let monitor: Monitor<Source> = Monitor::new(resolver, source);
    let mut states = monitor.subscribe();
    let cancel = monitor.cancellation_token();

    let runner = monitor.clone();
    let run_handle = tokio::spawn(async move { runner.run().await });

    let mut commands = spawn_stdin_reader();

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,

            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = states.borrow_and_update().clone();
                if let Some(state) = current {
                    output::print_output(&output::indicator_line(
                        &state,
                        monitor.resolver().bands(),
                        color,
                    ));
                }
            }

            Some(cmd) = commands.recv() => match cmd {
                StdinCommand::Refresh => {
                    if !monitor.refresh() {
                        debug!("refresh already pending");
                    }
                }
                StdinCommand::Quit => monitor.shutdown(),
                StdinCommand::Unknown => warn!("unknown command; use r to refresh or q to quit"),
            },

            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!(error = %e, "failed to listen for Ctrl-C");
                }
                monitor.shutdown();
            }
        }
    }

    match run_handle.await {
        Ok(result) => result.map_err(CliError::from),
        Err(e) => Err(CliError::Internal(format!("monitor task failed: {e}"))),
    }
}

/// Read stdin on a plain thread so a pending read never holds up runtime
/// shutdown. The channel closes at end of input.
fn spawn_stdin_reader() -> mpsc::Receiver<StdinCommand> {
    let (tx, rx) = mpsc::channel(8);
    let spawned = std::thread::Builder::new()
        .name("linkwatch-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(StdinCommand::parse(&line)).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "stdin commands unavailable");
    }
    rx
}
