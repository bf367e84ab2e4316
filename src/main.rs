//! Territory -- a concurrent territory-contention simulation.
//!
//! Usage: `territory <BOARD>`
//!
//! Loads the board file, seeds one region per player, and runs every player
//! on its own thread while the board is printed to stdout at a fixed
//! interval. External events arrive as signals or as stdin commands: SIGINT
//! (or `confiscate`) strips a random owned region, SIGTERM (or `terminate`)
//! ends the game. Logs go to stderr; set `RUST_LOG=debug` to see every move
//! attempt.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use territory::board::{load_regions, StdoutSink};
use territory::config::SimConfig;
use territory::events::{self, Event};
use territory::protocol::parse_event;
use territory::sim::Simulation;
use territory::state::StopReason;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "territory", version, about = "Concurrent territory-contention simulation")]
struct Cli {
    /// Board file: one line of ';'-separated neighbor indices per region.
    board: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = SimConfig::from_env().context("invalid configuration")?;
    let graph = load_regions(&cli.board)?;
    let report_path = config.report_path.clone();

    let sim = Simulation::new(graph, config, Arc::new(StdoutSink))?;
    let (tx, rx) = events::channel();
    #[cfg(unix)]
    spawn_signal_source(tx.clone())?;
    spawn_stdin_source(tx);

    let report = sim.run(Some(rx));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if report.stop == StopReason::ExternalEvent {
        writeln!(out, "Robin Hood wins")?;
    }
    report.write_summary(&mut out)?;

    if let Some(path) = report_path {
        report
            .write_json(&path)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }
    Ok(())
}

/// Forwards stdin commands to the event channel on a detached thread.
///
/// The thread is not joined: a blocking stdin read cannot be interrupted, and
/// the process exiting ends it. Reaching EOF drops this sender without
/// stopping the game.
fn spawn_stdin_source(tx: Sender<Event>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };
            if let Some(event) = parse_event(&line) {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
        debug!("stdin closed");
    });
}

/// Turns SIGINT into a confiscation and SIGTERM into a termination.
///
/// Handlers are installed before the game starts, so neither signal kills
/// the process once the board is printing. The listener thread is detached
/// like the stdin reader.
#[cfg(unix)]
fn spawn_signal_source(tx: Sender<Event>) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("installing signal handlers")?;
    thread::spawn(move || {
        for signal in signals.forever() {
            let event = match signal {
                SIGINT => Event::Confiscate,
                SIGTERM => Event::Terminate,
                _ => continue,
            };
            debug!(signal, ?event, "signal received");
            if tx.send(event).is_err() {
                break;
            }
        }
    });
    Ok(())
}
