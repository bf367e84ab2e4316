//! Point-in-time board snapshots and where they are published.
//!
//! A snapshot is taken while every region lock is held, so it never shows a
//! move half-applied. Sinks receive the snapshot while the locks are still
//! held; a sink must not try to take a region lock itself.

use std::io::{self, Write};

use parking_lot::Mutex;

use super::graph::RegionGraph;
use super::region::PlayerId;

/// Line printed after every board dump.
pub const SNAPSHOT_SEPARATOR: &str = "============================";

/// A player's score at the moment a snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerScore {
    pub player: PlayerId,
    pub points: i64,
}

/// A consistent copy of the whole board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The board with live owners copied in.
    pub board: RegionGraph,
    /// Scores of every player, in seat order.
    pub scores: Vec<PlayerScore>,
}

impl Snapshot {
    /// Score of the given player, if it is part of the game.
    pub fn points(&self, player: PlayerId) -> Option<i64> {
        self.scores
            .iter()
            .find(|s| s.player == player)
            .map(|s| s.points)
    }
}

/// Writes one line per region: `<index> [<owner>] : <n1>;<n2>;...`.
pub fn write_board<W: Write>(board: &RegionGraph, out: &mut W) -> io::Result<()> {
    for (i, region) in board.regions().iter().enumerate() {
        write!(out, "{} [{}] : ", i, region.owner.symbol())?;
        for (j, neighbor) in region.neighbors().iter().enumerate() {
            if j > 0 {
                write!(out, ";")?;
            }
            write!(out, "{}", neighbor)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Receives every published snapshot.
pub trait SnapshotSink: Send + Sync {
    fn publish(&self, snapshot: &Snapshot);
}

/// Prints snapshots to stdout followed by a separator line.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl SnapshotSink for StdoutSink {
    fn publish(&self, snapshot: &Snapshot) {
        let stdout = io::stdout();
        let mut out = io::BufWriter::new(stdout.lock());
        let result = write_board(&snapshot.board, &mut out)
            .and_then(|_| writeln!(out, "{}\n", SNAPSHOT_SEPARATOR))
            .and_then(|_| out.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to print board snapshot");
        }
    }
}

/// Keeps every snapshot in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    snapshots: Mutex<Vec<Snapshot>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// Returns a copy of everything published so far, oldest first.
    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotSink for MemorySink {
    fn publish(&self, snapshot: &Snapshot) {
        self.snapshots.lock().push(snapshot.clone());
    }
}

/// Discards snapshots.
#[derive(Debug, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn publish(&self, _snapshot: &Snapshot) {}
}
