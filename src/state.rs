//! State shared by every simulation thread.
//!
//! One `SharedState` is created before any thread starts and is borrowed by
//! all of them for the lifetime of the run. It holds the board shape, the
//! per-region locks that own the live region owners, the players, and the
//! termination flag.

use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::board::{Owner, PlayerId, PlayerScore, RegionGraph, Snapshot, SnapshotSink};
use crate::player::Player;
use crate::sync::{LockSetGuard, RegionLocks};

/// Why the simulation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Every player agent reached its frustration limit.
    AllGaveUp,
    /// An external termination event arrived.
    ExternalEvent,
}

/// Board, locks, players and the termination flag.
pub struct SharedState {
    /// Adjacency only. Every owner in it is cleared once the live owners
    /// have moved into `locks`.
    graph: RegionGraph,
    locks: RegionLocks,
    players: Vec<Player>,
    stop: OnceLock<StopReason>,
    sink: Arc<dyn SnapshotSink>,
}

impl SharedState {
    /// Creates the shared state for `player_count` players.
    ///
    /// Owners already set on `graph` become the initial live owners.
    /// `player_count` is capped at the number of player symbols.
    pub fn new(mut graph: RegionGraph, player_count: usize, sink: Arc<dyn SnapshotSink>) -> Self {
        let locks = RegionLocks::from_graph(&graph);
        for index in 0..graph.len() {
            graph.set_owner(index, Owner::Unclaimed);
        }
        let players = (0..player_count)
            .filter_map(PlayerId::new)
            .map(Player::new)
            .collect();
        SharedState {
            graph,
            locks,
            players,
            stop: OnceLock::new(),
            sink,
        }
    }

    /// Board shape. Owners read from it are always `Unclaimed`; use
    /// [`SharedState::owner`] or a snapshot for live ownership.
    pub fn graph(&self) -> &RegionGraph {
        &self.graph
    }

    pub fn locks(&self) -> &RegionLocks {
        &self.locks
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn num_regions(&self) -> usize {
        self.graph.len()
    }

    /// Raises the termination flag. The first reason recorded wins.
    pub fn request_stop(&self, reason: StopReason) {
        let _ = self.stop.set(reason);
    }

    pub fn is_terminated(&self) -> bool {
        self.stop.get().is_some()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop.get().copied()
    }

    /// True once every player has given up.
    pub fn all_gave_up(&self) -> bool {
        self.players.iter().all(|p| p.gave_up())
    }

    /// Current owner of one region, read under that region's lock.
    pub fn owner(&self, index: usize) -> Owner {
        self.locks
            .acquire_one(index)
            .owner(index)
            .unwrap_or_default()
    }

    /// Indices of every owned region.
    ///
    /// Regions are locked one at a time, so the result is only a hint: a
    /// region may change hands right after it was read.
    pub fn owned_regions(&self) -> Vec<usize> {
        (0..self.num_regions())
            .filter(|&i| self.owner(i) != Owner::Unclaimed)
            .collect()
    }

    /// Takes a consistent snapshot of the whole board.
    pub fn snapshot(&self) -> Snapshot {
        let guard = self.locks.acquire_all();
        self.snapshot_locked(&guard)
    }

    /// Locks the whole board, hands a snapshot to the sink while every lock is
    /// still held, then releases the board.
    pub fn publish_snapshot(&self) -> Snapshot {
        let guard = self.locks.acquire_all();
        let snapshot = self.snapshot_locked(&guard);
        self.sink.publish(&snapshot);
        drop(guard);
        snapshot
    }

    fn snapshot_locked(&self, guard: &LockSetGuard<'_>) -> Snapshot {
        debug_assert_eq!(guard.len(), self.num_regions());
        let mut board = self.graph.clone();
        for (index, owner) in guard.owners() {
            board.set_owner(index, owner);
        }
        let scores = self
            .players
            .iter()
            .map(|p| PlayerScore {
                player: p.id(),
                points: p.points(),
            })
            .collect();
        Snapshot { board, scores }
    }
}
