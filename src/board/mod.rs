//! Board representation.
//!
//! Contains the region and owner types, the region graph, the board file
//! loader, and point-in-time snapshots.

pub mod graph;
pub mod loader;
pub mod region;
pub mod snapshot;

pub use graph::RegionGraph;
pub use loader::{load_regions, parse_regions, BoardError, NEIGHBOR_SEPARATOR};
pub use region::{Owner, PlayerId, Region, MAX_NEIGHBORS, MAX_PLAYERS, UNCLAIMED_SYMBOL};
pub use snapshot::{
    write_board, MemorySink, NullSink, PlayerScore, Snapshot, SnapshotSink, StdoutSink,
    SNAPSHOT_SEPARATOR,
};
