//! Territory simulation library.
//!
//! Exposes the board representation, region locking, player agents, the
//! supervisor, the event injector, and the engine that runs them together,
//! for use by integration tests and the binary entry point.

pub mod agent;
pub mod board;
pub mod config;
pub mod events;
pub mod player;
pub mod protocol;
pub mod sim;
pub mod state;
pub mod supervisor;
pub mod sync;
