//! Text protocol for driving a running simulation from outside.

pub mod parser;

pub use parser::parse_event;
