//! Event command parser.
//!
//! Turns lines typed on stdin into simulation events. Each line holds one
//! command word; case and surrounding whitespace are ignored.
//!
//! | command                           | event        |
//! |-----------------------------------|--------------|
//! | `confiscate`, `c`                 | Confiscate   |
//! | `terminate`, `quit`, `q`          | Terminate    |

use crate::events::Event;

/// Parses a single line of input into an `Event`.
///
/// Returns `None` for empty lines and unknown commands; unknown commands are
/// logged at warn level.
pub fn parse_event(line: &str) -> Option<Event> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let word = trimmed.split_whitespace().next()?.to_ascii_lowercase();
    match word.as_str() {
        "confiscate" | "c" => Some(Event::Confiscate),
        "terminate" | "quit" | "q" => Some(Event::Terminate),
        other => {
            tracing::warn!(command = other, "unknown command");
            None
        }
    }
}
