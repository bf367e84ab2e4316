//! Region, owner, and player identity types.
//!
//! A region is the elemental node of the board graph. Its neighbor list is
//! fixed after load; only the owner changes during a game.

use std::fmt;

use serde::Serialize;

/// Maximum number of neighbors a single region may list.
pub const MAX_NEIGHBORS: usize = 6;

/// Maximum number of players, one per uppercase letter.
pub const MAX_PLAYERS: usize = 26;

/// Symbol printed for a region nobody owns.
pub const UNCLAIMED_SYMBOL: char = '-';

/// Identifies a player by its zero-based seat index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Creates a player id. Returns None if the index has no symbol.
    pub fn new(index: usize) -> Option<PlayerId> {
        if index < MAX_PLAYERS {
            Some(PlayerId(index as u8))
        } else {
            None
        }
    }

    /// Zero-based seat index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Single-character symbol: 'A' for seat 0, 'B' for seat 1, ...
    pub const fn symbol(self) -> char {
        (b'A' + self.0) as char
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Who controls a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Owner {
    #[default]
    Unclaimed,
    Player(PlayerId),
}

impl Owner {
    /// Returns the character shown in board snapshots.
    pub const fn symbol(self) -> char {
        match self {
            Owner::Unclaimed => UNCLAIMED_SYMBOL,
            Owner::Player(id) => id.symbol(),
        }
    }

    pub fn is_owned_by(self, id: PlayerId) -> bool {
        self == Owner::Player(id)
    }
}

/// A single board region.
///
/// Neighbors are stored inline in a fixed-size array so the board is one
/// contiguous allocation regardless of how dense the graph is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub owner: Owner,
    neighbors: [usize; MAX_NEIGHBORS],
    num_neighbors: u8,
}

impl Region {
    /// Creates an unclaimed region with no neighbors.
    pub const fn new() -> Self {
        Region {
            owner: Owner::Unclaimed,
            neighbors: [0; MAX_NEIGHBORS],
            num_neighbors: 0,
        }
    }

    /// Appends a neighbor. Returns false if the region is already full.
    pub fn push_neighbor(&mut self, index: usize) -> bool {
        let n = self.num_neighbors as usize;
        if n >= MAX_NEIGHBORS {
            return false;
        }
        self.neighbors[n] = index;
        self.num_neighbors += 1;
        true
    }

    /// Neighbor indices in file order.
    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors[..self.num_neighbors as usize]
    }

    pub fn num_neighbors(&self) -> usize {
        self.num_neighbors as usize
    }
}

impl Default for Region {
    fn default() -> Self {
        Region::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_symbols_are_consecutive_letters() {
        for i in 0..MAX_PLAYERS {
            let id = PlayerId::new(i).unwrap();
            assert_eq!(id.index(), i);
            assert_eq!(id.symbol(), (b'A' + i as u8) as char);
        }
        assert_eq!(PlayerId::new(0).unwrap().symbol(), 'A');
        assert_eq!(PlayerId::new(25).unwrap().symbol(), 'Z');
        assert_eq!(PlayerId::new(MAX_PLAYERS), None);
    }

    #[test]
    fn owner_symbols() {
        let b = PlayerId::new(1).unwrap();
        assert_eq!(Owner::Unclaimed.symbol(), '-');
        assert_eq!(Owner::Player(b).symbol(), 'B');
        assert!(Owner::Player(b).is_owned_by(b));
        assert!(!Owner::Unclaimed.is_owned_by(b));
        assert_eq!(Owner::default(), Owner::Unclaimed);
    }

    #[test]
    fn push_neighbor_respects_bound() {
        let mut r = Region::new();
        for i in 0..MAX_NEIGHBORS {
            assert!(r.push_neighbor(i));
        }
        assert!(!r.push_neighbor(99));
        assert_eq!(r.num_neighbors(), MAX_NEIGHBORS);
        assert_eq!(r.neighbors(), &[0, 1, 2, 3, 4, 5]);
    }
}
