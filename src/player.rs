//! Players and their guarded score fields.
//!
//! A player's score is written by its own agent (claims) and by the event
//! injector (confiscations), so every field sits behind a per-player mutex.
//! Region locks do not protect these fields. When both are needed the region
//! locks are taken first and the player guard last.

use parking_lot::Mutex;
use serde::Serialize;

use crate::board::PlayerId;

/// Score fields of a player, copied out under the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlayerStats {
    /// Claims minus confiscation losses. Negative if a seed region was taken.
    pub points: i64,
    /// Successful claims made.
    pub claims: u64,
    /// Regions taken away by confiscation.
    pub confiscations: u64,
    /// Set once the agent reached the frustration limit.
    pub gave_up: bool,
}

/// A player in the game.
#[derive(Debug)]
pub struct Player {
    id: PlayerId,
    stats: Mutex<PlayerStats>,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Player {
            id,
            stats: Mutex::new(PlayerStats::default()),
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn symbol(&self) -> char {
        self.id.symbol()
    }

    /// Copy of the current stats.
    pub fn stats(&self) -> PlayerStats {
        *self.stats.lock()
    }

    pub fn points(&self) -> i64 {
        self.stats.lock().points
    }

    pub fn gave_up(&self) -> bool {
        self.stats.lock().gave_up
    }

    pub fn record_claim(&self) {
        let mut stats = self.stats.lock();
        stats.claims += 1;
        stats.points += 1;
    }

    pub fn record_confiscation(&self) {
        let mut stats = self.stats.lock();
        stats.confiscations += 1;
        stats.points -= 1;
    }

    pub fn mark_gave_up(&self) {
        self.stats.lock().gave_up = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_follow_claims_and_confiscations() {
        let p = Player::new(PlayerId::new(0).unwrap());
        p.record_claim();
        p.record_claim();
        p.record_confiscation();
        let s = p.stats();
        assert_eq!(s.claims, 2);
        assert_eq!(s.confiscations, 1);
        assert_eq!(s.points, 1);
        assert!(!s.gave_up);
    }

    #[test]
    fn points_can_go_negative() {
        let p = Player::new(PlayerId::new(1).unwrap());
        p.record_confiscation();
        assert_eq!(p.points(), -1);
        assert_eq!(p.symbol(), 'B');
    }

    #[test]
    fn concurrent_writers_do_not_lose_updates() {
        let p = Player::new(PlayerId::new(0).unwrap());
        std::thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..10_000 {
                    p.record_claim();
                }
            });
            s.spawn(|| {
                for _ in 0..4_000 {
                    p.record_confiscation();
                }
            });
        });
        let stats = p.stats();
        assert_eq!(stats.claims, 10_000);
        assert_eq!(stats.confiscations, 4_000);
        assert_eq!(stats.points, 6_000);
    }
}
