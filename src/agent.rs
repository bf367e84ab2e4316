//! Player agents.
//!
//! Each player runs on its own thread. An agent picks a uniformly random
//! region, locks that region together with its neighbors, and claims the
//! region if it does not already own it and owns at least one of the
//! region's own neighbors. A legal move is followed by a think-time pause;
//! an illegal attempt retries at once. After `frustration_limit` illegal
//! attempts in a row the agent gives up for good.

use std::thread;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::board::{Owner, PlayerId};
use crate::config::SimConfig;
use crate::state::SharedState;
use crate::sync::LockSet;

/// Result of one claim attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The region changed hands; `previous` is who held it before.
    Claimed { previous: Owner },
    /// The acting player already owns the target.
    AlreadyOwned,
    /// None of the target's neighbors belong to the acting player.
    NoOwnedNeighbor,
}

impl MoveOutcome {
    pub fn is_legal(self) -> bool {
        matches!(self, MoveOutcome::Claimed { .. })
    }
}

/// Why an agent thread finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgentExit {
    /// Reached the frustration limit.
    GaveUp,
    /// Saw the termination flag.
    Terminated,
}

/// Counts consecutive illegal attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frustration {
    consecutive: u32,
    limit: u32,
}

impl Frustration {
    pub fn new(limit: u32) -> Self {
        Frustration {
            consecutive: 0,
            limit,
        }
    }

    /// Records an attempt. Returns true once the limit is reached.
    pub fn record(&mut self, outcome: MoveOutcome) -> bool {
        if outcome.is_legal() {
            self.consecutive = 0;
        } else {
            self.consecutive = self.consecutive.saturating_add(1);
        }
        self.is_exhausted()
    }

    pub fn is_exhausted(&self) -> bool {
        self.consecutive >= self.limit
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }
}

/// What an agent did over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentReport {
    pub player: PlayerId,
    pub exit: AgentExit,
    /// Every claim attempt, legal or not.
    pub attempts: u64,
    /// Legal moves made.
    pub claims: u64,
    /// Consecutive illegal attempts at exit.
    pub illegal_streak: u32,
}

/// The autonomous agent driving one player.
pub struct PlayerAgent {
    id: PlayerId,
    rng: SmallRng,
    frustration: Frustration,
    think_time: Duration,
    move_hold: Duration,
}

impl PlayerAgent {
    /// Creates the agent for `id`. With a fixed seed every agent gets its own
    /// reproducible stream.
    pub fn new(id: PlayerId, config: &SimConfig) -> Self {
        let rng = if config.seed != 0 {
            SmallRng::seed_from_u64(config.seed.wrapping_add(1 + id.index() as u64))
        } else {
            SmallRng::from_entropy()
        };
        PlayerAgent {
            id,
            rng,
            frustration: Frustration::new(config.frustration_limit),
            think_time: config.think_time,
            move_hold: config.move_hold,
        }
    }

    /// Attempts to claim `target`.
    ///
    /// The target and its neighbors stay locked from the ownership check
    /// through the owner change and score update, so no other thread can
    /// touch any of them in between.
    pub fn attempt(&self, state: &SharedState, target: usize) -> MoveOutcome {
        let me = Owner::Player(self.id);
        let set = LockSet::for_move(state.graph(), target);
        let mut guard = state.locks().acquire(&set);

        if guard.owner(target) == Some(me) {
            return MoveOutcome::AlreadyOwned;
        }

        let owns_neighbor = state
            .graph()
            .neighbors(target)
            .iter()
            .any(|&n| guard.owner(n) == Some(me));
        if !owns_neighbor {
            return MoveOutcome::NoOwnedNeighbor;
        }

        let previous = guard.set_owner(target, me).unwrap_or_default();
        if !self.move_hold.is_zero() {
            thread::sleep(self.move_hold);
        }
        state.player(self.id).record_claim();
        MoveOutcome::Claimed { previous }
    }

    /// Runs until the agent gives up or the simulation is terminated.
    pub fn run(mut self, state: &SharedState) -> AgentReport {
        let regions = state.num_regions();
        let mut attempts = 0u64;
        let mut claims = 0u64;

        let exit = loop {
            if state.is_terminated() {
                break AgentExit::Terminated;
            }
            if regions == 0 {
                state.player(self.id).mark_gave_up();
                break AgentExit::GaveUp;
            }

            let target = self.rng.gen_range(0..regions);
            let outcome = self.attempt(state, target);
            attempts += 1;

            match outcome {
                MoveOutcome::Claimed { previous } => {
                    claims += 1;
                    debug!(player = %self.id, region = target, from = %previous.symbol(), "claimed region");
                }
                MoveOutcome::AlreadyOwned => {
                    debug!(player = %self.id, region = target, "region already owned");
                }
                MoveOutcome::NoOwnedNeighbor => {
                    debug!(player = %self.id, region = target, "no neighboring region owned");
                }
            }

            if self.frustration.record(outcome) {
                state.player(self.id).mark_gave_up();
                info!(
                    player = %self.id,
                    attempts,
                    claims,
                    "player gave up after {} illegal attempts",
                    self.frustration.consecutive()
                );
                break AgentExit::GaveUp;
            }

            if outcome.is_legal() && !self.think_time.is_zero() {
                thread::sleep(self.think_time);
            }
        };

        AgentReport {
            player: self.id,
            exit,
            attempts,
            claims,
            illegal_streak: self.frustration.consecutive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{NullSink, RegionGraph};
    use std::sync::Arc;

    fn a() -> PlayerId {
        PlayerId::new(0).unwrap()
    }

    fn b() -> PlayerId {
        PlayerId::new(1).unwrap()
    }

    fn fast_config() -> SimConfig {
        SimConfig {
            think_time: Duration::ZERO,
            seed: 7,
            ..Default::default()
        }
    }

    fn state_with(lists: &[&[usize]], owners: &[(usize, PlayerId)], players: usize) -> SharedState {
        let mut g = RegionGraph::from_adjacency(lists).unwrap();
        for &(region, id) in owners {
            g.set_owner(region, Owner::Player(id));
        }
        SharedState::new(g, players, Arc::new(NullSink))
    }

    #[test]
    fn frustration_counts_consecutive_illegal_only() {
        let mut f = Frustration::new(3);
        assert!(!f.record(MoveOutcome::AlreadyOwned));
        assert!(!f.record(MoveOutcome::NoOwnedNeighbor));
        assert!(!f.record(MoveOutcome::Claimed {
            previous: Owner::Unclaimed
        }));
        assert_eq!(f.consecutive(), 0);
        assert!(!f.record(MoveOutcome::AlreadyOwned));
        assert!(!f.record(MoveOutcome::AlreadyOwned));
        assert!(f.record(MoveOutcome::NoOwnedNeighbor));
        assert_eq!(f.consecutive(), 3);
    }

    #[test]
    fn attempt_on_own_region_is_illegal() {
        let state = state_with(&[&[1], &[0]], &[(0, a())], 1);
        let agent = PlayerAgent::new(a(), &fast_config());
        assert_eq!(agent.attempt(&state, 0), MoveOutcome::AlreadyOwned);
        assert_eq!(state.player(a()).points(), 0);
    }

    #[test]
    fn attempt_without_owned_neighbor_is_illegal() {
        let state = state_with(&[&[1], &[0], &[]], &[(0, a())], 1);
        let agent = PlayerAgent::new(a(), &fast_config());
        assert_eq!(agent.attempt(&state, 2), MoveOutcome::NoOwnedNeighbor);
        assert_eq!(state.owner(2), Owner::Unclaimed);
    }

    #[test]
    fn attempt_next_to_own_region_claims_it() {
        let state = state_with(&[&[1], &[0]], &[(0, a())], 1);
        let agent = PlayerAgent::new(a(), &fast_config());
        assert_eq!(
            agent.attempt(&state, 1),
            MoveOutcome::Claimed {
                previous: Owner::Unclaimed
            }
        );
        assert_eq!(state.owner(1), Owner::Player(a()));
        assert_eq!(state.player(a()).points(), 1);
    }

    #[test]
    fn claim_checks_only_the_targets_own_neighbor_list() {
        // Region 1 lists 0, but 0 lists nobody. Owning 1 does not make 0
        // claimable; it does make 2 claimable because 2 lists 1.
        let state = state_with(&[&[], &[0], &[1]], &[(1, a())], 1);
        let agent = PlayerAgent::new(a(), &fast_config());
        assert_eq!(agent.attempt(&state, 0), MoveOutcome::NoOwnedNeighbor);
        assert!(agent.attempt(&state, 2).is_legal());
    }

    #[test]
    fn can_take_opponent_region() {
        let state = state_with(&[&[1], &[0]], &[(0, a()), (1, b())], 2);
        let agent = PlayerAgent::new(a(), &fast_config());
        assert_eq!(
            agent.attempt(&state, 1),
            MoveOutcome::Claimed {
                previous: Owner::Player(b())
            }
        );
        assert_eq!(state.player(a()).points(), 1);
        assert_eq!(state.player(b()).points(), 0);
    }

    #[test]
    fn stuck_agent_gives_up_after_exactly_limit_attempts() {
        // A owns 0; 1 is isolated. Every attempt is illegal.
        let state = state_with(&[&[], &[]], &[(0, a())], 1);
        let config = SimConfig {
            frustration_limit: 5,
            ..fast_config()
        };
        let report = PlayerAgent::new(a(), &config).run(&state);
        assert_eq!(report.exit, AgentExit::GaveUp);
        assert_eq!(report.attempts, 5);
        assert_eq!(report.claims, 0);
        assert_eq!(report.illegal_streak, 5);
        assert!(state.player(a()).gave_up());
    }

    #[test]
    fn terminated_agent_exits_before_moving() {
        let state = state_with(&[&[1], &[0]], &[(0, a())], 1);
        state.request_stop(crate::state::StopReason::ExternalEvent);
        let report = PlayerAgent::new(a(), &fast_config()).run(&state);
        assert_eq!(report.exit, AgentExit::Terminated);
        assert_eq!(report.attempts, 0);
        assert!(!state.player(a()).gave_up());
        assert_eq!(state.owner(1), Owner::Unclaimed);
    }
}
