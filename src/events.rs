//! External events and the injector thread that applies them.
//!
//! Events arrive on a channel so the engine does not depend on how they are
//! produced: the binary bridges SIGINT/SIGTERM and stdin commands, tests
//! send events directly. A confiscation strips one random owned region from
//! its owner and costs that owner a point; a termination stops the whole
//! simulation cooperatively.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::board::{Owner, PlayerId};
use crate::config::SimConfig;
use crate::state::{SharedState, StopReason};

/// An event delivered from outside the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Take a random owned region away from its owner.
    Confiscate,
    /// Stop the simulation.
    Terminate,
}

/// Creates the channel the injector consumes.
pub fn channel() -> (Sender<Event>, Receiver<Event>) {
    mpsc::channel()
}

/// Result of a confiscation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confiscation {
    /// No region was owned; nothing changed.
    NothingOwned,
    /// `region` was taken from `from`.
    Taken { region: usize, from: PlayerId },
}

/// Why the injector finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InjectorExit {
    /// It received a termination event and raised the flag.
    Terminated,
    /// Every sender was dropped.
    SourceClosed,
    /// The simulation stopped for another reason.
    Shutdown,
}

/// What the injector did over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InjectorReport {
    pub exit: InjectorExit,
    /// Regions successfully confiscated.
    pub confiscations: u64,
}

/// Consumes events and applies them under the board locking rules.
pub struct EventInjector {
    rng: SmallRng,
    poll: Duration,
    confiscations: u64,
}

impl EventInjector {
    pub fn new(config: &SimConfig) -> Self {
        let rng = if config.seed != 0 {
            SmallRng::seed_from_u64(config.seed)
        } else {
            SmallRng::from_entropy()
        };
        EventInjector {
            rng,
            poll: config.event_poll,
            confiscations: 0,
        }
    }

    /// Number of successful confiscations so far.
    pub fn confiscations(&self) -> u64 {
        self.confiscations
    }

    /// Strips a uniformly chosen owned region from its owner.
    ///
    /// Only the chosen region is locked while its owner is cleared and the
    /// owner's score is decremented. A consistent board is then published
    /// exactly as the supervisor does.
    pub fn confiscate(&mut self, state: &SharedState) -> Confiscation {
        let owned = state.owned_regions();
        let Some(&region) = owned.choose(&mut self.rng) else {
            debug!("confiscation skipped: no region is owned");
            return Confiscation::NothingOwned;
        };

        let taken = {
            let mut guard = state.locks().acquire_one(region);
            match guard.owner(region) {
                Some(Owner::Player(from)) => {
                    guard.set_owner(region, Owner::Unclaimed);
                    state.player(from).record_confiscation();
                    Some(from)
                }
                _ => None,
            }
        };

        match taken {
            Some(from) => {
                self.confiscations += 1;
                info!(region, player = %from, "region confiscated");
                state.publish_snapshot();
                Confiscation::Taken { region, from }
            }
            None => Confiscation::NothingOwned,
        }
    }

    /// Applies one event. Returns false if the injector should stop.
    pub fn handle(&mut self, state: &SharedState, event: Event) -> bool {
        match event {
            Event::Confiscate => {
                self.confiscate(state);
                true
            }
            Event::Terminate => {
                info!("termination requested");
                state.request_stop(StopReason::ExternalEvent);
                false
            }
        }
    }

    /// Waits for events until termination, shutdown, or the source closes.
    ///
    /// The wait is bounded by the poll interval so a shutdown raised by the
    /// supervisor is noticed without any event arriving.
    pub fn run(mut self, state: &SharedState, events: Receiver<Event>) -> InjectorReport {
        let exit = loop {
            if state.is_terminated() {
                break InjectorExit::Shutdown;
            }
            match events.recv_timeout(self.poll) {
                Ok(event) => {
                    if !self.handle(state, event) {
                        break InjectorExit::Terminated;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("event source closed");
                    break InjectorExit::SourceClosed;
                }
            }
        };
        InjectorReport {
            exit,
            confiscations: self.confiscations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MemorySink, RegionGraph};
    use std::sync::Arc;

    fn config() -> SimConfig {
        SimConfig {
            seed: 11,
            event_poll: Duration::from_millis(5),
            ..Default::default()
        }
    }

    fn a() -> PlayerId {
        PlayerId::new(0).unwrap()
    }

    #[test]
    fn confiscation_with_nothing_owned_is_noop() {
        let sink = Arc::new(MemorySink::new());
        let g = RegionGraph::from_adjacency(&[&[1], &[0]]).unwrap();
        let state = SharedState::new(g.clone(), 2, sink.clone());
        let mut injector = EventInjector::new(&config());

        assert_eq!(injector.confiscate(&state), Confiscation::NothingOwned);
        assert_eq!(injector.confiscations(), 0);
        assert!(sink.is_empty());
        assert_eq!(state.snapshot().board, g);
        for p in state.players() {
            assert_eq!(p.stats(), Default::default());
        }
    }

    #[test]
    fn confiscation_clears_owner_and_costs_a_point() {
        let sink = Arc::new(MemorySink::new());
        let mut g = RegionGraph::from_adjacency(&[&[1], &[0], &[]]).unwrap();
        g.set_owner(1, Owner::Player(a()));
        let state = SharedState::new(g, 1, sink.clone());
        state.player(a()).record_claim();

        let mut injector = EventInjector::new(&config());
        assert_eq!(
            injector.confiscate(&state),
            Confiscation::Taken {
                region: 1,
                from: a()
            }
        );
        assert_eq!(state.owner(1), Owner::Unclaimed);
        let stats = state.player(a()).stats();
        assert_eq!(stats.points, 0);
        assert_eq!(stats.confiscations, 1);

        // The board was published once, already showing the cleared region.
        let snaps = sink.snapshots();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].board.owner(1), Owner::Unclaimed);
    }

    #[test]
    fn terminate_event_raises_flag() {
        let g = RegionGraph::from_adjacency(&[&[]]).unwrap();
        let state = SharedState::new(g, 1, Arc::new(MemorySink::new()));
        let (tx, rx) = channel();
        tx.send(Event::Terminate).unwrap();
        let report = EventInjector::new(&config()).run(&state, rx);
        assert_eq!(report.exit, InjectorExit::Terminated);
        assert_eq!(state.stop_reason(), Some(StopReason::ExternalEvent));
    }

    #[test]
    fn closed_source_does_not_terminate() {
        let g = RegionGraph::from_adjacency(&[&[]]).unwrap();
        let state = SharedState::new(g, 1, Arc::new(MemorySink::new()));
        let (tx, rx) = channel();
        tx.send(Event::Confiscate).unwrap();
        drop(tx);
        let report = EventInjector::new(&config()).run(&state, rx);
        assert_eq!(report.exit, InjectorExit::SourceClosed);
        assert_eq!(report.confiscations, 0);
        assert!(!state.is_terminated());
    }

    #[test]
    fn shutdown_is_noticed_without_events() {
        let g = RegionGraph::from_adjacency(&[&[]]).unwrap();
        let state = SharedState::new(g, 1, Arc::new(MemorySink::new()));
        let (_tx, rx) = channel();
        std::thread::scope(|s| {
            let handle = s.spawn(|| EventInjector::new(&config()).run(&state, rx));
            std::thread::sleep(Duration::from_millis(20));
            state.request_stop(StopReason::AllGaveUp);
            assert_eq!(handle.join().unwrap().exit, InjectorExit::Shutdown);
        });
    }
}
