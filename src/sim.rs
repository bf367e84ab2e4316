//! The simulation engine.
//!
//! One engine covers every variant of the game: any number of players, with
//! or without an external event source. Players are seeded when the
//! simulation is built; `Simulation::run` then spawns one thread per player,
//! an injector thread if events are attached, and runs the supervisor loop
//! on the calling thread. All threads borrow the same `SharedState` and are
//! joined before `run` returns.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;

use rand::rngs::SmallRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::agent::{AgentExit, AgentReport, PlayerAgent};
use crate::board::{Owner, PlayerId, RegionGraph, SnapshotSink};
use crate::config::{ConfigError, SimConfig};
use crate::events::{Event, EventInjector, InjectorReport};
use crate::player::PlayerStats;
use crate::state::{SharedState, StopReason};
use crate::supervisor::Supervisor;

/// Errors raised while setting up or reporting on a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("board has {regions} regions, not enough to seed {players} players")]
    NotEnoughRegions { regions: usize, players: usize },

    #[error("expected {expected} seed regions, got {got}")]
    SeedCount { expected: usize, got: usize },

    #[error("seed region {region} is outside the board ({regions} regions)")]
    SeedOutOfRange { region: usize, regions: usize },

    #[error("seed region {0} is assigned to more than one player")]
    DuplicateSeed(usize),

    #[error("cannot write report: {0}")]
    Io(#[from] io::Error),

    #[error("cannot encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Final state of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerReport {
    pub player: PlayerId,
    pub symbol: char,
    pub seed_region: usize,
    pub exit: AgentExit,
    pub attempts: u64,
    /// Illegal attempts in a row when the agent stopped.
    pub illegal_streak: u32,
    pub stats: PlayerStats,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimReport {
    pub stop: StopReason,
    pub boards_published: u64,
    pub players: Vec<PlayerReport>,
    /// Present when an event source was attached.
    pub injector: Option<InjectorReport>,
    pub final_owners: Vec<Owner>,
}

impl SimReport {
    /// Writes one `Player <S> points: <N>` line per player.
    pub fn write_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for p in &self.players {
            writeln!(out, "Player {} points: {}", p.symbol, p.stats.points)?;
        }
        out.flush()
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), SimError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerReport> {
        self.players.iter().find(|p| p.player == id)
    }
}

/// A configured, seeded game ready to run.
pub struct Simulation {
    state: SharedState,
    config: SimConfig,
    seeds: Vec<usize>,
}

impl Simulation {
    /// Seeds every player on a distinct random region.
    pub fn new(
        graph: RegionGraph,
        config: SimConfig,
        sink: Arc<dyn SnapshotSink>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        if graph.len() < config.players {
            return Err(SimError::NotEnoughRegions {
                regions: graph.len(),
                players: config.players,
            });
        }
        let mut rng = if config.seed != 0 {
            SmallRng::seed_from_u64(config.seed)
        } else {
            SmallRng::from_entropy()
        };
        let seeds = index::sample(&mut rng, graph.len(), config.players).into_vec();
        Self::with_seeds(graph, config, &seeds, sink)
    }

    /// Seeds player `i` on `seeds[i]`. Seeds must be distinct board regions.
    pub fn with_seeds(
        mut graph: RegionGraph,
        config: SimConfig,
        seeds: &[usize],
        sink: Arc<dyn SnapshotSink>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        if seeds.len() != config.players {
            return Err(SimError::SeedCount {
                expected: config.players,
                got: seeds.len(),
            });
        }
        let mut seen = HashSet::new();
        for &region in seeds {
            if region >= graph.len() {
                return Err(SimError::SeedOutOfRange {
                    region,
                    regions: graph.len(),
                });
            }
            if !seen.insert(region) {
                return Err(SimError::DuplicateSeed(region));
            }
        }

        for (i, &region) in seeds.iter().enumerate() {
            if let Some(id) = PlayerId::new(i) {
                graph.set_owner(region, Owner::Player(id));
                info!(player = %id, region, "player seeded");
            }
        }
        info!(
            regions = graph.len(),
            players = config.players,
            "board ready"
        );

        let state = SharedState::new(graph, config.players, sink);
        Ok(Simulation {
            state,
            config,
            seeds: seeds.to_vec(),
        })
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Seed region of each player, in seat order.
    pub fn seeds(&self) -> &[usize] {
        &self.seeds
    }

    /// Runs the game to completion and returns the final report.
    ///
    /// Without an event source the game ends when every player gives up.
    pub fn run(self, events: Option<Receiver<Event>>) -> SimReport {
        let state = &self.state;
        let config = &self.config;

        let (agents, injector, stop, boards_published) = thread::scope(|s| {
            let agent_handles: Vec<_> = state
                .players()
                .iter()
                .map(|p| {
                    let agent = PlayerAgent::new(p.id(), config);
                    s.spawn(move || agent.run(state))
                })
                .collect();

            let injector_handle = events.map(|rx| {
                let injector = EventInjector::new(config);
                s.spawn(move || injector.run(state, rx))
            });

            let (stop, published) = Supervisor::new(config.display_interval).run(state);

            let agents: Vec<AgentReport> = agent_handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect();
            let injector = injector_handle
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)));
            (agents, injector, stop, published)
        });

        let final_board = state.snapshot().board;
        let players = agents
            .iter()
            .map(|a| PlayerReport {
                player: a.player,
                symbol: a.player.symbol(),
                seed_region: self.seeds[a.player.index()],
                exit: a.exit,
                attempts: a.attempts,
                illegal_streak: a.illegal_streak,
                stats: state.player(a.player).stats(),
            })
            .collect();

        SimReport {
            stop,
            boards_published,
            players,
            injector,
            final_owners: final_board.regions().iter().map(|r| r.owner).collect(),
        }
    }
}
