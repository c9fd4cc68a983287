//! Session-level state shared by every game
//!
//! Per-game state (boards, entities) lives in the game modules; this file holds
//! the pieces the generic session owns: status, scores, RNG and identity.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// The two sides of every game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The human at the keyboard
    Player,
    /// The computer opponent (or the environment, for single-player games)
    Opponent,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

/// Terminal verdict reported by a simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Won(Side),
    Draw,
}

/// Lifecycle of one round
///
/// Monotone within a round: Idle -> Running (<-> Paused) -> Won/Draw.
/// Only an explicit new game returns to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    /// Waiting for the first input
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Suspended by the player
    Paused,
    /// Round over with a winner
    Won(Side),
    /// Round over without a winner
    Draw,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Won(_) | Status::Draw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Running => "running",
            Status::Paused => "paused",
            Status::Won(Side::Player) => "player-won",
            Status::Won(Side::Opponent) => "opponent-won",
            Status::Draw => "draw",
        }
    }
}

impl From<Verdict> for Status {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Won(side) => Status::Won(side),
            Verdict::Draw => Status::Draw,
        }
    }
}

/// Rounds won per side, kept across rounds of one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub player: u32,
    pub opponent: u32,
}

impl ScoreBoard {
    /// Record a round-terminal verdict (draws change nothing)
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Won(Side::Player) => self.player += 1,
            Verdict::Won(Side::Opponent) => self.opponent += 1,
            Verdict::Draw => {}
        }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player,
            Side::Opponent => self.opponent,
        }
    }
}

/// RNG seed/stream pair a session is created from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Same seed, separate stream (one per session)
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        Self { seed, stream }
    }

    pub fn to_rng(&self) -> Pcg32 {
        if self.stream == 0 {
            Pcg32::seed_from_u64(self.seed)
        } else {
            Pcg32::new(self.seed, self.stream)
        }
    }
}

/// Identity of one round of one session
///
/// Deferred work (search requests, timers) carries the token it was started
/// under; a result whose token no longer matches is stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken {
    pub session_id: u64,
    pub generation: u64,
}

impl SessionToken {
    pub fn new(session_id: u64) -> Self {
        Self {
            session_id,
            generation: 0,
        }
    }

    /// Token for the next round of the same session
    pub fn next(self) -> Self {
        Self {
            session_id: self.session_id,
            generation: self.generation + 1,
        }
    }
}
