//! Heuristic opponent tier for placement games
//!
//! Scan the legal moves in order: take an immediate win, otherwise block the
//! other side's immediate win, otherwise play uniformly at random.

use rand_pcg::Pcg32;

use super::{LegalMoves, Policy, RandomPolicy};
use crate::sim::Side;

/// Games where a move places a mark for one side (Connect Four, Tic-Tac-Toe)
pub trait PlacementGame: LegalMoves + Sized {
    /// Board after `side` plays `mv`, or `None` if the move is illegal
    fn with_move(&self, mv: &Self::Move, side: Side) -> Option<Self>;

    /// Side owning a completed line, if any
    fn winner(&self) -> Option<Side>;
}

/// Win, else block, else random
#[derive(Debug, Clone, Copy)]
pub struct HeuristicPolicy {
    pub side: Side,
}

impl HeuristicPolicy {
    pub fn new(side: Side) -> Self {
        Self { side }
    }

    /// First move that completes a line for `side`
    pub fn winning_move<G: PlacementGame>(state: &G, side: Side) -> Option<G::Move> {
        state.legal_moves().into_iter().find(|mv| {
            state
                .with_move(mv, side)
                .is_some_and(|next| next.winner() == Some(side))
        })
    }
}

impl<G: PlacementGame> Policy<G, G::Move> for HeuristicPolicy {
    fn choose_move(&mut self, state: &G, rng: &mut Pcg32) -> Option<G::Move> {
        if let Some(mv) = Self::winning_move(state, self.side) {
            log::debug!("heuristic: taking the win");
            return Some(mv);
        }
        if let Some(mv) = Self::winning_move(state, self.side.other()) {
            log::debug!("heuristic: blocking");
            return Some(mv);
        }
        RandomPolicy.choose_move(state, rng)
    }
}
