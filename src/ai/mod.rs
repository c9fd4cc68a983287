//! Opponent policies
//!
//! Tiers, from cheapest to strongest:
//! - `RandomPolicy`: uniform over legal moves
//! - `heuristic`: win if possible, else block, else random
//! - `minimax`: bounded-depth alpha-beta search
//! - `pathfinding`: BFS pursuit on walled grids
//!
//! `worker` moves expensive searches off the rendering path.

pub mod heuristic;
pub mod minimax;
pub mod pathfinding;
pub mod worker;

pub use heuristic::{HeuristicPolicy, PlacementGame};
pub use minimax::{Role, Searchable, best_move};
pub use pathfinding::shortest_path;
pub use worker::{SearchPoll, SearchWorker};

use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

/// Capability every opponent exposes: pick one move for a state
///
/// Returns `None` only when the state has no legal move.
pub trait Policy<S: ?Sized, M> {
    fn choose_move(&mut self, state: &S, rng: &mut Pcg32) -> Option<M>;
}

/// States that can enumerate their legal moves in a stable order
pub trait LegalMoves {
    type Move: Clone;

    fn legal_moves(&self) -> Vec<Self::Move>;
}

/// Uniformly random legal move
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl<S: LegalMoves> Policy<S, S::Move> for RandomPolicy {
    fn choose_move(&mut self, state: &S, rng: &mut Pcg32) -> Option<S::Move> {
        state.legal_moves().choose(rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    struct Slots(Vec<u8>);

    impl LegalMoves for Slots {
        type Move = u8;

        fn legal_moves(&self) -> Vec<u8> {
            self.0.clone()
        }
    }

    #[test]
    fn test_random_policy_picks_legal_moves() {
        let mut rng = Pcg32::seed_from_u64(5);
        let state = Slots(vec![2, 4, 8]);
        for _ in 0..50 {
            let mv = RandomPolicy.choose_move(&state, &mut rng).unwrap();
            assert!(state.0.contains(&mv));
        }
    }

    #[test]
    fn test_random_policy_without_moves() {
        let mut rng = Pcg32::seed_from_u64(5);
        assert_eq!(RandomPolicy.choose_move(&Slots(vec![]), &mut rng), None);
    }

    #[test]
    fn test_random_policy_is_seeded() {
        let state = Slots((0..20).collect());
        let pick = |seed| {
            let mut rng = Pcg32::seed_from_u64(seed);
            (0..5)
                .map(|_| RandomPolicy.choose_move(&state, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(pick(11), pick(11));
    }
}
