//! Minimax search with alpha-beta pruning
//!
//! Scores are always from the maximizer's point of view. The caller says which
//! role the searching side plays; the root then keeps the first move with the
//! best score, in the order `Searchable::moves` generates them.

/// Which extreme the searching side is after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Maximizer,
    Minimizer,
}

impl Role {
    pub fn other(self) -> Self {
        match self {
            Role::Maximizer => Role::Minimizer,
            Role::Minimizer => Role::Maximizer,
        }
    }
}

/// A game position that can be searched
pub trait Searchable: Sized {
    type Move: Clone;

    /// Legal moves for the side to move, in a stable order
    fn moves(&self) -> Vec<Self::Move>;

    /// Position after playing `mv`
    fn child(&self, mv: &Self::Move) -> Self;

    /// Score of a finished game; `ply` is the distance from the root's children
    fn terminal_score(&self, ply: u32) -> Option<i32>;

    /// Static evaluation of an unfinished position at the depth horizon
    fn evaluate(&self) -> i32;
}

/// Best move for `role` searching `depth` plies (at least one)
///
/// Returns the move and its backed-up score, or `None` without legal moves.
pub fn best_move<S: Searchable>(root: &S, depth: u32, role: Role) -> Option<(S::Move, i32)> {
    let mut alpha = i32::MIN;
    let mut beta = i32::MAX;
    let mut best: Option<(S::Move, i32)> = None;

    for mv in root.moves() {
        let child = root.child(&mv);
        let score = alphabeta(&child, depth.saturating_sub(1), 0, alpha, beta, role.other());

        match role {
            Role::Maximizer => {
                if best.as_ref().is_none_or(|(_, b)| score > *b) {
                    best = Some((mv, score));
                    alpha = alpha.max(score);
                }
            }
            Role::Minimizer => {
                if best.as_ref().is_none_or(|(_, b)| score < *b) {
                    best = Some((mv, score));
                    beta = beta.min(score);
                }
            }
        }
    }

    best
}

fn alphabeta<S: Searchable>(
    node: &S,
    depth: u32,
    ply: u32,
    mut alpha: i32,
    mut beta: i32,
    role: Role,
) -> i32 {
    if let Some(score) = node.terminal_score(ply) {
        return score;
    }
    if depth == 0 {
        return node.evaluate();
    }
    let moves = node.moves();
    if moves.is_empty() {
        return node.evaluate();
    }

    match role {
        Role::Maximizer => {
            let mut value = i32::MIN;
            for mv in &moves {
                let score = alphabeta(&node.child(mv), depth - 1, ply + 1, alpha, beta, Role::Minimizer);
                value = value.max(score);
                alpha = alpha.max(value);
                if beta <= alpha {
                    break;
                }
            }
            value
        }
        Role::Minimizer => {
            let mut value = i32::MAX;
            for mv in &moves {
                let score = alphabeta(&node.child(mv), depth - 1, ply + 1, alpha, beta, Role::Maximizer);
                value = value.min(score);
                beta = beta.min(value);
                if beta <= alpha {
                    break;
                }
            }
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Take 1-3 stones; whoever takes the last stone wins
    #[derive(Debug, Clone, Copy)]
    struct Nim {
        pile: u32,
        max_to_move: bool,
    }

    impl Searchable for Nim {
        type Move = u32;

        fn moves(&self) -> Vec<u32> {
            (1..=self.pile.min(3)).collect()
        }

        fn child(&self, take: &u32) -> Self {
            Nim {
                pile: self.pile - take,
                max_to_move: !self.max_to_move,
            }
        }

        fn terminal_score(&self, ply: u32) -> Option<i32> {
            // The side that just moved took the last stone
            (self.pile == 0).then(|| {
                let magnitude = 10 - ply as i32;
                if self.max_to_move { -magnitude } else { magnitude }
            })
        }

        fn evaluate(&self) -> i32 {
            0
        }
    }

    fn solve(pile: u32, role: Role) -> (u32, i32) {
        let root = Nim {
            pile,
            max_to_move: role == Role::Maximizer,
        };
        best_move(&root, 12, role).unwrap()
    }

    #[test]
    fn test_finds_winning_nim_moves() {
        assert_eq!(solve(5, Role::Maximizer).0, 1);
        assert_eq!(solve(6, Role::Maximizer).0, 2);
        assert_eq!(solve(7, Role::Maximizer).0, 3);
        assert_eq!(solve(7, Role::Minimizer).0, 3);
    }

    #[test]
    fn test_prefers_faster_win() {
        // Taking all three stones wins immediately at ply 0
        let (mv, score) = solve(3, Role::Maximizer);
        assert_eq!(mv, 3);
        assert_eq!(score, 10);
    }

    #[test]
    fn test_losing_position_keeps_first_move() {
        // Every move loses from a multiple of four; ties keep generation order
        let (mv, score) = solve(4, Role::Maximizer);
        assert_eq!(mv, 1);
        assert!(score < 0);
    }

    #[test]
    fn test_no_moves() {
        let root = Nim {
            pile: 0,
            max_to_move: true,
        };
        assert!(best_move(&root, 3, Role::Maximizer).is_none());
    }

    #[test]
    fn test_depth_one_uses_evaluation() {
        let root = Nim {
            pile: 9,
            max_to_move: true,
        };
        let (mv, score) = best_move(&root, 1, Role::Maximizer).unwrap();
        assert_eq!((mv, score), (1, 0));
    }
}
