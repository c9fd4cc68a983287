//! Tic-Tac-Toe
//!
//! The player is X and moves first; the opponent is O. Hard difficulty
//! searches the full game tree with alpha-beta and never loses.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::{Delay, board_cell};
use crate::ai::{LegalMoves, PlacementGame, Policy, RandomPolicy, Role, Searchable, best_move};
use crate::input::InputEvent;
use crate::renderer::{Surface, colors};
use crate::settings::{Difficulty, TicTacToeSettings};
use crate::sim::{Schedule, Side, Simulation, StepContext, Verdict};

/// Pixel size of one cell
pub const CELL: f32 = 100.0;

/// Rows, columns and diagonals
pub const WIN_PATTERNS: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// 3x3 board; `Player` is X, `Opponent` is O
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board(pub [Option<Side>; 9]);

impl Board {
    pub fn get(&self, index: usize) -> Option<Side> {
        self.0.get(index).copied().flatten()
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    /// Place a mark; false if the index is out of range or taken
    pub fn place(&mut self, index: usize, side: Side) -> bool {
        match self.0.get_mut(index) {
            Some(cell @ None) => {
                *cell = Some(side);
                true
            }
            _ => false,
        }
    }

    /// Winner, draw, or still open
    pub fn verdict(&self) -> Option<Verdict> {
        match self.winner() {
            Some(side) => Some(Verdict::Won(side)),
            None if self.is_full() => Some(Verdict::Draw),
            None => None,
        }
    }
}

impl LegalMoves for Board {
    type Move = usize;

    fn legal_moves(&self) -> Vec<usize> {
        (0..9).filter(|&i| self.0[i].is_none()).collect()
    }
}

impl PlacementGame for Board {
    fn with_move(&self, mv: &usize, side: Side) -> Option<Self> {
        let mut next = *self;
        next.place(*mv, side).then_some(next)
    }

    fn winner(&self) -> Option<Side> {
        WIN_PATTERNS.iter().find_map(|&[a, b, c]| {
            let mark = self.0[a]?;
            (self.0[b] == Some(mark) && self.0[c] == Some(mark)).then_some(mark)
        })
    }
}

/// Search node: board plus the side to move (O maximizes)
#[derive(Debug, Clone, Copy)]
struct Node {
    board: Board,
    to_move: Side,
}

impl Searchable for Node {
    type Move = usize;

    fn moves(&self) -> Vec<usize> {
        self.board.legal_moves()
    }

    fn child(&self, mv: &usize) -> Self {
        let mut board = self.board;
        board.place(*mv, self.to_move);
        Node {
            board,
            to_move: self.to_move.other(),
        }
    }

    fn terminal_score(&self, ply: u32) -> Option<i32> {
        let depth = ply as i32;
        match self.board.verdict()? {
            Verdict::Won(Side::Opponent) => Some(10 - depth),
            Verdict::Won(Side::Player) => Some(depth - 10),
            Verdict::Draw => Some(0),
        }
    }

    fn evaluate(&self) -> i32 {
        0
    }
}

/// Opponent policy for the configured difficulty
#[derive(Debug, Clone, Copy)]
pub struct TicTacToePolicy {
    pub difficulty: Difficulty,
}

impl TicTacToePolicy {
    /// Exhaustive minimax for O
    pub fn best(board: &Board) -> Option<usize> {
        let root = Node {
            board: *board,
            to_move: Side::Opponent,
        };
        best_move(&root, 9, Role::Maximizer).map(|(mv, _)| mv)
    }
}

impl Policy<Board, usize> for TicTacToePolicy {
    fn choose_move(&mut self, board: &Board, rng: &mut Pcg32) -> Option<usize> {
        match self.difficulty {
            Difficulty::Easy => RandomPolicy.choose_move(board, rng),
            Difficulty::Medium if rng.random_bool(0.5) => Self::best(board),
            Difficulty::Medium => RandomPolicy.choose_move(board, rng),
            Difficulty::Hard => Self::best(board),
        }
    }
}

pub struct TicTacToe {
    settings: TicTacToeSettings,
    board: Board,
    turn: Side,
    reply: Delay,
    outcome: Option<Verdict>,
}

impl TicTacToe {
    pub fn new(settings: TicTacToeSettings) -> Self {
        Self {
            settings,
            board: Board::default(),
            turn: Side::Player,
            reply: Delay::default(),
            outcome: None,
        }
    }

    /// Game positioned at `board` with `turn` to move
    pub fn from_board(settings: TicTacToeSettings, board: Board, turn: Side) -> Self {
        let mut game = Self::new(settings);
        game.board = board;
        game.turn = turn;
        if turn == Side::Opponent {
            game.reply.start(game.settings.reply_delay);
        }
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    fn finish(&mut self) -> Option<Verdict> {
        let verdict = self.board.verdict()?;
        self.outcome = Some(verdict);
        Some(verdict)
    }
}

impl Simulation for TicTacToe {
    type Intent = usize;

    fn name(&self) -> &'static str {
        "tictactoe"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Frame
    }

    fn world_size(&self) -> Vec2 {
        Vec2::splat(CELL * 3.0)
    }

    fn map_input(&self, event: &InputEvent) -> Option<usize> {
        match event {
            InputEvent::PointerDown(p) => {
                board_cell(*p, Vec2::ZERO, CELL, 3, 3).map(|(col, row)| row * 3 + col)
            }
            _ => None,
        }
    }

    fn step(&mut self, intent: Option<usize>, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        match self.turn {
            Side::Player => {
                let index = intent?;
                if !self.board.place(index, Side::Player) {
                    return None;
                }
                self.turn = Side::Opponent;
                self.reply.start(self.settings.reply_delay);
                self.finish()
            }
            Side::Opponent => {
                if !self.reply.tick(ctx.dt) {
                    return None;
                }
                let mut policy = TicTacToePolicy {
                    difficulty: self.settings.difficulty,
                };
                let index = policy.choose_move(&self.board, ctx.rng)?;
                log::debug!("tictactoe: O plays {}", index);
                self.board.place(index, Side::Opponent);
                self.turn = Side::Player;
                self.finish()
            }
        }
    }

    fn reset(&mut self, _rng: &mut Pcg32) {
        self.board = Board::default();
        self.turn = Side::Player;
        self.reply.cancel();
        self.outcome = None;
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(colors::BOARD);
        let size = CELL * 3.0;
        for i in 1..3 {
            let at = CELL * i as f32;
            surface.line(Vec2::new(at, 0.0), Vec2::new(at, size), 4.0, colors::GRID_LINE);
            surface.line(Vec2::new(0.0, at), Vec2::new(size, at), 4.0, colors::GRID_LINE);
        }

        let cells = &self.board.0;
        let winning = WIN_PATTERNS
            .iter()
            .find(|&&[a, b, c]| cells[a].is_some() && cells[a] == cells[b] && cells[b] == cells[c]);

        for (i, cell) in self.board.0.iter().enumerate() {
            let center = Vec2::new((i % 3) as f32 + 0.5, (i / 3) as f32 + 0.5) * CELL;
            let lit = winning.is_some_and(|p| p.contains(&i));
            match cell {
                Some(Side::Player) => {
                    let color = if lit { colors::HIGHLIGHT } else { colors::PLAYER };
                    let r = CELL * 0.3;
                    surface.line(center - Vec2::splat(r), center + Vec2::splat(r), 8.0, color);
                    surface.line(center + Vec2::new(-r, r), center + Vec2::new(r, -r), 8.0, color);
                }
                Some(Side::Opponent) => {
                    let color = if lit { colors::HIGHLIGHT } else { colors::OPPONENT };
                    surface.stroke_circle(center, CELL * 0.3, 8.0, color);
                }
                None => {}
            }
        }
    }

    fn message(&self) -> String {
        match (self.outcome, self.turn) {
            (Some(Verdict::Won(Side::Player)), _) => "You win!".to_string(),
            (Some(Verdict::Won(Side::Opponent)), _) => "AI wins!".to_string(),
            (Some(Verdict::Draw), _) => "It's a draw!".to_string(),
            (None, Side::Player) => "Your turn (X)".to_string(),
            (None, Side::Opponent) => "AI thinking...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::HeuristicPolicy;
    use crate::renderer::DrawList;
    use crate::sim::{GameSession, RngState, Status};
    use rand::SeedableRng;

    const X: Option<Side> = Some(Side::Player);
    const O: Option<Side> = Some(Side::Opponent);
    const E: Option<Side> = None;

    fn hard() -> TicTacToeSettings {
        TicTacToeSettings::default()
    }

    #[test]
    fn test_every_pattern_is_detected() {
        for pattern in WIN_PATTERNS {
            for side in [Side::Player, Side::Opponent] {
                let mut board = Board::default();
                for i in pattern {
                    board.place(i, side);
                }
                assert_eq!(board.winner(), Some(side), "{pattern:?}");
            }
        }
    }

    #[test]
    fn test_no_line_means_no_winner() {
        let board = Board([X, O, X, X, O, O, O, X, X]);
        assert_eq!(board.winner(), None);
        assert_eq!(board.verdict(), Some(Verdict::Draw));
        assert_eq!(Board([X, X, E, E, O, E, E, E, E]).winner(), None);
    }

    #[test]
    fn test_player_completes_top_row() {
        let board = Board([X, X, E, E, O, E, E, E, E]);
        let game = TicTacToe::from_board(hard(), board, Side::Player);
        let mut session = GameSession::resume(game, RngState::new(1), 1, Status::Running);

        session.submit(2);
        assert_eq!(session.step(1.0 / 60.0), Some(Verdict::Won(Side::Player)));
        assert_eq!(session.message(), "You win!");
        assert_eq!(session.scores().player, 1);
        assert_eq!(session.scores().opponent, 0);
    }

    #[test]
    fn test_occupied_cell_is_ignored() {
        let mut session = GameSession::new(TicTacToe::new(hard()), RngState::new(2), 1);
        session.submit(4);
        session.step(0.0);
        assert_eq!(session.game().board().get(4), X);

        // Opponent replies after the delay
        session.step(0.6);
        assert_eq!(session.game().board().legal_moves().len(), 7);
        let before = *session.game().board();

        let taken = (0..9).find(|&i| before.get(i) == O).unwrap();
        session.submit(taken);
        session.step(0.0);
        assert_eq!(*session.game().board(), before);
        assert_eq!(session.game().turn(), Side::Player);
    }

    #[test]
    fn test_opponent_waits_for_reply_delay() {
        let mut session = GameSession::new(TicTacToe::new(hard()), RngState::new(3), 1);
        session.submit(0);
        session.step(0.0);
        assert_eq!(session.message(), "AI thinking...");
        session.step(0.2);
        assert_eq!(session.game().board().legal_moves().len(), 8);
        session.step(0.4);
        assert_eq!(session.game().board().legal_moves().len(), 7);
        assert_eq!(session.message(), "Your turn (X)");
    }

    #[test]
    fn test_hard_blocks_and_wins() {
        // O must block the top row
        let board = Board([X, X, E, E, O, E, E, E, E]);
        assert_eq!(TicTacToePolicy::best(&board), Some(2));
        // O takes the diagonal win instead of blocking
        let board = Board([X, X, E, E, O, E, O, E, X]);
        assert_eq!(TicTacToePolicy::best(&board), Some(2));
        let board = Board([X, E, X, E, O, E, O, X, E]);
        assert_eq!(TicTacToePolicy::best(&board), Some(1));
    }

    /// Every X strategy against hard O; returns true if X can ever win
    fn x_can_win(board: Board) -> bool {
        if board.verdict().is_some() {
            return board.winner() == Some(Side::Player);
        }
        board.legal_moves().into_iter().any(|x| {
            let mut after_x = board;
            after_x.place(x, Side::Player);
            if after_x.verdict().is_some() {
                return after_x.winner() == Some(Side::Player);
            }
            let o = TicTacToePolicy::best(&after_x).expect("open board has a move");
            let mut after_o = after_x;
            after_o.place(o, Side::Opponent);
            x_can_win(after_o)
        })
    }

    #[test]
    fn test_hard_never_loses() {
        assert!(!x_can_win(Board::default()));
    }

    #[test]
    fn test_easy_plays_legal_moves() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut policy = TicTacToePolicy {
            difficulty: Difficulty::Easy,
        };
        let board = Board([X, O, X, E, O, E, E, X, E]);
        for _ in 0..20 {
            let mv = policy.choose_move(&board, &mut rng).unwrap();
            assert!(board.get(mv).is_none());
        }
        assert_eq!(policy.choose_move(&Board([X, O, X, X, O, O, O, X, X]), &mut rng), None);
    }

    #[test]
    fn test_heuristic_tier_also_blocks() {
        let board = Board([X, E, E, X, O, E, E, E, E]);
        let mut rng = Pcg32::seed_from_u64(1);
        let mv = HeuristicPolicy::new(Side::Opponent).choose_move(&board, &mut rng);
        assert_eq!(mv, Some(6));
    }

    #[test]
    fn test_new_game_restores_initial_state() {
        let mut session = GameSession::new(TicTacToe::new(hard()), RngState::new(4), 1);
        for cell in [0, 1, 3, 5, 7] {
            session.submit(cell);
            session.step(0.0);
            session.step(1.0);
        }
        session.new_game();
        assert_eq!(*session.game().board(), Board::default());
        assert_eq!(session.status(), Status::Idle);
        assert_eq!(session.message(), "Your turn (X)");
    }

    #[test]
    fn test_draw_marks_board() {
        let game = TicTacToe::from_board(hard(), Board([X, O, X, X, O, O, O, X, E]), Side::Player);
        let mut list = DrawList::new();
        game.draw(&mut list);
        assert!(!list.is_empty());
    }
}
