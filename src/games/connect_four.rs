//! Connect Four
//!
//! Six rows by seven columns, row 0 at the top. Pieces fall to the lowest
//! empty row of a column. The opponent plays the heuristic tier.

use glam::Vec2;
use rand_pcg::Pcg32;

use super::Delay;
use crate::ai::{HeuristicPolicy, LegalMoves, PlacementGame, Policy};
use crate::input::{InputEvent, Key};
use crate::renderer::{Surface, colors};
use crate::settings::ConnectFourSettings;
use crate::sim::{Schedule, Side, Simulation, StepContext, Verdict};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const WIN_LENGTH: usize = 4;
/// Pixel size of one slot
pub const CELL: f32 = 60.0;

/// (row, col) steps of the four line directions
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [[Option<Side>; COLS]; ROWS],
}

impl Board {
    pub fn get(&self, row: usize, col: usize) -> Option<Side> {
        self.cells.get(row)?.get(col).copied().flatten()
    }

    /// Columns that still have room, left to right
    pub fn valid_moves(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| self.cells[0][col].is_none()).collect()
    }

    /// Drop a piece; returns the row it lands in, or `None` for a full or
    /// out-of-range column
    pub fn drop_piece(&mut self, col: usize, side: Side) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        let row = (0..ROWS).rev().find(|&row| self.cells[row][col].is_none())?;
        self.cells[row][col] = Some(side);
        Some(row)
    }

    pub fn is_full(&self) -> bool {
        self.valid_moves().is_empty()
    }

    /// True when `side` owns four in a row in any direction
    pub fn has_line(&self, side: Side) -> bool {
        (0..ROWS).any(|row| {
            (0..COLS).any(|col| {
                DIRECTIONS
                    .iter()
                    .any(|&dir| self.run_from(row, col, dir) == Some(side))
            })
        })
    }

    /// Owner of a full-length run starting at (row, col) in `dir`
    fn run_from(&self, row: usize, col: usize, (dr, dc): (isize, isize)) -> Option<Side> {
        let first = self.get(row, col)?;
        let same = (1..WIN_LENGTH as isize).all(|k| {
            let r = row as isize + dr * k;
            let c = col as isize + dc * k;
            r >= 0 && c >= 0 && self.get(r as usize, c as usize) == Some(first)
        });
        same.then_some(first)
    }

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
        self.valid_moves()
    }
}

impl PlacementGame for Board {
    fn with_move(&self, col: &usize, side: Side) -> Option<Self> {
        let mut next = *self;
        next.drop_piece(*col, side)?;
        Some(next)
    }

    fn winner(&self) -> Option<Side> {
        [Side::Player, Side::Opponent]
            .into_iter()
            .find(|&side| self.has_line(side))
    }
}

pub struct ConnectFour {
    settings: ConnectFourSettings,
    board: Board,
    turn: Side,
    /// Column under the pointer or keyboard cursor
    cursor: usize,
    reply: Delay,
    outcome: Option<Verdict>,
}

/// Player input: move the cursor or drop into a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Hover(usize),
    Drop(usize),
}

impl ConnectFour {
    pub fn new(settings: ConnectFourSettings) -> Self {
        Self {
            settings,
            board: Board::default(),
            turn: Side::Player,
            cursor: COLS / 2,
            reply: Delay::default(),
            outcome: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    fn column_at(x: f32) -> Option<usize> {
        let col = (x / CELL).floor();
        (col >= 0.0 && (col as usize) < COLS).then_some(col as usize)
    }

    fn finish(&mut self) -> Option<Verdict> {
        let verdict = self.board.verdict()?;
        self.outcome = Some(verdict);
        Some(verdict)
    }
}

impl Simulation for ConnectFour {
    type Intent = Intent;

    fn name(&self) -> &'static str {
        "connect_four"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Frame
    }

    fn world_size(&self) -> Vec2 {
        Vec2::new(COLS as f32 * CELL, ROWS as f32 * CELL)
    }

    fn map_input(&self, event: &InputEvent) -> Option<Intent> {
        match event {
            InputEvent::PointerMove(p) => Self::column_at(p.x).map(Intent::Hover),
            InputEvent::PointerDown(p) => Self::column_at(p.x).map(Intent::Drop),
            InputEvent::KeyDown(Key::Left) => Some(Intent::Hover(self.cursor.saturating_sub(1))),
            InputEvent::KeyDown(Key::Right) => Some(Intent::Hover((self.cursor + 1).min(COLS - 1))),
            InputEvent::KeyDown(Key::Space | Key::Enter | Key::Down) => Some(Intent::Drop(self.cursor)),
            _ => None,
        }
    }

    fn step(&mut self, intent: Option<Intent>, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        match self.turn {
            Side::Player => match intent? {
                Intent::Hover(col) => {
                    self.cursor = col.min(COLS - 1);
                    None
                }
                Intent::Drop(col) => {
                    self.board.drop_piece(col, Side::Player)?;
                    self.cursor = col;
                    self.turn = Side::Opponent;
                    self.reply.start(self.settings.reply_delay);
                    self.finish()
                }
            },
            Side::Opponent => {
                if let Some(Intent::Hover(col)) = intent {
                    self.cursor = col.min(COLS - 1);
                }
                if !self.reply.tick(ctx.dt) {
                    return None;
                }
                let col = HeuristicPolicy::new(Side::Opponent).choose_move(&self.board, ctx.rng)?;
                log::debug!("connect four: opponent drops into column {}", col);
                self.board.drop_piece(col, Side::Opponent);
                self.turn = Side::Player;
                self.finish()
            }
        }
    }

    fn reset(&mut self, _rng: &mut Pcg32) {
        self.board = Board::default();
        self.turn = Side::Player;
        self.cursor = COLS / 2;
        self.reply.cancel();
        self.outcome = None;
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(colors::BOARD);
        if self.turn == Side::Player && self.outcome.is_none() {
            surface.fill_rect(
                Vec2::new(self.cursor as f32 * CELL, 0.0),
                Vec2::new(CELL, ROWS as f32 * CELL),
                [1.0, 1.0, 1.0, 0.06],
            );
        }
        for row in 0..ROWS {
            for col in 0..COLS {
                let center = Vec2::new(col as f32 + 0.5, row as f32 + 0.5) * CELL;
                let color = match self.board.get(row, col) {
                    Some(Side::Player) => colors::PLAYER,
                    Some(Side::Opponent) => colors::OPPONENT,
                    None => colors::BACKGROUND,
                };
                surface.fill_circle(center, CELL * 0.4, color);
            }
        }
    }

    fn message(&self) -> String {
        match (self.outcome, self.turn) {
            (Some(Verdict::Won(Side::Player)), _) => "You win!".to_string(),
            (Some(Verdict::Won(Side::Opponent)), _) => "AI wins!".to_string(),
            (Some(Verdict::Draw), _) => "It's a draw!".to_string(),
            (None, Side::Player) => "Your turn".to_string(),
            (None, Side::Opponent) => "AI thinking...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameSession, RngState, Status};
    use proptest::prelude::*;

    fn board_with(cells: &[(usize, usize)], side: Side) -> Board {
        let mut board = Board::default();
        for &(row, col) in cells {
            board.cells[row][col] = Some(side);
        }
        board
    }

    /// Full board without any four in a row
    fn drawn_board() -> Board {
        let mut board = Board::default();
        for row in 0..ROWS {
            for col in 0..COLS {
                let flip = (row % 2) ^ ((col / 2) % 2);
                board.cells[row][col] = Some(if flip == 0 { Side::Player } else { Side::Opponent });
            }
        }
        board
    }

    #[test]
    fn test_full_column_is_not_a_valid_move() {
        let mut board = Board::default();
        for i in 0..ROWS {
            let side = if i % 2 == 0 { Side::Player } else { Side::Opponent };
            assert!(board.drop_piece(3, side).is_some());
        }
        assert!(!board.valid_moves().contains(&3));
        assert_eq!(board.valid_moves().len(), COLS - 1);
        let before = board;
        assert_eq!(board.drop_piece(3, Side::Player), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_pieces_stack_from_the_bottom() {
        let mut board = Board::default();
        assert_eq!(board.drop_piece(0, Side::Player), Some(ROWS - 1));
        assert_eq!(board.drop_piece(0, Side::Opponent), Some(ROWS - 2));
        assert_eq!(board.drop_piece(COLS, Side::Player), None);
    }

    #[test]
    fn test_each_direction_detected() {
        let horizontal = board_with(&[(5, 0), (5, 1), (5, 2), (5, 3)], Side::Player);
        let vertical = board_with(&[(2, 6), (3, 6), (4, 6), (5, 6)], Side::Player);
        let down_right = board_with(&[(0, 0), (1, 1), (2, 2), (3, 3)], Side::Opponent);
        let up_right = board_with(&[(5, 3), (4, 4), (3, 5), (2, 6)], Side::Opponent);
        assert_eq!(horizontal.winner(), Some(Side::Player));
        assert_eq!(vertical.winner(), Some(Side::Player));
        assert_eq!(down_right.winner(), Some(Side::Opponent));
        assert_eq!(up_right.winner(), Some(Side::Opponent));
    }

    #[test]
    fn test_three_is_not_enough() {
        let board = board_with(&[(5, 0), (5, 1), (5, 2)], Side::Player);
        assert_eq!(board.winner(), None);
        let mut broken = board_with(&[(5, 0), (5, 1), (5, 2), (5, 4)], Side::Player);
        broken.cells[5][3] = Some(Side::Opponent);
        assert_eq!(broken.winner(), None);
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let board = drawn_board();
        assert_eq!(board.winner(), None);
        assert!(board.is_full());
        assert_eq!(board.verdict(), Some(Verdict::Draw));
    }

    #[test]
    fn test_opponent_blocks_vertical_threat() {
        let mut game = ConnectFour::new(ConnectFourSettings::default());
        for _ in 0..3 {
            game.board.drop_piece(2, Side::Player);
        }
        game.board.drop_piece(5, Side::Opponent);
        game.board.drop_piece(6, Side::Opponent);
        game.turn = Side::Opponent;
        game.reply.start(0.8);

        let mut session = GameSession::resume(game, RngState::new(1), 1, Status::Running);
        session.step(0.5);
        assert_eq!(session.game().turn(), Side::Opponent);
        session.step(0.5);
        assert_eq!(session.game().board().get(2, 2), Some(Side::Opponent));
        assert_eq!(session.message(), "Your turn");
    }

    #[test]
    fn test_player_win_scores_once() {
        let mut game = ConnectFour::new(ConnectFourSettings::default());
        for col in 0..3 {
            game.board.drop_piece(col, Side::Player);
            game.board.drop_piece(col, Side::Opponent);
        }
        let mut session = GameSession::resume(game, RngState::new(1), 1, Status::Running);
        session.submit(Intent::Drop(3));
        assert_eq!(session.step(0.0), Some(Verdict::Won(Side::Player)));
        assert_eq!(session.message(), "You win!");
        session.submit(Intent::Drop(4));
        session.step(1.0);
        assert_eq!(session.scores().player, 1);
        assert_eq!(session.game().board().get(5, 4), None);
    }

    #[test]
    fn test_reset_clears_board() {
        let mut session = GameSession::new(ConnectFour::new(ConnectFourSettings::default()), RngState::new(5), 1);
        session.submit(Intent::Drop(0));
        session.step(0.0);
        session.step(1.0);
        session.new_game();
        assert_eq!(*session.game().board(), Board::default());
        assert_eq!(session.game().turn(), Side::Player);
    }

    proptest! {
        #[test]
        fn prop_any_four_run_is_detected(row in 0usize..ROWS, col in 0usize..COLS, dir in 0usize..4) {
            let (dr, dc) = DIRECTIONS[dir];
            let cells: Vec<(isize, isize)> = (0..WIN_LENGTH as isize)
                .map(|k| (row as isize + dr * k, col as isize + dc * k))
                .collect();
            let fits = cells
                .iter()
                .all(|&(r, c)| r >= 0 && c >= 0 && (r as usize) < ROWS && (c as usize) < COLS);
            prop_assume!(fits);

            let cells: Vec<(usize, usize)> = cells.iter().map(|&(r, c)| (r as usize, c as usize)).collect();
            prop_assert_eq!(board_with(&cells, Side::Opponent).winner(), Some(Side::Opponent));
            prop_assert_eq!(board_with(&cells[..3], Side::Opponent).winner(), None);
        }
    }
}
