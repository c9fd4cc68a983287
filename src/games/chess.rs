//! Blitz chess against a searching opponent
//!
//! Rules and move generation come from the `chess` crate. The opponent runs
//! alpha-beta over [`ChessPosition`] on a [`SearchWorker`] thread when one is
//! available, otherwise inline on the stepping thread. A random legal move
//! stands in when the worker fails or returns something illegal.
//!
//! Both sides have a clock; the side to move loses time every step and gains
//! the increment after each move.

use std::str::FromStr;

use ::chess::{
    ALL_PIECES, ALL_SQUARES, BitBoard, Board, BoardStatus, ChessMove, Color, File, MoveGen, Piece,
    Rank, Square,
};
use glam::Vec2;
use rand_pcg::Pcg32;

use super::{Delay, board_cell};
use crate::ai::{
    LegalMoves, Policy, RandomPolicy, Role, SearchPoll, SearchWorker, Searchable, best_move,
};
use crate::input::InputEvent;
use crate::renderer::{Surface, colors};
use crate::settings::{ChessSettings, PlayerColor};
use crate::sim::{Schedule, Side, Simulation, StepContext, Verdict};

/// Pixel size of one square
pub const SQUARE: f32 = 60.0;
/// Score of a checkmate, white-positive
pub const MATE_SCORE: i32 = 1000;
/// Deepest search regardless of level
pub const MAX_DEPTH: u32 = 3;
/// Half-moves without a capture or pawn move before the game is drawn
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// Material value per piece, in `ALL_PIECES` order
const PIECE_VALUES: [i32; 6] = [1, 3, 3, 5, 9, 0];

/// A position as seen by the search
#[derive(Clone, Copy)]
pub struct ChessPosition {
    pub board: Board,
}

impl ChessPosition {
    pub fn new(board: Board) -> Self {
        Self { board }
    }

    /// White material minus black material
    pub fn material(&self) -> i32 {
        let side = |color: Color| -> i32 {
            ALL_PIECES
                .iter()
                .zip(PIECE_VALUES)
                .map(|(&piece, value)| {
                    let count = (*self.board.pieces(piece) & *self.board.color_combined(color)).popcnt();
                    count as i32 * value
                })
                .sum()
        };
        side(Color::White) - side(Color::Black)
    }
}

impl LegalMoves for ChessPosition {
    type Move = ChessMove;

    fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }
}

impl Searchable for ChessPosition {
    type Move = ChessMove;

    fn moves(&self) -> Vec<ChessMove> {
        self.legal_moves()
    }

    fn child(&self, mv: &ChessMove) -> Self {
        Self::new(self.board.make_move_new(*mv))
    }

    fn terminal_score(&self, _ply: u32) -> Option<i32> {
        match self.board.status() {
            BoardStatus::Checkmate => Some(match self.board.side_to_move() {
                Color::White => -MATE_SCORE,
                Color::Black => MATE_SCORE,
            }),
            BoardStatus::Stalemate => Some(0),
            BoardStatus::Ongoing => insufficient_material(&self.board).then_some(0),
        }
    }

    fn evaluate(&self) -> i32 {
        self.material()
    }
}

/// Neither side can ever mate: bare kings, or one minor piece against a bare king
pub fn insufficient_material(board: &Board) -> bool {
    let kings = *board.pieces(Piece::King);
    let others: BitBoard = *board.combined() & !kings;
    match others.popcnt() {
        0 => true,
        1 => {
            let minors = *board.pieces(Piece::Knight) | *board.pieces(Piece::Bishop);
            (others & minors).popcnt() == 1
        }
        _ => false,
    }
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Checkmate { winner: Color },
    /// Clock ran out for `loser`
    Flag { loser: Color },
    Stalemate,
    Repetition,
    FiftyMoves,
    InsufficientMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Click on a square: select a piece or complete a move
    Select(Square),
    Move { from: Square, to: Square },
}

pub struct ChessGame {
    settings: ChessSettings,
    board: Board,
    /// Hashes since the last irreversible move, current position last
    history: Vec<u64>,
    halfmove_clock: u32,
    move_count: u32,
    /// Seconds left, indexed by `Color::to_index`
    clocks: [f32; 2],
    selected: Option<Square>,
    last_move: Option<ChessMove>,
    reply: Delay,
    thinking: bool,
    worker: Option<SearchWorker<ChessPosition>>,
    ending: Option<Ending>,
}

impl ChessGame {
    /// Opponent searches inline on the stepping thread (no worker)
    pub fn new(settings: ChessSettings) -> Self {
        let clocks = [settings.clock_secs; 2];
        let board = Board::default();
        Self {
            settings,
            board,
            history: vec![board.get_hash()],
            halfmove_clock: 0,
            move_count: 0,
            clocks,
            selected: None,
            last_move: None,
            reply: Delay::default(),
            thinking: false,
            worker: None,
            ending: None,
        }
    }

    /// Opponent searches on a background thread when one can be started
    pub fn with_worker(settings: ChessSettings, timeout: f32) -> Self {
        let mut game = Self::new(settings);
        match SearchWorker::spawn("chess-search", timeout) {
            Ok(worker) => game.worker = Some(worker),
            Err(e) => log::warn!("chess: {}, searching inline", e),
        }
        game
    }

    /// Game set up from a FEN string
    pub fn from_fen(settings: ChessSettings, fen: &str) -> Result<Self, ::chess::Error> {
        let mut game = Self::new(settings);
        game.board = Board::from_str(fen)?;
        game.history = vec![game.board.get_hash()];
        Ok(game)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    pub fn clock(&self, color: Color) -> f32 {
        self.clocks[color.to_index()]
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn ending(&self) -> Option<Ending> {
        self.ending
    }

    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    pub fn player_color(&self) -> Color {
        match self.settings.player_color {
            PlayerColor::White => Color::White,
            PlayerColor::Black => Color::Black,
        }
    }

    fn side_of(&self, color: Color) -> Side {
        if color == self.player_color() {
            Side::Player
        } else {
            Side::Opponent
        }
    }

    /// Search depth grows with the game, capped at three plies
    pub fn search_depth(&self) -> u32 {
        (self.settings.ai_level + self.move_count / 10).clamp(1, MAX_DEPTH)
    }

    fn verdict(&self, ending: Ending) -> Verdict {
        match ending {
            Ending::Checkmate { winner } => Verdict::Won(self.side_of(winner)),
            Ending::Flag { loser } => Verdict::Won(self.side_of(!loser)),
            _ => Verdict::Draw,
        }
    }

    /// Move from `from` to `to`, promoting pawns to a queen
    fn move_between(&self, from: Square, to: Square) -> ChessMove {
        let last_rank = match self.board.side_to_move() {
            Color::White => Rank::Eighth,
            Color::Black => Rank::First,
        };
        let promotion = (self.board.piece_on(from) == Some(Piece::Pawn) && to.get_rank() == last_rank)
            .then_some(Piece::Queen);
        ChessMove::new(from, to, promotion)
    }

    /// Player click: returns a move once a selection and a legal target meet
    fn click(&mut self, square: Square) -> Option<ChessMove> {
        if let Some(from) = self.selected {
            let mv = self.move_between(from, square);
            if self.board.legal(mv) {
                return Some(mv);
            }
        }
        self.selected = (self.board.color_on(square) == Some(self.player_color())).then_some(square);
        None
    }

    fn repetitions(&self) -> usize {
        let current = self.board.get_hash();
        self.history.iter().filter(|&&h| h == current).count()
    }

    /// Play a legal move and settle the bookkeeping
    fn play(&mut self, mv: ChessMove) -> Option<Verdict> {
        let mover = self.board.side_to_move();
        let irreversible =
            self.board.piece_on(mv.get_source()) == Some(Piece::Pawn) || self.board.piece_on(mv.get_dest()).is_some();

        self.board = self.board.make_move_new(mv);
        self.move_count += 1;
        if irreversible {
            self.halfmove_clock = 0;
            self.history.clear();
        } else {
            self.halfmove_clock += 1;
        }
        self.history.push(self.board.get_hash());
        self.clocks[mover.to_index()] += self.settings.increment_secs;
        self.selected = None;
        self.last_move = Some(mv);
        self.thinking = false;
        self.reply.cancel();
        log::debug!("chess: {:?} plays {}", mover, mv);

        let ending = match self.board.status() {
            BoardStatus::Checkmate => Some(Ending::Checkmate { winner: mover }),
            BoardStatus::Stalemate => Some(Ending::Stalemate),
            BoardStatus::Ongoing if insufficient_material(&self.board) => Some(Ending::InsufficientMaterial),
            BoardStatus::Ongoing if self.repetitions() >= 3 => Some(Ending::Repetition),
            BoardStatus::Ongoing if self.halfmove_clock >= FIFTY_MOVE_PLIES => Some(Ending::FiftyMoves),
            BoardStatus::Ongoing => None,
        }?;
        self.ending = Some(ending);
        Some(self.verdict(ending))
    }

    fn random_reply(&mut self, rng: &mut Pcg32) -> Option<Verdict> {
        let mv = RandomPolicy.choose_move(&ChessPosition::new(self.board), rng)?;
        self.play(mv)
    }

    /// Opponent's half of a step
    fn opponent_step(&mut self, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        if !self.thinking {
            if !self.reply.is_active() {
                self.reply.start(self.settings.reply_delay);
            }
            if !self.reply.tick(ctx.dt) {
                return None;
            }

            let root = ChessPosition::new(self.board);
            let depth = self.search_depth();
            let role = match self.board.side_to_move() {
                Color::White => Role::Maximizer,
                Color::Black => Role::Minimizer,
            };
            let Some(worker) = self.worker.as_mut() else {
                return match best_move(&root, depth, role) {
                    Some((mv, _)) => self.play(mv),
                    None => self.random_reply(ctx.rng),
                };
            };
            return match worker.submit(ctx.token, root, depth, role) {
                Ok(_) => {
                    self.thinking = true;
                    None
                }
                Err(e) => {
                    log::warn!("chess: search not started ({}), playing a random move", e);
                    self.random_reply(ctx.rng)
                }
            };
        }

        let poll = match self.worker.as_mut() {
            Some(worker) => worker.poll(ctx.token, ctx.dt),
            None => SearchPoll::Idle,
        };
        match poll {
            SearchPoll::Pending => None,
            SearchPoll::Ready(mv) if self.board.legal(mv) => self.play(mv),
            SearchPoll::Ready(mv) => {
                log::warn!("chess: search returned illegal move {}, playing a random move", mv);
                self.random_reply(ctx.rng)
            }
            SearchPoll::Failed(e) => {
                log::warn!("chess: search failed ({}), playing a random move", e);
                self.random_reply(ctx.rng)
            }
            SearchPoll::Idle => self.random_reply(ctx.rng),
        }
    }

    /// Board square under a view cell; the player's colour sits at the bottom
    fn square_at(&self, col: usize, row: usize) -> Square {
        let (file, rank) = match self.player_color() {
            Color::White => (col, 7 - row),
            Color::Black => (7 - col, row),
        };
        Square::make_square(Rank::from_index(rank), File::from_index(file))
    }

    fn corner_of(&self, square: Square) -> Vec2 {
        let (file, rank) = (square.get_file().to_index(), square.get_rank().to_index());
        let (col, row) = match self.player_color() {
            Color::White => (file, 7 - rank),
            Color::Black => (7 - file, rank),
        };
        Vec2::new(col as f32, row as f32) * SQUARE
    }
}

impl Simulation for ChessGame {
    type Intent = Intent;

    fn name(&self) -> &'static str {
        "chess"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Frame
    }

    fn world_size(&self) -> Vec2 {
        Vec2::splat(SQUARE * 8.0)
    }

    fn autostart(&self) -> bool {
        true
    }

    fn map_input(&self, event: &InputEvent) -> Option<Intent> {
        match event {
            InputEvent::PointerDown(p) => {
                board_cell(*p, Vec2::ZERO, SQUARE, 8, 8).map(|(col, row)| Intent::Select(self.square_at(col, row)))
            }
            _ => None,
        }
    }

    fn step(&mut self, intent: Option<Intent>, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        let to_move = self.board.side_to_move();
        let clock = &mut self.clocks[to_move.to_index()];
        *clock -= ctx.dt;
        if *clock <= 0.0 {
            *clock = 0.0;
            log::info!("chess: {:?} flagged", to_move);
            let ending = Ending::Flag { loser: to_move };
            self.ending = Some(ending);
            return Some(self.verdict(ending));
        }

        if to_move != self.player_color() {
            return self.opponent_step(ctx);
        }

        let mv = match intent? {
            Intent::Select(square) => self.click(square)?,
            Intent::Move { from, to } => {
                let mv = self.move_between(from, to);
                if !self.board.legal(mv) {
                    return None;
                }
                mv
            }
        };
        self.play(mv)
    }

    fn reset(&mut self, _rng: &mut Pcg32) {
        if let Some(worker) = self.worker.as_mut() {
            worker.cancel();
        }
        let worker = self.worker.take();
        *self = Self::new(self.settings.clone());
        self.worker = worker;
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(colors::BACKGROUND);
        let size = Vec2::splat(SQUARE);

        for square in ALL_SQUARES {
            let light = (square.get_file().to_index() + square.get_rank().to_index()) % 2 == 1;
            let color = if light {
                colors::LIGHT_SQUARE
            } else {
                colors::DARK_SQUARE
            };
            surface.fill_rect(self.corner_of(square), size, color);
        }

        if let Some(mv) = self.last_move {
            for square in [mv.get_source(), mv.get_dest()] {
                surface.fill_rect(self.corner_of(square), size, colors::DIM);
            }
        }

        if let Some(from) = self.selected {
            surface.fill_rect(self.corner_of(from), size, colors::HIGHLIGHT);
            for mv in MoveGen::new_legal(&self.board).filter(|mv| mv.get_source() == from) {
                let centre = self.corner_of(mv.get_dest()) + size / 2.0;
                surface.fill_circle(centre, 6.0, colors::HIGHLIGHT);
            }
        }

        for square in ALL_SQUARES {
            let (Some(piece), Some(color)) = (self.board.piece_on(square), self.board.color_on(square)) else {
                continue;
            };
            let centre = self.corner_of(square) + size / 2.0;
            let (fill, edge) = match color {
                Color::White => (colors::WHITE_PIECE, colors::BLACK_PIECE),
                Color::Black => (colors::BLACK_PIECE, colors::WHITE_PIECE),
            };
            let radius = match piece {
                Piece::Pawn => 10.0,
                Piece::Knight | Piece::Bishop => 15.0,
                Piece::Rook => 18.0,
                Piece::Queen | Piece::King => 22.0,
            };
            surface.fill_circle(centre, radius, fill);
            surface.stroke_circle(centre, radius, 2.0, edge);
            match piece {
                Piece::Knight => surface.fill_rect(centre - 4.0, Vec2::splat(8.0), edge),
                Piece::Bishop => surface.fill_circle(centre, 4.0, edge),
                Piece::King => surface.stroke_circle(centre, 10.0, 3.0, edge),
                Piece::Queen => surface.fill_circle(centre, 8.0, edge),
                _ => {}
            }
        }
    }

    fn message(&self) -> String {
        let clock = |color: Color| {
            let secs = self.clock(color).ceil() as u32;
            format!("{}:{:02}", secs / 60, secs % 60)
        };
        let clocks = format!("White {} | Black {}", clock(Color::White), clock(Color::Black));

        let status = match self.ending {
            Some(Ending::Checkmate { winner }) if self.side_of(winner) == Side::Player => {
                "Checkmate! You win!".to_string()
            }
            Some(Ending::Checkmate { .. }) => "Checkmate! AI wins!".to_string(),
            Some(Ending::Flag { loser }) if self.side_of(loser) == Side::Player => {
                "Time's up! AI wins!".to_string()
            }
            Some(Ending::Flag { .. }) => "AI ran out of time! You win!".to_string(),
            Some(Ending::Stalemate) => "Stalemate".to_string(),
            Some(Ending::Repetition) => "Draw by repetition".to_string(),
            Some(Ending::FiftyMoves) => "Draw by the fifty-move rule".to_string(),
            Some(Ending::InsufficientMaterial) => "Draw by insufficient material".to_string(),
            None if self.board.side_to_move() == self.player_color() => {
                let check = if self.board.checkers().popcnt() > 0 {
                    " - check!"
                } else {
                    ""
                };
                format!("Your move{}", check)
            }
            None => "AI thinking...".to_string(),
        };
        format!("{}  ({})", status, clocks)
    }
}
