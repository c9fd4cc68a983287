//! Memory Match
//!
//! Sixteen face-down cards, eight pairs. A match scores and keeps the turn;
//! a miss stays face up for `reveal_secs` and then passes the turn. The
//! opponent remembers every card it has seen turned over.

use glam::Vec2;
use rand::seq::{IndexedRandom, SliceRandom};
use rand_pcg::Pcg32;

use super::{Delay, board_cell};
use crate::ai::Policy;
use crate::input::InputEvent;
use crate::renderer::{Color, Surface, colors};
use crate::settings::MemorySettings;
use crate::sim::{Schedule, Side, Simulation, StepContext, Verdict};

pub const PAIRS: u8 = 8;
pub const COLS: usize = 4;
pub const ROWS: usize = 4;
/// Card slot including the gutter
pub const SLOT: f32 = 90.0;
pub const MARGIN: f32 = 10.0;
/// Pause before the opponent turns its cards
pub const THINK_SECS: f32 = 0.6;

const SYMBOL_COLORS: [Color; PAIRS as usize] = [
    [0.95, 0.35, 0.35, 1.0],
    [0.35, 0.8, 0.4, 1.0],
    [0.35, 0.55, 0.95, 1.0],
    [0.95, 0.8, 0.3, 1.0],
    [0.75, 0.4, 0.9, 1.0],
    [0.3, 0.85, 0.85, 1.0],
    [0.95, 0.55, 0.2, 1.0],
    [0.9, 0.9, 0.9, 1.0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub symbol: u8,
    pub face_up: bool,
    /// Who matched this card
    pub owner: Option<Side>,
}

impl Card {
    fn is_open(&self) -> bool {
        !self.face_up && self.owner.is_none()
    }
}

/// Opponent that never forgets a card it has seen
#[derive(Debug, Clone, Default)]
pub struct CardRecall {
    known: Vec<Option<u8>>,
}

impl CardRecall {
    pub fn observe(&mut self, index: usize, symbol: u8) {
        if self.known.len() <= index {
            self.known.resize(index + 1, None);
        }
        self.known[index] = Some(symbol);
    }

    pub fn known(&self, index: usize) -> Option<u8> {
        self.known.get(index).copied().flatten()
    }
}

impl Policy<MemoryMatch, (usize, usize)> for CardRecall {
    fn choose_move(&mut self, game: &MemoryMatch, rng: &mut Pcg32) -> Option<(usize, usize)> {
        let open: Vec<usize> = (0..game.cards.len()).filter(|&i| game.cards[i].is_open()).collect();
        if open.len() < 2 {
            return None;
        }

        for (n, &a) in open.iter().enumerate() {
            let Some(symbol) = self.known(a) else { continue };
            if let Some(&b) = open[n + 1..].iter().find(|&&b| self.known(b) == Some(symbol)) {
                return Some((a, b));
            }
        }

        let unseen: Vec<usize> = open.iter().copied().filter(|&i| self.known(i).is_none()).collect();
        let first = *unseen.choose(rng).or_else(|| open.choose(rng))?;
        // Turning the first card reveals it, so its partner may already be known
        let symbol = game.cards[first].symbol;
        if let Some(&b) = open.iter().find(|&&b| b != first && self.known(b) == Some(symbol)) {
            return Some((first, b));
        }

        let rest: Vec<usize> = unseen.into_iter().filter(|&i| i != first).collect();
        let second = match rest.choose(rng) {
            Some(&i) => i,
            None => *open
                .iter()
                .filter(|&&i| i != first)
                .collect::<Vec<_>>()
                .choose(rng)
                .copied()?,
        };
        Some((first, second))
    }
}

pub struct MemoryMatch {
    settings: MemorySettings,
    cards: Vec<Card>,
    turn: Side,
    /// Face-up cards of the current attempt
    flipped: Vec<usize>,
    reveal: Delay,
    think: Delay,
    recall: CardRecall,
    pairs: (u32, u32),
    note: &'static str,
}

impl MemoryMatch {
    pub fn new(settings: MemorySettings) -> Self {
        let cards = (0..PAIRS)
            .flat_map(|symbol| [symbol, symbol])
            .map(|symbol| Card {
                symbol,
                face_up: false,
                owner: None,
            })
            .collect();
        Self {
            settings,
            cards,
            turn: Side::Player,
            flipped: Vec::new(),
            reveal: Delay::default(),
            think: Delay::default(),
            recall: CardRecall::default(),
            pairs: (0, 0),
            note: "Your turn - Flip a card!",
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn pairs(&self) -> (u32, u32) {
        self.pairs
    }

    fn turn_over(&mut self, index: usize) {
        let card = &mut self.cards[index];
        card.face_up = true;
        self.recall.observe(index, card.symbol);
        self.flipped.push(index);
    }

    /// Resolve a two-card attempt
    fn settle(&mut self) -> Option<Verdict> {
        let (a, b) = (self.flipped[0], self.flipped[1]);
        if self.cards[a].symbol != self.cards[b].symbol {
            self.reveal.start(self.settings.reveal_secs);
            self.note = match self.turn {
                Side::Player => "No match - AI's turn",
                Side::Opponent => "AI missed - your turn next",
            };
            return None;
        }

        for i in [a, b] {
            self.cards[i].owner = Some(self.turn);
        }
        self.flipped.clear();
        match self.turn {
            Side::Player => {
                self.pairs.0 += 1;
                self.note = "Match! Keep going!";
            }
            Side::Opponent => {
                self.pairs.1 += 1;
                self.note = "AI found a match!";
            }
        }
        log::debug!("memory: {:?} matched symbol {}", self.turn, self.cards[a].symbol);

        if self.cards.iter().any(|c| c.owner.is_none()) {
            return None;
        }
        let (player, opponent) = self.pairs;
        Some(if player > opponent {
            Verdict::Won(Side::Player)
        } else if opponent > player {
            Verdict::Won(Side::Opponent)
        } else {
            Verdict::Draw
        })
    }
}

impl Simulation for MemoryMatch {
    type Intent = usize;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Frame
    }

    fn world_size(&self) -> Vec2 {
        Vec2::new(COLS as f32, ROWS as f32) * SLOT + MARGIN
    }

    fn map_input(&self, event: &InputEvent) -> Option<usize> {
        match event {
            InputEvent::PointerDown(p) => {
                board_cell(*p, Vec2::splat(MARGIN), SLOT, COLS, ROWS).map(|(col, row)| row * COLS + col)
            }
            _ => None,
        }
    }

    fn step(&mut self, intent: Option<usize>, ctx: &mut StepContext<'_>) -> Option<Verdict> {
        if self.reveal.tick(ctx.dt) {
            for &i in &self.flipped {
                self.cards[i].face_up = false;
            }
            self.flipped.clear();
            self.turn = self.turn.other();
            self.note = match self.turn {
                Side::Player => "Your turn - Flip a card!",
                Side::Opponent => "AI's turn",
            };
        }
        if self.reveal.is_active() {
            return None;
        }

        match self.turn {
            Side::Player => {
                let index = intent?;
                let legal = self.cards.get(index).is_some_and(Card::is_open) && self.flipped.len() < 2;
                if !legal {
                    return None;
                }
                self.turn_over(index);
                if self.flipped.len() == 2 {
                    return self.settle();
                }
                None
            }
            Side::Opponent => {
                if !self.think.is_active() {
                    self.think.start(THINK_SECS);
                }
                if !self.think.tick(ctx.dt) {
                    return None;
                }
                let mut recall = std::mem::take(&mut self.recall);
                let pick = recall.choose_move(self, ctx.rng);
                self.recall = recall;
                let (a, b) = pick?;
                self.turn_over(a);
                self.turn_over(b);
                self.settle()
            }
        }
    }

    fn reset(&mut self, rng: &mut Pcg32) {
        let mut fresh = Self::new(self.settings.clone());
        fresh.cards.shuffle(rng);
        *self = fresh;
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(colors::BACKGROUND);
        let size = Vec2::splat(SLOT - MARGIN);
        for (i, card) in self.cards.iter().enumerate() {
            let (col, row) = (i % COLS, i / COLS);
            let corner = Vec2::new(col as f32, row as f32) * SLOT + MARGIN;
            if !card.face_up && card.owner.is_none() {
                surface.fill_rect(corner, size, colors::CARD_BACK);
                continue;
            }
            let face = match card.owner {
                Some(Side::Player) => colors::PLAYER,
                Some(Side::Opponent) => colors::OPPONENT,
                None => colors::BOARD,
            };
            surface.fill_rect(corner, size, face);
            surface.fill_circle(corner + size / 2.0, size.x / 3.0, SYMBOL_COLORS[card.symbol as usize]);
        }
    }

    fn message(&self) -> String {
        let (player, opponent) = self.pairs;
        if self.cards.iter().all(|c| c.owner.is_some()) {
            return match player.cmp(&opponent) {
                std::cmp::Ordering::Greater => format!("You win! {} - {}", player, opponent),
                std::cmp::Ordering::Less => format!("AI wins! {} - {}", player, opponent),
                std::cmp::Ordering::Equal => "It's a draw!".to_string(),
            };
        }
        self.note.to_string()
    }

    fn round_score(&self) -> (u32, u32) {
        self.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameSession, RngState, Status};
    use rand::SeedableRng;

    /// Cards laid out 0,0,1,1,2,2,...
    fn sorted() -> MemoryMatch {
        MemoryMatch::new(MemorySettings::default())
    }

    fn running(game: MemoryMatch) -> GameSession<MemoryMatch> {
        GameSession::resume(game, RngState::new(31), 1, Status::Running)
    }

    fn click(s: &mut GameSession<MemoryMatch>, index: usize) -> Option<Verdict> {
        s.submit(index);
        s.step(0.016)
    }

    #[test]
    fn test_deal_has_eight_pairs() {
        let s = GameSession::new(sorted(), RngState::new(2), 1);
        let mut counts = [0; PAIRS as usize];
        for card in s.game().cards() {
            counts[card.symbol as usize] += 1;
            assert!(!card.face_up);
        }
        assert_eq!(counts, [2; PAIRS as usize]);
    }

    #[test]
    fn test_match_keeps_the_turn() {
        let mut s = running(sorted());
        click(&mut s, 0);
        click(&mut s, 1);
        assert_eq!(s.game().pairs(), (1, 0));
        assert_eq!(s.game().turn(), Side::Player);
        assert_eq!(s.game().cards()[0].owner, Some(Side::Player));
        assert_eq!(s.message(), "Match! Keep going!");
    }

    #[test]
    fn test_miss_passes_the_turn_after_reveal() {
        let mut s = running(sorted());
        click(&mut s, 0);
        click(&mut s, 2);
        assert!(s.game().cards()[0].face_up);
        // Further clicks are ignored while the miss is on show
        click(&mut s, 4);
        assert!(!s.game().cards()[4].face_up);

        for _ in 0..70 {
            s.step(0.016);
        }
        assert!(!s.game().cards()[0].face_up);
        assert!(!s.game().cards()[2].face_up);
        assert_eq!(s.game().turn(), Side::Opponent);
    }

    #[test]
    fn test_matched_card_cannot_be_picked() {
        let mut s = running(sorted());
        click(&mut s, 0);
        click(&mut s, 1);
        click(&mut s, 1);
        assert!(s.game().flipped.is_empty());
    }

    #[test]
    fn test_opponent_uses_what_it_saw() {
        let mut game = sorted();
        game.recall.observe(4, 2);
        game.recall.observe(5, 2);
        game.turn = Side::Opponent;
        let mut s = running(game);
        for _ in 0..45 {
            s.step(0.016);
        }
        assert_eq!(s.game().cards()[4].owner, Some(Side::Opponent));
        assert_eq!(s.game().cards()[5].owner, Some(Side::Opponent));
        assert_eq!(s.game().pairs().1, 1);
    }

    #[test]
    fn test_recall_prefers_known_pair() {
        let game = sorted();
        let mut recall = CardRecall::default();
        recall.observe(4, 2);
        recall.observe(9, 4);
        recall.observe(5, 2);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(recall.choose_move(&game, &mut rng), Some((4, 5)));
    }

    #[test]
    fn test_recall_completes_pair_after_first_flip() {
        let game = sorted();
        let mut recall = CardRecall::default();
        // Every card seen except 6; its partner 7 is known
        for i in (0..16).filter(|&i| i != 6) {
            recall.observe(i, game.cards[i].symbol);
        }
        // Drop every known pair except 7 so only the unseen card is left to try
        let mut game = game;
        for i in 0..16 {
            if i != 6 && i != 7 && i % 2 == 0 {
                game.cards[i].owner = Some(Side::Player);
                game.cards[i + 1].owner = Some(Side::Player);
            }
        }
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(recall.choose_move(&game, &mut rng), Some((6, 7)));
    }

    #[test]
    fn test_all_pairs_decides_round() {
        let mut game = sorted();
        for i in 2..16 {
            game.cards[i].owner = Some(if i < 10 { Side::Player } else { Side::Opponent });
        }
        game.pairs = (4, 3);
        let mut s = running(game);
        click(&mut s, 0);
        assert_eq!(click(&mut s, 1), Some(Verdict::Won(Side::Player)));
        assert_eq!(s.message(), "You win! 5 - 3");
    }

    #[test]
    fn test_even_split_is_a_draw() {
        let mut game = sorted();
        for i in 2..16 {
            game.cards[i].owner = Some(if i < 8 { Side::Player } else { Side::Opponent });
        }
        game.pairs = (3, 4);
        let mut s = running(game);
        click(&mut s, 0);
        assert_eq!(click(&mut s, 1), Some(Verdict::Draw));
    }

    #[test]
    fn test_pointer_maps_to_card() {
        let game = sorted();
        assert_eq!(game.map_input(&InputEvent::PointerDown(Vec2::new(20.0, 20.0))), Some(0));
        assert_eq!(game.map_input(&InputEvent::PointerDown(Vec2::new(200.0, 110.0))), Some(6));
        assert_eq!(game.map_input(&InputEvent::PointerDown(Vec2::new(5.0, 5.0))), None);
    }

    #[test]
    fn test_reset_forgets() {
        let mut s = running(sorted());
        click(&mut s, 0);
        click(&mut s, 1);
        s.new_game();
        assert_eq!(s.game().pairs(), (0, 0));
        assert!(s.game().cards().iter().all(|c| c.owner.is_none() && !c.face_up));
        assert_eq!(s.game().recall.known(0), None);
    }
}
