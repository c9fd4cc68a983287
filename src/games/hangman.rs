//! Hangman
//!
//! The opponent picks a word from the chosen category; the player guesses
//! letters. Six misses lose.

use glam::Vec2;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use crate::ai::Policy;
use crate::input::{InputEvent, Key};
use crate::renderer::{Surface, colors};
use crate::settings::{HangmanSettings, WordCategory};
use crate::sim::{Schedule, Side, Simulation, StepContext, Verdict};

pub const MAX_WRONG_GUESSES: u32 = 6;
pub const WIDTH: f32 = 480.0;
pub const HEIGHT: f32 = 360.0;

pub fn words(category: WordCategory) -> &'static [&'static str] {
    match category {
        WordCategory::Tech => &[
            "algorithm",
            "blockchain",
            "cybersecurity",
            "javascript",
            "quantum",
            "neuralnetwork",
        ],
        WordCategory::Animals => &["chameleon", "rhinoceros", "platypus", "mongoose", "komodo", "axolotl"],
        WordCategory::Science => &[
            "photosynthesis",
            "electromagnetic",
            "paleontology",
            "astrophysics",
            "biochemistry",
            "nanotechnology",
        ],
    }
}

/// Uniform pick from a category's word list
#[derive(Debug, Clone, Copy)]
pub struct WordPicker;

impl Policy<WordCategory, &'static str> for WordPicker {
    fn choose_move(&mut self, category: &WordCategory, rng: &mut Pcg32) -> Option<&'static str> {
        words(*category).choose(rng).copied()
    }
}

pub struct Hangman {
    settings: HangmanSettings,
    word: &'static str,
    guessed: Vec<char>,
    wrong: u32,
}

impl Hangman {
    pub fn new(settings: HangmanSettings) -> Self {
        let word = words(settings.category).first().copied().unwrap_or_default();
        Self {
            settings,
            word,
            guessed: Vec::new(),
            wrong: 0,
        }
    }

    pub fn word(&self) -> &'static str {
        self.word
    }

    pub fn wrong(&self) -> u32 {
        self.wrong
    }

    pub fn guessed(&self) -> &[char] {
        &self.guessed
    }

    pub fn is_solved(&self) -> bool {
        self.word.chars().all(|c| self.guessed.contains(&c))
    }

    /// The word with unguessed letters blanked, e.g. `_ u _ n t u _`
    pub fn masked(&self) -> String {
        self.word
            .chars()
            .map(|c| if self.guessed.contains(&c) { c } else { '_' })
            .map(String::from)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Simulation for Hangman {
    type Intent = char;

    fn name(&self) -> &'static str {
        "hangman"
    }

    fn schedule(&self) -> Schedule {
        Schedule::Frame
    }

    fn world_size(&self) -> Vec2 {
        Vec2::new(WIDTH, HEIGHT)
    }

    fn map_input(&self, event: &InputEvent) -> Option<char> {
        match event {
            InputEvent::KeyDown(Key::Letter(c)) => Some(*c),
            _ => None,
        }
    }

    fn step(&mut self, intent: Option<char>, _ctx: &mut StepContext<'_>) -> Option<Verdict> {
        let letter = intent?.to_ascii_lowercase();
        if !letter.is_ascii_lowercase() || self.guessed.contains(&letter) {
            return None;
        }
        self.guessed.push(letter);

        if !self.word.contains(letter) {
            self.wrong += 1;
            log::debug!("hangman: miss '{}' ({}/{})", letter, self.wrong, MAX_WRONG_GUESSES);
            return (self.wrong >= MAX_WRONG_GUESSES).then_some(Verdict::Won(Side::Opponent));
        }
        self.is_solved().then_some(Verdict::Won(Side::Player))
    }

    fn reset(&mut self, rng: &mut Pcg32) {
        if let Some(word) = WordPicker.choose_move(&self.settings.category, rng) {
            self.word = word;
        }
        self.guessed.clear();
        self.wrong = 0;
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(colors::BACKGROUND);

        // Gallows
        let base = Vec2::new(60.0, 240.0);
        let c = colors::WALL;
        surface.line(base, base + Vec2::new(120.0, 0.0), 4.0, c);
        surface.line(base + Vec2::new(30.0, 0.0), Vec2::new(90.0, 20.0), 4.0, c);
        surface.line(Vec2::new(90.0, 20.0), Vec2::new(150.0, 20.0), 4.0, c);
        surface.line(Vec2::new(150.0, 20.0), Vec2::new(150.0, 50.0), 4.0, c);

        // Figure, one part per miss
        let f = colors::OPPONENT;
        let parts = self.wrong;
        if parts >= 1 {
            surface.stroke_circle(Vec2::new(150.0, 66.0), 16.0, 3.0, f);
        }
        if parts >= 2 {
            surface.line(Vec2::new(150.0, 82.0), Vec2::new(150.0, 150.0), 3.0, f);
        }
        if parts >= 3 {
            surface.line(Vec2::new(150.0, 100.0), Vec2::new(125.0, 125.0), 3.0, f);
        }
        if parts >= 4 {
            surface.line(Vec2::new(150.0, 100.0), Vec2::new(175.0, 125.0), 3.0, f);
        }
        if parts >= 5 {
            surface.line(Vec2::new(150.0, 150.0), Vec2::new(130.0, 190.0), 3.0, f);
        }
        if parts >= 6 {
            surface.line(Vec2::new(150.0, 150.0), Vec2::new(170.0, 190.0), 3.0, f);
        }

        // Letter slots; guessed letters are filled in
        let count = self.word.len().max(1) as f32;
        let slot = ((WIDTH - 40.0) / count).min(30.0);
        for (i, ch) in self.word.chars().enumerate() {
            let x = 20.0 + i as f32 * slot;
            surface.line(Vec2::new(x, 320.0), Vec2::new(x + slot - 6.0, 320.0), 2.0, colors::NEUTRAL);
            if self.guessed.contains(&ch) {
                surface.fill_rect(Vec2::new(x + 2.0, 296.0), Vec2::new(slot - 10.0, 20.0), colors::PLAYER);
            }
        }
    }

    fn message(&self) -> String {
        if self.is_solved() {
            "Congratulations! You won!".to_string()
        } else if self.wrong >= MAX_WRONG_GUESSES {
            format!("Game Over! The word was: {}", self.word)
        } else {
            format!(
                "Category: {} - {}  ({} of {} misses)",
                self.settings.category.as_str(),
                self.masked(),
                self.wrong,
                MAX_WRONG_GUESSES
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameSession, RngState, Status};

    fn with_word(word: &'static str) -> GameSession<Hangman> {
        let mut game = Hangman::new(HangmanSettings::default());
        game.word = word;
        GameSession::resume(game, RngState::new(1), 1, Status::Running)
    }

    fn guess(s: &mut GameSession<Hangman>, letter: char) -> Option<Verdict> {
        s.submit(letter);
        s.step(0.016)
    }

    #[test]
    fn test_word_comes_from_category() {
        for seed in 0..20 {
            let settings = HangmanSettings {
                category: WordCategory::Animals,
            };
            let s = GameSession::new(Hangman::new(settings), RngState::new(seed), 1);
            assert!(words(WordCategory::Animals).contains(&s.game().word()));
        }
    }

    #[test]
    fn test_solving_wins() {
        let mut s = with_word("quantum");
        for letter in ['q', 'u', 'a', 'n', 't'] {
            assert_eq!(guess(&mut s, letter), None);
        }
        assert_eq!(s.game().masked(), "q u a n t u _");
        assert_eq!(guess(&mut s, 'm'), Some(Verdict::Won(Side::Player)));
        assert_eq!(s.message(), "Congratulations! You won!");
        assert_eq!(s.game().wrong(), 0);
    }

    #[test]
    fn test_six_misses_lose() {
        let mut s = with_word("komodo");
        for letter in ['a', 'b', 'c', 'e', 'f'] {
            assert_eq!(guess(&mut s, letter), None);
        }
        assert_eq!(guess(&mut s, 'g'), Some(Verdict::Won(Side::Opponent)));
        assert_eq!(s.message(), "Game Over! The word was: komodo");
        assert_eq!(s.scores().opponent, 1);
    }

    #[test]
    fn test_repeat_guess_costs_nothing() {
        let mut s = with_word("komodo");
        guess(&mut s, 'z');
        guess(&mut s, 'z');
        guess(&mut s, 'Z');
        assert_eq!(s.game().wrong(), 1);
        assert_eq!(s.game().guessed(), &['z']);
    }

    #[test]
    fn test_only_letters_are_guesses() {
        let game = Hangman::new(HangmanSettings::default());
        assert_eq!(game.map_input(&InputEvent::KeyDown(Key::Letter('k'))), Some('k'));
        assert_eq!(game.map_input(&InputEvent::KeyDown(Key::Space)), None);
        let mut s = with_word("komodo");
        assert_eq!(guess(&mut s, '7'), None);
        assert!(s.game().guessed().is_empty());
    }

    #[test]
    fn test_reset_clears_guesses() {
        let mut s = with_word("komodo");
        guess(&mut s, 'k');
        guess(&mut s, 'x');
        s.new_game();
        assert!(s.game().guessed().is_empty());
        assert_eq!(s.game().wrong(), 0);
        assert!(words(WordCategory::Tech).contains(&s.game().word()));
    }
}
