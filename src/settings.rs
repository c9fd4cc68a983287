//! Game settings
//!
//! One explicit configuration object built at startup and passed by value into
//! every game constructor. Every field has a default, so a settings file only
//! needs the keys it wants to change.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Environment variable naming an optional JSON settings file
pub const SETTINGS_ENV: &str = "MINIHUB_SETTINGS";
/// Environment variable overriding the RNG seed
pub const SEED_ENV: &str = "MINIHUB_SEED";
/// Smallest maze or snake board side a settings file may ask for
pub const MIN_BOARD: usize = 4;

/// Tic-Tac-Toe opponent strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    /// Uniformly random moves
    Easy,
    /// Half search, half random
    Medium,
    /// Exhaustive search; never loses
    #[default]
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Colour the human plays in chess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlayerColor {
    #[default]
    White,
    Black,
}

/// Hangman word list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WordCategory {
    #[default]
    Tech,
    Animals,
    Science,
}

impl WordCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WordCategory::Tech => "tech",
            WordCategory::Animals => "animals",
            WordCategory::Science => "science",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tech" => Some(WordCategory::Tech),
            "animals" => Some(WordCategory::Animals),
            "science" => Some(WordCategory::Science),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TicTacToeSettings {
    pub difficulty: Difficulty,
    /// Seconds before the opponent answers
    pub reply_delay: f32,
}

impl Default for TicTacToeSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Hard,
            reply_delay: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectFourSettings {
    pub reply_delay: f32,
}

impl Default for ConnectFourSettings {
    fn default() -> Self {
        Self { reply_delay: 0.8 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChessSettings {
    pub player_color: PlayerColor,
    /// Base search depth in plies; grows with the move count up to three
    pub ai_level: u32,
    /// Starting time per side in seconds
    pub clock_secs: f32,
    /// Seconds added after every move
    pub increment_secs: f32,
    /// Pause before the opponent starts searching
    pub reply_delay: f32,
}

impl Default for ChessSettings {
    fn default() -> Self {
        Self {
            player_color: PlayerColor::White,
            ai_level: 1,
            clock_secs: 300.0,
            increment_secs: 2.0,
            reply_delay: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeSettings {
    pub grid_size: i32,
    /// Seconds per move
    pub interval: f32,
}

impl Default for SnakeSettings {
    fn default() -> Self {
        Self {
            grid_size: 20,
            interval: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PongSettings {
    /// Fraction of full paddle speed the opponent uses
    pub difficulty: f32,
    pub points_to_win: u32,
}

impl Default for PongSettings {
    fn default() -> Self {
        Self {
            difficulty: 0.7,
            points_to_win: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TankSettings {
    pub hits_to_win: u32,
    /// Seconds between opponent shots
    pub fire_interval: f32,
}

impl Default for TankSettings {
    fn default() -> Self {
        Self {
            hits_to_win: 3,
            fire_interval: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeSettings {
    pub width: usize,
    pub height: usize,
    /// Seconds per opponent step
    pub ai_interval: f32,
}

impl Default for MazeSettings {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            ai_interval: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterSettings {
    /// Enemies per second
    pub spawn_rate: f32,
}

impl Default for ShooterSettings {
    fn default() -> Self {
        Self { spawn_rate: 1.2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySettings {
    /// Targets per second
    pub spawn_rate: f32,
    pub round_secs: f32,
    /// Hits needed before the time runs out
    pub goal: u32,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            spawn_rate: 1.2,
            round_secs: 30.0,
            goal: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    /// Seconds a mismatched pair stays face up
    pub reveal_secs: f32,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self { reveal_secs: 1.0 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HangmanSettings {
    pub category: WordCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionSettings {
    pub points_to_win: u32,
}

impl Default for ReactionSettings {
    fn default() -> Self {
        Self { points_to_win: 5 }
    }
}

/// Startup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed RNG seed; `None` draws one from the platform
    pub seed: Option<u64>,

    // === Opponent search ===
    /// Run deep searches on a background thread when the platform allows it
    pub search_worker: bool,
    /// Simulation seconds before a search is abandoned
    pub worker_timeout: f32,

    // === Per-game tuning ===
    pub tictactoe: TicTacToeSettings,
    pub connect_four: ConnectFourSettings,
    pub chess: ChessSettings,
    pub snake: SnakeSettings,
    pub pong: PongSettings,
    pub tank: TankSettings,
    pub maze: MazeSettings,
    pub shooter: ShooterSettings,
    pub gallery: GallerySettings,
    pub memory: MemorySettings,
    pub hangman: HangmanSettings,
    pub reaction: ReactionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            search_worker: true,
            worker_timeout: 5.0,
            tictactoe: TicTacToeSettings::default(),
            connect_four: ConnectFourSettings::default(),
            chess: ChessSettings::default(),
            snake: SnakeSettings::default(),
            pong: PongSettings::default(),
            tank: TankSettings::default(),
            maze: MazeSettings::default(),
            shooter: ShooterSettings::default(),
            gallery: GallerySettings::default(),
            memory: MemorySettings::default(),
            hangman: HangmanSettings::default(),
            reaction: ReactionSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.clamped())
    }

    /// Raise board sizes below [`MIN_BOARD`]
    fn clamped(mut self) -> Self {
        let min = MIN_BOARD;
        if self.maze.width < min || self.maze.height < min {
            log::warn!(
                "maze {}x{} too small, using at least {}",
                self.maze.width,
                self.maze.height,
                min
            );
            self.maze.width = self.maze.width.max(min);
            self.maze.height = self.maze.height.max(min);
        }
        if self.snake.grid_size < min as i32 {
            log::warn!("snake grid {} too small, using {}", self.snake.grid_size, min);
            self.snake.grid_size = min as i32;
        }
        self
    }

    /// Configured seed, or `fallback` when none is set
    pub fn seed_or(&self, fallback: u64) -> u64 {
        self.seed.unwrap_or(fallback)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Apply a seed override given as text
    pub fn apply_seed(&mut self, value: &str) -> Result<(), SettingsError> {
        let seed = value.trim().parse::<u64>().map_err(|_| SettingsError::Env {
            var: SEED_ENV,
            value: value.to_string(),
        })?;
        self.seed = Some(seed);
        Ok(())
    }

    /// Build settings from `MINIHUB_SETTINGS` and `MINIHUB_SEED` (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, SettingsError> {
        let mut settings = match std::env::var(SETTINGS_ENV) {
            Ok(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|source| SettingsError::Io { path: path.clone(), source })?;
                log::info!("Loaded settings from {}", path);
                Self::from_json(&json)?
            }
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        };

        if let Ok(seed) = std::env::var(SEED_ENV) {
            settings.apply_seed(&seed)?;
        }
        Ok(settings)
    }
}
