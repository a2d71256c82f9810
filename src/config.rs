//! Session configuration, loadable from TOML.

use std::path::{Path, PathBuf};

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::deal_number::DealNumber;
use crate::pile::MAX_TABLEAU_PILES;

/// Fewest columns a session may be configured with. Ordered deals need one
/// column per suit.
pub const MIN_TABLEAU_PILES: usize = 4;

/// Directory under the platform data dir holding our files.
const DATA_DIR_NAME: &str = "klondike-engine";
const HIGHSCORE_FILE: &str = "highscores.json";

/// How the next deal orders its deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DealMode {
    /// Random deck. A set seed fixes the first deal only; later deals in
    /// the same session draw fresh seeds.
    Shuffled {
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Deck chosen by a game number (see `deal_number`).
    Numbered { number: String },
    /// Debug deal: one complete suit per column, Ace on top.
    Ordered,
}

impl DealMode {
    /// The seed a shuffled deal was pinned to, if any.
    pub fn pinned_seed(&self) -> Option<u64> {
        match self {
            DealMode::Shuffled { seed } => *seed,
            _ => None,
        }
    }
}

impl Default for DealMode {
    fn default() -> Self {
        DealMode::Shuffled { seed: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of tableau columns (4..=7).
    pub tableau_piles: usize,
    /// Suggested pause between auto-complete moves.
    pub auto_complete_delay_ms: u64,
    /// Where highscores are kept. `None` uses the platform data dir.
    pub highscore_path: Option<PathBuf>,
    /// Kept last: it serializes as a TOML table.
    pub deal: DealMode,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            tableau_piles: MAX_TABLEAU_PILES,
            auto_complete_delay_ms: 200,
            highscore_path: None,
            deal: DealMode::default(),
        }
    }
}

impl GameConfig {
    /// Parses TOML and validates the result.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(tableau_piles = config.tableau_piles, deal = ?config.deal, "Config loaded");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::new(format!("Failed to serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TABLEAU_PILES..=MAX_TABLEAU_PILES).contains(&self.tableau_piles) {
            return Err(ConfigError::new(format!(
                "tableau_piles must be {}..={}, got {}",
                MIN_TABLEAU_PILES, MAX_TABLEAU_PILES, self.tableau_piles
            )));
        }
        if let DealMode::Numbered { number } = &self.deal {
            number
                .parse::<DealNumber>()
                .map_err(|e| ConfigError::new(format!("Bad game number: {}", e.message)))?;
        }
        Ok(())
    }

    /// Configured highscore file, else `<data dir>/klondike-engine/highscores.json`.
    pub fn highscore_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.highscore_path {
            Some(p) => Ok(p.clone()),
            None => default_highscore_path(),
        }
    }
}

/// Platform default highscore location. The directory is not created here.
pub fn default_highscore_path() -> Result<PathBuf, ConfigError> {
    let mut path = dirs::data_dir()
        .ok_or_else(|| ConfigError::new("Unable to determine data directory for your platform".to_string()))?;
    path.push(DATA_DIR_NAME);
    path.push(HIGHSCORE_FILE);
    Ok(path)
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
