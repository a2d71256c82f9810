//! Best-times table.
//!
//! Keeps the five fastest wins, fastest first, and persists them as JSON.
//! The session only reports `(elapsed_seconds, moves)`; dating the record
//! and deciding whether it makes the table happens here.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::events::GameResult;

/// Entries kept.
pub const CAPACITY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highscore {
    pub date: DateTime<Local>,
    pub elapsed_seconds: u64,
    pub moves: u32,
}

impl Highscore {
    pub fn new(result: GameResult, date: DateTime<Local>) -> Self {
        Highscore {
            date,
            elapsed_seconds: result.elapsed_seconds,
            moves: result.moves,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighscoreTable {
    entries: Vec<Highscore>,
}

impl HighscoreTable {
    pub fn new() -> Self {
        HighscoreTable::default()
    }

    /// Fastest first.
    pub fn entries(&self) -> &[Highscore] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Would a win in `elapsed_seconds` make the table?
    pub fn qualifies(&self, elapsed_seconds: u64) -> bool {
        self.entries.len() < CAPACITY
            || self
                .entries
                .last()
                .is_some_and(|worst| elapsed_seconds < worst.elapsed_seconds)
    }

    /// Adds `score` if it qualifies. Returns its 0-based rank if kept.
    pub fn insert(&mut self, score: Highscore) -> Option<usize> {
        if !self.qualifies(score.elapsed_seconds) {
            debug!(elapsed = score.elapsed_seconds, "Score did not make the table");
            return None;
        }
        // Equal times keep their arrival order.
        let rank = self
            .entries
            .partition_point(|e| e.elapsed_seconds <= score.elapsed_seconds);
        self.entries.insert(rank, score);
        self.entries.truncate(CAPACITY);
        Some(rank)
    }

    /// Records a finished game stamped with the current local time.
    pub fn record(&mut self, result: GameResult) -> Option<usize> {
        self.insert(Highscore::new(result, Local::now()))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reads a table from `path`. A missing file is an empty table.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HighscoreError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No highscore file yet");
            return Ok(HighscoreTable::new());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| HighscoreError::new(format!("Failed to read highscores: {}", e)))?;
        let mut table: HighscoreTable = serde_json::from_str(&content)
            .map_err(|e| HighscoreError::new(format!("Failed to parse highscores: {}", e)))?;
        // Hand-edited files may be unsorted or overfull.
        table.entries.sort_by_key(|e| e.elapsed_seconds);
        table.entries.truncate(CAPACITY);
        info!(entries = table.len(), "Highscores loaded");
        Ok(table)
    }

    /// Writes the table to `path`, creating parent directories.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HighscoreError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| HighscoreError::new(format!("Failed to create {}: {}", dir.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| HighscoreError::new(format!("Failed to serialize highscores: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| HighscoreError::new(format!("Failed to write highscores: {}", e)))?;
        debug!(entries = self.len(), "Highscores saved");
        Ok(())
    }
}

/// A table bound to the file it lives in.
#[derive(Debug, Clone)]
pub struct HighscoreStore {
    path: PathBuf,
    table: HighscoreTable,
}

impl HighscoreStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HighscoreError> {
        let path = path.into();
        let table = HighscoreTable::load(&path)?;
        Ok(HighscoreStore { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &HighscoreTable {
        &self.table
    }

    /// Records and saves. Returns the rank if the game made the table.
    pub fn record(&mut self, result: GameResult) -> Result<Option<usize>, HighscoreError> {
        let rank = self.table.record(result);
        if rank.is_some() {
            self.table.save(&self.path)?;
        }
        Ok(rank)
    }

    /// Deletes every entry and saves the empty table.
    pub fn clear(&mut self) -> Result<(), HighscoreError> {
        self.table.clear();
        self.table.save(&self.path)
    }
}

/// Highscore persistence error.
#[derive(Debug, Clone, Display, Error)]
#[display("Highscore error: {} at {}:{}", message, file, line)]
pub struct HighscoreError {
    pub message: String,
    pub line: u32,
    pub file: &'static str,
}

impl HighscoreError {
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
