//! Outward notifications.
//!
//! The session never reaches into a UI. It hands every observable change to
//! a `GameObserver` that the front-end supplies at construction time.

use crate::card::{Card, Face};
use crate::pile::PileId;

/// Final figures of a won game, as handed to the highscore keeper.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameResult {
    pub elapsed_seconds: u64,
    pub moves: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A fresh deal is on the table.
    Dealt,
    CardMoved { card: Card, from: PileId, to: PileId },
    CardFlipped { card: Card, face: Face },
    AutoCompleteStarted,
    AutoCompleteMove { card: Card, from: PileId, to: PileId },
    AutoCompleteFinished,
    GameWon(GameResult),
    ActionCountChanged(u32),
}

pub trait GameObserver {
    fn notify(&mut self, event: &GameEvent);
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl GameObserver for NoopObserver {
    fn notify(&mut self, _event: &GameEvent) {}
}

/// Records events in order; handy in tests.
impl GameObserver for Vec<GameEvent> {
    fn notify(&mut self, event: &GameEvent) {
        self.push(event.clone());
    }
}

impl<O: GameObserver + ?Sized> GameObserver for &mut O {
    fn notify(&mut self, event: &GameEvent) {
        (**self).notify(event);
    }
}
