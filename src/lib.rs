//! Klondike solitaire engine: card movement rules, an exact undo history and
//! an auto-complete solver, driven through `game::GameSession`.

pub mod autocomplete;
pub mod board;
pub mod card;
pub mod cli;
pub mod config;
pub mod deal;
pub mod deal_number;
pub mod display;
pub mod events;
pub mod game;
pub mod highscore;
pub mod history;
pub mod pile;
pub mod rules;
pub mod timer;

pub use board::Board;
pub use card::{Card, Face, Rank, Suit};
pub use config::{DealMode, GameConfig};
pub use events::{GameEvent, GameObserver};
pub use game::GameSession;
pub use pile::PileId;
