//! Game session: the operation surface a front-end drives.
//!
//! `GameSession` owns the board, the undo history, the auto-complete solver
//! and the clock, and is the only thing that mutates them. Every request is
//! validated against `crate::rules` first; a refused request returns
//! `false` (or `None`) and leaves everything untouched. Accepted requests
//! record a history step, bump the action counter, notify the observer and
//! then check whether the game is over or can be finished automatically.
//!
//! While the solver is draining the board, player input is disabled. The
//! front-end paces the solver by calling `tick` once per
//! `auto_complete_delay_ms`; tests call `run_auto_complete` instead.

use tracing::{debug, error, info, instrument, warn};

use crate::autocomplete::{Advance, AutoComplete};
use crate::board::{Board, DealLayout, Transfer};
use crate::card::{CARDS_PER_DECK, Card, Face};
use crate::config::{ConfigError, DealMode, GameConfig};
use crate::deal::{ordered_deck, random_seed, shuffled_deck};
use crate::deal_number::DealNumber;
use crate::events::{GameEvent, GameObserver, GameResult};
use crate::history::{History, Step};
use crate::pile::PileId;
use crate::rules::{self, DropCandidate};
use crate::timer::GameTimer;

/// Where the session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Player input accepted.
    Playing,
    /// Solver draining the board; input refused.
    AutoCompleting,
    /// All foundations complete. Nothing more happens until a new deal.
    Won,
}

pub struct GameSession<O: GameObserver> {
    config: GameConfig,
    board: Board,
    history: History,
    solver: AutoComplete,
    timer: GameTimer,
    action_count: u32,
    phase: Phase,
    /// Human-readable name of the current deal ("seed 42", "game ms617").
    deal_label: String,
    /// Seed from the config still waiting to be dealt. Later shuffled
    /// deals draw fresh seeds.
    pending_seed: Option<u64>,
    observer: O,
}

impl<O: GameObserver> GameSession<O> {
    /// Validates `config` and deals the first game.
    #[instrument(skip(observer))]
    pub fn new(config: GameConfig, observer: O) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut session = GameSession {
            board: Board::new(config.tableau_piles),
            pending_seed: config.deal.pinned_seed(),
            config,
            history: History::new(),
            solver: AutoComplete::new(),
            timer: GameTimer::new(),
            action_count: 0,
            phase: Phase::Playing,
            deal_label: String::new(),
            observer,
        };
        session.deal()?;
        Ok(session)
    }

    /// Starts a session from a prepared position instead of a deal.
    ///
    /// The position need not hold all 52 cards, but auto-complete and win
    /// detection only engage once it does.
    pub fn with_board(mut config: GameConfig, board: Board, observer: O) -> Self {
        config.tableau_piles = board.tableau_count();
        let mut session = GameSession {
            config,
            board,
            history: History::new(),
            solver: AutoComplete::new(),
            timer: GameTimer::new(),
            action_count: 0,
            phase: Phase::Playing,
            deal_label: "custom".to_string(),
            pending_seed: None,
            observer,
        };
        session.check_terminal();
        session
    }

    // ----- Accessors -----

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn action_count(&self) -> u32 {
        self.action_count
    }

    pub fn timer(&self) -> &GameTimer {
        &self.timer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn deal_label(&self) -> &str {
        &self.deal_label
    }

    pub fn is_auto_completing(&self) -> bool {
        self.phase == Phase::AutoCompleting
    }

    pub fn is_won(&self) -> bool {
        self.phase == Phase::Won
    }

    /// False while the solver runs and after the game is won.
    pub fn input_enabled(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    // ----- Deal / reset -----

    /// Clears the table and deals a fresh game according to the config.
    #[instrument(skip(self))]
    pub fn deal(&mut self) -> Result<(), ConfigError> {
        let (deck, layout, label) = self.next_deck()?;
        self.board = Board::new(self.config.tableau_piles);
        self.board.deal(&deck, layout);
        self.history.clear();
        self.solver.cancel();
        self.timer.reset();
        self.action_count = 0;
        self.phase = Phase::Playing;
        self.deal_label = label;
        info!(deal = %self.deal_label, piles = self.config.tableau_piles, "Dealt new game");

        debug_assert!(self.board.holds_full_deck());
        self.emit(GameEvent::Dealt);
        self.emit(GameEvent::ActionCountChanged(0));
        self.check_terminal();
        Ok(())
    }

    /// Abandons the current game, cancelling any running auto-complete,
    /// and deals again.
    #[instrument(skip(self))]
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        if self.solver.is_running() {
            info!("Reset cancels auto-complete");
        }
        self.deal()
    }

    /// Replaces the config used by later deals. The current game continues.
    /// A pinned seed in `config` applies to the next deal.
    pub fn set_config(&mut self, config: GameConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.pending_seed = config.deal.pinned_seed();
        self.config = config;
        Ok(())
    }

    fn next_deck(&mut self) -> Result<([Card; CARDS_PER_DECK as usize], DealLayout, String), ConfigError> {
        match &self.config.deal {
            DealMode::Shuffled { .. } => {
                let seed = self.pending_seed.take().unwrap_or_else(random_seed);
                Ok((shuffled_deck(seed), DealLayout::Klondike, format!("seed {seed}")))
            }
            DealMode::Numbered { number } => {
                let number: DealNumber = number
                    .parse()
                    .map_err(|e: crate::deal_number::DealNumberError| ConfigError::new(e.message))?;
                let deck = number
                    .deck()
                    .map_err(|e| ConfigError::new(format!("Cannot deal game {}: {}", number, e.message)))?;
                Ok((deck, DealLayout::Klondike, format!("game {number}")))
            }
            DealMode::Ordered => Ok((ordered_deck(), DealLayout::SuitColumns, "ordered".to_string())),
        }
    }

    // ----- Player requests -----

    /// Moves `card` (with its run) onto `to` if the rules allow it.
    #[instrument(level = "debug", skip(self))]
    pub fn request_move(&mut self, card: Card, to: PileId) -> bool {
        if !self.input_enabled() {
            debug!("Input disabled");
            return false;
        }
        if !self.board.is_movable(card) || !rules::accepts(&self.board, to, card) {
            debug!("Move rejected");
            return false;
        }
        let Some(t) = self.board.transfer(card, to) else {
            error!(%card, "Accepted move could not be applied");
            return false;
        };
        self.history.push(Step::single(&t));
        debug!(%card, from = %t.from, %to, revealed = ?t.revealed, "Moved");
        self.emit_transfer(&t);
        self.count_action();
        self.check_terminal();
        true
    }

    /// Turns the stock's top card onto the waste.
    #[instrument(level = "debug", skip(self))]
    pub fn request_draw_from_stock(&mut self) -> bool {
        if !self.input_enabled() {
            warn!("Stock draw refused while input is disabled");
            return false;
        }
        let Some(t) = self.board.draw() else {
            return false;
        };
        self.history.push(Step::single(&t));
        debug!(card = %t.card(), "Drew from stock");
        self.emit_transfer(&t);
        self.count_action();
        self.check_terminal();
        true
    }

    /// Puts the whole waste back on the empty stock as one undoable step.
    #[instrument(level = "debug", skip(self))]
    pub fn request_recycle_stock(&mut self) -> bool {
        if !self.input_enabled() {
            warn!("Stock recycle refused while input is disabled");
            return false;
        }
        let Some(t) = self.board.recycle() else {
            return false;
        };
        self.history.push(Step::bulk(&t));
        debug!(cards = t.cards.len(), "Recycled waste");
        self.emit_transfer(&t);
        self.count_action();
        self.check_terminal();
        true
    }

    /// The stock was clicked: draw if it has cards, otherwise recycle.
    pub fn activate_stock(&mut self) -> bool {
        if self.board.stock().is_empty() {
            self.request_recycle_stock()
        } else {
            self.request_draw_from_stock()
        }
    }

    /// Reverts the most recent step. Refused while auto-completing, after
    /// a win, or with nothing to undo.
    #[instrument(level = "debug", skip(self))]
    pub fn request_undo(&mut self) -> bool {
        if !self.input_enabled() {
            debug!("Undo refused");
            return false;
        }
        let Some(reverted) = self.history.undo(&mut self.board) else {
            return false;
        };
        debug!(card = %reverted.transfer.card(), to = %reverted.transfer.to, "Undid step");
        if let Some((card, face)) = reverted.flipped {
            self.emit(GameEvent::CardFlipped { card, face });
        }
        self.emit_transfer(&reverted.transfer);
        self.count_action();
        true
    }

    /// A drag ended over `candidates`. Moves the card to the nearest pile
    /// that accepts it and returns that pile; `None` means the card snaps
    /// back and nothing changed.
    #[instrument(level = "debug", skip(self, candidates))]
    pub fn on_card_dropped(&mut self, card: Card, candidates: &[DropCandidate]) -> Option<PileId> {
        if !self.input_enabled() || !self.board.is_movable(card) {
            return None;
        }
        let target = rules::resolve_drop(&self.board, card, candidates)?;
        self.request_move(card, target).then_some(target)
    }

    // ----- Terminal states and auto-complete -----

    /// Detects a win, or a board the solver can finish. Runs after every
    /// accepted mutation and after each deal.
    pub fn check_terminal(&mut self) {
        match self.phase {
            Phase::Won => {}
            _ if self.board.all_foundations_complete() => self.win(),
            Phase::Playing if self.board.auto_complete_ready() && self.board.holds_full_deck() => {
                info!("Auto-complete started");
                self.phase = Phase::AutoCompleting;
                self.solver.start();
                self.emit(GameEvent::AutoCompleteStarted);
            }
            _ => {}
        }
    }

    /// Plays one auto-complete move. Returns `false` when there was nothing
    /// to play (solver idle, finished, or stuck).
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::AutoCompleting {
            return false;
        }
        match self.solver.advance(&mut self.board) {
            Advance::Moved(t) => {
                debug!(card = %t.card(), to = %t.to, "Auto-complete move");
                self.emit_transfer(&t);
                self.emit(GameEvent::AutoCompleteMove {
                    card: t.card(),
                    from: t.from,
                    to: t.to,
                });
                self.count_action();
                if self.board.all_foundations_complete() {
                    self.finish_auto_complete();
                }
                true
            }
            Advance::Finished => {
                self.finish_auto_complete();
                false
            }
            Advance::Idle | Advance::Stuck => {
                error!("Auto-complete stopped early, returning control to the player");
                self.solver.cancel();
                self.phase = Phase::Playing;
                false
            }
        }
    }

    /// Drains the solver with no pacing. Returns the number of moves made.
    pub fn run_auto_complete(&mut self) -> usize {
        let mut moves = 0;
        while self.tick() {
            moves += 1;
        }
        moves
    }

    fn finish_auto_complete(&mut self) {
        self.solver.cancel();
        self.phase = Phase::Playing;
        info!(moves = self.action_count, "Auto-complete finished");
        self.emit(GameEvent::AutoCompleteFinished);
        self.check_terminal();
    }

    fn win(&mut self) {
        self.timer.stop();
        self.phase = Phase::Won;
        self.history.clear();
        let result = GameResult {
            elapsed_seconds: self.timer.elapsed_secs(),
            moves: self.action_count,
        };
        info!(elapsed = result.elapsed_seconds, moves = result.moves, "Game won");
        self.emit(GameEvent::GameWon(result));
    }

    // ----- Bookkeeping -----

    /// The first action of a game starts the clock.
    fn count_action(&mut self) {
        if self.action_count == 0 {
            self.timer.start();
        }
        self.action_count += 1;
        self.emit(GameEvent::ActionCountChanged(self.action_count));
    }

    fn emit_transfer(&mut self, t: &Transfer) {
        for &card in &t.cards {
            self.emit(GameEvent::CardMoved {
                card,
                from: t.from,
                to: t.to,
            });
        }
        if let Some(card) = t.revealed {
            self.emit(GameEvent::CardFlipped { card, face: Face::Up });
        }
        for &(card, face) in &t.turned {
            self.emit(GameEvent::CardFlipped { card, face });
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.observer.notify(&event);
    }
}
