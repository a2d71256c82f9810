//! Auto-complete: plays out a board that can no longer go wrong.
//!
//! Once the stock and waste are empty and every tableau card is face-up, the
//! remaining cards can always be sent to the foundations by repeatedly
//! playing the lowest-ranked card any foundation is waiting for. The solver
//! is an explicit state machine so a front-end can pace it with a timer
//! (`advance` once per tick) while tests drain it synchronously.

use tracing::{debug, error};

use crate::board::{Board, Transfer};
use crate::card::{Card, Rank, Suit};
use crate::pile::PileId;

/// Suit handed to an empty foundation, first unclaimed first.
const UNCLAIMED_SUIT_ORDER: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolverState {
    #[default]
    Idle,
    Running {
        moves_made: usize,
    },
    Finished,
}

/// Result of one `advance` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    /// One card went to a foundation.
    Moved(Transfer),
    /// Every foundation is complete; the solver is now `Finished`.
    Finished,
    /// The solver was not running.
    Idle,
    /// The needed card could not be played. The board is corrupt.
    Stuck,
}

/// Card each incomplete foundation needs next, in foundation order.
///
/// A foundation without a suit is assigned the next suit no other
/// foundation has claimed, in Clubs, Diamonds, Hearts, Spades order. The
/// real assignment happens when its Ace lands, so this never mutates.
pub fn required_cards(board: &Board) -> Vec<(PileId, Card)> {
    let mut unclaimed = UNCLAIMED_SUIT_ORDER
        .into_iter()
        .filter(|s| board.foundations().iter().all(|f| f.suit() != Some(*s)));
    let mut out = Vec::new();
    for f in board.foundations() {
        if f.is_complete() {
            continue;
        }
        let needed = match (f.suit(), f.top_card()) {
            (Some(suit), Some(top)) => Rank::from_number(top.rank_number() + 1).map(|r| Card::new(suit, r)),
            _ => unclaimed.next().map(|suit| Card::new(suit, Rank::Ace)),
        };
        if let Some(card) = needed {
            out.push((f.id(), card));
        }
    }
    out
}

/// The next solver move: the lowest rank any foundation is waiting for,
/// earliest foundation on ties.
pub fn next_move(board: &Board) -> Option<(Card, PileId)> {
    let mut best: Option<(Card, PileId)> = None;
    for (pile, card) in required_cards(board) {
        if best.is_none_or(|(b, _)| card.rank() < b.rank()) {
            best = Some((card, pile));
        }
    }
    best
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AutoComplete {
    state: SolverState,
}

impl AutoComplete {
    pub fn new() -> Self {
        AutoComplete::default()
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SolverState::Running { .. })
    }

    pub fn start(&mut self) {
        self.state = SolverState::Running { moves_made: 0 };
    }

    /// Drops back to `Idle` without finishing, e.g. on reset.
    pub fn cancel(&mut self) {
        self.state = SolverState::Idle;
    }

    /// Plays one card. Moves bypass history and the rule checks the
    /// player's moves go through, except that the card must be exposed.
    pub fn advance(&mut self, board: &mut Board) -> Advance {
        let SolverState::Running { moves_made } = self.state else {
            return Advance::Idle;
        };
        let Some((card, to)) = next_move(board) else {
            debug!(moves_made, "auto-complete finished");
            self.state = SolverState::Finished;
            return Advance::Finished;
        };
        if !board.is_exposed(card) {
            error!(%card, %to, "auto-complete target card is covered");
            debug_assert!(false, "auto-complete needs {card} but it is covered");
            self.state = SolverState::Idle;
            return Advance::Stuck;
        }
        match board.transfer(card, to) {
            Some(t) => {
                self.state = SolverState::Running {
                    moves_made: moves_made + 1,
                };
                Advance::Moved(t)
            }
            None => {
                error!(%card, %to, "auto-complete could not locate card");
                self.state = SolverState::Idle;
                Advance::Stuck
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::DealLayout;
    use crate::card::Face;
    use crate::deal::ordered_deck;

    fn card(code: &str) -> Card {
        code.parse().unwrap()
    }

    #[test]
    fn empty_foundations_want_aces_in_fixed_suit_order() {
        let board = Board::new(4);
        let required = required_cards(&board);
        assert_eq!(
            required,
            vec![
                (PileId::Foundation(0), card("AC")),
                (PileId::Foundation(1), card("AD")),
                (PileId::Foundation(2), card("AH")),
                (PileId::Foundation(3), card("AS")),
            ]
        );
        assert_eq!(next_move(&board), Some((card("AC"), PileId::Foundation(0))));
    }

    #[test]
    fn lowest_rank_wins_across_foundations() {
        let mut board = Board::new(4);
        for code in ["AH", "2H", "3H"] {
            board.place(card(code), PileId::Foundation(0), Face::Up);
        }
        // Foundation 0 holds hearts, so empty piles get clubs, diamonds, spades.
        assert_eq!(next_move(&board), Some((card("AC"), PileId::Foundation(1))));

        board.place(card("AC"), PileId::Foundation(1), Face::Up);
        board.place(card("AD"), PileId::Foundation(2), Face::Up);
        board.place(card("AS"), PileId::Foundation(3), Face::Up);
        board.place(card("2S"), PileId::Foundation(3), Face::Up);
        // 2C and 2D tie on rank; the earlier foundation is chosen.
        assert_eq!(next_move(&board), Some((card("2C"), PileId::Foundation(1))));
    }

    #[test]
    fn complete_board_needs_nothing() {
        let mut board = Board::new(4);
        for (i, suit) in Suit::ALL.iter().enumerate() {
            for rank in Rank::ALL {
                board.place(Card::new(*suit, rank), PileId::Foundation(i as u8), Face::Up);
            }
        }
        assert!(required_cards(&board).is_empty());
        assert_eq!(next_move(&board), None);
    }

    #[test]
    fn idle_solver_does_nothing() {
        let mut board = Board::new(4);
        board.deal(&ordered_deck(), DealLayout::SuitColumns);
        let before = board.clone();
        let mut solver = AutoComplete::new();
        assert_eq!(solver.advance(&mut board), Advance::Idle);
        assert_eq!(board, before);
    }

    #[test]
    fn drains_suit_columns_to_completion() {
        let mut board = Board::new(4);
        board.deal(&ordered_deck(), DealLayout::SuitColumns);
        assert!(board.auto_complete_ready());

        let mut solver = AutoComplete::new();
        solver.start();
        let mut moves = 0;
        let mut last_rank = Rank::Ace;
        loop {
            match solver.advance(&mut board) {
                Advance::Moved(t) => {
                    assert!(t.to.is_foundation());
                    assert!(t.card().rank() >= last_rank, "ranks go up monotonically");
                    last_rank = t.card().rank();
                    moves += 1;
                }
                Advance::Finished => break,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(moves, 52);
        assert!(board.all_foundations_complete());
        assert!(board.holds_full_deck());
        assert_eq!(solver.state(), SolverState::Finished);
        for f in board.foundations() {
            let suit = f.suit().unwrap();
            for (i, c) in f.cards().iter().enumerate() {
                assert_eq!(*c, Card::new(suit, Rank::ALL[i]));
            }
        }
    }

    #[test]
    fn partial_foundations_take_the_rest() {
        let mut board = Board::new(4);
        for code in ["AS", "2S"] {
            board.place(card(code), PileId::Foundation(2), Face::Up);
        }
        // Everything else sits in alternating runs, King at the bottom.
        let mut rest: Vec<Card> = crate::card::standard_deck()
            .into_iter()
            .filter(|c| board.pile_of(*c).is_none())
            .collect();
        rest.sort_by_key(|c| std::cmp::Reverse(c.rank()));
        for c in rest {
            board.place(c, PileId::Tableau(c.suit() as u8), Face::Up);
        }

        let mut solver = AutoComplete::new();
        solver.start();
        let mut moves = 0;
        while let Advance::Moved(_) = solver.advance(&mut board) {
            moves += 1;
        }
        assert_eq!(moves, 52 - 2);
        assert!(board.all_foundations_complete());
        assert_eq!(board.foundations()[2].suit(), Some(Suit::Spades));
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut solver = AutoComplete::new();
        solver.start();
        assert!(solver.is_running());
        solver.cancel();
        assert_eq!(solver.state(), SolverState::Idle);
    }
}
