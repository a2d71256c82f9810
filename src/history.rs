//! Undo log.
//!
//! Each accepted mutation pushes one `Step` holding just enough to put the
//! board back: which card moved and where it came from, and the tableau card
//! the move turned up (so the same undo hides it again). Recycling the waste
//! is one `Bulk` step, so a single undo reverses the whole recycle.

use tracing::error;

use crate::board::{Board, Transfer};
use crate::card::{Card, Face};
use crate::pile::PileId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// A card (plus its run) moved from `source`.
    Single {
        card: Card,
        source: PileId,
        /// Tableau card turned face-up because this move exposed it.
        flipped: Option<Card>,
    },
    /// Cards moved together from `source`, listed in the order they
    /// were added to their new pile.
    Bulk { cards: Vec<Card>, source: PileId },
}

/// What undoing one step did to the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reverted {
    pub transfer: Transfer,
    /// The card turned back over, with its restored face.
    pub flipped: Option<(Card, Face)>,
}

impl Step {
    /// Builds the step recording a single move.
    pub fn single(transfer: &Transfer) -> Self {
        Step::Single {
            card: transfer.card(),
            source: transfer.from,
            flipped: transfer.revealed,
        }
    }

    /// Builds the step recording a recycle (or any bulk move).
    pub fn bulk(transfer: &Transfer) -> Self {
        Step::Bulk {
            cards: transfer.cards.clone(),
            source: transfer.from,
        }
    }

    /// Replays this step backwards. Returns `None` if the board no longer
    /// holds the cards where the step expects them.
    pub fn revert(&self, board: &mut Board) -> Option<Reverted> {
        match self {
            Step::Single {
                card,
                source,
                flipped,
            } => {
                board.pile_of(*card)?;
                // Hide the revealed card first so it is face-down again by
                // the time the moved card lands on it.
                let flipped = flipped.map(|c| {
                    let face = board.face(c).flipped();
                    board.flip(c, face);
                    (c, face)
                });
                match board.transfer_back(*card, *source) {
                    Some(transfer) => Some(Reverted { transfer, flipped }),
                    None => {
                        if let Some((c, face)) = flipped {
                            board.flip(c, face.flipped());
                        }
                        None
                    }
                }
            }
            Step::Bulk { cards, source } => {
                debug_assert_eq!(*source, PileId::Waste, "bulk steps only come from recycling");
                let transfer = board.unrecycle(cards)?;
                Some(Reverted {
                    transfer,
                    flipped: None,
                })
            }
        }
    }
}

/// Stack of reversible steps, most recent last.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    steps: Vec<Step>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn pop(&mut self) -> Option<Step> {
        self.steps.pop()
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Pops the most recent step and reverts it on `board`. An empty
    /// history is a no-op. A step the board can no longer revert stays on
    /// the stack and the board is left as it was.
    pub fn undo(&mut self, board: &mut Board) -> Option<Reverted> {
        let step = self.pop()?;
        let reverted = step.revert(board);
        if reverted.is_none() {
            error!(?step, "History out of sync with board");
            self.steps.push(step);
        }
        reverted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(code: &str) -> Card {
        code.parse().unwrap()
    }

    #[test]
    fn undo_of_empty_history_does_nothing() {
        let mut board = Board::new(4);
        let before = board.clone();
        let mut history = History::new();
        assert!(history.undo(&mut board).is_none());
        assert_eq!(board, before);
    }

    #[test]
    fn flip_is_undone_with_the_move_that_caused_it() {
        let mut board = Board::new(4);
        board.place(card("3C"), PileId::Tableau(0), Face::Down);
        board.place(card("8H"), PileId::Tableau(0), Face::Up);
        board.place(card("9S"), PileId::Tableau(1), Face::Up);
        let before = board.clone();

        let mut history = History::new();
        let t = board.transfer(card("8H"), PileId::Tableau(1)).unwrap();
        history.push(Step::single(&t));
        assert_eq!(board.face(card("3C")), Face::Up);
        assert_eq!(
            history.last(),
            Some(&Step::Single {
                card: card("8H"),
                source: PileId::Tableau(0),
                flipped: Some(card("3C")),
            })
        );

        let r = history.undo(&mut board).unwrap();
        assert_eq!(r.flipped, Some((card("3C"), Face::Down)));
        assert_eq!(r.transfer.to, PileId::Tableau(0));
        assert_eq!(board, before);
        assert!(history.is_empty());
    }

    #[test]
    fn failed_revert_keeps_step_and_faces() {
        let mut board = Board::new(4);
        board.place(card("3C"), PileId::Tableau(0), Face::Up);
        let before = board.clone();

        // 8H is not on the board, so the step cannot be replayed.
        let step = Step::Single {
            card: card("8H"),
            source: PileId::Tableau(0),
            flipped: Some(card("3C")),
        };
        let mut history = History::new();
        history.push(step.clone());

        assert!(history.undo(&mut board).is_none());
        assert_eq!(board, before);
        assert_eq!(board.face(card("3C")), Face::Up);
        assert_eq!(history.last(), Some(&step));
    }

    #[test]
    fn undo_of_draw_returns_card_face_down() {
        let mut board = Board::new(4);
        board.place(card("5D"), PileId::Stock, Face::Down);
        let before = board.clone();

        let mut history = History::new();
        let t = board.draw().unwrap();
        history.push(Step::single(&t));
        let r = history.undo(&mut board).unwrap();
        assert_eq!(r.transfer.turned, vec![(card("5D"), Face::Down)]);
        assert_eq!(board, before);
    }

    #[test]
    fn recycle_undoes_in_one_step() {
        let mut board = Board::new(4);
        for code in ["AS", "2S", "3S", "4S"] {
            board.place(card(code), PileId::Stock, Face::Down);
        }
        let mut history = History::new();
        while let Some(t) = board.draw() {
            history.push(Step::single(&t));
        }
        let drawn_out = board.clone();
        let t = board.recycle().unwrap();
        history.push(Step::bulk(&t));

        history.undo(&mut board).unwrap();
        assert_eq!(board, drawn_out);
        assert_eq!(history.len(), 4);
    }

    #[test]
    fn run_move_undo_restores_run_in_place() {
        let mut board = Board::new(4);
        board.place(card("KS"), PileId::Tableau(0), Face::Down);
        for code in ["9S", "8H", "7C"] {
            board.place(card(code), PileId::Tableau(0), Face::Up);
        }
        board.place(card("9D"), PileId::Tableau(1), Face::Up);
        let before = board.clone();

        let mut history = History::new();
        let t = board.transfer(card("8H"), PileId::Tableau(1)).unwrap();
        history.push(Step::single(&t));
        assert_eq!(t.revealed, None);

        history.undo(&mut board).unwrap();
        assert_eq!(board, before);
    }
}
