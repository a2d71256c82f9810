//! Move legality for Klondike.
//!
//! Everything here is a pure predicate over a `Board`: nothing mutates, and
//! the same checks back player drags, explicit move requests and the
//! auto-complete solver.

use crate::board::Board;
use crate::card::{Card, Face, Rank, Suit};
use crate::pile::{PileId, PileKind};

/// Something a dragged card was released over: a card lying on the board,
/// or the bare area of a pile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropTarget {
    Card(Card),
    Pile(PileId),
}

/// One overlap reported by the presentation layer when a drag ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropCandidate {
    pub target: DropTarget,
    /// Squared distance between the dragged card and the target centre.
    pub distance_sq: f32,
}

impl DropCandidate {
    pub fn new(target: DropTarget, distance_sq: f32) -> Self {
        DropCandidate {
            target,
            distance_sq,
        }
    }
}

/// True if `moving` may be placed onto `target` in a tableau column:
/// `target` is face-up and exposed, opposite colour, one rank higher.
#[inline]
pub fn can_stack_on_tableau(target: Card, target_face: Face, target_exposed: bool, moving: Card) -> bool {
    target_face.is_up()
        && target_exposed
        && target.color() != moving.color()
        && moving.rank_number() + 1 == target.rank_number()
}

/// Only a King may start an empty tableau column.
#[inline]
pub fn can_start_tableau(moving: Card) -> bool {
    moving.rank() == Rank::King
}

/// Only an Ace may start an empty foundation.
#[inline]
pub fn can_start_foundation(moving: Card) -> bool {
    moving.rank() == Rank::Ace
}

/// True if `moving` continues a foundation whose suit is `suit` and whose
/// top card is `top`. A card with others stacked on it never qualifies.
#[inline]
pub fn can_build_foundation(top: Card, suit: Option<Suit>, moving: Card, moving_exposed: bool) -> bool {
    moving_exposed
        && suit == Some(moving.suit())
        && moving.rank_number() == top.rank_number() + 1
}

/// True if the slice (bottom-to-top) is a descending, alternating-colour
/// run that can travel as one block.
pub fn is_valid_run(cards: &[Card]) -> bool {
    if cards.is_empty() {
        return false;
    }
    cards.windows(2).all(|pair| {
        let (below, above) = (pair[0], pair[1]);
        above.rank_number() + 1 == below.rank_number() && above.color() != below.color()
    })
}

/// Whether `pile` would accept `moving` (with its run) as the next card.
///
/// An empty pile applies the King/Ace start rule; a non-empty one checks
/// against its top card. Stock and waste never accept a drop, and a card
/// can never be dropped onto the pile it came from.
pub fn accepts(board: &Board, pile: PileId, moving: Card) -> bool {
    let Some(dest) = board.get_pile(pile) else {
        return false;
    };
    if board.pile_of(moving) == Some(pile) {
        return false;
    }
    match (dest.kind(), dest.top_card()) {
        (PileKind::Tableau, None) => can_start_tableau(moving),
        (PileKind::Tableau, Some(top)) => {
            can_stack_on_tableau(top, board.face(top), board.is_exposed(top), moving)
        }
        (PileKind::Foundation, None) => can_start_foundation(moving) && board.is_exposed(moving),
        (PileKind::Foundation, Some(top)) => {
            can_build_foundation(top, dest.suit(), moving, board.is_exposed(moving))
        }
        (PileKind::Stock | PileKind::Waste, _) => false,
    }
}

/// Whether a drop over `target` is legal for `moving`.
///
/// A card target only counts when it is the exposed top of an interactable
/// pile; the drop then lands on that pile.
pub fn accepts_target(board: &Board, target: DropTarget, moving: Card) -> Option<PileId> {
    let pile = match target {
        DropTarget::Pile(p) => p,
        DropTarget::Card(c) => {
            if !board.is_exposed(c) {
                return None;
            }
            board.pile_of(c)?
        }
    };
    accepts(board, pile, moving).then_some(pile)
}

/// Picks where a released card should land: the nearest overlapping target
/// whose pile accepts it. `None` means the drag snaps back.
pub fn resolve_drop(board: &Board, moving: Card, candidates: &[DropCandidate]) -> Option<PileId> {
    candidates
        .iter()
        .filter_map(|c| accepts_target(board, c.target, moving).map(|pile| (pile, c.distance_sq)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(pile, _)| pile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(code: &str) -> Card {
        code.parse().unwrap()
    }

    fn board_with(piles: &[(PileId, &[(&str, Face)])]) -> Board {
        let mut board = Board::new(4);
        for (pile, cards) in piles {
            for (code, face) in cards.iter() {
                board.place(card(code), *pile, *face);
            }
        }
        board
    }

    #[test]
    fn red_seven_on_exposed_black_eight() {
        let board = board_with(&[
            (PileId::Tableau(0), &[("8S", Face::Up)]),
            (PileId::Tableau(1), &[("7H", Face::Up)]),
        ]);
        assert!(accepts(&board, PileId::Tableau(0), card("7H")));
    }

    #[test]
    fn red_seven_not_on_covered_eight_nor_wrong_card() {
        // 8S has another card stacked on it, so it is not an exposed target.
        let board = board_with(&[
            (PileId::Tableau(0), &[("8S", Face::Up), ("7D", Face::Up)]),
            (PileId::Tableau(1), &[("7H", Face::Up)]),
            (PileId::Tableau(2), &[("6H", Face::Up)]),
        ]);
        assert_eq!(
            accepts_target(&board, DropTarget::Card(card("8S")), card("7H")),
            None
        );
        assert!(!can_stack_on_tableau(card("8S"), Face::Up, false, card("7H")));
        // A red 6 is neither one rank higher nor opposite colour.
        assert!(!accepts(&board, PileId::Tableau(2), card("7H")));
    }

    #[test]
    fn face_down_target_rejected() {
        assert!(!can_stack_on_tableau(card("8S"), Face::Down, true, card("7H")));
    }

    #[test]
    fn queen_on_king_alternates_colour() {
        let board = board_with(&[
            (PileId::Tableau(0), &[("KD", Face::Up)]),
            (PileId::Tableau(1), &[("QC", Face::Up)]),
            (PileId::Tableau(2), &[("QD", Face::Up)]),
        ]);
        assert!(accepts(&board, PileId::Tableau(0), card("QC")));
        assert!(!accepts(&board, PileId::Tableau(0), card("QD")));
    }

    #[test]
    fn only_kings_start_empty_columns() {
        let board = board_with(&[(PileId::Waste, &[("KH", Face::Up), ("QS", Face::Up)])]);
        assert!(!accepts(&board, PileId::Tableau(3), card("QS")));
        assert!(can_start_tableau(card("KH")));
    }

    #[test]
    fn foundation_rules() {
        let board = board_with(&[
            (PileId::Foundation(0), &[("AH", Face::Up)]),
            (PileId::Tableau(0), &[("2H", Face::Up)]),
            (PileId::Tableau(1), &[("2S", Face::Up)]),
            (PileId::Tableau(2), &[("AS", Face::Up)]),
            (PileId::Tableau(3), &[("3H", Face::Up)]),
        ]);
        // Ace on an empty foundation.
        assert!(accepts(&board, PileId::Foundation(1), card("AS")));
        // 2H only where AH is the top.
        assert!(accepts(&board, PileId::Foundation(0), card("2H")));
        assert!(!accepts(&board, PileId::Foundation(1), card("2H")));
        // Wrong suit, wrong rank.
        assert!(!accepts(&board, PileId::Foundation(0), card("2S")));
        assert!(!accepts(&board, PileId::Foundation(0), card("3H")));
    }

    #[test]
    fn foundation_refuses_a_card_carrying_a_run() {
        let board = board_with(&[
            (PileId::Foundation(0), &[("AH", Face::Up)]),
            (PileId::Tableau(0), &[("2H", Face::Up), ("AS", Face::Up)]),
        ]);
        assert!(!accepts(&board, PileId::Foundation(0), card("2H")));
    }

    #[test]
    fn never_onto_stock_waste_or_own_pile() {
        let board = board_with(&[
            (PileId::Tableau(0), &[("KD", Face::Up)]),
            (PileId::Waste, &[("QC", Face::Up)]),
        ]);
        assert!(!accepts(&board, PileId::Stock, card("QC")));
        assert!(!accepts(&board, PileId::Waste, card("KD")));
        assert!(!accepts(&board, PileId::Tableau(0), card("KD")));
        // Nonexistent column on a four-pile board.
        assert!(!accepts(&board, PileId::Tableau(6), card("KD")));
    }

    #[test]
    fn valid_and_invalid_runs() {
        let cards = [card("8S"), card("7H"), card("6C"), card("5C")];
        assert!(is_valid_run(&cards[0..3]));
        assert!(!is_valid_run(&cards[0..4]));
        assert!(is_valid_run(&cards[3..]));
        assert!(!is_valid_run(&[]));
    }

    #[test]
    fn drop_chooses_nearest_accepting_target() {
        let board = board_with(&[
            (PileId::Tableau(0), &[("8S", Face::Up)]),
            (PileId::Tableau(1), &[("8C", Face::Up)]),
            (PileId::Tableau(2), &[("9D", Face::Up)]),
            (PileId::Waste, &[("7H", Face::Up)]),
        ]);
        let candidates = [
            DropCandidate::new(DropTarget::Card(card("8S")), 4.0),
            DropCandidate::new(DropTarget::Card(card("9D")), 0.5),
            DropCandidate::new(DropTarget::Card(card("8C")), 1.5),
        ];
        // 9D is nearest but refuses a 7; 8C beats 8S on distance.
        assert_eq!(
            resolve_drop(&board, card("7H"), &candidates),
            Some(PileId::Tableau(1))
        );
        assert_eq!(resolve_drop(&board, card("7H"), &candidates[1..2]), None);
        assert_eq!(resolve_drop(&board, card("7H"), &[]), None);
    }

    #[test]
    fn drop_onto_empty_pile_area() {
        let board = board_with(&[(PileId::Waste, &[("AD", Face::Up)])]);
        let candidates = [
            DropCandidate::new(DropTarget::Pile(PileId::Tableau(0)), 0.1),
            DropCandidate::new(DropTarget::Pile(PileId::Foundation(2)), 0.9),
        ];
        assert_eq!(
            resolve_drop(&board, card("AD"), &candidates),
            Some(PileId::Foundation(2))
        );
    }
}
