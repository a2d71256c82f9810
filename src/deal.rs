//! Deck orderings fed to `Board::deal`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::card::{CARDS_PER_DECK, Card, Rank, Suit, standard_deck};

const DECK_LEN: usize = CARDS_PER_DECK as usize;

/// Debug ordering: each suit King down to Ace, suits in `Suit::ALL` order.
///
/// Dealt with `DealLayout::SuitColumns` this puts one complete suit in each
/// of the first four columns with its Ace on top, a board auto-complete can
/// finish straight away.
pub fn ordered_deck() -> [Card; DECK_LEN] {
    let mut cards = [Card(0); DECK_LEN];
    let ordered = Suit::ALL
        .iter()
        .flat_map(|&s| Rank::ALL.iter().rev().map(move |&r| Card::new(s, r)));
    for (slot, card) in cards.iter_mut().zip(ordered) {
        *slot = card;
    }
    cards
}

/// Fisher-Yates shuffle of the standard deck, reproducible from `seed`.
pub fn shuffled_deck(seed: u64) -> [Card; DECK_LEN] {
    let mut cards = standard_deck();
    let mut rng = StdRng::seed_from_u64(seed);
    cards.shuffle(&mut rng);
    cards
}

/// A fresh seed for games the player did not ask to reproduce.
pub fn random_seed() -> u64 {
    rand::random::<u64>()
}

/// True if `deck` holds each of the 52 cards exactly once.
pub fn is_permutation(deck: &[Card]) -> bool {
    let mut seen = [false; DECK_LEN];
    deck.len() == DECK_LEN
        && deck.iter().all(|c| {
            let i = c.index() as usize;
            i < DECK_LEN && !std::mem::replace(&mut seen[i], true)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_deck_runs_king_to_ace_per_suit() {
        let deck = ordered_deck();
        assert!(is_permutation(&deck));
        assert_eq!(deck[0], Card::new(Suit::Spades, Rank::King));
        assert_eq!(deck[12], Card::new(Suit::Spades, Rank::Ace));
        assert_eq!(deck[13], Card::new(Suit::Hearts, Rank::King));
        assert_eq!(deck[51], Card::new(Suit::Clubs, Rank::Ace));
    }

    #[test]
    fn shuffle_is_seeded() {
        let a = shuffled_deck(42);
        assert!(is_permutation(&a));
        assert_eq!(a, shuffled_deck(42));
        assert_ne!(a, shuffled_deck(43));
        assert_ne!(a, standard_deck());
    }

    #[test]
    fn permutation_check_rejects_duplicates() {
        let mut deck = standard_deck();
        deck[5] = deck[6];
        assert!(!is_permutation(&deck));
        assert!(!is_permutation(&deck[..51]));
    }
}
