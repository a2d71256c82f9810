//! Pile identities and the ordered membership list every pile kind shares.
//!
//! A `Pile` stores its cards bottom-to-top: the last element is the top
//! card. Which pile a card sits in, and which way up it lies, is tracked by
//! the `Board`; a pile only owns the ordering.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::card::{Card, Face, NUM_RANKS, NUM_SUITS, Suit};

/// Number of foundation piles (one per suit).
pub const NUM_FOUNDATIONS: usize = NUM_SUITS as usize;
/// Largest supported number of tableau piles.
pub const MAX_TABLEAU_PILES: usize = 7;

/// The four kinds of pile and the rules that come with them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PileKind {
    /// Main playing column.
    Tableau,
    /// Suit pile building Ace..King.
    Foundation,
    /// Face-down draw source.
    Stock,
    /// Face-up pile receiving cards drawn from the stock.
    Waste,
}

/// Stable name of one pile on the board.
///
/// Indices are 0-based internally; `Display`/`FromStr` use 1-based codes
/// such as `t3` or `f1`, plus `s` (stock) and `w` (waste).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PileId {
    Tableau(u8),
    Foundation(u8),
    Stock,
    Waste,
}

impl PileId {
    #[inline]
    pub fn kind(self) -> PileKind {
        match self {
            PileId::Tableau(_) => PileKind::Tableau,
            PileId::Foundation(_) => PileKind::Foundation,
            PileId::Stock => PileKind::Stock,
            PileId::Waste => PileKind::Waste,
        }
    }

    #[inline]
    pub fn is_tableau(self) -> bool {
        matches!(self, PileId::Tableau(_))
    }

    #[inline]
    pub fn is_foundation(self) -> bool {
        matches!(self, PileId::Foundation(_))
    }
}

impl fmt::Display for PileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PileId::Tableau(i) => write!(f, "t{}", i + 1),
            PileId::Foundation(i) => write!(f, "f{}", i + 1),
            PileId::Stock => f.write_str("s"),
            PileId::Waste => f.write_str("w"),
        }
    }
}

/// Error returned when a pile code such as "t3" cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid pile code {code:?} (expected t1..t7, f1..f4, s or w)")]
pub struct ParsePileError {
    pub code: String,
}

impl FromStr for PileId {
    type Err = ParsePileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePileError { code: s.to_string() };
        let t = s.trim().to_ascii_lowercase();
        match t.as_str() {
            "s" | "stock" => return Ok(PileId::Stock),
            "w" | "waste" => return Ok(PileId::Waste),
            _ => {}
        }
        let (prefix, digits) = t.split_at(t.chars().next().map_or(0, char::len_utf8));
        let n: u8 = digits.parse().map_err(|_| err())?;
        let idx = n.checked_sub(1).ok_or_else(err)?;
        match prefix {
            "t" if (idx as usize) < MAX_TABLEAU_PILES => Ok(PileId::Tableau(idx)),
            "f" if (idx as usize) < NUM_FOUNDATIONS => Ok(PileId::Foundation(idx)),
            _ => Err(err()),
        }
    }
}

/// Ordered card container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pile {
    id: PileId,
    cards: Vec<Card>,
    /// Foundation only: the suit this pile builds, set by its first card.
    suit: Option<Suit>,
}

impl Pile {
    pub fn new(id: PileId) -> Self {
        Pile {
            id,
            cards: Vec::new(),
            suit: None,
        }
    }

    #[inline]
    pub fn id(&self) -> PileId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> PileKind {
        self.id.kind()
    }

    /// Cards bottom-to-top.
    #[inline]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[inline]
    pub fn top_card(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    /// Position of `card` counted from the bottom.
    pub fn position(&self, card: Card) -> Option<usize> {
        self.cards.iter().position(|&c| c == card)
    }

    pub fn contains(&self, card: Card) -> bool {
        self.position(card).is_some()
    }

    /// Cards lying on top of `card`, excluding `card` itself.
    pub fn cards_above(&self, card: Card) -> &[Card] {
        match self.position(card) {
            Some(i) => &self.cards[i + 1..],
            None => &[],
        }
    }

    /// Foundation suit, once the first card has landed.
    #[inline]
    pub fn suit(&self) -> Option<Suit> {
        self.suit
    }

    /// True for a foundation holding all thirteen ranks.
    pub fn is_complete(&self) -> bool {
        self.kind() == PileKind::Foundation && self.cards.len() == NUM_RANKS as usize
    }

    /// Orientation a card is forced into when it lands here, if any.
    pub fn landing_face(&self) -> Option<Face> {
        match self.kind() {
            PileKind::Stock => Some(Face::Down),
            PileKind::Waste | PileKind::Foundation => Some(Face::Up),
            PileKind::Tableau => None,
        }
    }

    /// Drag policy for a card in this pile, given its current face.
    ///
    /// - Tableau: any face-up card (the run above it travels with it).
    /// - Foundation and Waste: only the top card.
    /// - Stock: never; the stock is activated, not dragged.
    pub fn is_card_draggable(&self, card: Card, face: Face) -> bool {
        if !self.contains(card) {
            return false;
        }
        match self.kind() {
            PileKind::Tableau => face.is_up(),
            PileKind::Foundation | PileKind::Waste => face.is_up() && self.top_card() == Some(card),
            PileKind::Stock => false,
        }
    }

    pub(crate) fn push(&mut self, card: Card) {
        debug_assert!(!self.contains(card), "{card} is already in {}", self.id);
        if self.kind() == PileKind::Foundation && self.cards.is_empty() {
            self.suit = Some(card.suit());
        }
        self.cards.push(card);
    }

    /// Removes `card` and everything above it, returned bottom-to-top.
    pub(crate) fn split_off_from(&mut self, card: Card) -> Option<Vec<Card>> {
        let i = self.position(card)?;
        let run = self.cards.split_off(i);
        if self.cards.is_empty() {
            self.suit = None;
        }
        Some(run)
    }

    pub(crate) fn clear(&mut self) {
        self.cards.clear();
        self.suit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Rank;

    #[test]
    fn pile_codes() {
        assert_eq!("t1".parse::<PileId>(), Ok(PileId::Tableau(0)));
        assert_eq!("T7".parse::<PileId>(), Ok(PileId::Tableau(6)));
        assert_eq!("f4".parse::<PileId>(), Ok(PileId::Foundation(3)));
        assert_eq!("w".parse::<PileId>(), Ok(PileId::Waste));
        assert_eq!("stock".parse::<PileId>(), Ok(PileId::Stock));
        assert!("t0".parse::<PileId>().is_err());
        assert!("t8".parse::<PileId>().is_err());
        assert!("f5".parse::<PileId>().is_err());
        assert!("x1".parse::<PileId>().is_err());
        assert!("".parse::<PileId>().is_err());

        for id in [PileId::Tableau(2), PileId::Foundation(0), PileId::Stock, PileId::Waste] {
            assert_eq!(id.to_string().parse::<PileId>(), Ok(id));
        }
    }

    #[test]
    fn foundation_suit_follows_bottom_card() {
        let mut f = Pile::new(PileId::Foundation(0));
        assert_eq!(f.suit(), None);

        let ah = Card::new(Suit::Hearts, Rank::Ace);
        let two_h = Card::new(Suit::Hearts, Rank::Two);
        f.push(ah);
        f.push(two_h);
        assert_eq!(f.suit(), Some(Suit::Hearts));

        assert_eq!(f.split_off_from(two_h), Some(vec![two_h]));
        assert_eq!(f.suit(), Some(Suit::Hearts));
        assert_eq!(f.split_off_from(ah), Some(vec![ah]));
        assert_eq!(f.suit(), None);
    }

    #[test]
    fn split_off_takes_the_run_above() {
        let mut t = Pile::new(PileId::Tableau(0));
        let cards = [
            Card::new(Suit::Spades, Rank::Nine),
            Card::new(Suit::Hearts, Rank::Eight),
            Card::new(Suit::Clubs, Rank::Seven),
        ];
        for c in cards {
            t.push(c);
        }
        assert_eq!(t.cards_above(cards[0]), &cards[1..]);
        assert_eq!(t.split_off_from(cards[1]), Some(cards[1..].to_vec()));
        assert_eq!(t.cards(), &cards[..1]);
        assert_eq!(t.split_off_from(cards[2]), None);
    }

    #[test]
    fn drag_policy_per_kind() {
        let a = Card::new(Suit::Spades, Rank::Nine);
        let b = Card::new(Suit::Hearts, Rank::Eight);

        let mut tab = Pile::new(PileId::Tableau(0));
        tab.push(a);
        tab.push(b);
        assert!(tab.is_card_draggable(a, Face::Up));
        assert!(!tab.is_card_draggable(a, Face::Down));

        let mut waste = Pile::new(PileId::Waste);
        waste.push(a);
        waste.push(b);
        assert!(!waste.is_card_draggable(a, Face::Up));
        assert!(waste.is_card_draggable(b, Face::Up));

        let mut stock = Pile::new(PileId::Stock);
        stock.push(a);
        assert!(!stock.is_card_draggable(a, Face::Up));

        // Not a member at all.
        assert!(!stock.is_card_draggable(b, Face::Up));
    }
}
