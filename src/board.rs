//! The full layout: tableau, foundations, stock and waste, plus the card
//! table that records, for each of the 52 cards, which way up it lies and
//! which pile currently holds it.
//!
//! Piles own the ordering; the card table is the non-owning back-reference
//! ("which pile am I in"). Every mutation goes through `remove`/`add` so the
//! two always agree. Mutations never check the rules of play: callers run
//! the predicates in `crate::rules` first.

use crate::card::{CARDS_PER_DECK, Card, Face, Rank, Suit};
use crate::pile::{MAX_TABLEAU_PILES, NUM_FOUNDATIONS, Pile, PileId, PileKind};
use crate::rules;

const DECK_LEN: usize = CARDS_PER_DECK as usize;

/// Mutable per-card state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardState {
    pub face: Face,
    /// `None` only while the card is between piles or before the deal.
    pub pile: Option<PileId>,
}

/// Record of one card (and whatever travelled with it) changing pile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: PileId,
    pub to: PileId,
    /// Moved cards, bottom-to-top as they now lie on `to`. Never empty.
    pub cards: Vec<Card>,
    /// Face-down tableau card turned up because the move exposed it.
    pub revealed: Option<Card>,
    /// Cards whose face changed on landing (stock turns cards down,
    /// waste and foundations turn them up).
    pub turned: Vec<(Card, Face)>,
}

impl Transfer {
    /// The card that was picked up (the base of the moved run).
    #[inline]
    pub fn card(&self) -> Card {
        self.cards[0]
    }
}

/// How `deal` distributes a deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DealLayout {
    /// Pile `i` receives `i + 1` cards, only the last face-up; the rest of
    /// the deck goes face-down to the stock.
    Klondike,
    /// Debug layout: the deck is cut into runs of 13 that go face-up onto
    /// the first four tableau piles. Stock and waste stay empty.
    SuitColumns,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    tableau: Vec<Pile>,
    foundations: [Pile; NUM_FOUNDATIONS],
    stock: Pile,
    waste: Pile,
    cards: [CardState; DECK_LEN],
}

impl Board {
    /// An empty board with `tableau_piles` main columns.
    pub fn new(tableau_piles: usize) -> Self {
        debug_assert!(
            (1..=MAX_TABLEAU_PILES).contains(&tableau_piles),
            "unsupported tableau pile count {tableau_piles}"
        );
        Board {
            tableau: (0..tableau_piles)
                .map(|i| Pile::new(PileId::Tableau(i as u8)))
                .collect(),
            foundations: std::array::from_fn(|i| Pile::new(PileId::Foundation(i as u8))),
            stock: Pile::new(PileId::Stock),
            waste: Pile::new(PileId::Waste),
            cards: [CardState::default(); DECK_LEN],
        }
    }

    // ----- Pile access -----

    #[inline]
    pub fn tableau_count(&self) -> usize {
        self.tableau.len()
    }

    pub fn tableau(&self) -> &[Pile] {
        &self.tableau
    }

    pub fn foundations(&self) -> &[Pile] {
        &self.foundations
    }

    pub fn stock(&self) -> &Pile {
        &self.stock
    }

    pub fn waste(&self) -> &Pile {
        &self.waste
    }

    /// Look up a pile that may not exist on this board (e.g. `t7` on a
    /// four-column layout).
    pub fn get_pile(&self, id: PileId) -> Option<&Pile> {
        match id {
            PileId::Tableau(i) => self.tableau.get(i as usize),
            PileId::Foundation(i) => self.foundations.get(i as usize),
            PileId::Stock => Some(&self.stock),
            PileId::Waste => Some(&self.waste),
        }
    }

    /// # Panics
    ///
    /// Panics if `id` names a tableau pile this board does not have.
    pub fn pile(&self, id: PileId) -> &Pile {
        match id {
            PileId::Tableau(i) => &self.tableau[i as usize],
            PileId::Foundation(i) => &self.foundations[i as usize],
            PileId::Stock => &self.stock,
            PileId::Waste => &self.waste,
        }
    }

    fn pile_mut(&mut self, id: PileId) -> &mut Pile {
        match id {
            PileId::Tableau(i) => &mut self.tableau[i as usize],
            PileId::Foundation(i) => &mut self.foundations[i as usize],
            PileId::Stock => &mut self.stock,
            PileId::Waste => &mut self.waste,
        }
    }

    /// Every pile id on this board: tableau, foundations, stock, waste.
    pub fn pile_ids(&self) -> impl Iterator<Item = PileId> + '_ {
        self.piles().map(Pile::id)
    }

    pub fn piles(&self) -> impl Iterator<Item = &Pile> + '_ {
        self.tableau
            .iter()
            .chain(self.foundations.iter())
            .chain([&self.stock, &self.waste])
    }

    // ----- Card queries -----

    #[inline]
    pub fn state(&self, card: Card) -> CardState {
        self.cards[card.index() as usize]
    }

    #[inline]
    pub fn face(&self, card: Card) -> Face {
        self.state(card).face
    }

    #[inline]
    pub fn pile_of(&self, card: Card) -> Option<PileId> {
        self.state(card).pile
    }

    /// True if nothing lies on top of `card`.
    pub fn is_exposed(&self, card: Card) -> bool {
        self.pile_of(card)
            .is_some_and(|p| self.pile(p).top_card() == Some(card))
    }

    /// Whether the owning pile lets the player pick this card up. A tableau
    /// card only travels as the base of a valid run.
    pub fn is_movable(&self, card: Card) -> bool {
        let Some(p) = self.pile_of(card) else {
            return false;
        };
        if !self.pile(p).is_card_draggable(card, self.face(card)) {
            return false;
        }
        !p.is_tableau() || rules::is_valid_run(self.run_from(card))
    }

    /// `card` and everything stacked on it, bottom-to-top.
    pub fn run_from(&self, card: Card) -> &[Card] {
        match self.pile_of(card) {
            Some(p) => {
                let pile = self.pile(p);
                match pile.position(card) {
                    Some(i) => &pile.cards()[i..],
                    None => &[],
                }
            }
            None => &[],
        }
    }

    /// Number of cards sitting on foundations.
    pub fn foundation_card_count(&self) -> usize {
        self.foundations.iter().map(Pile::len).sum()
    }

    pub fn all_foundations_complete(&self) -> bool {
        self.foundations.iter().all(Pile::is_complete)
    }

    /// Every tableau card is face-up.
    pub fn tableau_fully_revealed(&self) -> bool {
        self.tableau
            .iter()
            .flat_map(|p| p.cards().iter())
            .all(|&c| self.face(c).is_up())
    }

    /// Stock and waste are empty and nothing in the tableau is hidden, so
    /// the remaining cards can be played out to the foundations.
    pub fn auto_complete_ready(&self) -> bool {
        self.stock.is_empty() && self.waste.is_empty() && self.tableau_fully_revealed()
    }

    // ----- Primitive mutations -----

    /// Turns `card` to `face` with no rule check. Returns whether it changed.
    pub fn flip(&mut self, card: Card, face: Face) -> bool {
        let state = &mut self.cards[card.index() as usize];
        let changed = state.face != face;
        state.face = face;
        changed
    }

    /// Puts a loose card on top of `pile` with an explicit face. Used to
    /// deal and to set up positions; no landing side effects apply.
    pub fn place(&mut self, card: Card, pile: PileId, face: Face) {
        debug_assert!(
            self.pile_of(card).is_none(),
            "{card} is already in {:?}",
            self.pile_of(card)
        );
        self.pile_mut(pile).push(card);
        self.cards[card.index() as usize] = CardState {
            face,
            pile: Some(pile),
        };
    }

    /// Appends loose cards, bottom first, to `to` and applies the pile's
    /// landing orientation. Returns the cards whose face changed.
    pub fn add(&mut self, cards: &[Card], to: PileId) -> Vec<(Card, Face)> {
        let landing = self.pile(to).landing_face();
        let mut turned = Vec::new();
        for &card in cards {
            debug_assert!(
                self.pile_of(card).is_none(),
                "{card} is already in {:?}",
                self.pile_of(card)
            );
            self.pile_mut(to).push(card);
            self.cards[card.index() as usize].pile = Some(to);
            if let Some(face) = landing {
                if self.flip(card, face) {
                    turned.push((card, face));
                }
            }
        }
        turned
    }

    /// Detaches `card` together with every card stacked on it and returns
    /// them bottom-to-top. Nothing is turned over.
    pub fn remove(&mut self, card: Card) -> Vec<Card> {
        let Some(from) = self.pile_of(card) else {
            debug_assert!(false, "{card} is not in any pile");
            return Vec::new();
        };
        let Some(run) = self.pile_mut(from).split_off_from(card) else {
            debug_assert!(false, "{card} claims {from} but is not a member");
            return Vec::new();
        };
        for &c in &run {
            self.cards[c.index() as usize].pile = None;
        }
        run
    }

    /// Turns the top card of a tableau pile face-up if it is hidden.
    fn reveal_top(&mut self, pile: PileId) -> Option<Card> {
        if pile.kind() != PileKind::Tableau {
            return None;
        }
        let top = self.pile(pile).top_card()?;
        self.flip(top, Face::Up).then_some(top)
    }

    /// Moves `card` and its run onto `to`. A face-down tableau card left on
    /// top of the source is turned up and reported in `revealed`.
    pub fn transfer(&mut self, card: Card, to: PileId) -> Option<Transfer> {
        let from = self.pile_of(card)?;
        let cards = self.remove(card);
        if cards.is_empty() {
            return None;
        }
        let revealed = self.reveal_top(from);
        let turned = self.add(&cards, to);
        Some(Transfer {
            from,
            to,
            cards,
            revealed,
            turned,
        })
    }

    /// Moves `card` and its run onto `to` without revealing anything in the
    /// source. Used when replaying history backwards.
    pub fn transfer_back(&mut self, card: Card, to: PileId) -> Option<Transfer> {
        let from = self.pile_of(card)?;
        let cards = self.remove(card);
        if cards.is_empty() {
            return None;
        }
        let turned = self.add(&cards, to);
        Some(Transfer {
            from,
            to,
            cards,
            revealed: None,
            turned,
        })
    }

    /// Stock top card to the waste, face-up.
    pub fn draw(&mut self) -> Option<Transfer> {
        let top = self.stock.top_card()?;
        self.transfer(top, PileId::Waste)
    }

    /// Waste back onto the empty stock, reversed and face-down, so the stock
    /// ends up in the order it had before it was drawn out.
    pub fn recycle(&mut self) -> Option<Transfer> {
        if !self.stock.is_empty() {
            return None;
        }
        let bottom = self.waste.cards().first().copied()?;
        let mut cards = self.remove(bottom);
        cards.reverse();
        let turned = self.add(&cards, PileId::Stock);
        Some(Transfer {
            from: PileId::Waste,
            to: PileId::Stock,
            cards,
            revealed: None,
            turned,
        })
    }

    /// Moves a whole stock back onto the waste in reverse. Exact inverse of
    /// `recycle`.
    pub fn unrecycle(&mut self, cards: &[Card]) -> Option<Transfer> {
        let bottom = *cards.first()?;
        debug_assert_eq!(
            self.stock.cards(),
            cards,
            "stock changed since it was recycled"
        );
        let mut restored = self.remove(bottom);
        restored.reverse();
        let turned = self.add(&restored, PileId::Waste);
        Some(Transfer {
            from: PileId::Stock,
            to: PileId::Waste,
            cards: restored,
            revealed: None,
            turned,
        })
    }

    /// Empties every pile, releases foundation suits and turns all cards
    /// face-up.
    pub fn clear(&mut self) {
        for pile in self.tableau.iter_mut().chain(self.foundations.iter_mut()) {
            pile.clear();
        }
        self.stock.clear();
        self.waste.clear();
        self.cards = [CardState::default(); DECK_LEN];
    }

    /// Distributes `deck` (in the given order) onto an empty board.
    pub fn deal(&mut self, deck: &[Card; DECK_LEN], layout: DealLayout) {
        debug_assert!(self.piles().all(Pile::is_empty), "deal onto a non-empty board");
        let mut cards = deck.iter().copied();
        match layout {
            DealLayout::Klondike => {
                for i in 0..self.tableau.len() {
                    let pile = PileId::Tableau(i as u8);
                    for n in 0..=i {
                        let Some(card) = cards.next() else { break };
                        let face = if n == i { Face::Up } else { Face::Down };
                        self.place(card, pile, face);
                    }
                }
                for card in cards {
                    self.place(card, PileId::Stock, Face::Down);
                }
            }
            DealLayout::SuitColumns => {
                debug_assert!(self.tableau.len() >= Suit::ALL.len());
                for i in 0..Suit::ALL.len().min(self.tableau.len()) {
                    let pile = PileId::Tableau(i as u8);
                    for card in cards.by_ref().take(Rank::ALL.len()) {
                        self.place(card, pile, Face::Up);
                    }
                }
                for card in cards {
                    self.place(card, PileId::Stock, Face::Down);
                }
            }
        }
    }

    /// Checks that every card is in exactly one pile and that the card table
    /// agrees with pile membership.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen = [false; DECK_LEN];
        for pile in self.piles() {
            for &card in pile.cards() {
                let idx = card.index() as usize;
                if seen[idx] {
                    return Err(format!("{card} appears in more than one place"));
                }
                seen[idx] = true;
                if self.pile_of(card) != Some(pile.id()) {
                    return Err(format!(
                        "{card} lies in {} but claims {:?}",
                        pile.id(),
                        self.pile_of(card)
                    ));
                }
            }
        }
        for (idx, state) in self.cards.iter().enumerate() {
            if state.pile.is_some() && !seen[idx] {
                return Err(format!("{} claims a pile it is not in", Card(idx as u8)));
            }
        }
        Ok(())
    }

    /// True if all 52 cards are on the board.
    pub fn holds_full_deck(&self) -> bool {
        self.piles().map(Pile::len).sum::<usize>() == DECK_LEN
            && self.check_invariants().is_ok()
    }
}
