//! Numbered deals: a game number always produces the same deck.
//!
//! Numbers follow the PySol convention so a deal can be looked up by the
//! number other solitaire programs show:
//!
//! - `msNNNN`, or any number below 32000, uses the 31-bit LCG of the
//!   classic Microsoft deals.
//! - Every other number, however large, seeds MT19937 from its full value.
//!
//! Either way the generator drives a Fisher-Yates shuffle over the deck
//! built Clubs, Spades, Hearts, Diamonds (Ace..King within each suit), and
//! the shuffled talon is dealt from its end.

use core::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use tracing::instrument;

use crate::card::{CARDS_PER_DECK, Card, NUM_RANKS, Rank, Suit};

const DECK_LEN: usize = CARDS_PER_DECK as usize;

/// Suit creation order of the numbered-deal shuffle.
const SHUFFLE_SUITS: [Suit; 4] = [Suit::Clubs, Suit::Spades, Suit::Hearts, Suit::Diamonds];

/// Below this, plain numbers use the LCG.
const LCG_LIMIT: u32 = 32000;

/// Error produced when a game number cannot be parsed or dealt.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Deal number error: {} at {}:{}", message, file, line)]
pub struct DealNumberError {
    pub message: String,
    pub line: u32,
    pub file: &'static str,
}

impl DealNumberError {
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

/// A normalized game number.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DealNumber {
    /// `ms`-prefixed deal.
    Ms(u64),
    Plain(BigUint),
}

impl fmt::Display for DealNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DealNumber::Ms(n) => write!(f, "ms{n}"),
            DealNumber::Plain(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for DealNumber {
    type Err = DealNumberError;

    /// Whitespace and `# - _ . ,` are ignored, as is a trailing `L`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_suffix('L').unwrap_or(trimmed);
        let cleaned: String = trimmed
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '#' | '-' | '_' | '.' | ','))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if cleaned.is_empty() {
            return Err(DealNumberError::new("empty game number"));
        }
        let (is_ms, digits) = match cleaned.strip_prefix("ms") {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DealNumberError::new(format!("{s:?} is not a game number")));
        }
        if is_ms {
            let n = digits
                .parse()
                .map_err(|_| DealNumberError::new(format!("ms number {s:?} is too large")))?;
            return Ok(DealNumber::Ms(n));
        }
        BigUint::parse_bytes(digits.as_bytes(), 10)
            .map(DealNumber::Plain)
            .ok_or_else(|| DealNumberError::new(format!("could not parse {s:?}")))
    }
}

impl DealNumber {
    /// The deck this number deals, top of the talon first.
    #[instrument(level = "debug", skip(self), fields(number = %self))]
    pub fn deck(&self) -> Result<[Card; DECK_LEN], DealNumberError> {
        let mut talon: Vec<Card> = SHUFFLE_SUITS
            .iter()
            .flat_map(|&s| (0..NUM_RANKS).map(move |r| Card::new(s, Rank::from_u8(r))))
            .collect();

        match self {
            DealNumber::Ms(n) => Lcg31::new(*n)?.shuffle(&mut talon),
            DealNumber::Plain(n) if *n < BigUint::from(LCG_LIMIT) => {
                let small = n.to_u64().unwrap_or_default();
                Lcg31::new(small)?.shuffle(&mut talon);
            }
            DealNumber::Plain(n) => Mt19937::from_big(n).shuffle(&mut talon),
        }
        talon.reverse();

        let mut deck = [Card(0); DECK_LEN];
        deck.copy_from_slice(&talon);
        Ok(deck)
    }
}

/// Generators that support `randint(a, b)`-style draws.
trait IntSource {
    /// Uniform-ish integer in `0..=upper`.
    fn up_to(&mut self, upper: usize) -> usize;

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for n in (1..items.len()).rev() {
            let j = self.up_to(n);
            items.swap(n, j);
        }
    }
}

/// 31-bit linear congruential generator (Microsoft deals).
struct Lcg31 {
    seed: u64,
    state: u64,
}

impl Lcg31 {
    const MAX_SEED: u64 = (1 << 33) - 1;

    fn new(seed: u64) -> Result<Self, DealNumberError> {
        if !(1..=Self::MAX_SEED).contains(&seed) {
            return Err(DealNumberError::new(format!(
                "LCG deals run 1..={}, got {seed}",
                Self::MAX_SEED
            )));
        }
        let state = if seed < 1 << 32 { seed } else { seed - (1 << 32) };
        Ok(Lcg31 { seed, state })
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(214_013).wrapping_add(2_531_011) & Self::MAX_SEED;
        self.state >> 16
    }

    fn next_value(&mut self) -> usize {
        if self.seed < 1 << 32 {
            let r = (self.step() & 0x7fff) as usize;
            if self.seed < 1 << 31 { r } else { r | 0x8000 }
        } else {
            (self.step() & 0xffff) as usize + 1
        }
    }
}

impl IntSource for Lcg31 {
    fn up_to(&mut self, upper: usize) -> usize {
        self.next_value() % (upper + 1)
    }
}

const MT_N: usize = 624;
const MT_M: usize = 397;

/// Mersenne Twister seeded the way CPython seeds `random.Random(int)`.
struct Mt19937 {
    state: [u32; MT_N],
    index: usize,
}

impl Mt19937 {
    fn from_big(seed: &BigUint) -> Self {
        let mut key = seed.to_u32_digits();
        if key.is_empty() {
            key.push(0);
        }
        let mut mt = Mt19937 {
            state: [0; MT_N],
            index: MT_N,
        };
        mt.seed_array(&key);
        mt
    }

    fn seed_word(&mut self, s: u32) {
        self.state[0] = s;
        for i in 1..MT_N {
            let prev = self.state[i - 1];
            self.state[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        self.index = MT_N;
    }

    fn seed_array(&mut self, key: &[u32]) {
        self.seed_word(19_650_218);
        let (mut i, mut j) = (1usize, 0usize);
        for _ in 0..MT_N.max(key.len()) {
            let prev = self.state[i - 1];
            self.state[i] = (self.state[i] ^ 1_664_525u32.wrapping_mul(prev ^ (prev >> 30)))
                .wrapping_add(key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= MT_N {
                self.state[0] = self.state[MT_N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..MT_N - 1 {
            let prev = self.state[i - 1];
            self.state[i] = (self.state[i] ^ 1_566_083_941u32.wrapping_mul(prev ^ (prev >> 30)))
                .wrapping_sub(i as u32);
            i += 1;
            if i >= MT_N {
                self.state[0] = self.state[MT_N - 1];
                i = 1;
            }
        }
        self.state[0] = 0x8000_0000;
        self.index = MT_N;
    }

    fn refill(&mut self) {
        for i in 0..MT_N {
            let y = (self.state[i] & 0x8000_0000) | (self.state[(i + 1) % MT_N] & 0x7fff_ffff);
            let mag = if y & 1 == 0 { 0 } else { 0x9908_b0df };
            self.state[i] = self.state[(i + MT_M) % MT_N] ^ (y >> 1) ^ mag;
        }
        self.index = 0;
    }

    fn next_u32(&mut self) -> u32 {
        if self.index >= MT_N {
            self.refill();
        }
        let mut y = self.state[self.index];
        self.index += 1;
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^ (y >> 18)
    }

    /// 53-bit float in [0, 1), CPython's `random()`.
    fn next_f64(&mut self) -> f64 {
        let a = u64::from(self.next_u32() >> 5);
        let b = u64::from(self.next_u32() >> 6);
        ((a << 26) + b) as f64 / (1u64 << 53) as f64
    }
}

impl IntSource for Mt19937 {
    fn up_to(&mut self, upper: usize) -> usize {
        (self.next_f64() * (upper + 1) as f64) as usize
    }
}
