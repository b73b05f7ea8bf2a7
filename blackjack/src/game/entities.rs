use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use super::constants;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    #[serde(rename = "♠")]
    Spade,
    #[serde(rename = "♥")]
    Heart,
    #[serde(rename = "♦")]
    Diamond,
    #[serde(rename = "♣")]
    Club,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Spade, Self::Heart, Self::Diamond, Self::Club];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Spade => "♠",
            Self::Heart => "♥",
            Self::Diamond => "♦",
            Self::Club => "♣",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Rank {
    pub const ALL: [Self; 13] = [
        Self::Ace,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
    ];

    /// Pip value of a non-ace rank. Aces contribute 0 here and are
    /// resolved by [`hand_value`].
    #[must_use]
    pub const fn base_value(self) -> u32 {
        match self {
            Self::Ace => 0,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
            Self::Nine => 9,
            Self::Ten | Self::Jack | Self::Queen | Self::King => 10,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Ace => "A",
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
        };
        write!(f, "{repr}")
    }
}

/// A card is a (rank, suit) pair. Equality is by value; there is no
/// identity beyond it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Card(pub Rank, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.0, self.1)
    }
}

/// Drawing from an empty deck. Unreachable in a normal round (a full
/// table of 6 players plus the dealer cannot exhaust 52 cards); treated
/// as a defensive invariant, not a recoverable condition.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("deck is empty")]
pub struct EmptyDeckError;

/// A single 52-card deck, consumed from the back.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Rebuild all 52 cards, then shuffle.
    pub fn reset(&mut self) {
        self.cards.clear();
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                self.cards.push(Card(rank, suit));
            }
        }
        self.shuffle();
    }

    /// Uniform random permutation (Fisher–Yates).
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
    }

    /// Remove and return the last card.
    pub fn draw(&mut self) -> Result<Card, EmptyDeckError> {
        self.cards.pop().ok_or(EmptyDeckError)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut deck = Self {
            cards: Vec::with_capacity(constants::DECK_SIZE),
        };
        deck.reset();
        deck
    }
}

/// Blackjack value of a hand.
///
/// Non-ace ranks sum first (faces count 10), then each ace in sequence
/// counts 11 if that keeps the running total at or under 21, else 1.
/// The sequential rule means `A,A` is 12 and `A,A,A` is 13; it is not
/// re-solved globally for many aces.
#[must_use]
pub fn hand_value(cards: &[Card]) -> u32 {
    let mut value = 0;
    let mut aces = 0;
    for card in cards {
        if card.0 == Rank::Ace {
            aces += 1;
        } else {
            value += card.0.base_value();
        }
    }
    for _ in 0..aces {
        if value + 11 <= constants::BLACKJACK {
            value += 11;
        } else {
            value += 1;
        }
    }
    value
}

/// Whether a hand is over 21.
#[must_use]
pub fn is_bust(cards: &[Card]) -> bool {
    hand_value(cards) > constants::BLACKJACK
}

/// Type alias for whole credits. Bets and stacks are whole multiples of
/// the bet step, so there is nothing smaller to represent.
pub type Credits = u32;

/// Connection-scoped player identity, minted by the transport layer.
pub type PlayerId = Uuid;

/// Per-player outcome of a settled round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Lose,
    Push,
    Bust,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Win => "win",
            Self::Lose => "lose",
            Self::Push => "push",
            Self::Bust => "bust",
        };
        write!(f, "{repr}")
    }
}

/// A seated player. Seating order is join order and doubles as turn
/// order for the round.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub credits: Credits,
    pub bet: Credits,
    pub rounds_won: u32,
    pub is_host: bool,
    pub has_acted: bool,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, is_host: bool) -> Self {
        Self {
            id,
            name: name.into(),
            hand: Vec::with_capacity(4),
            credits: constants::STARTING_CREDITS,
            bet: 0,
            rounds_won: 0,
            is_host,
            has_acted: false,
        }
    }

    #[must_use]
    pub fn hand_value(&self) -> u32 {
        hand_value(&self.hand)
    }

    pub fn clear_hand(&mut self) {
        self.hand.clear();
    }

    #[must_use]
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            credits: self.credits,
            bet: self.bet,
            rounds_won: self.rounds_won,
            is_host: self.is_host,
            hand: self.hand.clone(),
            value: self.hand_value(),
        }
    }
}

/// The house hand. One per room, hand cleared every round, never
/// removed.
#[derive(Clone, Debug, Default)]
pub struct Dealer {
    pub hand: Vec<Card>,
    pub rounds_won: u32,
}

impl Dealer {
    #[must_use]
    pub fn hand_value(&self) -> u32 {
        hand_value(&self.hand)
    }

    pub fn clear_hand(&mut self) {
        self.hand.clear();
    }

    /// View with the hole card (the second card dealt) masked as null.
    #[must_use]
    pub fn masked_view(&self) -> DealerView {
        DealerView {
            hand: self
                .hand
                .iter()
                .enumerate()
                .map(|(i, card)| if i == 1 { None } else { Some(*card) })
                .collect(),
            value: None,
        }
    }

    /// Fully revealed view, used from the dealer's turn onward.
    #[must_use]
    pub fn view(&self) -> DealerView {
        DealerView {
            hand: self.hand.iter().copied().map(Some).collect(),
            value: Some(self.hand_value()),
        }
    }
}

/// Player state as broadcast to the room.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub credits: Credits,
    pub bet: Credits,
    pub rounds_won: u32,
    pub is_host: bool,
    pub hand: Vec<Card>,
    pub value: u32,
}

/// Dealer state as broadcast to the room. A `None` entry is a card that
/// is dealt but hidden.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerView {
    pub hand: Vec<Option<Card>>,
    pub value: Option<u32>,
}
