/// Property-based tests for deck integrity, hand valuation, and
/// settlement arithmetic.
use proptest::prelude::*;

use blackjack::{
    Card, Rank, Suit,
    entities::{Deck, Outcome, hand_value},
    game::settle,
};

fn arb_card() -> impl Strategy<Value = Card> {
    (
        prop::sample::select(Rank::ALL.to_vec()),
        prop::sample::select(Suit::ALL.to_vec()),
    )
        .prop_map(|(rank, suit)| Card(rank, suit))
}

fn arb_hand() -> impl Strategy<Value = Vec<Card>> {
    prop::collection::vec(arb_card(), 0..12)
}

proptest! {
    /// Every reset yields all 52 distinct cards, whatever order the
    /// shuffle picked.
    #[test]
    fn deck_reset_is_a_permutation(_seed in 0u8..32) {
        let mut deck = Deck::default();
        let mut seen = std::collections::HashSet::new();
        while let Ok(card) = deck.draw() {
            prop_assert!(seen.insert(card), "duplicate card {card}");
        }
        prop_assert_eq!(seen.len(), 52);
    }

    /// The greedy ace rule stays inside hard bounds: at least every
    /// card at its minimum, at most one ace promoted to 11.
    #[test]
    fn hand_value_bounds(hand in arb_hand()) {
        let aces = hand.iter().filter(|c| c.0 == Rank::Ace).count() as u32;
        let floor: u32 = hand.iter().map(|c| c.0.base_value()).sum::<u32>() + aces;
        let value = hand_value(&hand);
        prop_assert!(value >= floor);
        prop_assert!(value <= floor + 10);
        if aces == 0 {
            prop_assert_eq!(value, floor);
        }
    }

    /// Drawing another card never lowers a hand's value.
    #[test]
    fn hand_value_is_monotone(hand in arb_hand(), extra in arb_card()) {
        let before = hand_value(&hand);
        let mut grown = hand;
        grown.push(extra);
        prop_assert!(hand_value(&grown) >= before);
    }

    /// Settlement never pays more than double the stake, pays the
    /// stake back exactly on a push, and a busted player never wins —
    /// even against a busted dealer.
    #[test]
    fn settlement_pays_within_bounds(
        player in 2u32..30,
        dealer in 2u32..30,
        bet in (1u32..11).prop_map(|n| n * 10),
    ) {
        let (outcome, winnings) = settle(player, dealer, bet);
        prop_assert!(winnings <= 2 * bet);
        match outcome {
            Outcome::Bust => {
                prop_assert!(player > 21);
                prop_assert_eq!(winnings, 0);
            }
            Outcome::Win => {
                prop_assert!(player <= 21);
                prop_assert_eq!(winnings, 2 * bet);
            }
            Outcome::Push => {
                prop_assert_eq!(player, dealer);
                prop_assert_eq!(winnings, bet);
            }
            Outcome::Lose => {
                prop_assert!(dealer <= 21 && player < dealer);
                prop_assert_eq!(winnings, 0);
            }
        }
    }
}
