//! Trick comparison and the must-follow rule.

use super::cards::{Card, Suit};
use super::seats::Seat;

pub fn hand_has_suit(hand: &[Card], suit: Suit) -> bool {
    hand.iter().any(|c| c.suit == suit)
}

/// Whether `a` beats `b` in a trick led with `lead`.
///
/// Same suit: the higher rank wins. Different suits: the lead-suit card
/// wins; two off-suit cards never beat each other.
pub fn card_beats(a: Card, b: Card, lead: Suit) -> bool {
    if a.suit == b.suit {
        a.rank.value() > b.rank.value()
    } else {
        a.suit == lead
    }
}

/// The cards a player holding `hand` may play. With no lead yet, anything;
/// otherwise the lead-suit cards, or anything when the hand is void in the
/// lead suit.
pub fn follow_moves(hand: &[Card], lead: Option<Suit>) -> Vec<Card> {
    if let Some(lead) = lead {
        if hand_has_suit(hand, lead) {
            return hand.iter().copied().filter(|c| c.suit == lead).collect();
        }
    }
    hand.to_vec()
}

/// The seat that takes a trick opened by `opener`, given the four cards in
/// play order.
pub fn trick_winner(opener: Seat, cards: &[Card; 4]) -> Seat {
    let lead = cards[0].suit;
    let mut best = 0;
    for i in 1..4 {
        if card_beats(cards[i], cards[best], lead) {
            best = i;
        }
    }
    opener.offset(best)
}
