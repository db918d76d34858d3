//! Property-based round-trip tests for the wire codec.

use proptest::prelude::*;
use proptest::sample::subsequence;

use crate::domain::{Card, DealType, Rank, Seat, SeatMap, Suit, SEATS};
use crate::protocol::{decode, Message};

fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for suit in [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades] {
        for rank in [
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
            Rank::Ten,
            Rank::Jack,
            Rank::Queen,
            Rank::King,
            Rank::Ace,
        ] {
            deck.push(Card::new(rank, suit));
        }
    }
    deck
}

fn seat() -> impl Strategy<Value = Seat> {
    prop_oneof![
        Just(Seat::North),
        Just(Seat::East),
        Just(Seat::South),
        Just(Seat::West),
    ]
}

fn deal_type() -> impl Strategy<Value = DealType> {
    prop_oneof![
        Just(DealType::Tricks),
        Just(DealType::Hearts),
        Just(DealType::Queens),
        Just(DealType::Lords),
        Just(DealType::KingOfHearts),
        Just(DealType::SeventhAndLast),
        Just(DealType::Bandit),
    ]
}

/// `count` distinct cards in random order.
fn cards(count: impl Into<proptest::sample::SizeRange>) -> impl Strategy<Value = Vec<Card>> {
    subsequence(full_deck(), count).prop_shuffle()
}

// Values are bounded so every generated message fits the 50-byte line cap.
fn points() -> impl Strategy<Value = SeatMap<u32>> {
    prop::array::uniform4(0u32..=99_999_999).prop_map(SeatMap)
}

fn message() -> impl Strategy<Value = Message> {
    prop_oneof![
        seat().prop_map(|seat| Message::Iam { seat }),
        subsequence(SEATS.to_vec(), 1..=4)
            .prop_shuffle()
            .prop_map(|seats| Message::Busy { seats }),
        (deal_type(), seat(), cards(13)).prop_map(|(deal_type, opener, cards)| Message::Deal {
            deal_type,
            opener,
            cards,
        }),
        (1u8..=13, cards(0..=3)).prop_map(|(number, cards)| Message::Trick { number, cards }),
        (1u8..=13).prop_map(|number| Message::Wrong { number }),
        (1u8..=13, cards(4), seat()).prop_map(|(number, cards, winner)| Message::Taken {
            number,
            cards,
            winner,
        }),
        points().prop_map(|points| Message::Score { points }),
        points().prop_map(|points| Message::Total { points }),
    ]
}

proptest! {
    /// Every legal message survives an encode/decode round trip unchanged.
    #[test]
    fn prop_decode_inverts_encode(message in message()) {
        let line = message.encode();
        prop_assert!(line.len() <= crate::protocol::MAX_LINE_BYTES);
        prop_assert_eq!(decode(&line), Ok(message));
    }

    /// Whatever the decoder accepts, its canonical re-encoding decodes to
    /// the same value.
    #[test]
    fn prop_reencoding_is_stable(input in "[A-Z0-9]{0,20}") {
        let line = format!("{input}\r\n");
        if let Ok(message) = decode(&line) {
            prop_assert_eq!(decode(&message.encode()), Ok(message));
        }
    }

    /// The decoder never panics, whatever the bytes.
    #[test]
    fn prop_decode_never_panics(input in "\\PC{0,60}") {
        let _ = decode(&input);
    }
}
