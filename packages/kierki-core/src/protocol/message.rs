use std::fmt;

use crate::domain::{Card, DealType, Seat, SeatMap, SEATS};

/// One protocol message. Every variant encodes to a single CRLF-terminated
/// line and decodes back to an identical value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Seat claim, client to server.
    Iam { seat: Seat },
    /// Seat rejection listing the occupied seats.
    Busy { seats: Vec<Seat> },
    /// Hand for the starting deal: deal type, opening seat, 13 cards.
    Deal {
        deal_type: DealType,
        opener: Seat,
        cards: Vec<Card>,
    },
    /// As a prompt: the trick number and the 0..=3 cards on the table.
    /// As a reply: the trick number and exactly the card being played.
    Trick { number: u8, cards: Vec<Card> },
    /// Rejection of an illegal TRICK reply.
    Wrong { number: u8 },
    /// A completed trick: its four cards in play order and the taker.
    Taken {
        number: u8,
        cards: Vec<Card>,
        winner: Seat,
    },
    /// Per-seat scores for the deal that just ended.
    Score { points: SeatMap<u32> },
    /// Per-seat cumulative scores.
    Total { points: SeatMap<u32> },
}

/// Bare message discriminant, used by the awaiting latch.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MessageType {
    Iam,
    Busy,
    Deal,
    Trick,
    Wrong,
    Taken,
    Score,
    Total,
}

impl MessageType {
    pub const fn tag(self) -> &'static str {
        match self {
            MessageType::Iam => "IAM",
            MessageType::Busy => "BUSY",
            MessageType::Deal => "DEAL",
            MessageType::Trick => "TRICK",
            MessageType::Wrong => "WRONG",
            MessageType::Taken => "TAKEN",
            MessageType::Score => "SCORE",
            MessageType::Total => "TOTAL",
        }
    }
}

impl Message {
    pub const fn message_type(&self) -> MessageType {
        match self {
            Message::Iam { .. } => MessageType::Iam,
            Message::Busy { .. } => MessageType::Busy,
            Message::Deal { .. } => MessageType::Deal,
            Message::Trick { .. } => MessageType::Trick,
            Message::Wrong { .. } => MessageType::Wrong,
            Message::Taken { .. } => MessageType::Taken,
            Message::Score { .. } => MessageType::Score,
            Message::Total { .. } => MessageType::Total,
        }
    }

    /// Canonical wire form, CRLF terminator included. SCORE and TOTAL emit
    /// seats in canonical N, E, S, W order.
    pub fn encode(&self) -> String {
        let mut line = String::from(self.message_type().tag());
        match self {
            Message::Iam { seat } => line.push(seat.letter()),
            Message::Busy { seats } => {
                for seat in seats {
                    line.push(seat.letter());
                }
            }
            Message::Deal {
                deal_type,
                opener,
                cards,
            } => {
                line.push(deal_type.digit());
                line.push(opener.letter());
                push_cards(&mut line, cards);
            }
            Message::Trick { number, cards } => {
                line.push_str(&number.to_string());
                push_cards(&mut line, cards);
            }
            Message::Wrong { number } => line.push_str(&number.to_string()),
            Message::Taken {
                number,
                cards,
                winner,
            } => {
                line.push_str(&number.to_string());
                push_cards(&mut line, cards);
                line.push(winner.letter());
            }
            Message::Score { points } | Message::Total { points } => {
                for seat in SEATS {
                    line.push(seat.letter());
                    line.push_str(&points[seat].to_string());
                }
            }
        }
        line.push_str("\r\n");
        line
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Without the line terminator, for logs.
        let encoded = self.encode();
        f.write_str(encoded.trim_end_matches("\r\n"))
    }
}

fn push_cards(line: &mut String, cards: &[Card]) {
    for card in cards {
        line.push_str(card.rank.figure());
        line.push(card.suit.letter());
    }
}
