//! Domain layer: pure card-game types and helpers.

pub mod cards;
pub mod deal;
pub mod seats;
pub mod tricks;

pub use cards::{parse_card_list, Card, CardParseError, Rank, Suit};
pub use deal::DealType;
pub use seats::{Seat, SeatMap, SEATS};
pub use tricks::{card_beats, follow_moves, hand_has_suit, trick_winner};
