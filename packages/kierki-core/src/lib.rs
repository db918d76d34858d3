//! Shared building blocks for the kierki server and client: the card and
//! seat domain model, the line-oriented wire codec, and read-side framing.

pub mod domain;
pub mod net;
pub mod protocol;

pub use domain::{Card, DealType, Rank, Seat, SeatMap, Suit};
pub use protocol::{decode, DecodeError, Message, MessageType, MAX_LINE_BYTES};
