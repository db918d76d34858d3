//! Seats and seat-keyed storage. Four fixed positions, canonical order
//! (N, E, S, W), rotation is clockwise.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid seat: {0:?}")]
pub struct SeatParseError(pub String);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Seat {
    North,
    East,
    South,
    West,
}

/// Canonical seating order.
pub const SEATS: [Seat; 4] = [Seat::North, Seat::East, Seat::South, Seat::West];

impl Seat {
    pub const fn letter(self) -> char {
        match self {
            Seat::North => 'N',
            Seat::East => 'E',
            Seat::South => 'S',
            Seat::West => 'W',
        }
    }

    pub fn from_letter(letter: char) -> Option<Seat> {
        match letter {
            'N' => Some(Seat::North),
            'E' => Some(Seat::East),
            'S' => Some(Seat::South),
            'W' => Some(Seat::West),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Seat::North => 0,
            Seat::East => 1,
            Seat::South => 2,
            Seat::West => 3,
        }
    }

    /// The next seat clockwise (N → E → S → W → N).
    pub const fn next(self) -> Seat {
        self.offset(1)
    }

    /// The seat `steps` places clockwise from this one.
    pub const fn offset(self, steps: usize) -> Seat {
        SEATS[(self.index() + steps) % 4]
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Seat {
    type Err = SeatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next().and_then(Seat::from_letter), chars.next()) {
            (Some(seat), None) => Ok(seat),
            _ => Err(SeatParseError(s.to_string())),
        }
    }
}

/// Fixed-size storage keyed by seat, in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatMap<T>(pub [T; 4]);

impl<T> SeatMap<T> {
    pub fn iter(&self) -> impl Iterator<Item = (Seat, &T)> {
        SEATS.iter().copied().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }
}

impl<T> Index<Seat> for SeatMap<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &T {
        &self.0[seat.index()]
    }
}

impl<T> IndexMut<Seat> for SeatMap<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut T {
        &mut self.0[seat.index()]
    }
}
