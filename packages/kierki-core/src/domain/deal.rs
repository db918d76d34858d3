//! Deal types and their per-trick scoring profiles.

use std::fmt;

use super::cards::{Card, Rank, Suit};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DealType {
    /// +1 per trick taken.
    Tricks,
    /// +1 per heart in the trick.
    Hearts,
    /// +5 per queen in the trick.
    Queens,
    /// +2 per jack or king in the trick.
    Lords,
    /// +18 if the king of hearts is in the trick.
    KingOfHearts,
    /// +10 on the 7th and the 13th trick.
    SeventhAndLast,
    /// All of the above combined.
    Bandit,
}

impl DealType {
    pub const fn digit(self) -> char {
        match self {
            DealType::Tricks => '1',
            DealType::Hearts => '2',
            DealType::Queens => '3',
            DealType::Lords => '4',
            DealType::KingOfHearts => '5',
            DealType::SeventhAndLast => '6',
            DealType::Bandit => '7',
        }
    }

    pub fn from_digit(digit: char) -> Option<DealType> {
        match digit {
            '1' => Some(DealType::Tricks),
            '2' => Some(DealType::Hearts),
            '3' => Some(DealType::Queens),
            '4' => Some(DealType::Lords),
            '5' => Some(DealType::KingOfHearts),
            '6' => Some(DealType::SeventhAndLast),
            '7' => Some(DealType::Bandit),
            _ => None,
        }
    }

    /// Points the winner of trick `trick_no` collects for `cards` under this
    /// deal type.
    pub fn trick_points(self, trick_no: u8, cards: &[Card]) -> u32 {
        let all = self == DealType::Bandit;
        let mut points = 0;

        if all || self == DealType::Tricks {
            points += 1;
        }
        if all || self == DealType::Hearts {
            points += cards.iter().filter(|c| c.suit == Suit::Hearts).count() as u32;
        }
        if all || self == DealType::Queens {
            points += 5 * cards.iter().filter(|c| c.rank == Rank::Queen).count() as u32;
        }
        if all || self == DealType::Lords {
            points += 2 * cards
                .iter()
                .filter(|c| c.rank == Rank::Jack || c.rank == Rank::King)
                .count() as u32;
        }
        if (all || self == DealType::KingOfHearts)
            && cards
                .iter()
                .any(|c| c.rank == Rank::King && c.suit == Suit::Hearts)
        {
            points += 18;
        }
        if (all || self == DealType::SeventhAndLast) && (trick_no == 7 || trick_no == 13) {
            points += 10;
        }

        points
    }
}

impl fmt::Display for DealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digit())
    }
}
