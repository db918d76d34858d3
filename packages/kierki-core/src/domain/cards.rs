//! Core card types: `Suit`, `Rank`, `Card`, and their wire text forms.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid card token: {0:?}")]
pub struct CardParseError(pub String);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const fn letter(self) -> char {
        match self {
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
            Suit::Spades => 'S',
        }
    }

    pub fn from_letter(letter: char) -> Option<Suit> {
        match letter {
            'H' => Some(Suit::Hearts),
            'D' => Some(Suit::Diamonds),
            'C' => Some(Suit::Clubs),
            'S' => Some(Suit::Spades),
            _ => None,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// Numeric strength used for trick resolution: 2..=10, J=11, Q=12,
    /// K=13, A=14.
    pub const fn value(self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 14,
        }
    }

    /// The printed figure. `"10"` is the only two-character one.
    pub const fn figure(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }

    pub fn from_figure(figure: &str) -> Option<Rank> {
        match figure {
            "2" => Some(Rank::Two),
            "3" => Some(Rank::Three),
            "4" => Some(Rank::Four),
            "5" => Some(Rank::Five),
            "6" => Some(Rank::Six),
            "7" => Some(Rank::Seven),
            "8" => Some(Rank::Eight),
            "9" => Some(Rank::Nine),
            "10" => Some(Rank::Ten),
            "J" => Some(Rank::Jack),
            "Q" => Some(Rank::Queen),
            "K" => Some(Rank::King),
            "A" => Some(Rank::Ace),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }
}

// Ord on Card is only for stable sorting and set dedup: suit order, then the
// figure as a string (so "10" sorts before "2"). Trick strength goes through
// `Rank::value` and `card_beats` instead.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.suit
            .cmp(&other.suit)
            .then_with(|| self.rank.figure().cmp(other.rank.figure()))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.figure(), self.suit.letter())
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CardParseError(s.to_string());
        if !s.is_ascii() || s.len() < 2 {
            return Err(err());
        }
        let (figure, suit) = s.split_at(s.len() - 1);
        let rank = Rank::from_figure(figure).ok_or_else(err)?;
        let suit = suit.chars().next().and_then(Suit::from_letter).ok_or_else(err)?;
        Ok(Card { rank, suit })
    }
}

/// Parse a concatenated card list such as `"ASKH10D"`.
///
/// The scan is greedy against `(10|[2-9JQKA])[HDCS]`, must consume the whole
/// input, and rejects duplicate cards.
pub fn parse_card_list(input: &str) -> Result<Vec<Card>, CardParseError> {
    let err = || CardParseError(input.to_string());
    if !input.is_ascii() {
        return Err(err());
    }

    let mut cards: Vec<Card> = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        let token_len = if rest.starts_with("10") { 3 } else { 2 };
        if rest.len() < token_len {
            return Err(err());
        }
        let (token, tail) = rest.split_at(token_len);
        let card: Card = token.parse().map_err(|_| err())?;
        if cards.contains(&card) {
            return Err(err());
        }
        cards.push(card);
        rest = tail;
    }
    Ok(cards)
}
