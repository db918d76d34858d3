//! Deal schedule loading. Each deal is a header line `<type><opener>`
//! followed by four 13-card hand lines in N, E, S, W order.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use thiserror::Error;

use kierki_core::domain::{parse_card_list, Card, DealType, Seat, SeatMap, SEATS};

#[derive(Debug, Clone)]
pub struct ScheduledDeal {
    pub deal_type: DealType,
    pub opener: Seat,
    pub hands: SeatMap<Vec<Card>>,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("failed to read schedule file: {0}")]
    Io(#[from] std::io::Error),

    #[error("schedule line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("schedule contains no deals")]
    Empty,
}

pub fn load_schedule(path: &Path) -> Result<Vec<ScheduledDeal>, ScheduleError> {
    parse_schedule(&fs::read_to_string(path)?)
}

pub fn parse_schedule(input: &str) -> Result<Vec<ScheduledDeal>, ScheduleError> {
    let parse_error = |line: usize, message: String| ScheduleError::Parse {
        line: line + 1,
        message,
    };

    let mut deals = Vec::new();
    let mut lines = input.lines().enumerate();
    while let Some((header_no, header)) = lines.next() {
        let mut chars = header.chars();
        let deal_type = chars
            .next()
            .and_then(DealType::from_digit)
            .ok_or_else(|| parse_error(header_no, format!("invalid deal type in {header:?}")))?;
        let opener = chars
            .next()
            .and_then(Seat::from_letter)
            .ok_or_else(|| parse_error(header_no, format!("invalid opening seat in {header:?}")))?;
        if chars.next().is_some() {
            return Err(parse_error(
                header_no,
                format!("trailing characters after deal header {header:?}"),
            ));
        }

        let mut hands: SeatMap<Vec<Card>> = SeatMap::default();
        for seat in SEATS {
            let (hand_no, hand_line) = lines
                .next()
                .ok_or_else(|| parse_error(header_no, format!("missing hand line for seat {seat}")))?;
            let cards = parse_card_list(hand_line)
                .map_err(|error| parse_error(hand_no, format!("seat {seat}: {error}")))?;
            if cards.len() != 13 {
                return Err(parse_error(
                    hand_no,
                    format!("seat {seat} holds {} cards instead of 13", cards.len()),
                ));
            }
            hands[seat] = cards;
        }

        // Four disjoint 13-card hands are exactly the 52-card pack.
        let distinct: HashSet<Card> = hands.values().flatten().copied().collect();
        if distinct.len() != 52 {
            return Err(parse_error(
                header_no,
                "hands do not form a full 52-card pack".to_string(),
            ));
        }

        deals.push(ScheduledDeal {
            deal_type,
            opener,
            hands,
        });
    }

    if deals.is_empty() {
        return Err(ScheduleError::Empty);
    }
    Ok(deals)
}
