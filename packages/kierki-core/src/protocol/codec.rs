use thiserror::Error;

use crate::domain::{parse_card_list, DealType, Seat, SeatMap, SEATS};
use crate::protocol::message::Message;

/// Maximum length of a wire line, CRLF included.
pub const MAX_LINE_BYTES: usize = 50;

/// A byte sequence that failed to decode as any known message. Never fatal
/// at the transport layer: the receiver logs it and keeps reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed message: {0}")]
pub struct DecodeError(pub String);

fn malformed(reason: impl Into<String>) -> DecodeError {
    DecodeError(reason.into())
}

/// Decode one CRLF-terminated wire line.
///
/// The line must be at most [`MAX_LINE_BYTES`] long and end in exactly one
/// CRLF. The trick number in TRICK and TAKEN is one or two digits wide and
/// sits directly against a card list whose first card may start with a
/// digit (`10…`); the ambiguity is resolved by whole-message validity,
/// trying the one-digit split first.
pub fn decode(line: &str) -> Result<Message, DecodeError> {
    if line.len() > MAX_LINE_BYTES {
        return Err(malformed(format!(
            "line exceeds {MAX_LINE_BYTES} bytes ({} bytes)",
            line.len()
        )));
    }
    if !line.is_ascii() {
        return Err(malformed("line contains non-ASCII bytes"));
    }
    let body = line
        .strip_suffix("\r\n")
        .ok_or_else(|| malformed("line does not end with CRLF"))?;
    if body.contains('\r') || body.contains('\n') {
        return Err(malformed("line terminator inside message"));
    }

    if let Some(payload) = body.strip_prefix("IAM") {
        return parse_iam(payload);
    }
    if let Some(payload) = body.strip_prefix("BUSY") {
        return parse_busy(payload);
    }
    if let Some(payload) = body.strip_prefix("DEAL") {
        return parse_deal(payload);
    }
    if let Some(payload) = body.strip_prefix("TRICK") {
        return parse_trick(payload);
    }
    if let Some(payload) = body.strip_prefix("WRONG") {
        return parse_wrong(payload);
    }
    if let Some(payload) = body.strip_prefix("TAKEN") {
        return parse_taken(payload);
    }
    if let Some(payload) = body.strip_prefix("SCORE") {
        return parse_points(payload).map(|points| Message::Score { points });
    }
    if let Some(payload) = body.strip_prefix("TOTAL") {
        return parse_points(payload).map(|points| Message::Total { points });
    }
    Err(malformed("unknown message tag"))
}

fn parse_iam(payload: &str) -> Result<Message, DecodeError> {
    let seat = payload
        .parse::<Seat>()
        .map_err(|_| malformed("IAM requires exactly one seat letter"))?;
    Ok(Message::Iam { seat })
}

fn parse_busy(payload: &str) -> Result<Message, DecodeError> {
    if payload.is_empty() || payload.len() > 4 {
        return Err(malformed("BUSY carries 1 to 4 seats"));
    }
    let mut seats = Vec::with_capacity(payload.len());
    for letter in payload.chars() {
        let seat =
            Seat::from_letter(letter).ok_or_else(|| malformed("BUSY contains an invalid seat"))?;
        if seats.contains(&seat) {
            return Err(malformed("BUSY repeats a seat"));
        }
        seats.push(seat);
    }
    Ok(Message::Busy { seats })
}

fn parse_deal(payload: &str) -> Result<Message, DecodeError> {
    let mut chars = payload.chars();
    let deal_type = chars
        .next()
        .and_then(DealType::from_digit)
        .ok_or_else(|| malformed("DEAL requires a deal type 1..7"))?;
    let opener = chars
        .next()
        .and_then(Seat::from_letter)
        .ok_or_else(|| malformed("DEAL requires an opening seat"))?;
    let cards = parse_card_list(chars.as_str())
        .map_err(|_| malformed("DEAL carries an invalid card list"))?;
    if cards.len() != 13 {
        return Err(malformed(format!(
            "DEAL requires exactly 13 cards, got {}",
            cards.len()
        )));
    }
    Ok(Message::Deal {
        deal_type,
        opener,
        cards,
    })
}

fn parse_trick(payload: &str) -> Result<Message, DecodeError> {
    for (number, rest) in number_splits(payload) {
        let Ok(cards) = parse_card_list(rest) else {
            continue;
        };
        if cards.len() > 3 {
            continue;
        }
        return Ok(Message::Trick { number, cards });
    }
    Err(malformed("invalid TRICK message"))
}

fn parse_wrong(payload: &str) -> Result<Message, DecodeError> {
    for (number, rest) in number_splits(payload) {
        if rest.is_empty() {
            return Ok(Message::Wrong { number });
        }
    }
    Err(malformed("invalid WRONG message"))
}

fn parse_taken(payload: &str) -> Result<Message, DecodeError> {
    for (number, rest) in number_splits(payload) {
        let Some(winner) = rest
            .chars()
            .next_back()
            .and_then(Seat::from_letter)
        else {
            continue;
        };
        let Ok(cards) = parse_card_list(&rest[..rest.len() - 1]) else {
            continue;
        };
        if cards.len() != 4 {
            continue;
        }
        return Ok(Message::Taken {
            number,
            cards,
            winner,
        });
    }
    Err(malformed("invalid TAKEN message"))
}

/// The candidate (trick number, remainder) splits of a payload, one-digit
/// split first, then two-digit. Only numbers 1..=13 are produced.
fn number_splits(payload: &str) -> impl Iterator<Item = (u8, &str)> + '_ {
    [1usize, 2].into_iter().filter_map(|width| {
        let digits = payload.get(..width)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let number = digits.parse::<u8>().ok()?;
        if !(1..=13).contains(&number) {
            return None;
        }
        Some((number, &payload[width..]))
    })
}

fn parse_points(payload: &str) -> Result<SeatMap<u32>, DecodeError> {
    let mut points: SeatMap<Option<u32>> = SeatMap::default();
    let mut rest = payload;
    while !rest.is_empty() {
        let mut chars = rest.chars();
        let seat = chars
            .next()
            .and_then(Seat::from_letter)
            .ok_or_else(|| malformed("score group must start with a seat"))?;
        let digits: &str = chars.as_str();
        let digit_count = digits
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digit_count == 0 {
            return Err(malformed("score group requires a decimal value"));
        }
        let value = digits[..digit_count]
            .parse::<u32>()
            .map_err(|_| malformed("score value out of range"))?;
        if points[seat].replace(value).is_some() {
            return Err(malformed("score repeats a seat"));
        }
        rest = &digits[digit_count..];
    }

    let mut resolved: SeatMap<u32> = SeatMap::default();
    for seat in SEATS {
        resolved[seat] = points[seat].ok_or_else(|| malformed("score is missing a seat"))?;
    }
    Ok(resolved)
}
