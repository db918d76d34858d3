//! The client's view of the match: own hand, the table, taken piles and
//! scores, updated by server messages with strict preconditions.

use thiserror::Error;

use kierki_core::domain::{card_beats, follow_moves, Card, DealType, Seat, SeatMap, SEATS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("deal has not ended yet")]
    DealStillRunning,
    #[error("deal has ended")]
    DealOver,
    #[error("trick number is not correct")]
    TrickNumberMismatch,
    #[error("trick has ended")]
    TrickOver,
    #[error("score already received")]
    ScoreRepeated,
    #[error("total already received")]
    TotalRepeated,
}

/// Per-client match state. `verbose` turns on the interactive summaries.
#[derive(Debug)]
pub struct ClientGame {
    seat: Seat,
    verbose: bool,

    hand: Vec<Card>,
    table: Vec<Card>,
    taken_piles: Vec<Vec<Card>>,

    deal_type: Option<DealType>,
    deal_no: u32,
    trick_no: u8,
    points: u32,
    total_points: u32,

    deal_ended: bool,
    trick_ended: bool,
    got_score: bool,
    got_total: bool,
    pub waiting_for_move: bool,
}

impl ClientGame {
    pub fn new(seat: Seat, verbose: bool) -> ClientGame {
        ClientGame {
            seat,
            verbose,
            hand: Vec::new(),
            table: Vec::new(),
            taken_piles: Vec::new(),
            deal_type: None,
            deal_no: 0,
            trick_no: 1,
            points: 0,
            total_points: 0,
            deal_ended: true,
            trick_ended: true,
            got_score: false,
            got_total: false,
            waiting_for_move: false,
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn deal_type(&self) -> Option<DealType> {
        self.deal_type
    }

    pub fn deal_no(&self) -> u32 {
        self.deal_no
    }

    pub fn trick_no(&self) -> u8 {
        self.trick_no
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    pub fn deal_ended(&self) -> bool {
        self.deal_ended
    }

    pub fn on_deal(
        &mut self,
        deal_type: DealType,
        opener: Seat,
        cards: Vec<Card>,
    ) -> Result<(), StateError> {
        if !self.deal_ended {
            return Err(StateError::DealStillRunning);
        }
        self.deal_no += 1;
        self.deal_ended = false;
        self.got_score = false;
        self.got_total = false;
        self.trick_no = 1;
        self.trick_ended = true;
        self.waiting_for_move = false;
        self.deal_type = Some(deal_type);
        self.hand = cards;
        self.table.clear();
        self.taken_piles.clear();

        if self.verbose {
            println!(
                "New deal {deal_type}: starting place {opener}, your cards: {}.",
                card_list(&self.hand)
            );
        }
        Ok(())
    }

    pub fn on_trick(&mut self, number: u8, cards: Vec<Card>) -> Result<(), StateError> {
        if self.deal_ended {
            return Err(StateError::DealOver);
        }
        if number != self.trick_no {
            return Err(StateError::TrickNumberMismatch);
        }
        self.trick_ended = false;
        self.table = cards;
        self.waiting_for_move = true;

        if self.verbose {
            println!("Trick: ({}) {}", self.trick_no, card_list(&self.table));
            println!("Available: {}", card_list(&self.hand));
        }
        Ok(())
    }

    pub fn on_taken(
        &mut self,
        number: u8,
        cards: Vec<Card>,
        winner: Seat,
    ) -> Result<(), StateError> {
        if self.deal_ended {
            return Err(StateError::DealOver);
        }
        if number != self.trick_no {
            return Err(StateError::TrickNumberMismatch);
        }
        self.trick_ended = true;
        self.waiting_for_move = false;
        // Our own card is always among the four; drop whichever of them we
        // still hold.
        self.hand.retain(|held| !cards.contains(held));
        if winner == self.seat {
            self.taken_piles.push(cards.clone());
        }

        if self.verbose {
            println!(
                "A trick {number} is taken by {winner}, cards {}.",
                card_list(&cards)
            );
        }
        self.trick_no = number + 1;
        Ok(())
    }

    pub fn on_score(&mut self, points: &SeatMap<u32>) -> Result<(), StateError> {
        if self.deal_ended {
            return Err(StateError::DealOver);
        }
        if self.got_score {
            return Err(StateError::ScoreRepeated);
        }
        self.got_score = true;
        self.deal_ended = self.got_score && self.got_total;
        self.waiting_for_move = false;
        self.points = points[self.seat];

        if self.verbose {
            println!("The scores are:");
            for seat in SEATS {
                println!("{seat} | {}", points[seat]);
            }
        }
        Ok(())
    }

    pub fn on_total(&mut self, points: &SeatMap<u32>) -> Result<(), StateError> {
        if self.deal_ended {
            return Err(StateError::DealOver);
        }
        if self.got_total {
            return Err(StateError::TotalRepeated);
        }
        self.got_total = true;
        self.deal_ended = self.got_score && self.got_total;
        self.waiting_for_move = false;
        self.total_points = points[self.seat];

        if self.verbose {
            println!("The total scores are:");
            for seat in SEATS {
                println!("{seat} | {}", points[seat]);
            }
        }
        Ok(())
    }

    /// Legal cards under the must-follow rule.
    pub fn valid_moves(&self) -> Result<Vec<Card>, StateError> {
        if self.deal_ended {
            return Err(StateError::DealOver);
        }
        if self.trick_ended {
            return Err(StateError::TrickOver);
        }
        let lead = self.table.first().map(|card| card.suit);
        Ok(follow_moves(&self.hand, lead))
    }

    pub fn is_valid_move(&self, card: Card) -> bool {
        self.valid_moves()
            .map(|moves| moves.contains(&card))
            .unwrap_or(false)
    }

    /// The heuristic move: lead the lowest card; otherwise climb toward the
    /// highest legal card that still loses the trick, falling back to the
    /// first legal card when every move would win.
    pub fn best_move(&self) -> Result<Card, StateError> {
        let moves = self.valid_moves()?;
        let Some(leader) = self.table.first().copied() else {
            // Leading: smallest rank, first such card in hand order.
            let lowest = self
                .hand
                .iter()
                .copied()
                .min_by_key(|card| card.rank.value());
            return lowest.ok_or(StateError::TrickOver);
        };

        let lead = leader.suit;
        let Some(&first) = moves.first() else {
            return Err(StateError::TrickOver);
        };
        let mut best = first;
        for &candidate in &moves[1..] {
            if !card_beats(best, candidate, lead) && card_beats(leader, candidate, lead) {
                best = candidate;
            }
        }
        Ok(best)
    }

    pub fn show_cards(&self) {
        if self.verbose {
            println!("{}", card_list(&self.hand));
        }
    }

    pub fn show_tricks(&self) {
        if self.verbose {
            for pile in &self.taken_piles {
                println!("{}", card_list(pile));
            }
        }
    }
}

fn card_list(cards: &[Card]) -> String {
    cards
        .iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
