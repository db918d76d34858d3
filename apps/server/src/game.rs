//! The authoritative match orchestrator: a state machine over deals, tricks
//! and player turns, driven by seat claims, trick replies, timeouts and
//! disconnects.

use tokio::time::Duration;
use tracing::{debug, info, warn};

use kierki_core::domain::{follow_moves, trick_winner, Card, DealType, Seat, SeatMap, SEATS};
use kierki_core::protocol::{Message, MessageType};

use crate::connection::{ConnId, Registry};
use crate::schedule::ScheduledDeal;

/// Everything that belongs to the deal currently being played. Dropped
/// wholesale when the deal ends.
#[derive(Debug)]
struct DealState {
    deal_type: DealType,
    opener: Seat,
    starting_hands: SeatMap<Vec<Card>>,
    hands: SeatMap<Vec<Card>>,
    scores: SeatMap<u32>,
    /// TAKEN announcements so far, in order, for reconnect replay.
    taken_log: Vec<Message>,
    /// 0 until the first trick starts, 14 once the 13th has been taken.
    trick_no: u8,
    trick_in_progress: bool,
    /// Seat that opened the current trick; the winner opens the next.
    trick_opener: Seat,
    /// Cards of the trick in progress, in play order.
    table: Vec<Card>,
    awaited: Option<Seat>,
}

impl DealState {
    fn deal_message(&self, seat: Seat) -> Message {
        Message::Deal {
            deal_type: self.deal_type,
            opener: self.opener,
            cards: self.starting_hands[seat].clone(),
        }
    }
}

/// The match. Connections are referenced by id only; the [`Registry`] stays
/// with the event loop.
#[derive(Debug)]
pub struct ServerGame {
    schedule: Vec<ScheduledDeal>,
    reply_timeout: Duration,
    seats: SeatMap<Option<ConnId>>,
    deals_started: usize,
    deal: Option<DealState>,
    total_scores: SeatMap<u32>,
    game_over: bool,
}

impl ServerGame {
    pub fn new(schedule: Vec<ScheduledDeal>, reply_timeout: Duration) -> ServerGame {
        ServerGame {
            schedule,
            reply_timeout,
            seats: SeatMap::default(),
            deals_started: 0,
            deal: None,
            total_scores: SeatMap::default(),
            game_over: false,
        }
    }

    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn awaited_seat(&self) -> Option<Seat> {
        self.deal.as_ref().and_then(|deal| deal.awaited)
    }

    fn seat_of(&self, conn_id: ConnId) -> Option<Seat> {
        SEATS
            .into_iter()
            .find(|&seat| self.seats[seat] == Some(conn_id))
    }

    fn all_seats_filled(&self) -> bool {
        SEATS.into_iter().all(|seat| self.seats[seat].is_some())
    }

    /// A client claims a seat. Occupied seats get a BUSY listing and the
    /// connection is closed; otherwise the seat is taken and, mid-deal, the
    /// newcomer is caught up on everything it missed.
    pub fn handle_iam(&mut self, conn_id: ConnId, seat: Seat, conns: &mut Registry) {
        if self.seats[seat].is_some() {
            let occupied: Vec<Seat> = SEATS
                .into_iter()
                .filter(|&s| self.seats[s].is_some())
                .collect();
            if let Some(conn) = conns.get_mut(conn_id) {
                warn!(conn = conn_id, %seat, "seat already taken, rejecting");
                conn.send(&Message::Busy { seats: occupied });
                conn.close();
            }
            return;
        }

        self.seats[seat] = Some(conn_id);
        if let Some(conn) = conns.get_mut(conn_id) {
            info!(conn = conn_id, %seat, peer = conn.peer(), "seat claimed");
            if conn.awaiting_type() == Some(MessageType::Iam) {
                conn.clear_awaiting();
            }
        }
        if self.deal.is_some() {
            self.rejoin(seat, conns);
        }
    }

    /// Replay the current deal to a seat that joined mid-deal: the original
    /// DEAL, every TAKEN so far, and the open TRICK prompt if this seat is
    /// the one owed a move.
    fn rejoin(&self, seat: Seat, conns: &mut Registry) {
        let Some(deal) = &self.deal else { return };
        debug!(%seat, taken = deal.taken_log.len(), "replaying deal state");
        self.send_to_seat(seat, &deal.deal_message(seat), conns);
        for taken in &deal.taken_log {
            self.send_to_seat(seat, taken, conns);
        }
        if deal.trick_in_progress && deal.awaited == Some(seat) {
            self.send_trick_prompt(seat, conns);
        }
    }

    /// A TRICK reply. Every rejection answers `WRONG <current trick>` and
    /// leaves the state untouched.
    pub fn handle_trick(
        &mut self,
        conn_id: ConnId,
        number: u8,
        cards: &[Card],
        conns: &mut Registry,
    ) {
        let (seat, card) = match self.validate_trick_reply(conn_id, number, cards) {
            Ok(accepted) => accepted,
            Err(reason) => {
                warn!(conn = conn_id, number, reason, "rejecting trick reply");
                let Some(deal) = &self.deal else { return };
                if (1..=13).contains(&deal.trick_no) {
                    if let Some(conn) = conns.get_mut(conn_id) {
                        conn.send(&Message::Wrong {
                            number: deal.trick_no,
                        });
                    }
                }
                return;
            }
        };

        let Some(deal) = &mut self.deal else { return };
        deal.table.push(card);
        if let Some(held) = deal.hands[seat].iter().position(|&c| c == card) {
            deal.hands[seat].remove(held);
        }
        deal.awaited = None;
        if let Some(conn) = conns.get_mut(conn_id) {
            conn.clear_awaiting();
        }
        debug!(%seat, %card, trick = number, "card played");
    }

    fn validate_trick_reply(
        &self,
        conn_id: ConnId,
        number: u8,
        cards: &[Card],
    ) -> Result<(Seat, Card), &'static str> {
        let Some(deal) = &self.deal else {
            return Err("no trick in progress");
        };
        let Some(seat) = self.seat_of(conn_id) else {
            return Err("connection does not hold a seat");
        };
        if deal.awaited != Some(seat) {
            return Err("not the awaited seat");
        }
        if number != deal.trick_no {
            return Err("trick number mismatch");
        }
        let Some(&card) = cards.last() else {
            return Err("reply carries no card");
        };
        let lead = deal.table.first().map(|c| c.suit);
        if !follow_moves(&deal.hands[seat], lead).contains(&card) {
            return Err("card is not a legal move");
        }
        Ok((seat, card))
    }

    /// A connection's reply deadline expired. Pre-seat connections are cut
    /// loose; an awaited seat gets the identical prompt again with a fresh
    /// deadline.
    pub fn handle_timeout(&mut self, conn_id: ConnId, conns: &mut Registry) {
        let awaiting = conns.get(conn_id).and_then(|conn| conn.awaiting_type());
        match awaiting {
            Some(MessageType::Iam) => {
                if let Some(conn) = conns.get_mut(conn_id) {
                    info!(conn = conn_id, peer = conn.peer(), "seat claim timed out");
                    conn.close();
                }
            }
            Some(MessageType::Trick) => match self.seat_of(conn_id) {
                Some(seat) => {
                    debug!(%seat, "move timed out, re-sending prompt");
                    self.send_trick_prompt(seat, conns);
                }
                None => {
                    if let Some(conn) = conns.get_mut(conn_id) {
                        conn.clear_awaiting();
                    }
                }
            },
            _ => {}
        }
    }

    /// A connection is gone. Its seat (if any) opens up; the deal state
    /// stays put, waiting for a replacement to replay into.
    pub fn handle_disconnect(&mut self, conn_id: ConnId) {
        for seat in SEATS {
            if self.seats[seat] == Some(conn_id) {
                info!(%seat, "seat vacated");
                self.seats[seat] = None;
            }
        }
    }

    /// Drive the match as far as it will go. Quiesces once a prompt is
    /// outstanding, a seat is missing, or the match is over, so a second
    /// call with no intervening events is a no-op.
    pub fn tick(&mut self, conns: &mut Registry) {
        while self.step(conns) {}
    }

    fn step(&mut self, conns: &mut Registry) -> bool {
        if self.game_over || !self.all_seats_filled() {
            return false;
        }
        let Some(deal) = &self.deal else {
            if self.deals_started == self.schedule.len() {
                self.end_game(conns);
                return false;
            }
            self.start_deal(conns);
            return true;
        };

        let trick_no = deal.trick_no;
        let trick_in_progress = deal.trick_in_progress;
        let played = deal.table.len();
        let awaited = deal.awaited;

        if trick_no > 13 {
            self.finish_deal(conns);
            return true;
        }
        if !trick_in_progress {
            self.start_trick();
            return true;
        }
        if played == 4 {
            self.finish_trick(conns);
            return true;
        }
        if awaited.is_none() {
            self.prompt_next_player(conns);
            return true;
        }
        false
    }

    fn start_deal(&mut self, conns: &mut Registry) {
        let next = &self.schedule[self.deals_started];
        self.deals_started += 1;
        let deal = DealState {
            deal_type: next.deal_type,
            opener: next.opener,
            starting_hands: next.hands.clone(),
            hands: next.hands.clone(),
            scores: SeatMap::default(),
            taken_log: Vec::new(),
            trick_no: 0,
            trick_in_progress: false,
            trick_opener: next.opener,
            table: Vec::new(),
            awaited: None,
        };
        info!(
            deal = self.deals_started,
            deal_type = %deal.deal_type,
            opener = %deal.opener,
            "starting deal"
        );
        for seat in SEATS {
            self.send_to_seat(seat, &deal.deal_message(seat), conns);
        }
        self.deal = Some(deal);
    }

    fn start_trick(&mut self) {
        if let Some(deal) = &mut self.deal {
            deal.trick_no += 1;
            deal.trick_in_progress = true;
            deal.table.clear();
            deal.awaited = None;
        }
    }

    fn prompt_next_player(&mut self, conns: &mut Registry) {
        let seat = {
            let Some(deal) = &mut self.deal else { return };
            let seat = deal.trick_opener.offset(deal.table.len());
            deal.awaited = Some(seat);
            seat
        };
        self.send_trick_prompt(seat, conns);
    }

    /// The TRICK prompt is idempotent: it depends only on what has been
    /// played so far, so timeouts and rejoins can repeat it verbatim.
    fn send_trick_prompt(&self, seat: Seat, conns: &mut Registry) {
        let Some(deal) = &self.deal else { return };
        let prompt = Message::Trick {
            number: deal.trick_no,
            cards: deal.table.clone(),
        };
        if let Some(conn) = self.seats[seat].and_then(|id| conns.get_mut(id)) {
            conn.send(&prompt);
            conn.await_reply(MessageType::Trick, self.reply_timeout);
        }
    }

    fn finish_trick(&mut self, conns: &mut Registry) {
        let taken = {
            let Some(deal) = &mut self.deal else { return };
            let Ok(cards) = <[Card; 4]>::try_from(deal.table.clone()) else {
                return;
            };
            let winner = trick_winner(deal.trick_opener, &cards);
            let points = deal.deal_type.trick_points(deal.trick_no, &cards);
            deal.scores[winner] += points;
            let taken = Message::Taken {
                number: deal.trick_no,
                cards: cards.to_vec(),
                winner,
            };
            deal.taken_log.push(taken.clone());
            deal.trick_opener = winner;
            deal.trick_in_progress = false;
            info!(trick = deal.trick_no, %winner, points, "trick taken");
            if deal.trick_no == 13 {
                deal.trick_no = 14;
            }
            taken
        };
        self.broadcast(&taken, conns);
    }

    fn finish_deal(&mut self, conns: &mut Registry) {
        let Some(deal) = self.deal.take() else { return };
        for seat in SEATS {
            self.total_scores[seat] += deal.scores[seat];
        }
        info!(
            deal = self.deals_started,
            scores = %Message::Score { points: deal.scores.clone() },
            "deal finished"
        );
        self.broadcast(
            &Message::Score {
                points: deal.scores,
            },
            conns,
        );
        self.broadcast(
            &Message::Total {
                points: self.total_scores.clone(),
            },
            conns,
        );
    }

    fn end_game(&mut self, conns: &mut Registry) {
        info!("match complete, closing connections");
        self.game_over = true;
        conns.close_all();
    }

    fn broadcast(&self, message: &Message, conns: &mut Registry) {
        for seat in SEATS {
            self.send_to_seat(seat, message, conns);
        }
    }

    fn send_to_seat(&self, seat: Seat, message: &Message, conns: &mut Registry) {
        if let Some(conn) = self.seats[seat].and_then(|id| conns.get(id)) {
            conn.send(message);
        }
    }
}
