//! Unit tests for the match orchestrator, driven through fake connections:
//! each test connection is an outbox channel whose receiver the test holds.

use tokio::sync::mpsc;
use tokio::time::{advance, Duration, Instant};

use kierki_core::domain::{parse_card_list, Card, DealType, Seat, SeatMap, SEATS};
use kierki_core::protocol::{decode, Message, MessageType};

use crate::connection::{ConnId, Connection, Registry};
use crate::game::ServerGame;
use crate::schedule::ScheduledDeal;

type Outbox = mpsc::UnboundedReceiver<String>;

const TIMEOUT: Duration = Duration::from_secs(5);

fn connect(conns: &mut Registry) -> (ConnId, Outbox) {
    let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
    let id = conns.next_id();
    let mut connection = Connection::new(
        id,
        format!("198.51.100.7:{}", 40_000 + id),
        "198.51.100.1:4242".to_string(),
        outbox_tx,
        tokio::spawn(async {}),
    );
    connection.await_reply(MessageType::Iam, TIMEOUT);
    conns.insert(connection);
    (id, outbox_rx)
}

fn sent(outbox: &mut Outbox) -> Vec<Message> {
    let mut messages = Vec::new();
    while let Ok(line) = outbox.try_recv() {
        messages.push(decode(&line).expect("server sent a malformed line"));
    }
    messages
}

fn cards(list: &str) -> Vec<Card> {
    parse_card_list(list).unwrap()
}

/// One deal: every seat holds a full suit, ascending. North opens and,
/// holding all the spades, wins every trick.
fn suit_per_seat_schedule(deal_type: char) -> Vec<ScheduledDeal> {
    let deal_type = DealType::from_digit(deal_type).unwrap();
    vec![ScheduledDeal {
        deal_type,
        opener: Seat::North,
        hands: SeatMap([
            cards("2S3S4S5S6S7S8S9S10SJSQSKSAS"),
            cards("2H3H4H5H6H7H8H9H10HJHQHKHAH"),
            cards("2D3D4D5D6D7D8D9D10DJDQDKDAD"),
            cards("2C3C4C5C6C7C8C9C10CJCQCKCAC"),
        ]),
    }]
}

/// East holds the ace of spades and must follow North's spade leads.
fn follow_suit_schedule() -> Vec<ScheduledDeal> {
    vec![ScheduledDeal {
        deal_type: DealType::Tricks,
        opener: Seat::North,
        hands: SeatMap([
            cards("2S3S4S5S6S7S8S9S10SJSQSKS2H"),
            cards("AS3H4H5H6H7H8H9H10HJHQHKHAH"),
            cards("2D3D4D5D6D7D8D9D10DJDQDKDAD"),
            cards("2C3C4C5C6C7C8C9C10CJCQCKCAC"),
        ]),
    }]
}

struct Table {
    game: ServerGame,
    conns: Registry,
    outboxes: SeatMap<Option<Outbox>>,
    conn_ids: SeatMap<ConnId>,
}

impl Table {
    fn seated(schedule: Vec<ScheduledDeal>) -> Table {
        let mut game = ServerGame::new(schedule, TIMEOUT);
        let mut conns = Registry::new();
        let mut outboxes: SeatMap<Option<Outbox>> = SeatMap::default();
        let mut conn_ids: SeatMap<ConnId> = SeatMap::default();
        for seat in SEATS {
            let (id, outbox) = connect(&mut conns);
            game.handle_iam(id, seat, &mut conns);
            outboxes[seat] = Some(outbox);
            conn_ids[seat] = id;
        }
        Table {
            game,
            conns,
            outboxes,
            conn_ids,
        }
    }

    fn tick(&mut self) {
        self.game.tick(&mut self.conns);
    }

    fn sent_to(&mut self, seat: Seat) -> Vec<Message> {
        sent(self.outboxes[seat].as_mut().unwrap())
    }

    fn play(&mut self, seat: Seat, number: u8, list: &str) {
        self.game
            .handle_trick(self.conn_ids[seat], number, &cards(list), &mut self.conns);
        self.tick();
    }

    fn drain_all(&mut self) {
        for seat in SEATS {
            self.sent_to(seat);
        }
    }
}

#[tokio::test]
async fn match_pauses_until_all_seats_are_filled() {
    let mut game = ServerGame::new(suit_per_seat_schedule('1'), TIMEOUT);
    let mut conns = Registry::new();
    let mut outboxes = Vec::new();
    for seat in [Seat::North, Seat::East, Seat::South] {
        let (id, outbox) = connect(&mut conns);
        game.handle_iam(id, seat, &mut conns);
        outboxes.push(outbox);
    }
    game.tick(&mut conns);
    for outbox in &mut outboxes {
        assert_eq!(sent(outbox), vec![]);
    }
    assert!(!game.is_over());
}

#[tokio::test]
async fn deal_starts_once_the_table_is_full() {
    let mut table = Table::seated(suit_per_seat_schedule('1'));
    table.tick();

    let north = table.sent_to(Seat::North);
    assert_eq!(
        north[0],
        Message::Deal {
            deal_type: DealType::Tricks,
            opener: Seat::North,
            cards: cards("2S3S4S5S6S7S8S9S10SJSQSKSAS"),
        }
    );
    // North opens, so the first prompt goes there with an empty table.
    assert_eq!(
        north[1],
        Message::Trick {
            number: 1,
            cards: vec![]
        }
    );
    assert_eq!(table.game.awaited_seat(), Some(Seat::North));

    // The other seats see their own hand and no prompt.
    let east = table.sent_to(Seat::East);
    assert_eq!(east.len(), 1);
    assert!(matches!(east[0], Message::Deal { .. }));
}

#[tokio::test]
async fn tick_is_idempotent_between_events() {
    let mut table = Table::seated(suit_per_seat_schedule('1'));
    table.tick();
    table.sent_to(Seat::North);

    table.tick();
    table.tick();
    assert_eq!(table.sent_to(Seat::North), vec![]);
    assert_eq!(table.game.awaited_seat(), Some(Seat::North));
}

#[tokio::test]
async fn claiming_an_occupied_seat_draws_busy() {
    let mut table = Table::seated(suit_per_seat_schedule('1'));
    table.tick();

    let (latecomer, mut outbox) = connect(&mut table.conns);
    table.game.handle_iam(latecomer, Seat::North, &mut table.conns);

    assert_eq!(
        sent(&mut outbox),
        vec![Message::Busy {
            seats: SEATS.to_vec()
        }]
    );
    assert!(table.conns.get(latecomer).unwrap().is_closed());
    // The incumbent is untouched.
    assert_eq!(table.game.awaited_seat(), Some(Seat::North));
}

#[tokio::test]
async fn illegal_replies_draw_wrong_and_change_nothing() {
    let mut table = Table::seated(follow_suit_schedule());
    table.tick();
    table.drain_all();
    table.play(Seat::North, 1, "2S");
    table.sent_to(Seat::East);

    // Not the awaited seat.
    table.play(Seat::South, 1, "2D");
    assert_eq!(table.sent_to(Seat::South), vec![Message::Wrong { number: 1 }]);

    // Wrong trick number.
    table.play(Seat::East, 2, "AS");
    // Empty payload.
    table.play(Seat::East, 1, "");
    // Must-follow violation: East holds the ace of spades.
    table.play(Seat::East, 1, "3H");
    // A card East does not hold at all.
    table.play(Seat::East, 1, "2D");
    assert_eq!(
        table.sent_to(Seat::East),
        vec![Message::Wrong { number: 1 }; 4]
    );
    assert_eq!(table.game.awaited_seat(), Some(Seat::East));

    // The legal reply still goes through afterwards.
    table.play(Seat::East, 1, "AS");
    assert_eq!(table.game.awaited_seat(), Some(Seat::South));
}

#[tokio::test]
async fn a_full_deal_is_scored_and_closed_out() {
    let mut table = Table::seated(suit_per_seat_schedule('7'));
    table.tick();

    let figures = [
        "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K", "A",
    ];
    for trick in 1..=13u8 {
        let figure = figures[(trick - 1) as usize];
        table.play(Seat::North, trick, &format!("{figure}S"));
        table.play(Seat::East, trick, &format!("{figure}H"));
        table.play(Seat::South, trick, &format!("{figure}D"));
        table.play(Seat::West, trick, &format!("{figure}C"));
    }

    let north = table.sent_to(Seat::North);
    let taken: Vec<&Message> = north
        .iter()
        .filter(|m| matches!(m, Message::Taken { .. }))
        .collect();
    assert_eq!(taken.len(), 13);
    for (i, message) in taken.iter().enumerate() {
        let Message::Taken { number, winner, .. } = message else {
            unreachable!()
        };
        assert_eq!(*number as usize, i + 1);
        assert_eq!(*winner, Seat::North);
    }

    // Bandit scoring over this layout: 13 tricks + 13 hearts + 4 queens * 5
    // + 8 lords * 2 + king of hearts 18 + tricks 7 and 13 * 10.
    let expected = SeatMap([100, 0, 0, 0]);
    assert!(north.contains(&Message::Score {
        points: expected.clone()
    }));
    assert!(north.contains(&Message::Total { points: expected }));

    // Single-deal schedule: the match is over and every connection closed.
    assert!(table.game.is_over());
    for seat in SEATS {
        assert!(table.conns.get(table.conn_ids[seat]).unwrap().is_closed());
    }
}

#[tokio::test]
async fn cards_are_conserved_through_a_trick() {
    let mut table = Table::seated(follow_suit_schedule());
    table.tick();
    table.play(Seat::North, 1, "2S");
    table.play(Seat::East, 1, "AS");
    table.play(Seat::South, 1, "2D");
    table.play(Seat::West, 1, "2C");

    // East's ace of spades beats North's deuce: East takes and leads next.
    let east = table.sent_to(Seat::East);
    assert!(east.contains(&Message::Taken {
        number: 1,
        cards: cards("2SAS2D2C"),
        winner: Seat::East,
    }));
    assert_eq!(table.game.awaited_seat(), Some(Seat::East));
}

#[tokio::test(start_paused = true)]
async fn trick_timeout_resends_the_identical_prompt() {
    let mut table = Table::seated(follow_suit_schedule());
    table.tick();
    table.play(Seat::North, 1, "2S");
    let before = table.sent_to(Seat::East);
    let prompt = before.last().unwrap().clone();
    assert_eq!(
        prompt,
        Message::Trick {
            number: 1,
            cards: cards("2S"),
        }
    );

    advance(TIMEOUT + Duration::from_millis(1)).await;
    let now = Instant::now();
    let expired = table.conns.timed_out(now);
    assert_eq!(expired, vec![table.conn_ids[Seat::East]]);

    table.game.handle_timeout(expired[0], &mut table.conns);
    assert_eq!(table.sent_to(Seat::East), vec![prompt]);
    // The deadline is re-armed, not left expired.
    assert!(table.conns.timed_out(Instant::now()).is_empty());
}

#[tokio::test(start_paused = true)]
async fn pre_seat_connections_are_cut_after_the_deadline() {
    let mut game = ServerGame::new(suit_per_seat_schedule('1'), TIMEOUT);
    let mut conns = Registry::new();
    let (id, _outbox) = connect(&mut conns);

    advance(TIMEOUT + Duration::from_millis(1)).await;
    let expired = conns.timed_out(Instant::now());
    assert_eq!(expired, vec![id]);

    game.handle_timeout(id, &mut conns);
    assert!(conns.get(id).unwrap().is_closed());
}

#[tokio::test]
async fn a_rejoining_seat_gets_the_deal_replayed() {
    let mut table = Table::seated(follow_suit_schedule());
    table.tick();
    table.play(Seat::North, 1, "2S");
    table.play(Seat::East, 1, "AS");
    table.play(Seat::South, 1, "2D");
    table.play(Seat::West, 1, "2C");
    // Trick 2: East leads, then South is owed a move.
    table.play(Seat::East, 2, "3H");

    // South drops mid-trick.
    let old_south = table.conn_ids[Seat::South];
    table.conns.remove(old_south);
    table.game.handle_disconnect(old_south);
    table.tick();

    // A replacement claims the seat.
    let (id, mut outbox) = connect(&mut table.conns);
    table.game.handle_iam(id, Seat::South, &mut table.conns);

    let replay = sent(&mut outbox);
    assert_eq!(
        replay,
        vec![
            Message::Deal {
                deal_type: DealType::Tricks,
                opener: Seat::North,
                cards: cards("2D3D4D5D6D7D8D9D10DJDQDKDAD"),
            },
            Message::Taken {
                number: 1,
                cards: cards("2SAS2D2C"),
                winner: Seat::East,
            },
            Message::Trick {
                number: 2,
                cards: cards("3H"),
            },
        ]
    );

    // Play resumes where it stopped.
    table.game.handle_trick(id, 2, &cards("2D"), &mut table.conns);
    table.tick();
    assert_eq!(table.game.awaited_seat(), Some(Seat::West));
}
