//! The server event loop: one listener, one event channel, one clock.
//!
//! Connections get a reader task (socket bytes in, complete lines out) and
//! a writer task (queued lines out, flush, half-close). Everything else —
//! decoding, the match, deadlines — runs on the single orchestrator task,
//! so the match only ever advances between awaits.

use std::future;
use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use kierki_core::net::{wire_trace, LineBuffer};
use kierki_core::protocol::{decode, Message, MessageType};

use crate::connection::{ConnId, Connection, Registry};
use crate::game::ServerGame;
use crate::schedule::ScheduledDeal;

const READ_CHUNK: usize = 4096;

#[derive(Debug)]
enum Event {
    Line { conn: ConnId, line: String },
    Closed { conn: ConnId },
}

pub struct Server {
    listener: TcpListener,
    game: ServerGame,
}

impl Server {
    pub async fn bind(
        addr: impl ToSocketAddrs,
        schedule: Vec<ScheduledDeal>,
        reply_timeout: Duration,
    ) -> io::Result<Server> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Server {
            listener,
            game: ServerGame::new(schedule, reply_timeout),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the match to completion. Returns once the last deal has been
    /// scored and every connection has been flushed and dropped.
    pub async fn run(self) -> io::Result<()> {
        let Server { listener, mut game } = self;

        let (events_tx, mut events) = mpsc::unbounded_channel();
        let mut conns = Registry::new();
        let mut writers = JoinSet::new();

        loop {
            let deadline = conns.earliest_deadline();
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        register(stream, peer, game.reply_timeout(), &events_tx, &mut conns, &mut writers);
                    }
                    Err(error) => warn!(%error, "accept failed"),
                },
                event = events.recv() => {
                    if let Some(event) = event {
                        handle_event(event, &mut game, &mut conns);
                    }
                }
                () = wait_until(deadline) => {}
            }

            // Drain whatever is already queued before advancing the match.
            while let Ok(event) = events.try_recv() {
                handle_event(event, &mut game, &mut conns);
            }

            let now = Instant::now();
            for conn_id in conns.timed_out(now) {
                game.handle_timeout(conn_id, &mut conns);
            }

            game.tick(&mut conns);

            for conn_id in conns.closed_ids() {
                conns.remove(conn_id);
                game.handle_disconnect(conn_id);
                debug!(conn = conn_id, "connection dropped");
            }

            if game.is_over() && conns.is_empty() {
                break;
            }
        }

        // Dropping the registry drops every outbox sender; writer tasks
        // flush what is queued and half-close before we return.
        drop(conns);
        while writers.join_next().await.is_some() {}
        info!("match served, shutting down");
        Ok(())
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

fn register(
    stream: TcpStream,
    peer: SocketAddr,
    iam_timeout: Duration,
    events: &mpsc::UnboundedSender<Event>,
    conns: &mut Registry,
    writers: &mut JoinSet<()>,
) {
    let local = stream
        .local_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_default();
    let conn_id = conns.next_id();
    let (read_half, write_half) = stream.into_split();
    let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();

    let reader = tokio::spawn(read_lines(read_half, conn_id, events.clone()));
    writers.spawn(write_lines(write_half, outbox_rx));

    let mut connection = Connection::new(conn_id, peer.to_string(), local, outbox_tx, reader);
    connection.await_reply(MessageType::Iam, iam_timeout);
    info!(conn = conn_id, %peer, "accepted connection");
    conns.insert(connection);
}

async fn read_lines(mut socket: OwnedReadHalf, conn: ConnId, events: mpsc::UnboundedSender<Event>) {
    let mut chunk = [0u8; READ_CHUNK];
    let mut lines = LineBuffer::new();
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(received) => {
                lines.push(&chunk[..received]);
                while let Some(line) = lines.take_line() {
                    if events.send(Event::Line { conn, line }).is_err() {
                        return;
                    }
                }
            }
        }
    }
    let _ = events.send(Event::Closed { conn });
}

async fn write_lines(mut socket: OwnedWriteHalf, mut outbox: mpsc::UnboundedReceiver<String>) {
    while let Some(line) = outbox.recv().await {
        if socket.write_all(line.as_bytes()).await.is_err() {
            break;
        }
    }
    let _ = socket.shutdown().await;
}

fn handle_event(event: Event, game: &mut ServerGame, conns: &mut Registry) {
    match event {
        Event::Closed { conn } => {
            if let Some(connection) = conns.get_mut(conn) {
                info!(conn, peer = connection.peer(), "peer disconnected");
                connection.close();
            }
        }
        Event::Line { conn, line } => {
            let Some(connection) = conns.get(conn) else {
                return;
            };
            wire_trace(connection.peer(), connection.local(), &line);
            match decode(&line) {
                Ok(Message::Iam { seat }) => game.handle_iam(conn, seat, conns),
                Ok(Message::Trick { number, cards }) => {
                    game.handle_trick(conn, number, &cards, conns);
                }
                Ok(other) => {
                    warn!(conn, message = %other, "unexpected message from client");
                }
                Err(error) => warn!(conn, %error, "ignoring malformed line"),
            }
        }
    }
}
