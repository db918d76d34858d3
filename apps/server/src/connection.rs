//! Per-connection bookkeeping. The event loop owns every [`Connection`]
//! through the [`Registry`]; the match refers to them by id only.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

use kierki_core::net::wire_trace;
use kierki_core::protocol::{Message, MessageType};

pub type ConnId = u64;

/// A reply the match is waiting for on one connection, with its deadline.
#[derive(Debug, Copy, Clone)]
pub struct Awaiting {
    pub expected: MessageType,
    pub deadline: Instant,
}

/// One client connection as the orchestrator sees it. The socket itself
/// lives in the reader and writer tasks; this side holds the outbound
/// queue, the awaiting latch, and the close flag.
#[derive(Debug)]
pub struct Connection {
    id: ConnId,
    peer: String,
    local: String,
    outbox: mpsc::UnboundedSender<String>,
    reader: JoinHandle<()>,
    awaiting: Option<Awaiting>,
    closed: bool,
}

impl Connection {
    pub fn new(
        id: ConnId,
        peer: String,
        local: String,
        outbox: mpsc::UnboundedSender<String>,
        reader: JoinHandle<()>,
    ) -> Connection {
        Connection {
            id,
            peer,
            local,
            outbox,
            reader,
            awaiting: None,
            closed: false,
        }
    }

    pub fn id(&self) -> ConnId {
        self.id
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    /// Encode, trace, and queue one message for the writer task.
    pub fn send(&self, message: &Message) {
        let line = message.encode();
        wire_trace(&self.local, &self.peer, &line);
        // A send can only fail once the writer task is gone, i.e. while the
        // connection is being torn down anyway.
        let _ = self.outbox.send(line);
    }

    /// Arm the latch: a `expected` reply is now owed within `timeout`.
    pub fn await_reply(&mut self, expected: MessageType, timeout: Duration) {
        self.awaiting = Some(Awaiting {
            expected,
            deadline: Instant::now() + timeout,
        });
    }

    pub fn awaiting_type(&self) -> Option<MessageType> {
        self.awaiting.map(|awaiting| awaiting.expected)
    }

    pub fn clear_awaiting(&mut self) {
        self.awaiting = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        if self.closed {
            return None;
        }
        self.awaiting.map(|awaiting| awaiting.deadline)
    }

    pub fn is_timed_out(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.awaiting = None;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// The event loop's table of live connections.
#[derive(Debug, Default)]
pub struct Registry {
    connections: HashMap<ConnId, Connection>,
    next_id: ConnId,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    pub fn next_id(&mut self) -> ConnId {
        self.next_id += 1;
        self.next_id
    }

    pub fn insert(&mut self, connection: Connection) {
        self.connections.insert(connection.id(), connection);
    }

    pub fn get(&self, id: ConnId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn get_mut(&mut self, id: ConnId) -> Option<&mut Connection> {
        self.connections.get_mut(&id)
    }

    /// Drop a connection. Its reader task is aborted; dropping the outbox
    /// sender lets the writer task flush what is queued and half-close.
    pub fn remove(&mut self, id: ConnId) -> Option<Connection> {
        let connection = self.connections.remove(&id)?;
        connection.reader.abort();
        Some(connection)
    }

    pub fn close_all(&mut self) {
        for connection in self.connections.values_mut() {
            connection.close();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// The earliest outstanding reply deadline, the event loop's wait
    /// budget.
    pub fn earliest_deadline(&self) -> Option<Instant> {
        self.connections
            .values()
            .filter_map(Connection::deadline)
            .min()
    }

    pub fn timed_out(&self, now: Instant) -> Vec<ConnId> {
        let mut ids: Vec<ConnId> = self
            .connections
            .values()
            .filter(|connection| connection.is_timed_out(now))
            .map(Connection::id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn closed_ids(&self) -> Vec<ConnId> {
        let mut ids: Vec<ConnId> = self
            .connections
            .values()
            .filter(|connection| connection.is_closed())
            .map(Connection::id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
