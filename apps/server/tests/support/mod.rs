//! Shared test support: a scripted wire-level client speaking the real
//! protocol over a real socket.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};

use kierki_core::net::LineBuffer;
use kierki_core::protocol::{decode, Message};

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub struct WireClient {
    stream: TcpStream,
    lines: LineBuffer,
}

impl WireClient {
    pub async fn connect(addr: SocketAddr) -> WireClient {
        let stream = timeout(RECV_TIMEOUT, TcpStream::connect(addr))
            .await
            .expect("connect timed out")
            .expect("connect failed");
        WireClient {
            stream,
            lines: LineBuffer::new(),
        }
    }

    pub async fn send(&mut self, message: &Message) {
        self.stream
            .write_all(message.encode().as_bytes())
            .await
            .expect("send failed");
    }

    /// Next decoded message from the server.
    pub async fn recv(&mut self) -> Message {
        let line = self.recv_line().await.expect("connection closed early");
        decode(&line).expect("server sent a malformed line")
    }

    /// Next raw line, or `None` once the server has closed the connection.
    pub async fn recv_line(&mut self) -> Option<String> {
        loop {
            if let Some(line) = self.lines.take_line() {
                return Some(line);
            }
            let mut chunk = [0u8; 1024];
            let read = timeout(RECV_TIMEOUT, self.stream.read(&mut chunk))
                .await
                .expect("recv timed out")
                .expect("read failed");
            if read == 0 {
                return None;
            }
            self.lines.push(&chunk[..read]);
        }
    }

    pub async fn expect_eof(&mut self) {
        assert_eq!(self.recv_line().await, None, "expected the server to close");
    }
}
