use crate::protocol::MAX_LINE_BYTES;

/// Read-side byte queue that yields complete wire lines.
///
/// Bytes go in as they arrive from the socket; [`LineBuffer::take_line`]
/// hands out one line at a time. A "line" is everything up to and including
/// a `\n` — or, when the buffered prefix reaches [`MAX_LINE_BYTES`] without
/// a terminator, the oversized prefix itself, consumed so the stream can
/// resynchronize and surfaced so the decoder reports it as malformed.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> LineBuffer {
        LineBuffer::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The next complete line, terminator included, as a lossily-decoded
    /// string (invalid UTF-8 fails later, in the message decoder). `None`
    /// until a full line is buffered.
    pub fn take_line(&mut self) -> Option<String> {
        let window = self.buf.len().min(MAX_LINE_BYTES);
        let end = match self.buf[..window].iter().position(|&b| b == b'\n') {
            Some(newline) => newline + 1,
            None if self.buf.len() >= MAX_LINE_BYTES => MAX_LINE_BYTES,
            None => return None,
        };
        let line: Vec<u8> = self.buf.drain(..end).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}
