//! Transport-adjacent helpers that stay free of sockets: read-side line
//! framing and the wire-trace format.

mod line_buffer;
mod trace;

pub use line_buffer::LineBuffer;
pub use trace::{wire_timestamp, wire_trace};
