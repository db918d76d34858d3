//! The line-oriented wire protocol: message variants, canonical encoding,
//! and the strict decoder.

mod codec;
mod message;

#[cfg(test)]
mod tests_props;

pub use codec::{decode, DecodeError, MAX_LINE_BYTES};
pub use message::{Message, MessageType};
