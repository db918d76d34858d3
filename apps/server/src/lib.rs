//! Kierki match server: seats four clients, plays the scheduled deals, and
//! exits when the match is over.

pub mod cli;
pub mod connection;
pub mod game;
pub mod runtime;
pub mod schedule;
pub mod telemetry;

#[cfg(test)]
mod tests_game;
