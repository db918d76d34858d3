//! Kierki player client: claims a seat and plays one match, interactively
//! or automatically.

pub mod cli;
pub mod runtime;
pub mod state;
pub mod telemetry;
