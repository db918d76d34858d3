use std::path::PathBuf;

use clap::Parser;

/// Kierki match server: seats four players, plays the scheduled deals, and
/// exits.
#[derive(Parser, Debug)]
#[command(name = "kierki-server", version)]
pub struct Args {
    /// Port to listen on
    #[arg(short = 'p', value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Deal schedule file
    #[arg(short = 'f', value_name = "FILE")]
    pub file: PathBuf,

    /// Seconds a client has to answer a seat claim or a move prompt
    #[arg(short = 't', value_name = "SECONDS", default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,
}
