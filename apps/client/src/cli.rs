use clap::{ArgGroup, Parser};

use kierki_core::domain::Seat;

/// Which address family to resolve the server with.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IpVersion {
    Any,
    V4,
    V6,
}

/// Kierki player client.
#[derive(Parser, Debug)]
#[command(name = "kierki-client", version, disable_help_flag = true)]
#[command(group(ArgGroup::new("seat").required(true).args(["north", "east", "south", "west"])))]
#[command(group(ArgGroup::new("ip").args(["ipv4", "ipv6"])))]
pub struct Args {
    /// Server host name or address
    #[arg(short = 'h', value_name = "HOST")]
    pub host: String,

    /// Server port
    #[arg(short = 'p', value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Resolve the server over IPv4 only
    #[arg(short = '4')]
    pub ipv4: bool,

    /// Resolve the server over IPv6 only
    #[arg(short = '6')]
    pub ipv6: bool,

    /// Take the north seat
    #[arg(short = 'N')]
    pub north: bool,

    /// Take the east seat
    #[arg(short = 'E')]
    pub east: bool,

    /// Take the south seat
    #[arg(short = 'S')]
    pub south: bool,

    /// Take the west seat
    #[arg(short = 'W')]
    pub west: bool,

    /// Automatic mode: play without interactive input
    #[arg(short = 'a')]
    pub automatic: bool,

    /// Print help
    #[arg(long, action = clap::ArgAction::HelpLong)]
    pub help: Option<bool>,
}

impl Args {
    pub fn seat(&self) -> Seat {
        if self.north {
            Seat::North
        } else if self.east {
            Seat::East
        } else if self.south {
            Seat::South
        } else {
            Seat::West
        }
    }

    pub fn ip_version(&self) -> IpVersion {
        if self.ipv4 {
            IpVersion::V4
        } else if self.ipv6 {
            IpVersion::V6
        } else {
            IpVersion::Any
        }
    }
}
