//! The client event loop: one server connection and, in interactive mode,
//! standard input.

use std::net::SocketAddr;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tracing::warn;

use kierki_core::domain::{Card, Seat};
use kierki_core::net::{wire_trace, LineBuffer};
use kierki_core::protocol::{decode, Message};

use crate::cli::{Args, IpVersion};
use crate::state::{ClientGame, StateError};

const READ_CHUNK: usize = 4096;

pub async fn run(args: Args) -> anyhow::Result<()> {
    let addr = resolve(&args.host, args.port, args.ip_version()).await?;
    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("failed to connect to {addr}"))?;
    let local = stream.local_addr().context("no local address")?;
    let peer = stream.peer_addr().context("no peer address")?;

    let (mut read_half, write_half) = stream.into_split();
    let mut session = Session {
        game: ClientGame::new(args.seat(), !args.automatic),
        automatic: args.automatic,
        // In automatic mode the raw wire is the only useful output; the
        // interactive mode prints the human summaries instead.
        trace: args.automatic,
        local: local.to_string(),
        peer: peer.to_string(),
        writer: write_half,
    };
    session.send(&Message::Iam { seat: args.seat() }).await?;

    let mut lines = LineBuffer::new();
    let mut chunk = [0u8; READ_CHUNK];
    let mut stdin: Option<Lines<BufReader<Stdin>>> = if args.automatic {
        None
    } else {
        Some(BufReader::new(tokio::io::stdin()).lines())
    };

    loop {
        tokio::select! {
            read = read_half.read(&mut chunk) => match read {
                Ok(0) => break,
                Ok(received) => {
                    lines.push(&chunk[..received]);
                    while let Some(line) = lines.take_line() {
                        session.handle_server_line(&line).await?;
                    }
                }
                Err(error) => return Err(error).context("server connection failed"),
            },
            input = next_input(&mut stdin), if stdin.is_some() => match input {
                Some(line) => session.handle_user_line(line.trim()).await?,
                None => stdin = None,
            },
        }
    }

    if !session.game.deal_ended() {
        bail!("the server closed the connection before the game ended");
    }
    Ok(())
}

async fn resolve(host: &str, port: u16, version: IpVersion) -> anyhow::Result<SocketAddr> {
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("failed to resolve {host}:{port}"))?;
    addrs
        .find(|addr| match version {
            IpVersion::Any => true,
            IpVersion::V4 => addr.is_ipv4(),
            IpVersion::V6 => addr.is_ipv6(),
        })
        .ok_or_else(|| anyhow::anyhow!("no matching address for {host}:{port}"))
}

async fn next_input(stdin: &mut Option<Lines<BufReader<Stdin>>>) -> Option<String> {
    match stdin {
        Some(lines) => lines.next_line().await.ok().flatten(),
        None => std::future::pending().await,
    }
}

struct Session {
    game: ClientGame,
    automatic: bool,
    trace: bool,
    local: String,
    peer: String,
    writer: OwnedWriteHalf,
}

impl Session {
    async fn send(&mut self, message: &Message) -> anyhow::Result<()> {
        let line = message.encode();
        if self.trace {
            wire_trace(&self.local, &self.peer, &line);
        }
        self.writer
            .write_all(line.as_bytes())
            .await
            .context("failed to send to the server")?;
        Ok(())
    }

    async fn handle_server_line(&mut self, line: &str) -> anyhow::Result<()> {
        if self.trace {
            wire_trace(&self.peer, &self.local, line);
        }
        let message = match decode(line) {
            Ok(message) => message,
            Err(error) => {
                warn!(%error, "ignoring malformed line");
                return Ok(());
            }
        };
        match message {
            // A busy seat is fatal; nothing to wait for.
            Message::Busy { seats } => {
                if !self.automatic {
                    let listed = seats
                        .iter()
                        .map(Seat::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    println!("Place busy, list of busy places received: {listed}.");
                }
                bail!("seat is busy");
            }
            Message::Deal {
                deal_type,
                opener,
                cards,
            } => report(self.game.on_deal(deal_type, opener, cards)),
            Message::Trick { number, cards } => {
                report(self.game.on_trick(number, cards));
                if self.automatic && self.game.waiting_for_move {
                    self.play_best_move().await?;
                }
            }
            Message::Wrong { number } => {
                if !self.automatic {
                    println!("Wrong message received in trick {number}.");
                }
            }
            Message::Taken {
                number,
                cards,
                winner,
            } => report(self.game.on_taken(number, cards, winner)),
            Message::Score { points } => report(self.game.on_score(&points)),
            Message::Total { points } => report(self.game.on_total(&points)),
            Message::Iam { .. } => warn!("unexpected IAM from the server"),
        }
        Ok(())
    }

    async fn play_best_move(&mut self) -> anyhow::Result<()> {
        match self.game.best_move() {
            Ok(card) => {
                let reply = Message::Trick {
                    number: self.game.trick_no(),
                    cards: vec![card],
                };
                self.send(&reply).await?;
                self.game.waiting_for_move = false;
            }
            Err(error) => warn!(%error, "no move available"),
        }
        Ok(())
    }

    async fn handle_user_line(&mut self, line: &str) -> anyhow::Result<()> {
        match line {
            "cards" => self.game.show_cards(),
            "tricks" => self.game.show_tricks(),
            _ => {
                let Some(token) = line.strip_prefix('!') else {
                    return Ok(());
                };
                match token.parse::<Card>() {
                    Ok(card) => {
                        if self.game.waiting_for_move && self.game.is_valid_move(card) {
                            let reply = Message::Trick {
                                number: self.game.trick_no(),
                                cards: vec![card],
                            };
                            self.send(&reply).await?;
                            self.game.waiting_for_move = false;
                        } else {
                            println!("You cannot play a card now.");
                        }
                    }
                    Err(error) => eprintln!("{error}"),
                }
            }
        }
        Ok(())
    }
}

fn report(result: Result<(), StateError>) {
    if let Err(error) = result {
        warn!(%error, "rejected server message");
    }
}
