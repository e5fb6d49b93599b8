//! Interactive read-respond-render loop

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::conversation::Session;
use crate::core::Advisor;

use super::Console;

/// What a line of input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    History,
    Reset,
    Exit,
    Skip,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => Command::Skip,
            "exit" | "quit" | "/exit" | "/quit" | ":q" => Command::Exit,
            "/history" => Command::History,
            "/reset" => Command::Reset,
            _ => Command::Say(line.to_string()),
        }
    }
}

/// Read lines from `input` until exit or EOF, one interaction per line.
///
/// Returns the session as it stood when the loop ended.
pub async fn run<R, W, S>(
    advisor: &Advisor,
    input: R,
    console: &mut Console<W, S>,
) -> anyhow::Result<Session>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: Write,
{
    let mut lines = input.lines();
    let mut session = Session::new();
    tracing::info!(session = %session.id, "Session started");

    console.banner()?;
    console.prompt()?;

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Exit => break,
            Command::Skip => {}
            Command::History => console.transcript(&session.transcript)?,
            Command::Reset => {
                session = Session::new();
                tracing::info!(session = %session.id, "Session reset");
                console.info("Started a new conversation.")?;
            }
            Command::Say(text) => {
                console.working()?;
                let exchange = advisor.respond(&mut session, &text).await?;
                console.done_working()?;

                if let Some(ref notice) = exchange.notice {
                    console.notice(notice)?;
                }
                if let Some(reply) = session.transcript.last() {
                    console.turn(reply)?;
                }
            }
        }
        console.prompt()?;
    }

    tracing::info!(session = %session.id, turns = session.transcript.len(), "Session ended");
    Ok(session)
}
