//! Terminal display surface

mod repl;

use std::io::{self, Write};

use crate::config::DisplayConfig;
use crate::conversation::{Message, Role, Transcript};

pub use repl::run;

const WORKING_INDICATOR: &str = "Thinking...";

/// Renders banners, turns and notices to `out`; the working indicator goes
/// to `status` so piped chat output carries no control characters.
pub struct Console<W: Write, S: Write> {
    out: W,
    status: S,
    display: DisplayConfig,
}

impl<W: Write, S: Write> Console<W, S> {
    pub fn new(out: W, status: S, display: DisplayConfig) -> Self {
        Self {
            out,
            status,
            display,
        }
    }

    pub fn into_parts(self) -> (W, S) {
        (self.out, self.status)
    }

    pub fn banner(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", self.display.title)?;
        writeln!(self.out)?;
        writeln!(self.out, "{}", self.display.welcome)?;
        writeln!(self.out)?;
        writeln!(self.out, "Type /history to replay the chat, /reset to start over, exit to quit.")?;
        writeln!(self.out)
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{} > ", self.display.input_hint)?;
        self.out.flush()
    }

    pub fn turn(&mut self, message: &Message) -> io::Result<()> {
        let label = match message.role {
            Role::User => "You",
            Role::Assistant => "Advisor",
            Role::System => return Ok(()),
        };
        for line in message.content.lines() {
            writeln!(self.out, "  {} > {}", label, line)?;
        }
        writeln!(self.out)
    }

    /// Every turn, oldest first
    pub fn transcript(&mut self, transcript: &Transcript) -> io::Result<()> {
        if transcript.is_empty() {
            writeln!(self.out, "  (no messages yet)")?;
            return writeln!(self.out);
        }
        for message in transcript {
            self.turn(message)?;
        }
        Ok(())
    }

    pub fn working(&mut self) -> io::Result<()> {
        write!(self.status, "  {}", WORKING_INDICATOR)?;
        self.status.flush()
    }

    pub fn done_working(&mut self) -> io::Result<()> {
        let blank = " ".repeat(WORKING_INDICATOR.len() + 2);
        write!(self.status, "\r{}\r", blank)?;
        self.status.flush()
    }

    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "  [error] {}", text)
    }

    pub fn info(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "  {}", text)?;
        writeln!(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_parts(
        f: impl FnOnce(&mut Console<Vec<u8>, Vec<u8>>) -> io::Result<()>,
    ) -> (String, String) {
        let mut console = Console::new(Vec::new(), Vec::new(), DisplayConfig::default());
        f(&mut console).unwrap();
        let (out, status) = console.into_parts();
        (String::from_utf8(out).unwrap(), String::from_utf8(status).unwrap())
    }

    fn rendered(f: impl FnOnce(&mut Console<Vec<u8>, Vec<u8>>) -> io::Result<()>) -> String {
        rendered_parts(f).0
    }

    #[test]
    fn test_banner_shows_title_and_welcome() {
        let out = rendered(|c| c.banner());
        assert!(out.contains("ShetJi Loan Advisor"));
        assert!(out.contains("Application process guidance"));
    }

    #[test]
    fn test_transcript_oldest_first_without_system() {
        let mut transcript = Transcript::new();
        transcript.append_user("I want a home loan.").unwrap();
        transcript.append_assistant("Eligibility or rates?");

        let out = rendered(|c| {
            c.turn(&Message::system("hidden instruction"))?;
            c.transcript(&transcript)
        });

        assert!(!out.contains("hidden instruction"));
        let user_at = out.find("You > I want a home loan.").unwrap();
        let reply_at = out.find("Advisor > Eligibility or rates?").unwrap();
        assert!(user_at < reply_at);
    }

    #[test]
    fn test_multiline_reply_prefixed_per_line() {
        let out = rendered(|c| c.turn(&Message::assistant("Step one\nStep two")));
        assert!(out.contains("Advisor > Step one\n"));
        assert!(out.contains("Advisor > Step two\n"));
    }

    #[test]
    fn test_empty_transcript_placeholder() {
        let out = rendered(|c| c.transcript(&Transcript::new()));
        assert!(out.contains("no messages yet"));
    }

    #[test]
    fn test_working_indicator_stays_off_chat_output() {
        let (out, status) = rendered_parts(|c| {
            c.working()?;
            c.done_working()?;
            c.turn(&Message::assistant("Is your CIBIL score above 750?"))
        });

        assert_eq!(out, "  Advisor > Is your CIBIL score above 750?\n\n");
        assert!(status.starts_with("  Thinking..."));
        assert!(status.ends_with('\r'));
    }
}
