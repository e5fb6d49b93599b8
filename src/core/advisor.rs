//! Transcript and request assembly
//!
//! The Advisor drives one interaction at a time:
//! 1. Appends the user's turn to the session transcript
//! 2. Builds the request: system instruction followed by the whole transcript
//! 3. Sends it to the provider and takes the first candidate
//! 4. Appends the reply (or a fixed apology when the call failed)
//!
//! Stage tracking, intent detection and eligibility questions live entirely in
//! the system instruction; nothing here branches on conversation content.

use crate::conversation::{Message, Session, TranscriptError};
use crate::providers::{ChatProvider, ProviderError};

/// Reply used when the provider returns no usable candidate
pub const FALLBACK_REPLY: &str = "I couldn't process your request.";

/// Reply used when the provider call fails
pub const APOLOGY_REPLY: &str = "I encountered an error. Please try again or contact support.";

/// Outcome of one user interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// Content of the assistant turn that was appended
    pub reply: String,

    /// One-line notice for the user when generation failed
    pub notice: Option<String>,
}

/// Builds requests and records exchanges for a session
pub struct Advisor {
    provider: Box<dyn ChatProvider>,
    instruction: String,
    model: String,
}

impl Advisor {
    pub fn new(
        provider: Box<dyn ChatProvider>,
        instruction: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            instruction: instruction.into(),
            model: model.into(),
        }
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send an assembled request and extract the reply text.
    ///
    /// Zero candidates or a null first candidate yield [`FALLBACK_REPLY`];
    /// transport and API failures are returned to the caller.
    pub async fn complete(&self, request: &[Message]) -> Result<String, ProviderError> {
        let completion = self.provider.chat(request, &self.model).await?;

        match completion.first_text() {
            Some(text) => Ok(text.to_string()),
            None => {
                tracing::warn!(
                    provider = %self.provider.name(),
                    candidates = completion.candidates.len(),
                    "No usable candidate in completion"
                );
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }

    /// Run one interaction against `session`.
    ///
    /// Only an empty `text` is an error, and then nothing is appended. Every
    /// other call grows the transcript by exactly two turns.
    pub async fn respond(&self, session: &mut Session, text: &str) -> Result<Exchange, TranscriptError> {
        session.transcript.append_user(text)?;

        let request = build_request(&self.instruction, session.transcript.turns());

        tracing::debug!(
            session = %session.id,
            model = %self.model,
            turns = request.len(),
            "Dispatching request"
        );

        let exchange = match self.complete(&request).await {
            Ok(reply) => Exchange {
                reply,
                notice: None,
            },
            Err(e) => {
                tracing::error!(session = %session.id, error = %e, "Generation failed");
                Exchange {
                    reply: APOLOGY_REPLY.to_string(),
                    notice: Some(format!("An error occurred: {}", e)),
                }
            }
        };

        session.transcript.append_assistant(&exchange.reply);
        Ok(exchange)
    }
}

/// `[system instruction] ++ transcript`, transcript order untouched.
pub fn build_request(instruction: &str, transcript: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(Message::system(instruction));
    messages.extend_from_slice(transcript);
    messages
}
