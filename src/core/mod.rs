//! Core advisor components
//!
//! Request assembly and transcript bookkeeping for a chat session.

pub mod advisor;

pub use advisor::Advisor;
