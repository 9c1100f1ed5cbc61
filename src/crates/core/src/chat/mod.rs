//! Chat flow
//!
//! Conversation model, incremental answer-stream decoding, and the
//! request client for the language-model proxy

pub mod client;
pub mod conversation;
pub mod session;
pub mod stream;

pub use client::ChatClient;
pub use conversation::{Conversation, Speaker, Turn, TurnId, TurnStatus};
pub use session::{ApplyOutcome, StreamSession};
pub use stream::{AnswerEvent, FragmentDecoder};
