// Stockpilot Core Library - Platform-agnostic client logic
// Two request flows against the supply-chain backend: single-shot
// detection uploads and incrementally consumed chat answers.

pub mod chat; // Chat flow - conversation model, stream decoding, request client
pub mod config; // Backend endpoint + credential configuration
pub mod error; // Error types shared by both flows
pub mod vision; // Detection flow - multipart upload, annotated result

// Export main types
pub use config::{ApiConfig, Credential, DEFAULT_BASE_URL};
pub use error::ClientError;

// Export chat flow components
pub use chat::{
    conversation::{Conversation, Speaker, Turn, TurnId, TurnStatus},
    session::{ApplyOutcome, StreamSession},
    stream::{AnswerEvent, FragmentDecoder},
    ChatClient,
};

// Export detection flow components
pub use vision::{DetectionClient, DetectionResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
