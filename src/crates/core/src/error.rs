//! Error types shared by the detection and chat flows.
//!
//! Every error is terminal for its own in-flight operation only; callers
//! keep unrelated state (earlier turns, the previous detection result)
//! untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection-level failure: refused, reset, timed out.
    #[error("network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status before any payload
    /// was consumed.
    #[error("server returned status {status}")]
    Status { status: u16 },

    /// The response body was not decodable as UTF-8 text.
    #[error("stream decode error: {0}")]
    Decode(String),

    /// The detection response arrived without a usable object-count header.
    #[error("detection response is missing the object count")]
    MissingCount,

    #[error("upload payload is empty")]
    EmptyUpload,

    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("no API key configured")]
    MissingCredential,
}

impl ClientError {
    /// Short plain-language message for the UI. No status lines, no
    /// stack-trace detail.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => {
                "Could not reach the backend. Is it running?".to_string()
            }
            ClientError::Status { status } => {
                format!("The backend rejected the request (HTTP {status}).")
            }
            ClientError::Decode(_) => "The response could not be read.".to_string(),
            ClientError::MissingCount => {
                "The detection service did not report a count.".to_string()
            }
            ClientError::EmptyUpload => "Select a non-empty image file first.".to_string(),
            ClientError::EmptyPrompt => "Type a prompt first.".to_string(),
            ClientError::MissingCredential => "Enter an API key first.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_carry_no_internal_detail() {
        let err = ClientError::Transport("tcp connect error: connection refused".to_string());
        assert!(!err.user_message().contains("tcp"));

        let err = ClientError::Decode("invalid utf-8 sequence of 1 bytes".to_string());
        assert!(!err.user_message().contains("utf-8"));
    }

    #[test]
    fn status_message_names_the_code() {
        let err = ClientError::Status { status: 401 };
        assert!(err.user_message().contains("401"));
    }
}
