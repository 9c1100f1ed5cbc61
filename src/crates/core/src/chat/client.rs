//! Request client for the language-model proxy.

use super::conversation::TurnId;
use super::session::StreamSession;
use super::stream::handler::pump_answer_stream;
use crate::config::ApiConfig;
use crate::error::ClientError;
use log::debug;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
}

/// Sends one prompt per call and hands back the stream session for the
/// answer. At most one session should be live per conversation; the
/// collaborator UI enforces that by not submitting while one exists.
pub struct ChatClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ChatClient {
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Dispatch `prompt` and start consuming the streamed answer into
    /// the turn identified by `turn_id`.
    ///
    /// A non-success status is detected before any body byte is read, so
    /// a rejected request fails the turn without it ever streaming.
    pub async fn ask(&self, prompt: &str, turn_id: TurnId) -> Result<StreamSession, ClientError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ClientError::EmptyPrompt);
        }
        let credential = self
            .config
            .credential
            .as_ref()
            .ok_or(ClientError::MissingCredential)?;

        let url = self.config.endpoint("/chat");
        debug!("dispatching prompt ({} chars) to {url}", prompt.len());

        let response = self
            .http
            .post(&url)
            .bearer_auth(credential.expose())
            .json(&ChatRequest { prompt })
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(pump_answer_stream(response, tx));

        Ok(StreamSession::new(turn_id, CancellationToken::new(), rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::conversation::Conversation;
    use crate::config::Credential;

    #[tokio::test]
    async fn empty_prompt_is_rejected_before_any_io() {
        let config = ApiConfig::new("http://localhost:1").with_credential(Credential::new("k"));
        let client = ChatClient::new(config).expect("client builds");
        let turn_id = Conversation::new().begin_assistant();

        let err = client.ask("   ", turn_id).await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyPrompt));
    }

    #[tokio::test]
    async fn missing_credential_is_rejected_before_any_io() {
        let client = ChatClient::new(ApiConfig::new("http://localhost:1")).expect("client builds");
        let turn_id = Conversation::new().begin_assistant();

        let err = client.ask("Hi", turn_id).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingCredential));
    }
}
