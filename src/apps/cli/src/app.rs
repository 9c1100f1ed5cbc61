//! Application state and event loop.
//!
//! One `App` owns both flows: the conversation plus its at-most-one
//! live stream session, and the detection state plus its at-most-one
//! in-flight upload. The loop multiplexes terminal input, answer-stream
//! events and the detection task over `select!`.

use crate::config::CliConfig;
use crate::ui;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stockpilot_core::{
    AnswerEvent, ApiConfig, ChatClient, ClientError, Conversation, Credential, DetectionClient,
    StreamSession,
};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Vision,
    Chat,
}

#[derive(Debug, Clone)]
pub struct VisionOutcome {
    pub object_count: u64,
    pub output_path: PathBuf,
}

/// State of the vision view. A failed request keeps the previous
/// outcome; only a success replaces it.
#[derive(Debug, Default)]
pub struct VisionState {
    pub path_input: String,
    pub analyzing: bool,
    pub error: Option<String>,
    pub outcome: Option<VisionOutcome>,
}

type DetectionMessage = Result<VisionOutcome, String>;

pub struct App {
    pub view: View,
    pub conversation: Conversation,
    pub chat_input: String,
    pub key_input: String,
    pub vision: VisionState,
    api_config: ApiConfig,
    file_config: CliConfig,
    chat_client: ChatClient,
    detection_client: DetectionClient,
    session: Option<StreamSession>,
    vision_rx: Option<mpsc::UnboundedReceiver<DetectionMessage>>,
    should_quit: bool,
}

impl App {
    pub fn new(api_config: ApiConfig, file_config: CliConfig) -> Result<Self> {
        let chat_client = ChatClient::new(api_config.clone())?;
        let detection_client = DetectionClient::new(api_config.clone())?;
        Ok(Self {
            view: View::Vision,
            conversation: Conversation::new(),
            chat_input: String::new(),
            key_input: String::new(),
            vision: VisionState::default(),
            api_config,
            file_config,
            chat_client,
            detection_client,
            session: None,
            vision_rx: None,
            should_quit: false,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_config.credential.is_some()
    }

    /// True while an assistant turn is still streaming; the chat input
    /// stays disabled until the turn is terminal.
    pub fn awaiting_answer(&self) -> bool {
        self.session.is_some()
    }

    pub async fn run(
        mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let mut tick = tokio::time::interval(Duration::from_millis(16));

        loop {
            terminal.draw(|frame| ui::render(frame, &self))?;

            tokio::select! {
                event = Self::session_event(&mut self.session) => {
                    self.on_session_event(event);
                }
                message = Self::detection_message(&mut self.vision_rx) => {
                    self.on_detection_message(message);
                }
                _ = tick.tick() => {
                    while event::poll(Duration::from_millis(0))? {
                        if let Event::Key(key) = event::read()? {
                            self.on_key(key).await;
                        }
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    async fn session_event(
        session: &mut Option<StreamSession>,
    ) -> Option<Result<AnswerEvent, ClientError>> {
        match session {
            Some(session) => session.next_event().await,
            None => std::future::pending().await,
        }
    }

    async fn detection_message(
        rx: &mut Option<mpsc::UnboundedReceiver<DetectionMessage>>,
    ) -> Option<DetectionMessage> {
        match rx {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    fn on_session_event(&mut self, event: Option<Result<AnswerEvent, ClientError>>) {
        let closed = event.is_none();
        let outcome = match &self.session {
            Some(session) => {
                let event = event.unwrap_or_else(|| {
                    Err(ClientError::Transport(
                        "response stream closed unexpectedly".to_string(),
                    ))
                });
                session.apply(&mut self.conversation, event)
            }
            None => return,
        };
        if closed || outcome.is_terminal() {
            self.session = None;
        }
    }

    fn on_detection_message(&mut self, message: Option<DetectionMessage>) {
        self.vision_rx = None;
        self.vision.analyzing = false;
        match message {
            Some(Ok(outcome)) => {
                self.vision.error = None;
                self.vision.outcome = Some(outcome);
            }
            Some(Err(message)) => {
                self.vision.error = Some(message);
            }
            None => {
                self.vision.error = Some("The detection task stopped unexpectedly.".to_string());
            }
        }
    }

    async fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Esc => {
                if let Some(session) = &self.session {
                    session.cancel();
                }
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.view = match self.view {
                    View::Vision => View::Chat,
                    View::Chat => View::Vision,
                };
            }
            code => match self.view {
                View::Vision => self.on_vision_key(code),
                View::Chat => self.on_chat_key(code).await,
            },
        }
    }

    fn on_vision_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.vision.path_input.push(c),
            KeyCode::Backspace => {
                self.vision.path_input.pop();
            }
            KeyCode::Enter => self.start_detection(),
            _ => {}
        }
    }

    async fn on_chat_key(&mut self, code: KeyCode) {
        if !self.has_credential() {
            match code {
                KeyCode::Char(c) => self.key_input.push(c),
                KeyCode::Backspace => {
                    self.key_input.pop();
                }
                KeyCode::Enter => self.set_credential(),
                _ => {}
            }
            return;
        }
        match code {
            KeyCode::Char(c) => self.chat_input.push(c),
            KeyCode::Backspace => {
                self.chat_input.pop();
            }
            KeyCode::Enter => self.submit_prompt().await,
            _ => {}
        }
    }

    fn set_credential(&mut self) {
        let key = self.key_input.trim().to_string();
        if key.is_empty() {
            return;
        }
        self.key_input.clear();

        self.file_config.api_key = Some(key.clone());
        if let Err(e) = self.file_config.save() {
            tracing::warn!("could not persist config: {e}");
        }

        self.api_config = self.api_config.clone().with_credential(Credential::new(key));
        match ChatClient::new(self.api_config.clone()) {
            Ok(client) => self.chat_client = client,
            Err(e) => tracing::error!("could not rebuild chat client: {e}"),
        }
    }

    /// Append the user turn and its assistant placeholder, then
    /// dispatch. A rejected request fails the placeholder right away.
    async fn submit_prompt(&mut self) {
        if self.session.is_some() {
            return;
        }
        let prompt = self.chat_input.trim().to_string();
        if prompt.is_empty() {
            return;
        }
        self.chat_input.clear();

        self.conversation.push_user(prompt.clone());
        let turn_id = self.conversation.begin_assistant();

        match self.chat_client.ask(&prompt, turn_id).await {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                tracing::warn!("chat request rejected: {e}");
                self.conversation.fail_turn(turn_id, e.user_message());
            }
        }
    }

    fn start_detection(&mut self) {
        if self.vision.analyzing {
            return;
        }
        let input = self.vision.path_input.trim();
        if input.is_empty() {
            self.vision.error = Some("Enter the path of an image first.".to_string());
            return;
        }
        let path = PathBuf::from(input);

        let client = self.detection_client.clone();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let _ = tx.send(run_detection(client, path).await);
        });

        self.vision_rx = Some(rx);
        self.vision.analyzing = true;
        self.vision.error = None;
    }
}

/// Read the image, upload it, write the annotated copy next to the
/// input. Every failure is already a user-facing message.
async fn run_detection(client: DetectionClient, path: PathBuf) -> DetectionMessage {
    let payload = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Could not read {}: {e}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.jpg");

    let result = client
        .detect(file_name, payload)
        .await
        .map_err(|e| e.user_message())?;

    let output_path = annotated_output_path(&path);
    tokio::fs::write(&output_path, &result.annotated_image)
        .await
        .map_err(|e| format!("Could not write {}: {e}", output_path.display()))?;

    Ok(VisionOutcome {
        object_count: result.object_count,
        output_path,
    })
}

fn annotated_output_path(input: &Path) -> PathBuf {
    match input.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => input.with_extension(format!("annotated.{ext}")),
        None => input.with_extension("annotated"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotated_path_sits_next_to_the_input() {
        assert_eq!(
            annotated_output_path(Path::new("/tmp/shelf.jpg")),
            PathBuf::from("/tmp/shelf.annotated.jpg")
        );
        assert_eq!(
            annotated_output_path(Path::new("shelf")),
            PathBuf::from("shelf.annotated")
        );
    }
}
