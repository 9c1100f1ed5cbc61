//! Conversation model
//!
//! An append-only list of turns. Turns are addressed by id, never by
//! position, and the assistant turn's lifecycle is a one-way state
//! machine: Pending -> Streaming -> Complete | Failed.

use chrono::Utc;
use uuid::Uuid;

/// Marker appended to streaming content at display time only; it is
/// never part of the stored accumulation.
pub const STREAM_CURSOR: &str = "\u{258c}";

/// Placeholder shown while an assistant turn has received nothing yet.
pub const PENDING_PLACEHOLDER: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TurnId(Uuid);

impl TurnId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnStatus {
    Pending,
    Streaming,
    Complete,
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct Turn {
    id: TurnId,
    speaker: Speaker,
    content: String,
    status: TurnStatus,
    pub created_at_ms: i64,
}

impl Turn {
    fn new_user(content: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            speaker: Speaker::User,
            content: content.into(),
            status: TurnStatus::Complete,
            created_at_ms: Utc::now().timestamp_millis(),
        }
    }

    fn new_assistant() -> Self {
        Self {
            id: TurnId::new(),
            speaker: Speaker::Assistant,
            content: String::new(),
            status: TurnStatus::Pending,
            created_at_ms: Utc::now().timestamp_millis(),
        }
    }

    pub fn id(&self) -> TurnId {
        self.id
    }

    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn status(&self) -> &TurnStatus {
        &self.status
    }

    /// Accumulated content. Grows monotonically while streaming; empty
    /// again after a failure.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            TurnStatus::Complete | TurnStatus::Failed { .. }
        )
    }

    /// What the UI renders for this turn right now.
    pub fn display_content(&self) -> String {
        match &self.status {
            TurnStatus::Pending => PENDING_PLACEHOLDER.to_string(),
            TurnStatus::Streaming => format!("{}{}", self.content, STREAM_CURSOR),
            TurnStatus::Complete => self.content.clone(),
            TurnStatus::Failed { reason } => format!("Error: {reason}"),
        }
    }

    /// Append one fragment in arrival order. The first fragment, empty
    /// string included, moves Pending to Streaming. Ignored once
    /// terminal: the stream session is already gone by then.
    pub(crate) fn append_fragment(&mut self, fragment: &str) {
        match self.status {
            TurnStatus::Pending => {
                self.status = TurnStatus::Streaming;
                self.content.push_str(fragment);
            }
            TurnStatus::Streaming => self.content.push_str(fragment),
            TurnStatus::Complete | TurnStatus::Failed { .. } => {
                log::warn!("fragment for terminal turn dropped");
            }
        }
    }

    pub(crate) fn complete(&mut self) {
        if self.is_terminal() {
            log::warn!("completion for terminal turn dropped");
            return;
        }
        self.status = TurnStatus::Complete;
    }

    /// Fail the turn with a user-facing reason. Partial accumulation is
    /// discarded; the UI shows the reason instead.
    pub(crate) fn fail(&mut self, reason: String) {
        if self.is_terminal() {
            log::warn!("failure for terminal turn dropped");
            return;
        }
        self.content.clear();
        self.status = TurnStatus::Failed { reason };
    }
}

/// Ordered turns of one chat session. Append-only; cleared only by
/// dropping the whole conversation.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> TurnId {
        let turn = Turn::new_user(content);
        let id = turn.id;
        self.turns.push(turn);
        id
    }

    /// Append the placeholder assistant turn for an answer about to be
    /// requested.
    pub fn begin_assistant(&mut self) -> TurnId {
        let turn = Turn::new_assistant();
        let id = turn.id;
        self.turns.push(turn);
        id
    }

    pub fn turn(&self, id: TurnId) -> Option<&Turn> {
        self.turns.iter().find(|t| t.id == id)
    }

    pub(crate) fn turn_mut(&mut self, id: TurnId) -> Option<&mut Turn> {
        self.turns.iter_mut().find(|t| t.id == id)
    }

    /// Fail a turn from outside the stream path, e.g. when the request
    /// itself was rejected before any byte arrived.
    pub fn fail_turn(&mut self, id: TurnId, reason: String) {
        if let Some(turn) = self.turn_mut(id) {
            turn.fail(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turns_are_complete_at_creation() {
        let mut conversation = Conversation::new();
        let id = conversation.push_user("Hi");
        let turn = conversation.turn(id).expect("turn exists");
        assert_eq!(turn.speaker(), Speaker::User);
        assert_eq!(turn.status(), &TurnStatus::Complete);
        assert_eq!(turn.display_content(), "Hi");
    }

    #[test]
    fn empty_fragment_still_moves_pending_to_streaming() {
        let mut conversation = Conversation::new();
        let id = conversation.begin_assistant();
        assert_eq!(
            conversation.turn(id).expect("turn").display_content(),
            PENDING_PLACEHOLDER
        );

        conversation.turn_mut(id).expect("turn").append_fragment("");
        let turn = conversation.turn(id).expect("turn");
        assert_eq!(turn.status(), &TurnStatus::Streaming);
        assert_eq!(turn.display_content(), STREAM_CURSOR);
    }

    #[test]
    fn content_accumulates_in_arrival_order_with_no_separator() {
        let mut conversation = Conversation::new();
        let id = conversation.begin_assistant();
        let turn = conversation.turn_mut(id).expect("turn");
        turn.append_fragment("Hello");
        turn.append_fragment("World");
        assert_eq!(turn.content(), "HelloWorld");
        assert_eq!(turn.display_content(), format!("HelloWorld{STREAM_CURSOR}"));
    }

    #[test]
    fn completion_removes_the_cursor() {
        let mut conversation = Conversation::new();
        let id = conversation.begin_assistant();
        let turn = conversation.turn_mut(id).expect("turn");
        turn.append_fragment("done");
        turn.complete();
        assert_eq!(turn.display_content(), "done");
        assert!(turn.is_terminal());
    }

    #[test]
    fn failure_discards_partial_accumulation() {
        let mut conversation = Conversation::new();
        let id = conversation.begin_assistant();
        let turn = conversation.turn_mut(id).expect("turn");
        turn.append_fragment("half an ans");
        turn.fail("Could not reach the backend.".to_string());
        assert_eq!(turn.content(), "");
        assert_eq!(
            turn.display_content(),
            "Error: Could not reach the backend."
        );
    }

    #[test]
    fn terminal_turns_ignore_late_mutations() {
        let mut conversation = Conversation::new();
        let id = conversation.begin_assistant();
        let turn = conversation.turn_mut(id).expect("turn");
        turn.append_fragment("final");
        turn.complete();

        turn.append_fragment(" late");
        turn.fail("late failure".to_string());
        assert_eq!(turn.content(), "final");
        assert_eq!(turn.status(), &TurnStatus::Complete);
    }

    #[test]
    fn turns_are_found_by_id_not_position() {
        let mut conversation = Conversation::new();
        conversation.push_user("first");
        let id = conversation.begin_assistant();
        conversation.push_user("interleaved");

        conversation.turn_mut(id).expect("turn").append_fragment("x");
        assert_eq!(conversation.turn(id).expect("turn").content(), "x");
        assert_eq!(conversation.turns().len(), 3);
    }
}
