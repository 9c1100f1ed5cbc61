//! Per-answer stream session.
//!
//! One `StreamSession` exists per in-flight assistant turn. It owns the
//! pump's event receiver and the liveness token, and it is the only path
//! through which stream events reach the conversation. Dropping the
//! session abandons the stream: the token is cancelled and any event
//! still in flight is ignored rather than applied to a turn nobody is
//! watching.

use super::conversation::{Conversation, TurnId};
use super::stream::AnswerEvent;
use crate::error::ClientError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// What applying one event did to the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Fragment appended; the turn keeps streaming.
    Applied,
    /// The turn reached Complete or Failed; drop the session.
    Terminal,
    /// Liveness check failed (cancelled, unknown or already-terminal
    /// turn); nothing was mutated.
    Ignored,
}

impl ApplyOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ApplyOutcome::Terminal)
    }
}

#[derive(Debug)]
pub struct StreamSession {
    turn_id: TurnId,
    cancel: CancellationToken,
    rx: mpsc::UnboundedReceiver<Result<AnswerEvent, ClientError>>,
}

impl StreamSession {
    pub(crate) fn new(
        turn_id: TurnId,
        cancel: CancellationToken,
        rx: mpsc::UnboundedReceiver<Result<AnswerEvent, ClientError>>,
    ) -> Self {
        Self {
            turn_id,
            cancel,
            rx,
        }
    }

    pub fn turn_id(&self) -> TurnId {
        self.turn_id
    }

    /// Stop applying events without waiting for the pump. Late events
    /// become no-ops.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Next event from the pump. `None` means the channel closed without
    /// a terminal event, which callers should treat as a transport
    /// failure.
    pub async fn next_event(&mut self) -> Option<Result<AnswerEvent, ClientError>> {
        self.rx.recv().await
    }

    /// Apply one event to the conversation, checking turn liveness
    /// first.
    pub fn apply(
        &self,
        conversation: &mut Conversation,
        event: Result<AnswerEvent, ClientError>,
    ) -> ApplyOutcome {
        if self.cancel.is_cancelled() {
            return ApplyOutcome::Ignored;
        }
        let Some(turn) = conversation.turn_mut(self.turn_id) else {
            return ApplyOutcome::Ignored;
        };
        if turn.is_terminal() {
            return ApplyOutcome::Ignored;
        }

        match event {
            Ok(AnswerEvent::Fragment(fragment)) => {
                turn.append_fragment(&fragment);
                ApplyOutcome::Applied
            }
            Ok(AnswerEvent::Completed) => {
                turn.complete();
                ApplyOutcome::Terminal
            }
            Err(e) => {
                log::warn!("answer stream for turn failed: {e}");
                turn.fail(e.user_message());
                ApplyOutcome::Terminal
            }
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
