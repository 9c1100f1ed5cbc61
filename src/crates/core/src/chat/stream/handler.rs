//! Answer-stream pump.
//!
//! Runs as a spawned task: reads the HTTP byte stream, drives the
//! [`FragmentDecoder`] and forwards events to the consumer over an
//! unbounded channel. The first error ends the pump; so does a dropped
//! receiver.

use super::decoder::FragmentDecoder;
use crate::error::ClientError;
use futures::{Stream, StreamExt};
use log::{error, trace};
use reqwest::Response;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Idle limit per read. The proxy is trusted to terminate the stream,
/// but a wedged connection must not leave the turn streaming forever.
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// One event on the pump-to-consumer channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerEvent {
    /// One decoded fragment, in arrival order. May be empty.
    Fragment(String),
    /// The byte source signalled end-of-stream; no more fragments follow.
    Completed,
}

/// Convert a live chat response into a sequence of [`AnswerEvent`]s.
pub async fn pump_answer_stream(
    response: Response,
    tx: mpsc::UnboundedSender<Result<AnswerEvent, ClientError>>,
) {
    pump_fragments(response.bytes_stream(), tx).await;
}

async fn pump_fragments<S, B, E>(
    mut stream: S,
    tx: mpsc::UnboundedSender<Result<AnswerEvent, ClientError>>,
) where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut decoder = FragmentDecoder::new();

    loop {
        let chunk = match timeout(IDLE_TIMEOUT, stream.next()).await {
            Ok(Some(Ok(chunk))) => chunk,
            Ok(Some(Err(e))) => {
                let error_msg = format!("answer stream failed: {e}");
                error!("{}", error_msg);
                let _ = tx.send(Err(ClientError::Transport(error_msg)));
                return;
            }
            Ok(None) => {
                decoder.finish();
                let _ = tx.send(Ok(AnswerEvent::Completed));
                return;
            }
            Err(_) => {
                let error_msg = format!(
                    "answer stream idle for more than {}s",
                    IDLE_TIMEOUT.as_secs()
                );
                error!("{}", error_msg);
                let _ = tx.send(Err(ClientError::Transport(error_msg)));
                return;
            }
        };

        let fragments = match decoder.push(chunk.as_ref()) {
            Ok(fragments) => fragments,
            Err(e) => {
                error!("answer stream decode failed: {e}");
                let _ = tx.send(Err(e));
                return;
            }
        };

        for fragment in fragments {
            trace!("answer fragment: {:?}", fragment);
            if tx.send(Ok(AnswerEvent::Fragment(fragment))).is_err() {
                // Consumer is gone; stop reading.
                return;
            }
        }
    }
}
