//! Incremental fragment decoder for the chat proxy's answer stream.
//!
//! The proxy emits blocks of the form `data: <text>\n\n`. Chunk
//! boundaries carry no meaning: a block may be split anywhere, including
//! in the middle of a multi-byte UTF-8 sequence, or several blocks may
//! arrive in one chunk. The decoder buffers accordingly and only ever
//! emits complete, delimiter-bounded fragments.

use crate::error::ClientError;

const FRAGMENT_DELIMITER: &str = "\n\n";
const DATA_PREFIX: &str = "data: ";

/// Push-based decoder: feed byte chunks, collect finished fragments.
///
/// Pieces without the `data: ` prefix (keep-alives, comments) are
/// silently discarded. An undelimited tail still buffered when the
/// stream ends is dropped by [`FragmentDecoder::finish`]; an incomplete
/// block is never emitted.
#[derive(Debug, Default)]
pub struct FragmentDecoder {
    /// Raw bytes not yet decodable as text (a split UTF-8 sequence).
    pending_bytes: Vec<u8>,
    /// Decoded text not yet closed by a delimiter.
    pending_text: String,
}

impl FragmentDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one chunk from the wire, returning every fragment it
    /// completed, in arrival order.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, ClientError> {
        self.pending_bytes.extend_from_slice(chunk);
        self.decode_pending()?;
        Ok(self.drain_fragments())
    }

    /// End of stream. Whatever is still buffered belongs to an
    /// unterminated block and is dropped, truncated UTF-8 included.
    pub fn finish(self) {
        if !self.pending_text.is_empty() || !self.pending_bytes.is_empty() {
            log::trace!(
                "dropping unterminated tail at end of stream ({} text chars, {} raw bytes)",
                self.pending_text.len(),
                self.pending_bytes.len()
            );
        }
    }

    fn decode_pending(&mut self) -> Result<(), ClientError> {
        let (decoded_len, text) = match std::str::from_utf8(&self.pending_bytes) {
            Ok(text) => (self.pending_bytes.len(), text.to_string()),
            // A sequence cut off at the chunk boundary stays buffered
            // until the rest arrives.
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                (
                    valid,
                    String::from_utf8_lossy(&self.pending_bytes[..valid]).into_owned(),
                )
            }
            Err(e) => {
                return Err(ClientError::Decode(format!(
                    "response body is not valid UTF-8: {e}"
                )));
            }
        };
        self.pending_text.push_str(&text);
        self.pending_bytes.drain(..decoded_len);
        Ok(())
    }

    fn drain_fragments(&mut self) -> Vec<String> {
        let mut fragments = Vec::new();
        while let Some(end) = self.pending_text.find(FRAGMENT_DELIMITER) {
            let block: String = self
                .pending_text
                .drain(..end + FRAGMENT_DELIMITER.len())
                .collect();
            match block[..end].strip_prefix(DATA_PREFIX) {
                Some(data) => fragments.push(data.to_string()),
                None => log::trace!("discarding non-data block: {:?}", &block[..end]),
            }
        }
        fragments
    }
}
