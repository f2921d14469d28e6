//! The streaming-mode frame scanner and extractor.
//!
//! Records arrive framed as `---RESOURCE_START---{json}---RESOURCE_END---`
//! inside an unstructured token stream whose delta boundaries never align
//! with frame boundaries. [`FrameScanner`] is the pure incremental state
//! machine over the accumulating buffer; [`StreamExtractor`] drives it from
//! a [`DeltaStream`], validating and emitting each record the moment its
//! frame closes.

use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;

use refgen_core::{DeltaEvent, DeltaStream};

use crate::config::StreamConfig;
use crate::validator::{SchemaValidator, ValidationOutcome};

/// Marker opening one record frame.
pub const RESOURCE_START: &str = "---RESOURCE_START---";

/// Marker closing one record frame.
pub const RESOURCE_END: &str = "---RESOURCE_END---";

/// Renders one record into the streaming wire format.
///
/// Inverse of extraction: feeding the output back through a
/// [`FrameScanner`] yields the same record.
///
/// # Errors
///
/// Returns a serialization error if the record cannot be encoded as JSON.
pub fn render_frame<T: Serialize>(record: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string_pretty(record)?;
    Ok(format!("{RESOURCE_START}\n{json}\n{RESOURCE_END}"))
}

/// Incremental scanner for delimited record frames.
///
/// The buffer always holds exactly the unconsumed tail of the stream:
/// everything already returned as a closed frame has been removed, along
/// with any noise that preceded its start marker.
#[derive(Debug, Default)]
pub struct FrameScanner {
    buffer: String,
}

impl FrameScanner {
    /// Creates an empty scanner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one delta and returns every frame it closed, in order.
    ///
    /// A single delta may close zero, one, or many frames, including
    /// frames whose markers were themselves split across deltas.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);

        let mut closed = Vec::new();
        loop {
            let Some(start) = self.buffer.find(RESOURCE_START) else {
                break;
            };
            let body_start = start + RESOURCE_START.len();
            let Some(rel_end) = self.buffer[body_start..].find(RESOURCE_END) else {
                break;
            };
            let body_end = body_start + rel_end;

            closed.push(self.buffer[body_start..body_end].trim().to_string());
            // Preamble before the start marker is noise; it goes too and
            // is never re-scanned.
            self.buffer.drain(..body_end + RESOURCE_END.len());
        }
        closed
    }

    /// Consumes the scanner at stream end, returning any unterminated
    /// trailing fragment (a record truncated by stream completion).
    ///
    /// The fragment is informational only; it is never emitted.
    #[must_use]
    pub fn finish(self) -> Option<String> {
        self.buffer.find(RESOURCE_START).map(|start| {
            self.buffer[start + RESOURCE_START.len()..]
                .trim()
                .to_string()
        })
    }
}

/// One item of the extracted-record output stream.
///
/// The stream never errors past its boundary: every failure mode is an
/// ordinary item the consumer can exhaustively match on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RecordEvent<T> {
    /// One validated record, emitted the moment its frame closed.
    Record(T),
    /// Informational notice (e.g. the stream completed with zero records).
    Notice(String),
    /// Terminal failure description.
    Error(String),
}

/// Drives a delta stream through a [`FrameScanner`], validating and
/// emitting records as their frames close.
pub struct StreamExtractor {
    validator: SchemaValidator,
    config: StreamConfig,
}

impl StreamExtractor {
    /// Creates an extractor validating candidates with `validator`.
    #[must_use]
    pub fn new(validator: SchemaValidator) -> Self {
        Self {
            validator,
            config: StreamConfig::default(),
        }
    }

    /// Creates an extractor with explicit stream configuration.
    #[must_use]
    pub const fn with_config(validator: SchemaValidator, config: StreamConfig) -> Self {
        Self { validator, config }
    }

    /// Consumes the delta stream, producing record events in frame-close
    /// order.
    ///
    /// Each delta is processed synchronously to completion (append, scan,
    /// zero or more emissions) before the next is accepted, so emission
    /// order is deterministic. Malformed candidates are dropped with a
    /// warning; they never terminate the stream. If the stream completes
    /// with zero records, exactly one [`RecordEvent::Notice`] is emitted.
    /// If the consumer drops the returned stream, forwarding stops and the
    /// underlying stream is released.
    pub fn extract<T>(self, mut deltas: DeltaStream) -> ReceiverStream<RecordEvent<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let (tx, rx) = tokio::sync::mpsc::channel(self.config.channel_capacity);
        let validator = self.validator;

        tokio::spawn(async move {
            let mut scanner = FrameScanner::new();
            let mut emitted = 0_usize;

            loop {
                // Watch for the consumer leaving even while the upstream is
                // quiet or producing only frame-less noise; otherwise the
                // buffer keeps growing against a receiver nobody holds.
                let event = tokio::select! {
                    () = tx.closed() => {
                        tracing::debug!("consumer dropped; releasing delta stream");
                        return;
                    }
                    event = deltas.next() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };
                match event {
                    DeltaEvent::Delta { text } => {
                        for candidate in scanner.push(&text) {
                            match validator.validate::<T>(&candidate) {
                                ValidationOutcome::Valid(record) => {
                                    emitted += 1;
                                    if tx.send(RecordEvent::Record(record)).await.is_err() {
                                        // Consumer went away; stop pulling.
                                        return;
                                    }
                                }
                                ValidationOutcome::Invalid { errors, .. } => {
                                    tracing::warn!(%errors, "dropping malformed record frame");
                                }
                            }
                        }
                    }
                    DeltaEvent::Done => break,
                    DeltaEvent::Error { message } => {
                        tracing::error!(%message, "stream failed");
                        let _ = tx.send(RecordEvent::Error(message)).await;
                        return;
                    }
                }
            }

            if let Some(fragment) = scanner.finish() {
                tracing::debug!(
                    fragment_len = fragment.len(),
                    "discarding record truncated by stream end"
                );
            }

            if emitted == 0 {
                let _ = tx
                    .send(RecordEvent::Notice(
                        "No records were generated. Please try a different query.".to_string(),
                    ))
                    .await;
            }
            tracing::info!(records = emitted, "stream extraction complete");
        });

        ReceiverStream::new(rx)
    }
}
