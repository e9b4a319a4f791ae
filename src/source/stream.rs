//! Stream-based probe source.
//!
//! Receives latency samples from an async byte stream, such as stdin or an
//! in-memory reader, as newline-delimited JSON.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

use super::ProbeSource;
use crate::data::LatencySample;

/// A probe source that reads samples from an async stream.
///
/// Spawns a background task that reads newline-delimited JSON from the
/// provided reader and makes samples available via `poll()`. Each line is
/// parsed as one [`LatencySample`].
///
/// # Example with a byte stream
///
/// ```
/// use std::io::Cursor;
/// use netpulse::StreamSource;
///
/// # tokio_test::block_on(async {
/// let data = b"{\"time\":\"2026-08-30T12:00:00Z\",\"latency_ms\":42.5}\n";
/// let stream = Cursor::new(data.to_vec());
/// let source = StreamSource::spawn(stream, "example");
/// # });
/// ```
#[derive(Debug)]
pub struct StreamSource {
    receiver: mpsc::Receiver<LatencySample>,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
}

impl StreamSource {
    /// Spawn a background task that reads from the given async reader.
    ///
    /// Must be called within a tokio runtime. The reader should provide
    /// newline-delimited JSON samples; malformed lines are skipped and
    /// surfaced through `error()`.
    pub fn spawn<R>(reader: R, description: &str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(64);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        // EOF
                        *error_handle.lock().unwrap() = Some("Stream ended".to_string());
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<LatencySample>(trimmed) {
                            Ok(sample) => {
                                *error_handle.lock().unwrap() = None;
                                if tx.send(sample).await.is_err() {
                                    // Receiver dropped
                                    break;
                                }
                            }
                            Err(e) => {
                                *error_handle.lock().unwrap() =
                                    Some(format!("Parse error: {}", e));
                            }
                        }
                    }
                    Err(e) => {
                        *error_handle.lock().unwrap() = Some(format!("Read error: {}", e));
                        break;
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description: format!("stream: {}", description),
            last_error,
        }
    }

    /// Create a StreamSource from a raw bytes channel.
    ///
    /// Useful when another component already frames messages and wants to
    /// push JSON bytes without going through an `AsyncRead`.
    pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> Self {
        let (tx, sample_rx) = mpsc::channel(64);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        tokio::spawn(async move {
            while let Some(bytes) = rx.recv().await {
                match serde_json::from_slice::<LatencySample>(&bytes) {
                    Ok(sample) => {
                        *error_handle.lock().unwrap() = None;
                        if tx.send(sample).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        *error_handle.lock().unwrap() = Some(format!("Parse error: {}", e));
                    }
                }
            }
        });

        Self {
            receiver: sample_rx,
            description: format!("stream: {}", description),
            last_error,
        }
    }
}

impl ProbeSource for StreamSource {
    fn poll(&mut self) -> Option<LatencySample> {
        match self.receiver.try_recv() {
            Ok(sample) => Some(sample),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                let mut err = self.last_error.lock().unwrap();
                if err.is_none() {
                    *err = Some("Stream disconnected".to_string());
                }
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }
}
