//! File-based probe source.
//!
//! Tails a JSON-lines file of latency samples, one sample object per line.

use std::collections::VecDeque;
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::ProbeSource;
use crate::data::LatencySample;

/// A probe source that tails a JSON-lines sample log.
///
/// An external sampler appends one JSON object per line
/// (`{"time":"...","latency_ms":42.5}`). This source tracks its byte offset
/// into the file, parses only newly appended lines, and yields the buffered
/// samples one per `poll` so ingestion order matches production order.
///
/// If the file shrinks (truncated or replaced), reading restarts from the
/// top.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    offset: u64,
    pending: VecDeque<LatencySample>,
    last_error: Option<String>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            offset: 0,
            pending: VecDeque::new(),
            last_error: None,
        }
    }

    /// Returns the path being tailed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read any newly appended complete lines into the pending queue.
    fn refill(&mut self) {
        let mut file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                return;
            }
        };

        let len = match file.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                return;
            }
        };

        if len < self.offset {
            // Truncated or replaced; start over.
            self.offset = 0;
        }
        if len == self.offset {
            return;
        }

        if let Err(e) = file.seek(SeekFrom::Start(self.offset)) {
            self.last_error = Some(format!("Read error: {}", e));
            return;
        }

        let mut buf = String::new();
        if let Err(e) = file.read_to_string(&mut buf) {
            self.last_error = Some(format!("Read error: {}", e));
            return;
        }

        // Only consume complete lines; a partially written trailing line
        // stays untouched until the producer finishes it.
        let mut consumed = 0usize;
        for line in buf.split_inclusive('\n') {
            if !line.ends_with('\n') {
                break;
            }
            consumed += line.len();

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<LatencySample>(trimmed) {
                Ok(sample) => {
                    self.last_error = None;
                    self.pending.push_back(sample);
                }
                Err(e) => {
                    self.last_error = Some(format!("Parse error: {}", e));
                }
            }
        }
        self.offset += consumed as u64;
    }
}

impl ProbeSource for FileSource {
    fn poll(&mut self) -> Option<LatencySample> {
        if self.pending.is_empty() {
            self.refill();
        }
        self.pending.pop_front()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }
}
