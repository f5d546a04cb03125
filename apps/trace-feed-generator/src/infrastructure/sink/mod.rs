//! Record sink adapters: stdout, file, and an in-memory test double.
//!
//! All three implement the [`RecordSink`] port: one newline-terminated
//! line per record, flushed per append so output stays durably ordered.
//! Stdout is the primary data plane; logs go to stderr, never here.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::application::ports::{RecordSink, SinkError};

/// Writes records to standard output, flushing per record.
#[derive(Debug)]
pub struct StdoutSink {
    stdout: io::Stdout,
}

impl StdoutSink {
    /// Creates a stdout sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordSink for StdoutSink {
    fn append(&mut self, line: &str) -> Result<(), SinkError> {
        let mut handle = self.stdout.lock();
        writeln!(handle, "{line}")?;
        handle.flush()?;
        Ok(())
    }
}

/// Appends records to a file, flushing per record.
#[derive(Debug)]
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Opens `path` for appending, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl RecordSink for FileSink {
    fn append(&mut self, line: &str) -> Result<(), SinkError> {
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects records in memory. The test double for feed-loop assertions:
/// clones share the same backing store, so tests keep a clone and hand
/// the original to the emitter.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Snapshot of every line appended so far, in order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, line: &str) -> Result<(), SinkError> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_writes_newline_terminated_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.jsonl");

        let mut sink = FileSink::open(&path).unwrap();
        sink.append("{\"seq\":1}").unwrap();
        sink.append("{\"seq\":2}").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\"seq\":1}\n{\"seq\":2}\n");
    }

    #[test]
    fn file_sink_appends_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.jsonl");

        {
            let mut sink = FileSink::open(&path).unwrap();
            sink.append("{\"seq\":1}").unwrap();
        }
        {
            let mut sink = FileSink::open(&path).unwrap();
            sink.append("{\"seq\":2}").unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\"seq\":1}\n{\"seq\":2}\n");
    }

    #[test]
    fn file_sink_open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("feed.jsonl");
        assert!(matches!(FileSink::open(&path), Err(SinkError::Io(_))));
    }

    #[test]
    fn memory_sink_shares_lines_across_clones() {
        let mut sink = MemorySink::default();
        let view = sink.clone();

        sink.append("{\"seq\":1}").unwrap();
        sink.append("{\"seq\":2}").unwrap();

        assert_eq!(view.lines(), vec!["{\"seq\":1}", "{\"seq\":2}"]);
    }
}
