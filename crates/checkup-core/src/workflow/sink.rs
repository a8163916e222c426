use std::io::Write;
use std::sync::Mutex;

use crate::error::CheckupError;

/// Human-readable log stream of a workflow run.
pub trait LogSink: Send + Sync {
    fn line(&self, text: &str);

    /// Writes a fatal error followed by its causes.
    fn error(&self, err: &CheckupError) {
        let mut chain = err.chain().into_iter();
        if let Some(head) = chain.next() {
            self.line(&format!("ERROR: {head}"));
        }
        for cause in chain {
            self.line(&format!("  caused by: {cause}"));
        }
    }
}

/// Writes each line to an `io::Write`, typically stderr.
pub struct WriterSink<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl WriterSink<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        // Write failures are ignored.
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn line(&self, text: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn memory_sink_records_lines_in_order() {
        let sink = MemorySink::new();
        sink.line("Uploading app.apk");
        sink.line("Checking on operationId=1");
        assert_eq!(sink.lines(), vec!["Uploading app.apk", "Checking on operationId=1"]);
        assert!(sink.contains("operationId=1"));
    }

    #[test]
    fn error_writes_the_cause_chain() {
        let sink = MemorySink::new();
        sink.error(&CheckupError::ArtifactRead {
            path: PathBuf::from("app.apk"),
            source: std::io::Error::other("disk on fire"),
        });
        assert_eq!(
            sink.lines(),
            vec![
                "ERROR: failed to read artifact app.apk",
                "  caused by: disk on fire"
            ]
        );
    }

    #[test]
    fn writer_sink_appends_newlines() {
        let sink = WriterSink::new(Vec::new());
        sink.line("a");
        sink.line("b");
        let out = sink.out.into_inner().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a\nb\n");
    }
}
