//! Log sinks for diagnostic records.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Accepts one serialized record per invocation.
pub trait LogSink: Send + Sync {
    fn write_record(&self, line: &str) -> io::Result<()>;
}

/// Writes records to standard output, one per line.
///
/// Operational tracing goes to stderr, so stdout carries only records.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_record(&self, line: &str) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", line)?;
        handle.flush()
    }
}

/// Keeps records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for MemorySink {
    fn write_record(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory sink lock poisoned"))?
            .push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_lines() {
        let sink = MemorySink::new();
        let shared = sink.clone();
        sink.write_record(r#"{"Latency":"1ms"}"#).unwrap();
        sink.write_record(r#"{"Latency":"2ms"}"#).unwrap();
        assert_eq!(shared.lines().len(), 2);
        assert_eq!(shared.lines()[1], r#"{"Latency":"2ms"}"#);
    }
}
