//! Audit sink contract: record that a statement executed, and tolerate the
//! recording itself failing.

use crate::core::common::error::DbError;

/// Something that can durably record a statement having run. Implementors
/// must not let a recording failure propagate as a query failure — the
/// engine only ever logs a sink error, it never surfaces it to the caller.
pub trait AuditSink: std::fmt::Debug {
    fn record(&self, statement: &str) -> Result<(), DbError>;
}

/// Appends one line per statement to a file, opening and closing it on
/// every call so the sink holds no long-lived file handle.
#[derive(Debug)]
pub struct FileAuditSink {
    path: std::path::PathBuf,
}

impl FileAuditSink {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AuditSink for FileAuditSink {
    /// Appends `[<ISO-8601 timestamp>] <statement>` per §6's audit-log contract.
    fn record(&self, statement: &str) -> Result<(), DbError> {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "[{}] {statement}", chrono::Utc::now().to_rfc3339())?;
        Ok(())
    }
}

/// Records a statement through `sink`, if any, logging rather than
/// propagating a recording failure.
pub fn record_if_present(sink: Option<&dyn AuditSink>, statement: &str) {
    if let Some(sink) = sink {
        if let Err(err) = sink.record(statement) {
            tracing::warn!(error = %err, "audit sink failed to record statement");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn file_sink_appends_lines() {
        let file = NamedTempFile::new().unwrap();
        let sink = FileAuditSink::new(file.path());
        sink.record("INSERT INTO t VALUES (1)").unwrap();
        sink.record("DELETE FROM t WHERE id = 1").unwrap();
        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.lines().next().unwrap().starts_with('['));
    }

    #[test]
    fn record_if_present_is_a_noop_without_a_sink() {
        record_if_present(None, "SELECT 1");
    }
}
