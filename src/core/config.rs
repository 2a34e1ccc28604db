//! Runtime configuration for a database instance.

use std::path::PathBuf;

/// Settings controlling where a database persists its catalog snapshot and
/// audit log. The default is in-memory-friendly: no paths are set and the
/// audit sink is disabled, so `Database::open_in_memory` needs no
/// filesystem access at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Where `save`/`load` read and write the full-catalog snapshot.
    pub persistence_path: Option<PathBuf>,
    /// Where the audit sink appends statement records, when enabled.
    pub audit_log_path: Option<PathBuf>,
    pub audit_enabled: bool,
}

impl Config {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_persistence_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persistence_path = Some(path.into());
        self
    }

    pub fn with_audit_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.audit_log_path = Some(path.into());
        self.audit_enabled = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_in_memory_and_audit_disabled() {
        let config = Config::default();
        assert!(config.persistence_path.is_none());
        assert!(!config.audit_enabled);
    }

    #[test]
    fn with_audit_log_enables_the_sink() {
        let config = Config::in_memory().with_audit_log("audit.log");
        assert!(config.audit_enabled);
        assert_eq!(config.audit_log_path, Some(PathBuf::from("audit.log")));
    }
}
