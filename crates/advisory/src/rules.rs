//! Where the precaution rule table comes from.
//!
//! The rule file is a JSON array of `{condition, min_aqi, max_aqi,
//! precaution}` objects; row order is preserved because the selector
//! resolves overlaps by first match.

use async_trait::async_trait;
use airadvisor_core::error::RuleError;
use airadvisor_core::rule::RuleTable;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Supplies the rule table for a request.
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// Where the rules come from, for logs and `doctor`.
    fn describe(&self) -> String;

    async fn load(&self) -> Result<Arc<RuleTable>, RuleError>;
}

/// Re-reads the rule file on every request, so edits apply immediately.
pub struct FileRuleSource {
    path: PathBuf,
}

impl FileRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RuleSource for FileRuleSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn load(&self) -> Result<Arc<RuleTable>, RuleError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| RuleError::Read {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        let table = parse_rules(&self.path, &content)?;
        debug!(path = %self.path.display(), rules = table.len(), "Loaded rule table");
        Ok(Arc::new(table))
    }
}

/// A rule table fixed at construction. A load failure at construction is
/// kept and returned on every request, so a bad file still degrades rather
/// than aborting startup.
pub struct StaticRuleSource {
    origin: String,
    table: Result<Arc<RuleTable>, RuleError>,
}

impl StaticRuleSource {
    pub fn new(table: RuleTable) -> Self {
        Self {
            origin: "in-memory table".into(),
            table: Ok(Arc::new(table)),
        }
    }

    /// Read `path` once now and serve that result from then on.
    pub fn from_file(path: &Path) -> Self {
        let table = load_rules_file(path).map(Arc::new);
        if let Err(e) = &table {
            warn!(error = %e, "Cached rule table failed to load");
        }
        Self {
            origin: format!("cached file {}", path.display()),
            table,
        }
    }
}

#[async_trait]
impl RuleSource for StaticRuleSource {
    fn describe(&self) -> String {
        self.origin.clone()
    }

    async fn load(&self) -> Result<Arc<RuleTable>, RuleError> {
        self.table.clone()
    }
}

fn parse_rules(path: &Path, content: &str) -> Result<RuleTable, RuleError> {
    serde_json::from_str(content).map_err(|e| RuleError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Synchronously read and parse a rule file.
pub fn load_rules_file(path: &Path) -> Result<RuleTable, RuleError> {
    let content = std::fs::read_to_string(path).map_err(|e| RuleError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_rules(path, &content)
}

/// Pretty JSON for the built-in table (written by `onboard`).
pub fn default_rules_json() -> String {
    serde_json::to_string_pretty(&RuleTable::builtin()).unwrap_or_else(|_| "[]".into())
}
