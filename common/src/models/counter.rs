// common/src/models/counter.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two file activity counters kept in the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterKind {
    Preview,
    Download,
}

impl CounterKind {
    /// Name of the counter document
    pub fn var_name(&self) -> &'static str {
        match self {
            CounterKind::Preview => "PreviewCount",
            CounterKind::Download => "DownloadCount",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.var_name())
    }
}

/// Current values of both counters, as shown on the file listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub previews: u64,
    pub downloads: u64,
}
