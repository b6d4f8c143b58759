use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Why a file produced no content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Matched a soft rule; the file is still listed in the tree.
    SoftFiltered { rule: String },
    /// A soft rule pruned this directory from the content pass.
    SoftFilteredDir { rule: String },
    /// Extension on the ignored list (media, archives, compiled artifacts).
    Asset,
    /// Metadata could not be read.
    Metadata,
    /// Resolved to a directory at serialization time.
    SymlinkedDirectory,
    TooLarge { size: u64, limit: u64 },
    Unreadable,
    Binary,
    /// Neither UTF-8 nor GBK.
    UnknownEncoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// First traversal error seen for a root. The run carries on with the next root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootFailure {
    pub root: PathBuf,
    pub message: String,
}

/// Summary of one snapshot run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SnapshotReport {
    /// Where the document was written, when it went to a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Files that produced a content block, in walk order.
    pub files: Vec<PathBuf>,
    /// Files whose content was transcoded from GBK.
    pub converted: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    pub errors: Vec<RootFailure>,
}

impl SnapshotReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn skip(&mut self, path: impl Into<PathBuf>, reason: SkipReason) {
        self.skipped.push(SkippedFile {
            path: path.into(),
            reason,
        });
    }

    /// Keeps only the first failure per root.
    pub(crate) fn fail(&mut self, root: &std::path::Path, message: String) {
        if self.errors.iter().any(|f| f.root == root) {
            return;
        }
        self.errors.push(RootFailure {
            root: root.to_path_buf(),
            message,
        });
    }

    pub fn skip_reason(&self, path: &std::path::Path) -> Option<&SkipReason> {
        self.skipped
            .iter()
            .find(|s| s.path == path)
            .map(|s| &s.reason)
    }
}
