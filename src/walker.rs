//! Symlink-aware directory traversal.
//!
//! Every entry carries two paths. The *logical* path is built from the names seen while
//! walking, symlink names included, and is what filters and the tree see. The *physical*
//! path is where the bytes live; a symlinked directory's physical path is its resolved
//! target. Cycles are broken by a [`VisitedSet`] of canonical directories, consulted right
//! before descending.

use crate::error::SnapError;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// A single filesystem entry discovered during traversal.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: OsString,
    /// Relative to the walk root, joined from traversed names.
    pub logical: PathBuf,
    /// Resolved location used for I/O and cycle detection.
    pub physical: PathBuf,
    /// True for real directories and for symlinks that resolve to one.
    pub is_dir: bool,
    pub is_symlink: bool,
    /// Raw link text as stored in the symlink.
    pub link_target: Option<PathBuf>,
}

impl Node {
    pub fn name_lossy(&self) -> String {
        self.name.to_string_lossy().into_owned()
    }

    /// Logical path with forward slashes, the form filter rules are written against.
    pub fn logical_slash(&self) -> String {
        to_slash(&self.logical)
    }

    /// Whether this entry is the file at canonical path `target`.
    pub fn resolves_to(&self, target: &Path) -> bool {
        if target.file_name() != Some(self.name.as_os_str()) && !self.is_symlink {
            return false;
        }
        fs::canonicalize(&self.physical).is_ok_and(|p| p == target)
    }

    fn classify(
        parent_physical: &Path,
        parent_logical: &Path,
        name: OsString,
        file_type: Option<fs::FileType>,
    ) -> Self {
        let physical = parent_physical.join(&name);
        let logical = parent_logical.join(&name);
        let mut node = Node {
            name,
            logical,
            physical,
            is_dir: file_type.is_some_and(|t| t.is_dir()),
            is_symlink: file_type.is_some_and(|t| t.is_symlink()),
            link_target: None,
        };
        if node.is_symlink {
            node.link_target = fs::read_link(&node.physical).ok();
            // Unresolvable links stay leaves.
            if let Ok(target) = fs::canonicalize(&node.physical) {
                if fs::metadata(&target).is_ok_and(|m| m.is_dir()) {
                    node.is_dir = true;
                    node.physical = target;
                }
            }
        }
        node
    }
}

/// Lists one directory as nodes, sorted by name.
pub fn read_entries(physical: &Path, logical: &Path) -> Result<Vec<Node>, SnapError> {
    let read_dir = fs::read_dir(physical).map_err(|e| SnapError::read_dir(physical, e))?;
    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| SnapError::read_dir(physical, e))?;
        let file_type = entry.file_type().ok();
        entries.push(Node::classify(physical, logical, entry.file_name(), file_type));
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Canonical directories already entered during one pass.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: HashSet<PathBuf>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `dir` and returns `true` if it had not been entered yet.
    pub fn enter(&mut self, dir: &Path) -> bool {
        let canonical = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        self.seen.insert(canonical)
    }

    pub fn contains(&self, dir: &Path) -> bool {
        let canonical = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        self.seen.contains(&canonical)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// What the visitor wants done with the entry it was just handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// Do not descend into this entry. Ignored for files.
    SkipSubtree,
}

/// Iterative depth-first walk over one root.
///
/// Entries come in name order and a directory's subtree is walked right after the
/// directory itself, so directories are claimed in the same order the tree renderer
/// claims them. Each walk owns a fresh [`VisitedSet`].
pub struct Walker {
    root: PathBuf,
    visited: VisitedSet,
}

impl Walker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut visited = VisitedSet::new();
        visited.enter(&root);
        Self { root, visited }
    }

    /// Drives the walk to completion.
    ///
    /// A directory read failure aborts the walk, as does any error the visitor returns.
    pub fn walk<F>(mut self, mut visit: F) -> Result<VisitedSet, SnapError>
    where
        F: FnMut(&Node) -> Result<Visit, SnapError>,
    {
        let mut stack = vec![read_entries(&self.root, Path::new(""))?.into_iter()];
        while let Some(entries) = stack.last_mut() {
            let Some(node) = entries.next() else {
                stack.pop();
                continue;
            };
            if visit(&node)? == Visit::SkipSubtree {
                continue;
            }
            if node.is_dir && self.visited.enter(&node.physical) {
                stack.push(read_entries(&node.physical, &node.logical)?.into_iter());
            }
        }
        Ok(self.visited)
    }
}

/// Convenience wrapper: walks `root` with a fresh session.
pub fn walk<F>(root: &Path, visit: F) -> Result<(), SnapError>
where
    F: FnMut(&Node) -> Result<Visit, SnapError>,
{
    Walker::new(root).walk(visit).map(|_| ())
}

pub(crate) fn to_slash(path: &Path) -> String {
    let s = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        s.into_owned()
    } else {
        s.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
