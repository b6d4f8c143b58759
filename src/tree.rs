//! ASCII tree rendering for one root.
//!
//! Only junk names and the hard filter tier hide entries here; soft rules never touch the
//! tree. Within a directory, subdirectories come first and files follow, and a long file
//! list is folded to a fixed head and tail around a hidden-count line.

use crate::error::SnapError;
use crate::filter::RuleSet;
use crate::options::SnapOptions;
use crate::walker::{Node, VisitedSet, read_entries};
use std::path::{Path, PathBuf};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const GAP: &str = "    ";

/// One rendered line: a real entry or the synthetic fold marker.
#[derive(Debug, Clone)]
pub enum TreeItem {
    Entry(Node),
    Folded { hidden: usize },
}

impl TreeItem {
    pub fn label(&self) -> String {
        match self {
            TreeItem::Entry(node) => match &node.link_target {
                Some(target) if node.is_symlink => {
                    format!("{} -> {}", node.name_lossy(), target.display())
                }
                _ => node.name_lossy(),
            },
            TreeItem::Folded { hidden } => format!("... ({} files hidden) ...", hidden),
        }
    }
}

struct Level {
    items: Vec<TreeItem>,
    next: usize,
    prefix: String,
}

pub struct TreeRenderer<'a> {
    options: &'a SnapOptions,
    hard: &'a RuleSet,
    exclude: Option<&'a Path>,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(options: &'a SnapOptions, hard: &'a RuleSet) -> Self {
        Self {
            options,
            hard,
            exclude: None,
        }
    }

    /// Never lists the file at `path` (canonical), typically the output document.
    pub fn excluding(mut self, path: Option<&'a Path>) -> Self {
        self.exclude = path;
        self
    }

    pub fn render(&self, root: &Path) -> Result<String, SnapError> {
        let mut out = String::new();
        self.render_into(root, &mut out)?;
        Ok(out)
    }

    /// Appends the tree lines for `root` to `out`.
    ///
    /// On a directory read failure, the lines rendered so far stay in `out`.
    pub fn render_into(&self, root: &Path, out: &mut String) -> Result<(), SnapError> {
        let mut visited = VisitedSet::new();
        visited.enter(root);
        let mut stack = vec![Level {
            items: self.level(root, Path::new(""))?,
            next: 0,
            prefix: String::new(),
        }];

        while let Some(level) = stack.last_mut() {
            let Some(item) = level.items.get(level.next) else {
                stack.pop();
                continue;
            };
            level.next += 1;
            let is_last = level.next == level.items.len();

            out.push_str(&level.prefix);
            out.push_str(if is_last { LAST_BRANCH } else { BRANCH });
            out.push_str(&item.label());
            out.push('\n');

            let descend: Option<(PathBuf, PathBuf)> = match item {
                TreeItem::Entry(node) if node.is_dir => {
                    Some((node.physical.clone(), node.logical.clone()))
                }
                _ => None,
            };
            let Some((physical, logical)) = descend else {
                continue;
            };
            let prefix = format!("{}{}", level.prefix, if is_last { GAP } else { PIPE });
            if !visited.enter(&physical) {
                continue;
            }
            let items = self.level(&physical, &logical)?;
            stack.push(Level {
                items,
                next: 0,
                prefix,
            });
        }
        Ok(())
    }

    /// Visible entries of one directory: filtered, directories first, files folded.
    fn level(&self, physical: &Path, logical: &Path) -> Result<Vec<TreeItem>, SnapError> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for node in read_entries(physical, logical)? {
            if self.exclude.is_some_and(|ex| node.resolves_to(ex))
                || self.options.is_junk(&node.name_lossy())
                || self.hard.is_match(&node.logical_slash())
            {
                continue;
            }
            if node.is_dir {
                dirs.push(TreeItem::Entry(node));
            } else {
                files.push(TreeItem::Entry(node));
            }
        }

        let fold = &self.options.fold;
        if let Some(hidden) = fold.hidden_count(files.len()) {
            let tail = files.split_off(files.len() - fold.keep_tail);
            files.truncate(fold.keep_head);
            files.push(TreeItem::Folded { hidden });
            files.extend(tail);
            #[cfg(feature = "logging")]
            tracing::debug!("folded {} files in {}", hidden, physical.display());
        }

        dirs.extend(files);
        Ok(dirs)
    }
}
