//! # Dirsnap
//!
//! `dirsnap` turns one or more directory roots into a single text snapshot: an ASCII tree of
//! each root followed by the normalized contents of every surviving file, ready to be pasted
//! into an LLM context window.
//!
//! The pieces, leaves first:
//!
//! - [`RuleSet`]: ordered, first-match-wins path filters. Two tiers are used: *hard* rules
//!   hide an entry everywhere, *soft* rules only keep its content out of the document.
//! - [`Walker`]: an iterative, symlink-following walk that keeps the link names in the
//!   logical path and breaks cycles with a [`VisitedSet`] of canonical directories.
//! - [`TreeRenderer`]: the `├──`/`└──` listing, directories first, long file lists folded.
//! - [`ContentSerializer`]: size gate, binary sniff and UTF-8/GBK normalization.
//! - [`Aggregator`]: runs the tree pass, then the content pass, into one buffered sink.
//!
//! # Features
//!
//! - `logging` (default): skip and conversion notices are emitted as `tracing` events.
//!
//! # Example
//!
//! ```no_run
//! use dirsnap::{SnapBuilder, snapshot_to_file};
//!
//! let options = SnapBuilder::new(".")
//!     .hard_filters(vec!["dist/".into()])
//!     .soft_filters(vec!["*.snap".into(), "!keep.snap".into()])
//!     .fold(true)
//!     .build();
//!
//! let report = snapshot_to_file(&options).expect("snapshot failed");
//! println!("wrote {} files to {:?}", report.files.len(), report.output);
//! ```

mod content;
mod engine;
mod error;
mod filter;
mod options;
pub mod output;
mod tree;
mod types;
mod walker;

pub use content::{ContentBlock, ContentSerializer, SNIFF_LEN, Serialized, SourceEncoding, decode_text, is_binary};
pub use engine::{Aggregator, resolve_roots, snapshot, snapshot_to_file};
pub use error::SnapError;
pub use filter::{FilterRule, RuleKind, RuleSet, Verdict, load_patterns, normalize_pattern};
pub use options::{
    BinaryDetection, DEFAULT_ALWAYS_VISIBLE, DEFAULT_IGNORED_DIRS, DEFAULT_IGNORED_EXTENSIONS,
    DEFAULT_IGNORED_FILES, DEFAULT_KEEP_HEAD, DEFAULT_KEEP_TAIL, DEFAULT_MAX_DISPLAY_FILES,
    DEFAULT_MAX_FILE_SIZE, DEFAULT_TEXT_EXTENSIONS, DisplayPath, FoldPolicy, SnapBuilder,
    SnapOptions,
};
pub use tree::{TreeItem, TreeRenderer};
pub use types::{RootFailure, SkipReason, SkippedFile, SnapshotReport};
pub use walker::{Node, Visit, VisitedSet, Walker, read_entries, walk};
