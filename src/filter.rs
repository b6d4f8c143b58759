//! Ordered path filter rules.
//!
//! A [`RuleSet`] is one filter tier. Rules are tried in declaration order and the first
//! rule that matches decides: a plain rule excludes the path, a `!`-negated rule keeps it.
//! Paths are relative to their root and use forward slashes.
//!
//! Pattern shapes:
//!
//! - `dir/*` matches everything below `dir` but not `dir` itself.
//! - `dir/` or `dir` matches `dir` and everything below it.
//! - Anything else is also tried as a glob (`*`, `?`, `[...]`) against the full path and
//!   against the last path segment.

use crate::error::SnapError;
use globset::{GlobBuilder, GlobMatcher};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Trailing `/*`: the directory entry is spared, its descendants are not.
    ContentsOnly,
    /// Trailing `/`: the directory and everything beneath it.
    DirectoryPrefix,
    /// Bare pattern: segment prefix or glob.
    Glob,
}

#[derive(Debug, Clone)]
pub struct FilterRule {
    raw: String,
    negated: bool,
    kind: RuleKind,
    /// Pattern body without the negation marker or the `/*` suffix.
    body: String,
    glob: Option<GlobMatcher>,
}

impl FilterRule {
    /// Parses one pattern. Returns `None` for patterns that are empty once normalized.
    pub fn parse(pattern: &str) -> Option<Self> {
        let raw = normalize_pattern(pattern)?;
        let negated = raw.starts_with('!');
        let unmarked = if negated { &raw[1..] } else { raw.as_str() };

        let (kind, body) = if let Some(dir) = unmarked.strip_suffix("/*") {
            (RuleKind::ContentsOnly, dir.to_string())
        } else if pattern.trim_end().ends_with(['/', '\\']) {
            (RuleKind::DirectoryPrefix, unmarked.to_string())
        } else {
            (RuleKind::Glob, unmarked.to_string())
        };
        if body.is_empty() {
            return None;
        }

        let glob = match kind {
            RuleKind::ContentsOnly => None,
            _ => compile_glob(&body),
        };

        Some(Self {
            raw,
            negated,
            kind,
            body,
            glob,
        })
    }

    /// The normalized pattern text, including any `!` marker.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Whether the rule's pattern covers `path`, ignoring polarity.
    pub fn covers(&self, path: &str) -> bool {
        let body = self.body.as_str();
        match self.kind {
            RuleKind::ContentsOnly => {
                path.len() > body.len() + 1
                    && path.starts_with(body)
                    && path.as_bytes()[body.len()] == b'/'
            }
            RuleKind::DirectoryPrefix | RuleKind::Glob => {
                if is_segment_prefix(body, path) {
                    return true;
                }
                let Some(glob) = &self.glob else {
                    return false;
                };
                glob.is_match(path) || glob.is_match(file_name(path))
            }
        }
    }
}

fn is_segment_prefix(dir: &str, path: &str) -> bool {
    path == dir
        || (path.len() > dir.len() && path.starts_with(dir) && path.as_bytes()[dir.len()] == b'/')
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn compile_glob(body: &str) -> Option<GlobMatcher> {
    match GlobBuilder::new(body).literal_separator(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(_e) => {
            #[cfg(feature = "logging")]
            tracing::warn!("invalid glob '{}' only matches as a directory prefix: {}", body, _e);
            None
        }
    }
}

/// Normalizes separators and trailing slashes once, at load time.
///
/// Backslashes become forward slashes. A trailing `/*` is kept; any other trailing slash
/// is stripped.
pub fn normalize_pattern(pattern: &str) -> Option<String> {
    let pattern = pattern.trim().replace('\\', "/");
    if pattern.is_empty() {
        return None;
    }
    if pattern.ends_with("/*") {
        return Some(pattern);
    }
    let trimmed = pattern.trim_end_matches('/');
    if trimmed.is_empty() || trimmed == "!" {
        return None;
    }
    Some(trimmed.to_string())
}

/// Outcome of evaluating a path against a [`RuleSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict<'a> {
    pub matched: bool,
    /// The rule that decided, whether it excluded or rescued the path.
    pub rule: Option<&'a str>,
}

impl Verdict<'_> {
    fn keep() -> Self {
        Verdict {
            matched: false,
            rule: None,
        }
    }
}

/// One ordered filter tier.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<FilterRule>,
}

impl RuleSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        Self {
            rules: patterns
                .iter()
                .filter_map(|p| FilterRule::parse(p.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    /// First-match-wins evaluation. The empty path never matches.
    pub fn check(&self, path: &str) -> Verdict<'_> {
        if path.is_empty() {
            return Verdict::keep();
        }
        self.rules
            .iter()
            .find(|rule| rule.covers(path))
            .map_or_else(Verdict::keep, |rule| Verdict {
                matched: !rule.negated,
                rule: Some(rule.as_str()),
            })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.check(path).matched
    }
}

/// Reads patterns from a file: one per line, blank lines and `#` comments skipped.
pub fn load_patterns(path: impl AsRef<Path>) -> Result<Vec<String>, SnapError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| SnapError::io(path, e))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
