use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Directory names hidden from both the tree and the contents.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".idea",
    ".vscode",
    "node_modules",
    "__pycache__",
    "dist",
    "build",
    "vendor",
    "bin",
    "obj",
    "target",
    ".next",
    "coverage",
];

/// Extensions listed in the tree but never serialized.
pub const DEFAULT_IGNORED_EXTENSIONS: &[&str] = &[
    // media
    ".png", ".jpg", ".jpeg", ".gif", ".ico", ".svg", ".mp4", ".mp3", ".wav", ".webp",
    // archives
    ".zip", ".tar", ".gz", ".7z", ".rar",
    // compiled
    ".exe", ".dll", ".so", ".dylib", ".class", ".pyc", ".o",
    // fonts
    ".ttf", ".woff", ".woff2", ".eot",
    ".lock", ".pdf", ".ds_store",
];

/// Extensions that skip binary sniffing.
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    ".md", ".txt", ".log", ".go", ".java", ".py", ".js", ".ts", ".c", ".cpp", ".h", ".hpp",
    ".html", ".css", ".xml", ".yaml", ".yml", ".json", ".sql", ".properties", ".ini", ".sh",
    ".bat", ".conf", ".toml", ".rs",
];

/// The tool's own binaries.
pub const DEFAULT_IGNORED_FILES: &[&str] = &["dirsnap", "dirsnap.exe"];

/// Hidden names that stay visible even when hidden entries are excluded.
pub const DEFAULT_ALWAYS_VISIBLE: &[&str] = &[".env", ".gitignore"];

pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;
pub const DEFAULT_MAX_DISPLAY_FILES: usize = 24;
pub const DEFAULT_KEEP_HEAD: usize = 8;
pub const DEFAULT_KEEP_TAIL: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryDetection {
    /// A NUL byte in the sniff window marks the file as binary.
    Simple,
    Accurate,
    None,
}

/// How a content block names its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayPath {
    /// Absolute physical path with forward slashes.
    Physical,
    /// `<root-name>/<logical path>`.
    Relative,
}

/// Tree folding thresholds for long file lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldPolicy {
    pub enabled: bool,
    pub max_display_files: usize,
    pub keep_head: usize,
    pub keep_tail: usize,
}

impl Default for FoldPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_display_files: DEFAULT_MAX_DISPLAY_FILES,
            keep_head: DEFAULT_KEEP_HEAD,
            keep_tail: DEFAULT_KEEP_TAIL,
        }
    }
}

impl FoldPolicy {
    /// Returns the number of files to hide, or `None` when the list is shown in full.
    pub fn hidden_count(&self, files: usize) -> Option<usize> {
        let kept = self.keep_head + self.keep_tail;
        if self.enabled && files > self.max_display_files && files > kept {
            Some(files - kept)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapOptions {
    pub roots: Vec<PathBuf>,
    pub hard_filters: Vec<String>,
    pub soft_filters: Vec<String>,
    pub output: Option<PathBuf>,
    pub fold: FoldPolicy,
    pub max_file_size: u64,
    pub binary_detection: BinaryDetection,
    pub include_hidden: bool,
    pub ignored_dirs: BTreeSet<String>,
    pub ignored_files: BTreeSet<String>,
    pub ignored_extensions: BTreeSet<String>,
    pub text_extensions: BTreeSet<String>,
    pub always_visible: BTreeSet<String>,
    pub display: DisplayPath,
}

fn owned_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            hard_filters: Vec::new(),
            soft_filters: Vec::new(),
            output: None,
            fold: FoldPolicy::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            binary_detection: BinaryDetection::Simple,
            include_hidden: false,
            ignored_dirs: owned_set(DEFAULT_IGNORED_DIRS),
            ignored_files: owned_set(DEFAULT_IGNORED_FILES),
            ignored_extensions: owned_set(DEFAULT_IGNORED_EXTENSIONS),
            text_extensions: owned_set(DEFAULT_TEXT_EXTENSIONS),
            always_visible: owned_set(DEFAULT_ALWAYS_VISIBLE),
            display: DisplayPath::Physical,
        }
    }
}

impl SnapOptions {
    /// Junk entries never appear anywhere: not in the tree, not in the contents.
    pub fn is_junk(&self, name: &str) -> bool {
        if name == "." || self.always_visible.contains(name) {
            return false;
        }
        if self.ignored_files.contains(name) {
            return true;
        }
        if !self.include_hidden && name.starts_with('.') {
            return true;
        }
        self.ignored_dirs.contains(name)
    }

    /// Assets show up in the tree but their bytes are never read.
    pub fn is_asset(&self, name: &str) -> bool {
        dotted_extension(Path::new(name))
            .is_some_and(|ext| self.ignored_extensions.contains(&ext))
    }

    pub fn is_forced_text(&self, path: &Path) -> bool {
        dotted_extension(path).is_some_and(|ext| self.text_extensions.contains(&ext))
    }
}

/// Lower-case extension including the leading dot, e.g. `.rs`.
///
/// A bare dotfile such as `.DS_Store` counts as its own extension, so it can be listed
/// in the extension sets.
pub(crate) fn dotted_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let dot = name.rfind('.')?;
    Some(name[dot..].to_ascii_lowercase())
}

#[derive(Debug, Default)]
pub struct SnapBuilder {
    options: SnapOptions,
}
impl SnapBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            options: SnapOptions {
                roots: vec![root.into()],
                ..Default::default()
            },
        }
    }
    pub fn with_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            options: SnapOptions {
                roots: roots.into_iter().map(Into::into).collect(),
                ..Default::default()
            },
        }
    }
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.options.roots.push(root.into());
        self
    }
    pub fn hard_filters(mut self, patterns: Vec<String>) -> Self {
        self.options.hard_filters = patterns;
        self
    }
    pub fn soft_filters(mut self, patterns: Vec<String>) -> Self {
        self.options.soft_filters = patterns;
        self
    }
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.output = Some(path.into());
        self
    }
    pub fn fold(mut self, yes: bool) -> Self {
        self.options.fold.enabled = yes;
        self
    }
    pub fn fold_policy(mut self, policy: FoldPolicy) -> Self {
        self.options.fold = policy;
        self
    }
    pub fn max_file_size(mut self, limit: u64) -> Self {
        self.options.max_file_size = limit;
        self
    }
    pub fn binary_detection(mut self, method: BinaryDetection) -> Self {
        self.options.binary_detection = method;
        self
    }
    pub fn include_hidden(mut self, yes: bool) -> Self {
        self.options.include_hidden = yes;
        self
    }
    pub fn ignore_file_name(mut self, name: impl Into<String>) -> Self {
        self.options.ignored_files.insert(name.into());
        self
    }
    pub fn text_extension(mut self, ext: impl Into<String>) -> Self {
        self.options.text_extensions.insert(ext.into().to_ascii_lowercase());
        self
    }
    pub fn display(mut self, display: DisplayPath) -> Self {
        self.options.display = display;
        self
    }
    pub fn build(self) -> SnapOptions {
        self.options
    }
}
