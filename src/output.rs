//! Output document layout and output-path resolution.
//!
//! The document is Markdown-flavored text: a `# Project Structure` section holding one tree
//! per root inside a single `text` fence, then a `# File Contents` section with one fenced
//! block per serialized file.

use crate::content::ContentBlock;
use crate::error::SnapError;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

pub const STRUCTURE_HEADER: &str = "# Project Structure\n\n```text\n";
pub const STRUCTURE_FOOTER: &str = "```\n\n---\n\n";
pub const CONTENTS_HEADER: &str = "# File Contents\n\n";
pub const MERGED_NAME: &str = "merged_project";

pub fn write_structure_header<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(STRUCTURE_HEADER.as_bytes())
}

/// Writes `<root-name>/`, the rendered tree lines and a separating blank line.
pub fn write_root_tree<W: Write>(out: &mut W, root_name: &str, tree: &str) -> io::Result<()> {
    writeln!(out, "{}/", root_name)?;
    out.write_all(tree.as_bytes())?;
    out.write_all(b"\n")
}

pub fn write_structure_footer<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(STRUCTURE_FOOTER.as_bytes())
}

pub fn write_contents_header<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(CONTENTS_HEADER.as_bytes())
}

pub fn write_file_block<W: Write>(out: &mut W, block: &ContentBlock) -> io::Result<()> {
    write!(
        out,
        "## File: {}\n\n```{}\n",
        block.display_path, block.language
    )?;
    out.write_all(block.content.as_bytes())?;
    out.write_all(b"```\n\n---\n\n")
}

/// Fence language for an extension without its dot: the extension itself, lower-cased,
/// or `text` when there is none.
pub fn language_from_extension(ext: &str) -> String {
    if ext.is_empty() {
        "text".to_string()
    } else {
        ext.to_ascii_lowercase()
    }
}

/// Display name of a root in the tree header.
pub fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.to_string_lossy().into_owned())
}

/// Lexically removes `.` and `..` components.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other.as_os_str()),
        }
    }
    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }
    cleaned
}

/// Makes `path` absolute against `cwd` and cleans it.
pub fn absolute_clean(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        clean_path(path)
    } else {
        clean_path(&cwd.join(path))
    }
}

/// `<name>_context.md`, named after the single root or the roots' common ancestor.
pub fn output_file_name(roots: &[PathBuf]) -> String {
    let base = match roots {
        [] => None,
        [root] => root.file_name().map(|n| n.to_string_lossy().into_owned()),
        many => common_ancestor(many)
            .filter(|common| common.parent().is_some())
            .and_then(|common| common.file_name().map(|n| n.to_string_lossy().into_owned())),
    };
    let base = base
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| MERGED_NAME.to_string());
    format!("{}_context.md", base)
}

/// Deepest directory that contains every path, if any.
pub fn common_ancestor(paths: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = paths.split_first()?;
    let mut common = first.clone();
    for path in rest {
        while !path.starts_with(&common) {
            if !common.pop() {
                return None;
            }
        }
    }
    Some(common)
}

/// Decides where the document goes.
///
/// Without a user path the document lands in `cwd`. A user path ending in `.md` is taken
/// literally; any other user path names a directory that receives the generated name.
pub fn resolve_output_path(
    roots: &[PathBuf],
    user_out: Option<&Path>,
    cwd: &Path,
) -> Result<PathBuf, SnapError> {
    if roots.is_empty() {
        return Err(SnapError::Config("at least one root directory is required".into()));
    }
    let absolute: Vec<PathBuf> = roots.iter().map(|r| absolute_clean(r, cwd)).collect();
    let file_name = output_file_name(&absolute);
    let Some(user_out) = user_out else {
        return Ok(cwd.join(file_name));
    };
    let cleaned = absolute_clean(user_out, cwd);
    let is_markdown = cleaned
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
    if is_markdown {
        Ok(cleaned)
    } else {
        Ok(cleaned.join(file_name))
    }
}
