//! The aggregator: one tree pass and one content pass per root, written to one document.

use crate::content::{ContentSerializer, Serialized, SourceEncoding};
use crate::error::SnapError;
use crate::filter::RuleSet;
use crate::options::{DisplayPath, SnapOptions};
use crate::output::{self, absolute_clean, resolve_output_path, root_name};
use crate::tree::TreeRenderer;
use crate::types::{SkipReason, SnapshotReport};
use crate::walker::{Node, Visit, Walker};
use std::env;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Makes every root absolute and lexically clean. An empty list means the current directory.
pub fn resolve_roots(roots: &[PathBuf]) -> Result<Vec<PathBuf>, SnapError> {
    let cwd = env::current_dir()
        .map_err(|e| SnapError::InvalidPath(format!("cannot resolve current directory: {}", e)))?;
    if roots.is_empty() {
        return Ok(vec![absolute_clean(Path::new("."), &cwd)]);
    }
    Ok(roots.iter().map(|r| absolute_clean(r, &cwd)).collect())
}

fn prune(node: &Node) -> Visit {
    if node.is_dir {
        Visit::SkipSubtree
    } else {
        Visit::Continue
    }
}

fn is_below(path: &str, dir: &str) -> bool {
    path.len() > dir.len() && path.starts_with(dir) && path.as_bytes()[dir.len()] == b'/'
}

/// Drives both passes. Filter tiers are compiled once and stay fixed for the run.
pub struct Aggregator<'a> {
    options: &'a SnapOptions,
    hard: RuleSet,
    soft: RuleSet,
    exclude: Option<PathBuf>,
    sink: PathBuf,
}

impl<'a> Aggregator<'a> {
    pub fn new(options: &'a SnapOptions) -> Self {
        Self {
            options,
            hard: RuleSet::new(&options.hard_filters),
            soft: RuleSet::new(&options.soft_filters),
            exclude: None,
            sink: PathBuf::from("<output>"),
        }
    }

    /// Keeps the file at `path` out of both passes. Pass the canonical path.
    pub fn exclude(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude = Some(path.into());
        self
    }

    /// Names the output in error messages.
    pub fn sink_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.sink = path.into();
        self
    }

    /// Writes the whole document to `out`.
    ///
    /// The buffered sink is flushed on every exit path. Output failures abort immediately;
    /// traversal failures are recorded per root in the report and the next root proceeds.
    pub fn run<W: Write>(&self, out: W) -> Result<SnapshotReport, SnapError> {
        let roots = resolve_roots(&self.options.roots)?;
        let mut out = BufWriter::new(out);
        let mut report = SnapshotReport::default();

        self.structure_pass(&roots, &mut out, &mut report)?;
        output::write_contents_header(&mut out).map_err(|e| self.sink_err(e))?;
        for root in &roots {
            if let Err(e) = self.content_pass(root, &mut out, &mut report) {
                if e.is_fatal() {
                    return Err(e);
                }
                #[cfg(feature = "logging")]
                tracing::error!("failed while processing {}: {}", root.display(), e);
                report.fail(root, e.to_string());
            }
        }

        out.flush().map_err(|e| self.sink_err(e))?;
        Ok(report)
    }

    fn sink_err(&self, e: std::io::Error) -> SnapError {
        SnapError::output(&self.sink, e)
    }

    fn structure_pass<W: Write>(
        &self,
        roots: &[PathBuf],
        out: &mut W,
        report: &mut SnapshotReport,
    ) -> Result<(), SnapError> {
        let renderer = TreeRenderer::new(self.options, &self.hard).excluding(self.exclude.as_deref());
        output::write_structure_header(out).map_err(|e| self.sink_err(e))?;
        for root in roots {
            let mut tree = String::new();
            if let Err(e) = renderer.render_into(root, &mut tree) {
                tree.push_str(&format!("Error generating tree for {}: {}\n", root.display(), e));
                report.fail(root, e.to_string());
            }
            output::write_root_tree(out, &root_name(root), &tree).map_err(|e| self.sink_err(e))?;
        }
        output::write_structure_footer(out).map_err(|e| self.sink_err(e))
    }

    fn content_pass<W: Write>(
        &self,
        root: &Path,
        out: &mut W,
        report: &mut SnapshotReport,
    ) -> Result<(), SnapError> {
        let serializer = ContentSerializer::new(self.options);
        let name = root_name(root);
        // Soft-pruned subtrees are still walked, silently, so directories reachable
        // through several paths are claimed under the same logical path as in the tree.
        let mut pruned: Option<String> = None;
        Walker::new(root).walk(|node| {
            if self.exclude.as_deref().is_some_and(|ex| node.resolves_to(ex)) {
                return Ok(prune(node));
            }
            let file_name = node.name_lossy();
            if self.options.is_junk(&file_name) {
                return Ok(prune(node));
            }

            let rel = node.logical_slash();
            let hard = self.hard.check(&rel);
            if hard.matched {
                #[cfg(feature = "logging")]
                tracing::debug!("[SKIP] hard filter \"{}\": {}", hard.rule.unwrap_or(""), rel);
                return Ok(prune(node));
            }
            if let Some(dir) = &pruned {
                if is_below(&rel, dir) {
                    return Ok(Visit::Continue);
                }
                pruned = None;
            }
            let soft = self.soft.check(&rel);
            if soft.matched {
                let rule = soft.rule.unwrap_or_default().to_string();
                if node.is_dir {
                    #[cfg(feature = "logging")]
                    tracing::info!("[SKIP] directory (soft filter \"{}\"): {}", rule, rel);
                    report.skip(&node.physical, SkipReason::SoftFilteredDir { rule });
                    pruned = Some(rel);
                    return Ok(Visit::Continue);
                }
                #[cfg(feature = "logging")]
                tracing::info!("[SKIP] content (soft filter \"{}\"): {}", rule, rel);
                report.skip(&node.physical, SkipReason::SoftFiltered { rule });
                return Ok(Visit::Continue);
            }

            if node.is_dir {
                return Ok(Visit::Continue);
            }
            if self.options.is_asset(&file_name) {
                report.skip(&node.physical, SkipReason::Asset);
                return Ok(Visit::Continue);
            }

            match serializer.serialize(&node.physical) {
                Serialized::Emitted(mut block) => {
                    if self.options.display == DisplayPath::Relative {
                        block.display_path = format!("{}/{}", name, rel);
                    }
                    output::write_file_block(out, &block).map_err(|e| self.sink_err(e))?;
                    if block.encoding != SourceEncoding::Utf8 {
                        report.converted.push(node.physical.clone());
                    }
                    report.files.push(node.physical.clone());
                }
                Serialized::Skipped(reason) => {
                    #[cfg(feature = "logging")]
                    tracing::debug!("no content for {}: {:?}", node.physical.display(), reason);
                    report.skip(&node.physical, reason);
                }
            }
            Ok(Visit::Continue)
        })?;
        Ok(())
    }
}

/// Snapshots into any writer, with nothing excluded.
pub fn snapshot<W: Write>(options: &SnapOptions, out: W) -> Result<SnapshotReport, SnapError> {
    Aggregator::new(options).run(out)
}

/// Resolves the output path, creates the document and snapshots into it.
///
/// The document itself never appears in its own tree or contents.
pub fn snapshot_to_file(options: &SnapOptions) -> Result<SnapshotReport, SnapError> {
    let cwd = env::current_dir()
        .map_err(|e| SnapError::InvalidPath(format!("cannot resolve current directory: {}", e)))?;
    let roots = resolve_roots(&options.roots)?;
    let path = resolve_output_path(&roots, options.output.as_deref(), &cwd)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SnapError::output(parent, e))?;
    }
    let file = File::create(&path).map_err(|e| SnapError::output(&path, e))?;
    let canonical = fs::canonicalize(&path).map_err(|e| SnapError::output(&path, e))?;

    #[cfg(feature = "logging")]
    tracing::info!("writing snapshot to {}", path.display());

    let mut report = Aggregator::new(options)
        .exclude(canonical)
        .sink_name(&path)
        .run(file)?;
    report.output = Some(path);
    Ok(report)
}
