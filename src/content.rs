//! Per-file content serialization.
//!
//! Each file runs through a fixed sequence of gates and stops at the first that fails:
//! metadata, directory-via-symlink, size, read, binary sniff, encoding. A file that
//! clears all of them becomes a [`ContentBlock`].

use crate::options::{BinaryDetection, SnapOptions, dotted_extension};
use crate::output::language_from_extension;
use crate::types::SkipReason;
use crate::walker::to_slash;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Bytes inspected by the binary sniff.
pub const SNIFF_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceEncoding {
    Utf8,
    /// GBK / GB18030, transcoded to UTF-8.
    Gbk,
}

impl SourceEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "UTF-8",
            SourceEncoding::Gbk => "GBK/GB18030",
        }
    }
}

/// A file ready to be written into the contents section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    pub display_path: String,
    pub language: String,
    /// UTF-8 text, newline-terminated unless empty.
    pub content: String,
    pub encoding: SourceEncoding,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Serialized {
    Emitted(ContentBlock),
    Skipped(SkipReason),
}

pub struct ContentSerializer<'a> {
    options: &'a SnapOptions,
}

impl<'a> ContentSerializer<'a> {
    pub fn new(options: &'a SnapOptions) -> Self {
        Self { options }
    }

    pub fn serialize(&self, path: &Path) -> Serialized {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(_) => return Serialized::Skipped(SkipReason::Metadata),
        };
        if metadata.is_dir() {
            #[cfg(feature = "logging")]
            tracing::info!("[SKIP] symlink points to a directory: {}", path.display());
            return Serialized::Skipped(SkipReason::SymlinkedDirectory);
        }
        let limit = self.options.max_file_size;
        if metadata.len() > limit {
            #[cfg(feature = "logging")]
            tracing::info!(
                "[SKIP] large file ({} > {} bytes): {}",
                metadata.len(),
                limit,
                path.display()
            );
            return Serialized::Skipped(SkipReason::TooLarge {
                size: metadata.len(),
                limit,
            });
        }

        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(_) => return Serialized::Skipped(SkipReason::Unreadable),
        };

        if !self.options.is_forced_text(path)
            && is_binary(&bytes, self.options.binary_detection)
        {
            #[cfg(feature = "logging")]
            tracing::info!("[SKIP] binary file detected: {}", path.display());
            return Serialized::Skipped(SkipReason::Binary);
        }

        let Some((text, encoding)) = decode_text(&bytes) else {
            #[cfg(feature = "logging")]
            tracing::warn!(
                "[WARN] unrecognized encoding, neither UTF-8 nor GBK (skipped): {}",
                path.display()
            );
            return Serialized::Skipped(SkipReason::UnknownEncoding);
        };
        if encoding != SourceEncoding::Utf8 {
            #[cfg(feature = "logging")]
            tracing::info!(
                "[INFO] converted encoding [{} -> UTF-8]: {}",
                encoding.label(),
                path.display()
            );
        }

        #[cfg(feature = "logging")]
        tracing::info!("processing: {}", path.display());

        let ext = dotted_extension(path).unwrap_or_default();
        Serialized::Emitted(ContentBlock {
            display_path: to_slash(path),
            language: language_from_extension(ext.trim_start_matches('.')),
            content: terminate_line(text.into_owned()),
            encoding,
        })
    }
}

/// Looks for binary content in the first [`SNIFF_LEN`] bytes.
pub fn is_binary(bytes: &[u8], detection: BinaryDetection) -> bool {
    let window = &bytes[..bytes.len().min(SNIFF_LEN)];
    match detection {
        BinaryDetection::Simple => window.contains(&0),
        BinaryDetection::Accurate => content_inspector::inspect(window).is_binary(),
        BinaryDetection::None => false,
    }
}

/// UTF-8 as-is, otherwise a strict GBK decode.
pub fn decode_text(bytes: &[u8]) -> Option<(Cow<'_, str>, SourceEncoding)> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some((Cow::Borrowed(text), SourceEncoding::Utf8));
    }
    encoding_rs::GBK
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| (text, SourceEncoding::Gbk))
}

fn terminate_line(mut content: String) -> String {
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content
}
