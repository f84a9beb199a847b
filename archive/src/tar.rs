//! Decoding of the 512-byte-block archive format.
//!
//! Every entry starts with a fixed-layout header block followed by its
//! content, padded with zeros up to the next block boundary. Only the fields
//! needed to recover paths, sizes and directory markers are interpreted.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ArchiveError, Result};

/// Size of a header block and the alignment of every entry.
pub const BLOCK_SIZE: usize = 512;

const NAME_RANGE: std::ops::Range<usize> = 0..100;
const MODE_RANGE: std::ops::Range<usize> = 100..108;
const SIZE_RANGE: std::ops::Range<usize> = 124..136;
const CHECKSUM_RANGE: std::ops::Range<usize> = 148..156;
const TYPE_FLAG_OFFSET: usize = 156;
const MAGIC_RANGE: std::ops::Range<usize> = 257..265;
const DIRECTORY_FLAG: u8 = b'5';
const REGULAR_FLAG: u8 = b'0';

/// Kind of an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// A directory marker; carries no content.
    Directory,

    /// Any non-directory entry.
    Regular,
}

/// A single entry decoded from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path stored in the header.
    pub path: String,

    /// Size declared in the header.
    pub size_bytes: u64,

    /// Whether this is a directory or a regular entry.
    pub kind: EntryKind,

    /// Raw content (empty for directories).
    pub content: Vec<u8>,
}

impl ArchiveEntry {
    /// Create a regular entry holding `content`.
    pub fn file(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            size_bytes: content.len() as u64,
            kind: EntryKind::Regular,
            content,
        }
    }

    /// Create a directory entry.
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size_bytes: 0,
            kind: EntryKind::Directory,
            content: Vec::new(),
        }
    }

    /// Check if this entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Decode every entry of an uncompressed archive, in archive order.
///
/// An empty path (an all-zero header) marks the end of the archive, as does
/// running out of room for another full header. A declared size larger than
/// the bytes left fails with [`ArchiveError::Truncated`].
pub fn extract_entries(bytes: &[u8]) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    let mut offset = 0usize;

    while offset + BLOCK_SIZE <= bytes.len() {
        let header = &bytes[offset..offset + BLOCK_SIZE];

        let path = header_path(header);
        if path.is_empty() {
            break;
        }

        let size_bytes = header_size(header);
        let kind = if header[TYPE_FLAG_OFFSET] == DIRECTORY_FLAG {
            EntryKind::Directory
        } else {
            EntryKind::Regular
        };

        offset += BLOCK_SIZE;
        let available = bytes.len() - offset;

        let content = match kind {
            EntryKind::Directory => Vec::new(),
            EntryKind::Regular => {
                let size = usize::try_from(size_bytes)
                    .ok()
                    .filter(|size| *size <= available)
                    .ok_or_else(|| ArchiveError::Truncated {
                        path: path.clone(),
                        declared: size_bytes,
                        available: available as u64,
                    })?;
                bytes[offset..offset + size].to_vec()
            }
        };

        debug!("Archive entry {path} ({size_bytes} bytes, {kind:?})");

        entries.push(ArchiveEntry {
            path,
            size_bytes,
            kind,
            content,
        });

        offset = offset.saturating_add(padded_len(size_bytes));
    }

    Ok(entries)
}

/// Encode entries into the block format, terminated by two zero blocks.
///
/// Only the fields [`extract_entries`] reads are populated, plus a mode,
/// magic and checksum so that common tools accept the result.
pub fn encode_entries(entries: &[ArchiveEntry]) -> Vec<u8> {
    let mut out = Vec::new();

    for entry in entries {
        let mut header = [0u8; BLOCK_SIZE];

        let name = entry.path.as_bytes();
        let name_len = name.len().min(NAME_RANGE.end);
        header[..name_len].copy_from_slice(&name[..name_len]);

        write_octal(&mut header[MODE_RANGE], 0o644);
        write_octal(&mut header[SIZE_RANGE], entry.size_bytes);
        header[TYPE_FLAG_OFFSET] = match entry.kind {
            EntryKind::Directory => DIRECTORY_FLAG,
            EntryKind::Regular => REGULAR_FLAG,
        };
        header[MAGIC_RANGE].copy_from_slice(b"ustar\x0000");

        header[CHECKSUM_RANGE].fill(b' ');
        let checksum: u64 = header.iter().map(|b| u64::from(*b)).sum();
        write_octal(&mut header[CHECKSUM_RANGE.start..CHECKSUM_RANGE.end - 1], checksum);

        out.extend_from_slice(&header);
        if entry.kind == EntryKind::Regular {
            out.extend_from_slice(&entry.content);
            out.resize(out.len() + (padded_len(entry.size_bytes) - entry.content.len()), 0);
        }
    }

    out.resize(out.len() + 2 * BLOCK_SIZE, 0);
    out
}

/// Path field, cut at the first NUL and trimmed.
fn header_path(header: &[u8]) -> String {
    let raw = &header[NAME_RANGE];
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).trim().to_string()
}

/// Size field as ASCII octal; empty or garbage reads as zero.
fn header_size(header: &[u8]) -> u64 {
    let raw = String::from_utf8_lossy(&header[SIZE_RANGE]);
    let digits = raw.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    u64::from_str_radix(digits, 8).unwrap_or(0)
}

/// Content length rounded up to the block size.
fn padded_len(size: u64) -> usize {
    let size = usize::try_from(size).unwrap_or(usize::MAX);
    size.div_ceil(BLOCK_SIZE).saturating_mul(BLOCK_SIZE)
}

/// Zero-padded octal with a trailing NUL, filling `field`.
fn write_octal(field: &mut [u8], value: u64) {
    let width = field.len() - 1;
    let digits = format!("{value:0width$o}");
    let digits = digits.as_bytes();
    let start = digits.len().saturating_sub(width);
    field[..width].copy_from_slice(&digits[start..]);
    field[width] = 0;
}
