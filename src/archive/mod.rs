//! Archive container parsing and extraction.
//!
//! This module provides functionality for reading and extracting members of
//! `ttarch2`-style archive containers.
//!
//! ## Architecture
//!
//! The module is organized into four components:
//!
//! - [`error`]: the typed error taxonomy for parsing and extraction
//! - [`structures`]: on-disk structures (header, file-table records) and the
//!   pure decode helpers for tag fields and NUL-terminated names
//! - [`parser`]: low-level parsing and offset arithmetic over a [`ReadAt`]
//!   source
//! - [`extractor`]: the high-level open / list / extract API for end users
//!
//! ## Container Format Overview
//!
//! An archive consists of:
//! 1. A fixed 24-byte header: reversed type tag, total size, reversed
//!    version tag, chunk size, file count
//! 2. A file table of 28-byte records, one per member, in table order
//! 3. A name table divided into `chunk_size`-byte chunks; each record
//!    addresses its NUL-terminated name by chunk index + offset
//! 4. The content region, starting exactly one chunk after the name table
//!    begins; each record addresses its bytes by offset + size
//!
//! Everything after the file table is fetched lazily with positioned reads,
//! so listing a large remote archive stays cheap - perfect for HTTP Range
//! requests.
//!
//! ## Limitations
//!
//! - Read-only: no archive creation or modification
//! - No compression or encryption support
//! - Member hashes are opaque lookup keys and are not verified
//!
//! [`ReadAt`]: crate::io::ReadAt

mod error;
mod extractor;
mod parser;
mod structures;

pub use error::{ArchiveError, Result};
pub use extractor::ArchiveExtractor;
pub use parser::ArchiveParser;
pub use structures::*;

#[cfg(test)]
pub(crate) mod testing {
    use super::structures::{ArchiveHeader, FileEntry};

    /// Builds a synthetic single-name-chunk archive for tests.
    ///
    /// Names are packed into chunk 0 in file order; content is packed
    /// sequentially into the content region.
    pub struct ArchiveBuilder {
        chunk_size: u32,
        files: Vec<(u64, String, Vec<u8>)>,
    }

    impl ArchiveBuilder {
        pub fn new(chunk_size: u32) -> Self {
            Self {
                chunk_size,
                files: Vec::new(),
            }
        }

        pub fn file(mut self, hash: u64, name: &str, content: &[u8]) -> Self {
            self.files.push((hash, name.to_string(), content.to_vec()));
            self
        }

        fn encode_tag(tag: &str) -> [u8; 4] {
            let b = tag.as_bytes();
            [b[3], b[2], b[1], b[0]]
        }

        pub fn build(self) -> Vec<u8> {
            let count = self.files.len() as u32;
            let content_total: usize = self.files.iter().map(|(_, _, c)| c.len()).sum();
            let total_size = ArchiveHeader::SIZE as u64
                + FileEntry::SIZE as u64 * count as u64
                + self.chunk_size as u64
                + content_total as u64;

            let mut buf = Vec::with_capacity(total_size as usize);
            buf.extend_from_slice(&Self::encode_tag("TTA2"));
            buf.extend_from_slice(&total_size.to_le_bytes());
            buf.extend_from_slice(&Self::encode_tag("V001"));
            buf.extend_from_slice(&self.chunk_size.to_le_bytes());
            buf.extend_from_slice(&count.to_le_bytes());

            // file table, with names packed into chunk 0 and content packed
            // back to back
            let mut name_cursor: u16 = 0;
            let mut content_cursor: u64 = 0;
            let mut name_chunk = vec![0u8; self.chunk_size as usize];
            for (hash, name, content) in &self.files {
                buf.extend_from_slice(&hash.to_le_bytes());
                buf.extend_from_slice(&content_cursor.to_le_bytes());
                buf.extend_from_slice(&(content.len() as u32).to_le_bytes());
                buf.extend_from_slice(&0u32.to_le_bytes()); // reserved
                buf.extend_from_slice(&0u16.to_le_bytes()); // chunk index
                buf.extend_from_slice(&name_cursor.to_le_bytes());

                let name_bytes = name.as_bytes();
                let start = name_cursor as usize;
                name_chunk[start..start + name_bytes.len()].copy_from_slice(name_bytes);
                name_cursor += name_bytes.len() as u16 + 1; // NUL terminator
                content_cursor += content.len() as u64;
            }

            buf.extend_from_slice(&name_chunk);
            for (_, _, content) in &self.files {
                buf.extend_from_slice(content);
            }

            debug_assert_eq!(buf.len() as u64, total_size);
            buf
        }
    }
}
