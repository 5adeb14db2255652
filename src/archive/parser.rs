//! Low-level archive parser.
//!
//! This module handles the binary parsing of the container structures,
//! reading from any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! The container is designed to be read from the front:
//! 1. Parse the fixed 24-byte header at offset 0
//! 2. Read the file table immediately following it (28 bytes per entry)
//! 3. For each entry, the name and content locations are *computed*, not
//!    stored as absolute offsets:
//!    - a name lives in the chunk-addressed name table at
//!      `name_table_start + chunk_size * chunk + offset_in_chunk`
//!    - content lives at `content_start + entry.offset`, where the content
//!      region begins exactly one chunk after the name table starts
//!
//! Names and content are resolved lazily, per request. Only the header and
//! file table are fetched to list an archive, which keeps remote listing to
//! two small Range requests.

use std::sync::Arc;

use crate::io::ReadAt;

use super::error::{ArchiveError, Result};
use super::structures::{split_nul, ArchiveHeader, FileEntry};

/// Maximum number of bytes scanned for a name's NUL terminator.
///
/// Names are short in practice; this bounds the scan on archives whose name
/// references point into garbage.
const MAX_NAME_SCAN: u64 = 4096;

/// Block size for the incremental name scan.
const NAME_SCAN_BLOCK: usize = 256;

/// Low-level archive parser.
///
/// This struct handles reading and parsing container structures from a data
/// source. It's generic over the reader type to support both local files and
/// HTTP sources.
///
/// ## Usage
///
/// Typically used through [`ArchiveExtractor`](super::ArchiveExtractor)
/// rather than directly.
pub struct ArchiveParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
}

impl<R: ReadAt> ArchiveParser<R> {
    /// Create a new parser for the given reader.
    pub fn new(reader: Arc<R>) -> Self {
        Self { reader }
    }

    /// Read exactly `buf.len()` bytes starting at `offset`.
    ///
    /// Loops over short reads; a source that ends before the buffer is full
    /// yields [`ArchiveError::Truncated`].
    async fn read_full(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self
                .reader
                .read_at(offset + filled as u64, &mut buf[filled..])
                .await?;
            if n == 0 {
                return Err(ArchiveError::Truncated {
                    offset: offset + filled as u64,
                    needed: buf.len() - filled,
                });
            }
            filled += n;
        }
        Ok(())
    }

    /// Parse the archive header at offset 0.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Truncated`] if the source is smaller than a
    /// header, or [`ArchiveError::MalformedHeader`] if the header fails
    /// validation (zero chunk size, oversized file table, garbage type tag).
    pub async fn read_header(&self) -> Result<ArchiveHeader> {
        let mut buf = [0u8; ArchiveHeader::SIZE];
        self.read_full(0, &mut buf).await?;
        ArchiveHeader::from_bytes(&buf)
    }

    /// Read the complete file table.
    ///
    /// Fetches all `file_count` records in a single read (one Range request
    /// for remote sources) and decodes them in table order. The position of
    /// a record in the returned vector is its public index.
    pub async fn read_file_table(&self, header: &ArchiveHeader) -> Result<Vec<FileEntry>> {
        let count = header.file_count as usize;
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut table = vec![0u8; count * FileEntry::SIZE];
        self.read_full(ArchiveHeader::SIZE as u64, &mut table).await?;

        let mut entries = Vec::with_capacity(count);
        for record in table.chunks_exact(FileEntry::SIZE) {
            entries.push(FileEntry::from_bytes(record)?);
        }

        Ok(entries)
    }

    /// Absolute offset of an entry's name inside the archive.
    pub fn name_offset(&self, header: &ArchiveHeader, entry: &FileEntry) -> u64 {
        header.name_table_start()
            + header.chunk_size as u64 * entry.name_chunk as u64
            + entry.name_offset as u64
    }

    /// Resolve an entry's name from the chunked name table.
    ///
    /// The name is scanned in blocks until its NUL terminator, which is
    /// excluded from the returned string. Bytes are decoded as single-byte
    /// characters, never as multi-byte UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidOffset`] if the computed name offset
    /// lies at or past the archive's claimed size, and
    /// [`ArchiveError::Truncated`] if no terminator is found before the end
    /// of the source or the scan bound.
    pub async fn read_name(&self, header: &ArchiveHeader, entry: &FileEntry) -> Result<String> {
        let name_offset = self.name_offset(header, entry);
        if name_offset >= header.total_size {
            return Err(ArchiveError::InvalidOffset {
                offset: name_offset,
                size: header.total_size,
            });
        }

        let scan_limit = MAX_NAME_SCAN.min(header.total_size - name_offset) as usize;
        let mut name = Vec::new();

        while name.len() < scan_limit {
            let block_len = NAME_SCAN_BLOCK.min(scan_limit - name.len());
            let mut block = vec![0u8; block_len];
            let n = self
                .reader
                .read_at(name_offset + name.len() as u64, &mut block)
                .await?;
            if n == 0 {
                break;
            }

            if let Some(bytes) = split_nul(&block[..n]) {
                name.extend_from_slice(bytes);
                return Ok(name.iter().map(|&b| b as char).collect());
            }
            name.extend_from_slice(&block[..n]);
        }

        Err(ArchiveError::Truncated {
            offset: name_offset,
            needed: name.len() + 1,
        })
    }

    /// Absolute byte range `[start, end)` of an entry's content.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidOffset`] if the range end exceeds the
    /// archive's claimed size. A zero-size entry with an in-bounds start is
    /// a valid empty range.
    pub fn content_range(&self, header: &ArchiveHeader, entry: &FileEntry) -> Result<(u64, u64)> {
        let start = header.content_start() + entry.offset;
        let end = start + entry.size as u64;
        if end > header.total_size {
            return Err(ArchiveError::InvalidOffset {
                offset: end,
                size: header.total_size,
            });
        }
        Ok((start, end))
    }

    /// Read an entry's content into memory.
    pub async fn read_content(&self, header: &ArchiveHeader, entry: &FileEntry) -> Result<Vec<u8>> {
        let (start, end) = self.content_range(header, entry)?;
        let mut buf = vec![0u8; (end - start) as usize];
        self.read_full(start, &mut buf).await?;
        Ok(buf)
    }

    /// Get a reference to the underlying reader.
    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::ArchiveBuilder;
    use super::*;
    use crate::io::MemoryReader;

    fn parser_for(bytes: Vec<u8>) -> ArchiveParser<MemoryReader> {
        ArchiveParser::new(Arc::new(MemoryReader::new(bytes)))
    }

    #[tokio::test]
    async fn parses_header_and_table() {
        let bytes = ArchiveBuilder::new(64)
            .file(0x1, "a.lua", b"aaaa")
            .file(0x2, "b.lua", b"bb")
            .build();
        let parser = parser_for(bytes);

        let header = parser.read_header().await.unwrap();
        assert_eq!(header.type_tag, "TTA2");
        assert_eq!(header.version_tag, "V001");
        assert_eq!(header.file_count, 2);

        let entries = parser.read_file_table(&header).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].hash, 0x1);
        assert_eq!(entries[1].hash, 0x2);
        assert_eq!(entries[1].size, 2);
    }

    #[tokio::test]
    async fn empty_table_parses_to_empty_list() {
        let bytes = ArchiveBuilder::new(64).build();
        let parser = parser_for(bytes);

        let header = parser.read_header().await.unwrap();
        assert_eq!(header.file_count, 0);
        let entries = parser.read_file_table(&header).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn resolves_names_from_chunk_addresses() {
        let bytes = ArchiveBuilder::new(64)
            .file(0x1, "env_season2.lua", b"x")
            .file(0x2, "ui_menu.lua", b"y")
            .build();
        let parser = parser_for(bytes);

        let header = parser.read_header().await.unwrap();
        let entries = parser.read_file_table(&header).await.unwrap();
        assert_eq!(
            parser.read_name(&header, &entries[0]).await.unwrap(),
            "env_season2.lua"
        );
        assert_eq!(
            parser.read_name(&header, &entries[1]).await.unwrap(),
            "ui_menu.lua"
        );
    }

    #[tokio::test]
    async fn long_name_terminates_at_nul() {
        // longer than one scan block, to exercise the incremental scan
        let long = "n".repeat(700);
        let bytes = ArchiveBuilder::new(1024).file(0x1, &long, b"z").build();
        let parser = parser_for(bytes);

        let header = parser.read_header().await.unwrap();
        let entries = parser.read_file_table(&header).await.unwrap();
        let name = parser.read_name(&header, &entries[0]).await.unwrap();
        assert_eq!(name.len(), 700);
        assert_eq!(name, long);
    }

    #[tokio::test]
    async fn name_offset_past_total_size_is_rejected() {
        let mut bytes = ArchiveBuilder::new(64).file(0x1, "a", b"x").build();
        // point the name reference at a chunk far outside the archive
        let chunk_field = 24 + 24;
        bytes[chunk_field..chunk_field + 2].copy_from_slice(&u16::MAX.to_le_bytes());
        let parser = parser_for(bytes);

        let header = parser.read_header().await.unwrap();
        let entries = parser.read_file_table(&header).await.unwrap();
        assert!(matches!(
            parser.read_name(&header, &entries[0]).await,
            Err(ArchiveError::InvalidOffset { .. })
        ));
    }

    #[tokio::test]
    async fn unterminated_name_is_truncated() {
        let mut bytes = ArchiveBuilder::new(64).file(0x1, "abc", b"x").build();
        // overwrite the whole name chunk region onwards with non-zero bytes
        let name_table_start = 24 + 28;
        for b in &mut bytes[name_table_start..] {
            *b = b'q';
        }
        let parser = parser_for(bytes);

        let header = parser.read_header().await.unwrap();
        let entries = parser.read_file_table(&header).await.unwrap();
        assert!(matches!(
            parser.read_name(&header, &entries[0]).await,
            Err(ArchiveError::Truncated { .. })
        ));
    }

    #[tokio::test]
    async fn content_range_past_total_size_is_rejected() {
        let mut bytes = ArchiveBuilder::new(64).file(0x1, "a", b"xy").build();
        // inflate the entry's size field past the end of the archive
        let size_field = 24 + 16;
        bytes[size_field..size_field + 4].copy_from_slice(&10_000u32.to_le_bytes());
        let parser = parser_for(bytes);

        let header = parser.read_header().await.unwrap();
        let entries = parser.read_file_table(&header).await.unwrap();
        assert!(matches!(
            parser.content_range(&header, &entries[0]),
            Err(ArchiveError::InvalidOffset { .. })
        ));
    }

    #[tokio::test]
    async fn reads_content_bytes() {
        let bytes = ArchiveBuilder::new(64)
            .file(0x1, "a", b"first")
            .file(0x2, "b", b"second")
            .build();
        let parser = parser_for(bytes);

        let header = parser.read_header().await.unwrap();
        let entries = parser.read_file_table(&header).await.unwrap();
        assert_eq!(
            parser.read_content(&header, &entries[0]).await.unwrap(),
            b"first"
        );
        assert_eq!(
            parser.read_content(&header, &entries[1]).await.unwrap(),
            b"second"
        );
    }

    #[tokio::test]
    async fn truncated_source_fails_table_read() {
        let bytes = ArchiveBuilder::new(64).file(0x1, "a", b"x").build();
        let parser = parser_for(bytes[..30].to_vec());

        let header = parser.read_header().await.unwrap();
        assert!(matches!(
            parser.read_file_table(&header).await,
            Err(ArchiveError::Truncated { .. })
        ));
    }
}
