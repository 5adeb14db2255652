use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::io::ReadAt;

use super::error::{ArchiveError, Result};
use super::parser::ArchiveParser;
use super::structures::{ArchiveHeader, FileEntry};

/// Archive extractor
///
/// Parses the header and file table eagerly on [`open`](Self::open); names
/// and content are fetched on demand per entry.
pub struct ArchiveExtractor<R: ReadAt> {
    parser: ArchiveParser<R>,
    header: ArchiveHeader,
    entries: Vec<FileEntry>,
}

impl<R: ReadAt> ArchiveExtractor<R> {
    /// Open an archive, parsing its header and file table.
    pub async fn open(reader: Arc<R>) -> Result<Self> {
        let parser = ArchiveParser::new(reader);
        let header = parser.read_header().await?;
        let entries = parser.read_file_table(&header).await?;
        Ok(Self {
            parser,
            header,
            entries,
        })
    }

    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// All entries, in table order. An entry's position is its index.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn entry_by_index(&self, index: usize) -> Result<&FileEntry> {
        self.entries.get(index).ok_or(ArchiveError::IndexNotFound {
            index,
            count: self.entries.len(),
        })
    }

    /// Look up an entry by content hash.
    ///
    /// Hash uniqueness is not guaranteed by the format; this returns the
    /// first match in table order.
    pub fn entry_by_hash(&self, hash: u64) -> Result<&FileEntry> {
        self.entries
            .iter()
            .find(|e| e.hash == hash)
            .ok_or(ArchiveError::HashNotFound { hash })
    }

    /// Resolve an entry's name from the name table
    pub async fn entry_name(&self, entry: &FileEntry) -> Result<String> {
        self.parser.read_name(&self.header, entry).await
    }

    /// Extract entry content to memory
    pub async fn extract_to_memory(&self, entry: &FileEntry) -> Result<Vec<u8>> {
        self.parser.read_content(&self.header, entry).await
    }

    /// Extract the entry at a table index to memory
    pub async fn extract_by_index(&self, index: usize) -> Result<Vec<u8>> {
        let entry = self.entry_by_index(index)?;
        self.extract_to_memory(entry).await
    }

    /// Extract the first entry with the given hash to memory
    pub async fn extract_by_hash(&self, hash: u64) -> Result<Vec<u8>> {
        let entry = self.entry_by_hash(hash)?;
        self.extract_to_memory(entry).await
    }

    /// Extract entry content to disk
    pub async fn extract_to_file(&self, entry: &FileEntry, output_path: &Path) -> Result<()> {
        // Create parent directories if needed
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let data = self.extract_to_memory(entry).await?;

        let mut file = fs::File::create(output_path).await?;
        file.write_all(&data).await?;

        Ok(())
    }

    /// Extract entry content to stdout
    pub async fn extract_to_stdout(&self, entry: &FileEntry) -> Result<()> {
        let data = self.extract_to_memory(entry).await?;

        let mut stdout = tokio::io::stdout();
        stdout.write_all(&data).await?;

        Ok(())
    }
}
