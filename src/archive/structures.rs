use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use super::error::{ArchiveError, Result};

/// Decode a 4-character tag field.
///
/// Tag fields are stored byte-reversed relative to their human-readable
/// form, so `b"2ATT"` on disk reads back as `"TTA2"`. Bytes outside the
/// printable ASCII range are kept as-is; [`ArchiveHeader::from_bytes`]
/// decides whether that is acceptable.
pub fn decode_tag(raw: [u8; 4]) -> String {
    raw.iter().rev().map(|&b| b as char).collect()
}

/// Split a byte slice at its first NUL byte.
///
/// Returns the bytes before the terminator, excluding it, or `None` when no
/// terminator is present in the slice.
pub fn split_nul(data: &[u8]) -> Option<&[u8]> {
    data.iter().position(|&b| b == 0).map(|i| &data[..i])
}

/// Archive header - fixed 24 bytes at the start of the file
#[derive(Debug, Clone)]
pub struct ArchiveHeader {
    /// Container type tag, e.g. "TTA2"
    pub type_tag: String,
    /// Total archive size in bytes, as claimed by the header
    pub total_size: u64,
    /// Format version tag, e.g. "V001"
    pub version_tag: String,
    /// Name-table chunk size; stride for chunk-addressed name lookups
    pub chunk_size: u32,
    /// Number of records in the file table
    pub file_count: u32,
}

impl ArchiveHeader {
    pub const SIZE: usize = 24;

    /// Upper bound on `file_count`, capping metadata allocation when the
    /// header is corrupt.
    pub const MAX_FILE_COUNT: u32 = 1 << 20;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(ArchiveError::Truncated {
                offset: 0,
                needed: Self::SIZE,
            });
        }

        let mut cursor = Cursor::new(data);

        let mut type_raw = [0u8; 4];
        cursor.read_exact(&mut type_raw)?;
        let total_size = cursor.read_u64::<LittleEndian>()?;
        let mut version_raw = [0u8; 4];
        cursor.read_exact(&mut version_raw)?;
        let chunk_size = cursor.read_u32::<LittleEndian>()?;
        let file_count = cursor.read_u32::<LittleEndian>()?;

        // The type tag is not pinned to a single value (several container
        // generations share this layout), but a non-printable tag means
        // this is not an archive at all.
        if !type_raw.iter().all(|b| b.is_ascii_graphic()) {
            return Err(ArchiveError::MalformedHeader(format!(
                "unrecognized type tag {:02x?}",
                type_raw
            )));
        }

        if chunk_size == 0 {
            return Err(ArchiveError::MalformedHeader("chunk size is zero".into()));
        }

        if file_count > Self::MAX_FILE_COUNT {
            return Err(ArchiveError::MalformedHeader(format!(
                "file count {} exceeds maximum {}",
                file_count,
                Self::MAX_FILE_COUNT
            )));
        }

        let table_end = Self::SIZE as u64 + FileEntry::SIZE as u64 * file_count as u64;
        if table_end > total_size {
            return Err(ArchiveError::MalformedHeader(format!(
                "file table ends at {} but archive claims {} bytes",
                table_end, total_size
            )));
        }

        Ok(Self {
            type_tag: decode_tag(type_raw),
            total_size,
            version_tag: decode_tag(version_raw),
            chunk_size,
            file_count,
        })
    }

    /// Offset of the name-table region: right after the file table.
    pub fn name_table_start(&self) -> u64 {
        Self::SIZE as u64 + FileEntry::SIZE as u64 * self.file_count as u64
    }

    /// Offset of the content region.
    ///
    /// The name table occupies exactly one chunk before content begins,
    /// regardless of how much of that chunk the names actually fill.
    pub fn content_start(&self) -> u64 {
        self.name_table_start() + self.chunk_size as u64
    }
}

/// One file-table record - fixed 28 bytes
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Content hash; an opaque 64-bit lookup key, not verified
    pub hash: u64,
    /// Content offset relative to the start of the content region
    pub offset: u64,
    /// Content size in bytes
    pub size: u32,
    /// Name-table chunk holding this entry's name
    pub name_chunk: u16,
    /// Byte offset of the name within its chunk
    pub name_offset: u16,
}

impl FileEntry {
    pub const SIZE: usize = 28;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(ArchiveError::Truncated {
                offset: 0,
                needed: Self::SIZE,
            });
        }

        let mut cursor = Cursor::new(data);

        let hash = cursor.read_u64::<LittleEndian>()?;
        let offset = cursor.read_u64::<LittleEndian>()?;
        let size = cursor.read_u32::<LittleEndian>()?;
        let _reserved = cursor.read_u32::<LittleEndian>()?;
        let name_chunk = cursor.read_u16::<LittleEndian>()?;
        let name_offset = cursor.read_u16::<LittleEndian>()?;

        Ok(Self {
            hash,
            offset,
            size,
            name_chunk,
            name_offset,
        })
    }
}
