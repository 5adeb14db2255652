use thiserror::Error;

/// Errors produced while parsing or extracting from an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source ended early: needed {needed} bytes at offset {offset}")]
    Truncated { offset: u64, needed: usize },

    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("offset {offset} out of bounds (archive size {size})")]
    InvalidOffset { offset: u64, size: u64 },

    #[error("no entry at index {index} ({count} entries)")]
    IndexNotFound { index: usize, count: usize },

    #[error("no entry with hash {hash:#018x}")]
    HashNotFound { hash: u64 },
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
