//! # runarch
//!
//! A Rust ttarch2 archive extraction utility with HTTP URL support using
//! Range requests.
//!
//! This library reads Telltale-style `ttarch2` containers: a fixed header,
//! a file-metadata table, a chunk-addressed name table, and a raw content
//! region. Members are located by pure offset arithmetic, so extracting a
//! single member from a large archive touches only that member's bytes. For
//! remote files, HTTP Range requests fetch exactly the needed ranges,
//! making it practical to pull one member out of a multi-gigabyte archive
//! without downloading the rest.
//!
//! ## Features
//!
//! - List and extract archive members from the local filesystem
//! - List and extract from HTTP/HTTPS URLs using Range requests
//! - Member lookup by table index, content hash, exact name, or glob
//! - Lazy name and content resolution; only the metadata table is read up
//!   front
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use runarch::{ArchiveExtractor, LocalFileReader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Open a local archive
//!     let reader = Arc::new(LocalFileReader::new(std::path::Path::new("data.ttarch2"))?);
//!     let extractor = ArchiveExtractor::open(reader).await?;
//!
//!     // List all members
//!     for entry in extractor.entries() {
//!         let name = extractor.entry_name(entry).await?;
//!         println!("{:#018x}  {}", entry.hash, name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod io;

pub use archive::{ArchiveError, ArchiveExtractor, ArchiveHeader, ArchiveParser, FileEntry};
pub use cli::Cli;
pub use io::{HttpRangeReader, LocalFileReader, MemoryReader, ReadAt};
