mod http;
mod local;
mod memory;

pub use http::HttpRangeReader;
pub use local::LocalFileReader;
pub use memory::MemoryReader;

use async_trait::async_trait;

/// Trait for random access reading from a data source.
///
/// All archive parsing is done with positioned reads; implementations carry
/// no read position, so independent reads never interfere with each other.
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer.
    ///
    /// Returns the number of bytes read, which may be short near the end of
    /// the source.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}
