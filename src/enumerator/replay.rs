//! Bodies that can hand out any number of fresh enumerators.
//!
//! An [`Enumerator`] runs once. When the same stored content has to be
//! served repeatedly, keep a [`StoredBody`] (or a [`FileBody`]) and ask it for
//! a new enumerator per response; every run yields the same chunk sequence.
#[cfg(feature = "std")]
extern crate std;

use bytes::Bytes;

use super::Enumerator;

/// Chunk size used by replayable bodies unless overridden.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// In-memory content delivered in fixed-size chunks.
///
/// ```rust
/// use http_app_kit::enumerator::{Step, StoredBody};
///
/// # async fn example() -> Result<(), http_app_kit::BodyError> {
/// let stored = StoredBody::new("abcdefg").with_chunk_size(3);
/// let sizes = stored
///     .enumerate()
///     .run(|mut sizes: Vec<usize>, chunk| {
///         sizes.push(chunk.len());
///         Step::Continue(sizes)
///     }, Vec::new())
///     .await?;
/// assert_eq!(sizes, [3, 3, 1]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StoredBody {
    data: Bytes,
    chunk_size: usize,
}

impl StoredBody {
    /// Stores `data`, split into [`DEFAULT_CHUNK_SIZE`] chunks.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Changes the chunk size; zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The stored bytes.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// A fresh enumerator over the stored bytes.
    ///
    /// Chunks share the stored buffer; nothing is copied.
    pub fn enumerate(&self) -> Enumerator {
        let chunk_size = self.chunk_size;
        let chunks = (0..self.data.len())
            .step_by(chunk_size)
            .map(|start| self.data.slice(start..(start + chunk_size).min(self.data.len())));
        Enumerator::from_chunks(chunks)
    }
}

#[cfg(all(feature = "fs", feature = "std"))]
pub use self::file::FileBody;

#[cfg(all(feature = "fs", feature = "std"))]
mod file {
    use super::std;
    use super::{Enumerator, DEFAULT_CHUNK_SIZE};
    use std::path::{Path, PathBuf};

    use futures_lite::io::BufReader;

    /// A file on disk, opened anew for every enumerator.
    ///
    /// The file handle lives exactly as long as the enumerator's run: it is
    /// closed when the last chunk has been read, when the consumer stops
    /// early, or when the enumerator is dropped.
    #[derive(Debug, Clone)]
    pub struct FileBody {
        path: PathBuf,
        chunk_size: usize,
    }

    impl FileBody {
        /// Serves the file at `path`.
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self {
                path: path.into(),
                chunk_size: DEFAULT_CHUNK_SIZE,
            }
        }

        /// Changes the read buffer size, which bounds each chunk.
        pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
            self.chunk_size = chunk_size.max(1);
            self
        }

        /// The file's path.
        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Opens the file and returns an enumerator over its contents.
        pub async fn enumerate(&self) -> std::io::Result<Enumerator> {
            let file = async_fs::File::open(&self.path).await?;
            let length = usize::try_from(file.metadata().await?.len()).ok();
            tracing::trace!(path = %self.path.display(), ?length, "opened file body");
            Ok(Enumerator::from_reader(
                BufReader::with_capacity(self.chunk_size, file),
                length,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::Step;
    use alloc::vec::Vec;

    async fn chunks_of(body: Enumerator) -> Vec<Bytes> {
        body.run(
            |mut chunks: Vec<Bytes>, chunk| {
                chunks.push(chunk);
                Step::Continue(chunks)
            },
            Vec::new(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn fresh_enumerators_repeat_the_same_chunks() {
        let stored = StoredBody::new("the quick brown fox").with_chunk_size(4);
        let first = chunks_of(stored.enumerate()).await;
        let second = chunks_of(stored.enumerate()).await;
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
        assert_eq!(first[4], "fox");
    }

    #[tokio::test]
    async fn empty_stored_body_has_no_chunks() {
        assert!(chunks_of(StoredBody::new("").enumerate()).await.is_empty());
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let stored = StoredBody::new("ab").with_chunk_size(0);
        assert_eq!(stored.enumerate().size_hint(), (2, Some(2)));
    }
}
