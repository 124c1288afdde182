//! Re-exports that show up in this crate's signatures.
//!
//! Chunks are [`Bytes`], reason phrases are [`ByteStr`], and the async
//! helpers a server needs to drain an [`Enumerator`](crate::Enumerator) come
//! from `futures_lite`, re-exported whole so callers do not need to depend on
//! it directly.
//!
//! ```rust
//! use http_app_kit::utils::{Bytes, StreamExt};
//! use http_app_kit::Enumerator;
//!
//! # async fn example() -> Result<(), http_app_kit::BodyError> {
//! let mut body = Enumerator::from_chunks([Bytes::from("a"), Bytes::from("b")]);
//! let mut count = 0;
//! while let Some(chunk) = body.next().await {
//!     count += chunk?.len();
//! }
//! assert_eq!(count, 2);
//! # Ok(())
//! # }
//! ```

/// Reference-counted byte buffer; the chunk type of every body.
pub use bytes::Bytes;

/// UTF-8 checked byte string, used for reason phrases and request paths.
pub use bytestr::ByteStr;

pub use futures_lite::*;
