//! Streaming request and response bodies.
//!
//! An [`Enumerator`] is a producer of binary chunks. Consumers never buffer
//! implicitly: they fold the chunks themselves with [`Enumerator::run`],
//! handing in a step function and an initial accumulator. The step function
//! answers every chunk with [`Step::Continue`] or [`Step::Stop`], and the
//! producer stops the moment it sees `Stop`.
//!
//! Whatever the producer holds open (a file, a socket) is released exactly
//! once, on every way out: the body running dry, the step function stopping
//! early, the producer failing, or the enumerator being dropped half-way by a
//! server whose client went away.
//!
//! # Examples
//!
//! ```rust
//! use http_app_kit::Enumerator;
//! use http_app_kit::enumerator::Step;
//!
//! # async fn example() -> Result<(), http_app_kit::BodyError> {
//! let body = Enumerator::from_chunks(["ab", "", "cd"]);
//! let all = body
//!     .run(|mut acc: Vec<u8>, chunk| {
//!         acc.extend_from_slice(&chunk);
//!         Step::Continue(acc)
//!     }, Vec::new())
//!     .await?;
//! assert_eq!(all, b"abcd");
//! # Ok(())
//! # }
//! ```
//!
//! Stopping early:
//!
//! ```rust
//! use http_app_kit::Enumerator;
//! use http_app_kit::enumerator::Step;
//!
//! # async fn example() -> Result<(), http_app_kit::BodyError> {
//! let body = Enumerator::from_chunks(["GIF89a", "...pixels..."]);
//! let is_gif = body
//!     .run(|_, chunk| Step::Stop(chunk.starts_with(b"GIF")), false)
//!     .await?;
//! assert!(is_gif);
//! # Ok(())
//! # }
//! ```
mod convert;
mod error_type;
mod replay;
mod source;

pub use error_type::{BoxError, Error};
#[cfg(all(feature = "fs", feature = "std"))]
pub use replay::FileBody;
pub use replay::{StoredBody, DEFAULT_CHUNK_SIZE};
pub use source::Source;

#[cfg(feature = "std")]
extern crate std;

use alloc::{boxed::Box, collections::VecDeque};
use bytes::Bytes;
use core::fmt::{self, Debug};
use core::future::Future;
use core::mem::{replace, take};
use core::pin::Pin;
use core::task::{Context, Poll};
use futures_lite::{future, ready, Stream};

use self::source::{BoxSource, HttpBodySource, StreamSource};

/// The step function's verdict on one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step<A> {
    /// Keep going with this accumulator.
    Continue(A),
    /// Stop now; this is the final accumulator.
    Stop(A),
}

impl<A> Step<A> {
    /// The accumulator, whichever way the step went.
    pub fn into_inner(self) -> A {
        match self {
            Step::Continue(acc) | Step::Stop(acc) => acc,
        }
    }

    /// Whether the step asked to stop.
    pub const fn is_stop(&self) -> bool {
        matches!(self, Step::Stop(_))
    }
}

/// A streaming body producer.
///
/// See the [module documentation](self) for the fold protocol. Besides
/// [`run`](Self::run), the enumerator can be driven one chunk at a time with
/// [`next_chunk`](Self::next_chunk) and closed explicitly with
/// [`close`](Self::close). It also implements [`Stream`] and
/// [`http_body::Body`] so it can be handed to existing HTTP stacks.
pub struct Enumerator {
    inner: Inner,
}

enum Inner {
    Once(Bytes),
    Chunks(VecDeque<Bytes>),
    Source(BoxSource),
    Done,
    Consumed,
}

impl Debug for Enumerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.inner {
            Inner::Once(_) | Inner::Chunks(_) => "buffered",
            Inner::Source(_) => "streaming",
            Inner::Done => "finished",
            Inner::Consumed => "consumed",
        };
        f.debug_struct("Enumerator").field("state", &state).finish()
    }
}

impl Enumerator {
    /// A body with no chunks at all.
    pub const fn empty() -> Self {
        Self { inner: Inner::Done }
    }

    /// A placeholder left behind once the body was taken.
    ///
    /// Its first poll yields [`Error::Consumed`]; after that the body is
    /// over.
    pub const fn consumed() -> Self {
        Self {
            inner: Inner::Consumed,
        }
    }

    /// A body of one chunk, or of no chunks when `data` is empty.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        if data.is_empty() {
            Self::empty()
        } else {
            Self {
                inner: Inner::Once(data),
            }
        }
    }

    /// A body delivering exactly these chunks, empty ones included.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Bytes>,
    {
        Self {
            inner: Inner::Chunks(chunks.into_iter().map(Into::into).collect()),
        }
    }

    /// A body backed by a custom [`Source`].
    pub fn from_source(source: impl Source) -> Self {
        Self {
            inner: Inner::Source(Box::pin(source)),
        }
    }

    /// A body produced by a stream of chunks.
    ///
    /// ```rust
    /// use http_app_kit::Enumerator;
    /// use futures_lite::stream;
    ///
    /// let body = Enumerator::from_stream(stream::iter([
    ///     Ok::<_, std::io::Error>("Hello, "),
    ///     Ok("world!"),
    /// ]));
    /// # drop(body);
    /// ```
    pub fn from_stream<S, T, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<T, E>> + Send + 'static,
        T: Into<Bytes> + 'static,
        E: Into<Error> + 'static,
    {
        Self::from_source(StreamSource::new(stream))
    }

    /// Wraps any [`http_body::Body`]; trailer frames are skipped.
    ///
    /// ```rust
    /// use bytes::Bytes;
    /// use http_app_kit::Enumerator;
    /// use http_body_util::Full;
    ///
    /// let body = Enumerator::new(Full::new(Bytes::from("Hello, world!")));
    /// # drop(body);
    /// ```
    pub fn new<B>(body: B) -> Self
    where
        B: http_body::Body + Send + 'static,
        B::Data: Into<Bytes>,
        B::Error: Into<Error>,
    {
        Self::from_source(HttpBodySource::new(body))
    }

    /// A body read from an async buffered reader.
    ///
    /// Each chunk is one fill of the reader's buffer. The body ends when the
    /// reader reports an empty buffer, and the reader is dropped right then.
    ///
    /// ```rust
    /// use futures_lite::io::{BufReader, Cursor};
    /// use http_app_kit::Enumerator;
    ///
    /// let body = Enumerator::from_reader(BufReader::new(Cursor::new(b"line\n".to_vec())), 5);
    /// assert_eq!(body.size_hint(), (5, Some(5)));
    /// ```
    #[cfg(feature = "std")]
    pub fn from_reader(
        reader: impl futures_lite::AsyncBufRead + Send + 'static,
        length: impl Into<Option<usize>>,
    ) -> Self {
        Self::from_source(source::ReaderSource::new(Box::pin(reader), length.into()))
    }

    /// A body streaming a file, opened now and closed when the body ends.
    #[cfg(all(feature = "fs", feature = "std"))]
    pub async fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, std::io::Error> {
        FileBody::new(path.as_ref()).enumerate().await
    }

    /// A UTF-8 text body.
    pub fn from_text(text: impl Into<alloc::string::String>) -> Self {
        Self::from_bytes(text.into())
    }

    /// A body holding `value` serialized as JSON.
    ///
    /// ```rust
    /// # #[cfg(feature = "json")]
    /// # {
    /// use http_app_kit::Enumerator;
    ///
    /// let body = Enumerator::from_json(&serde_json::json!({ "ok": true }))?;
    /// assert_eq!(body.size_hint(), (11, Some(11)));
    /// # }
    /// # Ok::<(), serde_json::Error>(())
    /// ```
    #[cfg(feature = "json")]
    pub fn from_json<T: serde::Serialize>(value: T) -> Result<Self, serde_json::Error> {
        Ok(Self::from_bytes(serde_json::to_vec(&value)?))
    }

    /// A body holding `value` as `application/x-www-form-urlencoded` data.
    #[cfg(feature = "form")]
    pub fn from_form<T: serde::Serialize>(value: T) -> Result<Self, serde_urlencoded::ser::Error> {
        Ok(Self::from_bytes(serde_urlencoded::to_string(value)?))
    }

    /// Moves the body out, leaving a [consumed](Self::consumed) placeholder.
    pub fn take(&mut self) -> Self {
        replace(self, Self::consumed())
    }

    /// Whether this is a placeholder left by [`take`](Self::take).
    pub const fn is_consumed(&self) -> bool {
        matches!(self.inner, Inner::Consumed)
    }

    /// Whether no further chunks will be produced.
    pub const fn is_finished(&self) -> bool {
        matches!(self.inner, Inner::Done)
    }

    /// Bounds on the number of bytes still to come.
    pub fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Inner::Once(bytes) => (bytes.len(), Some(bytes.len())),
            Inner::Chunks(chunks) => {
                let len = chunks.iter().map(Bytes::len).sum();
                (len, Some(len))
            }
            Inner::Source(source) => source.size_hint(),
            Inner::Done => (0, Some(0)),
            Inner::Consumed => (0, None),
        }
    }

    /// Polls for the next chunk.
    ///
    /// `Ready(None)` marks the end of the body; the producer has been
    /// released by the time it is returned, and likewise after an error.
    pub fn poll_chunk(&mut self, cx: &mut Context<'_>) -> Poll<Option<Result<Bytes, Error>>> {
        match &mut self.inner {
            Inner::Once(bytes) => {
                let bytes = take(bytes);
                self.inner = Inner::Done;
                Poll::Ready(Some(Ok(bytes)))
            }
            Inner::Chunks(chunks) => match chunks.pop_front() {
                Some(chunk) => Poll::Ready(Some(Ok(chunk))),
                None => {
                    self.inner = Inner::Done;
                    Poll::Ready(None)
                }
            },
            Inner::Source(source) => match ready!(source.as_mut().poll_chunk(cx)) {
                Some(Ok(chunk)) => Poll::Ready(Some(Ok(chunk))),
                end => {
                    self.release();
                    Poll::Ready(end)
                }
            },
            Inner::Done => Poll::Ready(None),
            Inner::Consumed => {
                self.inner = Inner::Done;
                Poll::Ready(Some(Err(Error::Consumed)))
            }
        }
    }

    /// Waits for the next chunk; `None` once the body has ended.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes, Error>> {
        future::poll_fn(|cx| self.poll_chunk(cx)).await
    }

    /// Stops the body early, releasing the producer.
    ///
    /// Later polls report the end of the body. Closing twice is a no-op.
    pub fn close(&mut self) {
        if !self.is_consumed() {
            self.release();
        }
    }

    fn release(&mut self) {
        if let Inner::Source(mut source) = replace(&mut self.inner, Inner::Done) {
            source.as_mut().release();
            tracing::trace!("body producer released");
        }
    }

    /// Folds the body into an accumulator.
    ///
    /// `step` sees every chunk in delivery order and decides whether to keep
    /// going. An empty body returns `initial` without calling `step`. When
    /// `step` returns [`Step::Stop`], no further chunk is produced and the
    /// producer is released before this returns.
    pub async fn run<A, F>(mut self, mut step: F, initial: A) -> Result<A, Error>
    where
        F: FnMut(A, Bytes) -> Step<A>,
    {
        let mut acc = initial;
        loop {
            let chunk = match self.next_chunk().await {
                Some(chunk) => chunk?,
                None => return Ok(acc),
            };
            acc = match step(acc, chunk) {
                Step::Continue(acc) => acc,
                Step::Stop(acc) => {
                    self.close();
                    return Ok(acc);
                }
            };
        }
    }

    /// Like [`run`](Self::run), with a step function that may await.
    ///
    /// Servers use this to write each chunk to the client as it arrives.
    pub async fn run_async<A, F, Fut>(mut self, mut step: F, initial: A) -> Result<A, Error>
    where
        F: FnMut(A, Bytes) -> Fut,
        Fut: Future<Output = Step<A>>,
    {
        let mut acc = initial;
        loop {
            let chunk = match self.next_chunk().await {
                Some(chunk) => chunk?,
                None => return Ok(acc),
            };
            acc = match step(acc, chunk).await {
                Step::Continue(acc) => acc,
                Step::Stop(acc) => {
                    self.close();
                    return Ok(acc);
                }
            };
        }
    }

    /// Drains the body into `writer`, returning the number of bytes written.
    ///
    /// A failed write stops the body, so the producer is released even when
    /// the client has gone away.
    #[cfg(feature = "std")]
    pub async fn write_to<W>(mut self, writer: &mut W) -> std::io::Result<u64>
    where
        W: futures_lite::AsyncWrite + Unpin + ?Sized,
    {
        use futures_lite::AsyncWriteExt;

        let mut written = 0u64;
        while let Some(chunk) = self.next_chunk().await {
            let chunk = chunk?;
            if let Err(error) = writer.write_all(&chunk).await {
                self.close();
                return Err(error);
            }
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(written)
    }
}

impl Default for Enumerator {
    fn default() -> Self {
        Self::empty()
    }
}

impl Drop for Enumerator {
    fn drop(&mut self) {
        self.release();
    }
}

impl Stream for Enumerator {
    type Item = Result<Bytes, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_chunk(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        Enumerator::size_hint(self)
    }
}

impl http_body::Body for Enumerator {
    type Data = Bytes;
    type Error = Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        self.get_mut()
            .poll_chunk(cx)
            .map(|chunk| chunk.map(|result| result.map(http_body::Frame::data)))
    }

    fn is_end_stream(&self) -> bool {
        self.is_finished()
    }

    fn size_hint(&self) -> http_body::SizeHint {
        let (lower, upper) = Enumerator::size_hint(self);
        let mut hint = http_body::SizeHint::new();
        hint.set_lower(lower as u64);
        if let Some(upper) = upper {
            hint.set_upper(upper as u64);
        }
        hint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicUsize, Ordering};

    fn concat(mut acc: Vec<u8>, chunk: Bytes) -> Step<Vec<u8>> {
        acc.extend_from_slice(&chunk);
        Step::Continue(acc)
    }

    #[derive(Default)]
    struct Probe {
        delivered: AtomicUsize,
        released: AtomicUsize,
    }

    struct Counting {
        chunks: VecDeque<Bytes>,
        probe: Arc<Probe>,
    }

    impl Source for Counting {
        fn poll_chunk(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Bytes, Error>>> {
            let this = self.get_mut();
            let chunk = this.chunks.pop_front();
            if chunk.is_some() {
                this.probe.delivered.fetch_add(1, Ordering::SeqCst);
            }
            Poll::Ready(chunk.map(Ok))
        }

        fn release(self: Pin<&mut Self>) {
            self.probe.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting(chunks: &[&'static str]) -> (Enumerator, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        let source = Counting {
            chunks: chunks
                .iter()
                .copied()
                .map(|c| Bytes::from_static(c.as_bytes()))
                .collect(),
            probe: probe.clone(),
        };
        (Enumerator::from_source(source), probe)
    }

    #[tokio::test]
    async fn empty_chunks_are_delivered_but_add_nothing() {
        let mut seen = 0;
        let all = Enumerator::from_chunks(["ab", "", "cd"])
            .run(
                |acc, chunk| {
                    seen += 1;
                    concat(acc, chunk)
                },
                Vec::new(),
            )
            .await
            .unwrap();
        assert_eq!(all, b"abcd");
        assert_eq!(seen, 3);
    }

    #[tokio::test]
    async fn empty_body_returns_initial_without_stepping() {
        for body in [
            Enumerator::empty(),
            Enumerator::from_bytes(""),
            Enumerator::from_chunks(Vec::<Bytes>::new()),
        ] {
            let result = body
                .run(|_, _| -> Step<u32> { unreachable!("no chunks") }, 7)
                .await
                .unwrap();
            assert_eq!(result, 7);
        }
    }

    #[tokio::test]
    async fn stop_prevents_further_delivery_and_releases() {
        let (body, probe) = counting(&["a", "b", "c", "d"]);
        let taken = body
            .run(
                |n: usize, _| {
                    if n + 1 == 2 {
                        Step::Stop(n + 1)
                    } else {
                        Step::Continue(n + 1)
                    }
                },
                0,
            )
            .await
            .unwrap();
        assert_eq!(taken, 2);
        assert_eq!(probe.delivered.load(Ordering::SeqCst), 2);
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_releases_once() {
        let (body, probe) = counting(&["x", "y"]);
        let all = body.run(concat, Vec::new()).await.unwrap();
        assert_eq!(all, b"xy");
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_mid_stream_releases() {
        let (mut body, probe) = counting(&["x", "y", "z"]);
        assert_eq!(body.next_chunk().await.unwrap().unwrap(), "x");
        drop(body);
        assert_eq!(probe.delivered.load(Ordering::SeqCst), 1);
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (mut body, probe) = counting(&["x"]);
        body.close();
        body.close();
        assert!(body.next_chunk().await.is_none());
        drop(body);
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
        assert_eq!(probe.delivered.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn producer_error_releases_and_propagates() {
        let released = Arc::new(AtomicUsize::new(0));

        struct Failing(Arc<AtomicUsize>);
        impl Source for Failing {
            fn poll_chunk(
                self: Pin<&mut Self>,
                _cx: &mut Context<'_>,
            ) -> Poll<Option<Result<Bytes, Error>>> {
                Poll::Ready(Some(Err(Error::Other("socket reset".into()))))
            }
            fn release(self: Pin<&mut Self>) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let result = Enumerator::from_source(Failing(released.clone()))
            .run(concat, Vec::new())
            .await;
        assert!(matches!(result, Err(Error::Other(_))));
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn taken_body_reports_consumed() {
        let mut body = Enumerator::from_bytes("data");
        let taken = body.take();
        assert!(body.is_consumed());
        assert!(matches!(
            body.next_chunk().await,
            Some(Err(Error::Consumed))
        ));
        let all = taken.run(concat, Vec::new()).await.unwrap();
        assert_eq!(all, b"data");
    }

    #[tokio::test]
    async fn consumed_stream_ends_after_its_error() {
        let mut body = Enumerator::consumed();
        assert!(matches!(body.next_chunk().await, Some(Err(Error::Consumed))));
        assert!(body.next_chunk().await.is_none());
        assert!(body.is_finished());
    }

    #[tokio::test]
    async fn run_async_stop_releases_once() {
        let (body, probe) = counting(&["a", "b", "c", "d"]);
        let seen = body
            .run_async(
                |mut seen: Vec<Bytes>, chunk| async move {
                    seen.push(chunk);
                    if seen.len() == 2 {
                        Step::Stop(seen)
                    } else {
                        Step::Continue(seen)
                    }
                },
                Vec::new(),
            )
            .await
            .unwrap();
        assert_eq!(seen, ["a", "b"]);
        assert_eq!(probe.delivered.load(Ordering::SeqCst), 2);
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn size_hints_track_buffered_bodies() {
        assert_eq!(Enumerator::from_bytes("abc").size_hint(), (3, Some(3)));
        assert_eq!(
            Enumerator::from_chunks(["ab", "", "c"]).size_hint(),
            (3, Some(3))
        );
        assert_eq!(Enumerator::empty().size_hint(), (0, Some(0)));
        assert_eq!(Enumerator::consumed().size_hint(), (0, None));
    }
}
