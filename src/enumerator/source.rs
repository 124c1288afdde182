//! Pull-style producers that sit behind an [`Enumerator`](super::Enumerator).
use alloc::boxed::Box;
use bytes::Bytes;
use core::pin::Pin;
use core::task::{Context, Poll};
use futures_lite::{ready, Stream};
use pin_project_lite::pin_project;

use super::Error;

/// A producer of body chunks.
///
/// `poll_chunk` advances the producer: `Ready(Some(Ok(chunk)))` delivers the
/// next chunk (which may be empty), `Ready(None)` ends the body and `Pending`
/// means no bytes are available yet. `release` frees whatever the producer
/// holds open.
///
/// The owning [`Enumerator`](super::Enumerator) calls `release` exactly once:
/// after the end of the body, after an error, on early stop, or when it is
/// dropped. `poll_chunk` is never called after `release`.
///
/// # Examples
///
/// ```rust
/// use core::pin::Pin;
/// use core::task::{Context, Poll};
/// use http_app_kit::enumerator::{Source, Step};
/// use http_app_kit::{BodyError, Enumerator};
/// use bytes::Bytes;
///
/// struct Countdown(u8);
///
/// impl Source for Countdown {
///     fn poll_chunk(
///         mut self: Pin<&mut Self>,
///         _cx: &mut Context<'_>,
///     ) -> Poll<Option<Result<Bytes, BodyError>>> {
///         if self.0 == 0 {
///             return Poll::Ready(None);
///         }
///         self.0 -= 1;
///         Poll::Ready(Some(Ok(Bytes::from(self.0.to_string()))))
///     }
/// }
///
/// # async fn example() -> Result<(), BodyError> {
/// let digits = Enumerator::from_source(Countdown(3))
///     .run(|mut acc: String, chunk| {
///         acc.push_str(std::str::from_utf8(&chunk).unwrap());
///         Step::Continue(acc)
///     }, String::new())
///     .await?;
/// assert_eq!(digits, "210");
/// # Ok(())
/// # }
/// ```
pub trait Source: Send + 'static {
    /// Advances to the next chunk.
    fn poll_chunk(self: Pin<&mut Self>, cx: &mut Context<'_>)
        -> Poll<Option<Result<Bytes, Error>>>;

    /// Frees the producer's resources.
    fn release(self: Pin<&mut Self>) {}

    /// Bounds on the number of bytes still to come.
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}

pub(crate) type BoxSource = Pin<Box<dyn Source>>;

impl<S: Source + ?Sized> Source for Pin<Box<S>> {
    fn poll_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Bytes, Error>>> {
        self.get_mut().as_mut().poll_chunk(cx)
    }

    fn release(self: Pin<&mut Self>) {
        self.get_mut().as_mut().release()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (**self).size_hint()
    }
}

pin_project! {
    pub(crate) struct StreamSource<S> {
        #[pin]
        stream: S,
    }
}

impl<S> StreamSource<S> {
    pub(crate) fn new(stream: S) -> Self {
        Self { stream }
    }
}

impl<S, T, E> Source for StreamSource<S>
where
    S: Stream<Item = Result<T, E>> + Send + 'static,
    T: Into<Bytes>,
    E: Into<Error>,
{
    fn poll_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Bytes, Error>>> {
        let item = ready!(self.project().stream.poll_next(cx));
        Poll::Ready(item.map(|result| result.map(Into::into).map_err(Into::into)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

pin_project! {
    pub(crate) struct HttpBodySource<B> {
        #[pin]
        body: B,
    }
}

impl<B> HttpBodySource<B> {
    pub(crate) fn new(body: B) -> Self {
        Self { body }
    }
}

impl<B> Source for HttpBodySource<B>
where
    B: http_body::Body + Send + 'static,
    B::Data: Into<Bytes>,
    B::Error: Into<Error>,
{
    fn poll_chunk(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Bytes, Error>>> {
        let mut body = self.project().body;
        loop {
            match ready!(body.as_mut().poll_frame(cx)) {
                Some(Ok(frame)) => match frame.into_data() {
                    Ok(data) => return Poll::Ready(Some(Ok(data.into()))),
                    // Trailers carry no body bytes.
                    Err(_) => continue,
                },
                Some(Err(error)) => return Poll::Ready(Some(Err(error.into()))),
                None => return Poll::Ready(None),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let hint = self.body.size_hint();
        (
            usize::try_from(hint.lower()).unwrap_or(usize::MAX),
            hint.upper().and_then(|upper| usize::try_from(upper).ok()),
        )
    }
}

#[cfg(feature = "std")]
pub(crate) use self::reader::ReaderSource;

#[cfg(feature = "std")]
mod reader {
    use alloc::boxed::Box;
    use bytes::Bytes;
    use core::pin::Pin;
    use core::task::{Context, Poll};
    use futures_lite::{ready, AsyncBufRead};

    use super::{Error, Source};

    pub(crate) type BoxBufReader = Pin<Box<dyn AsyncBufRead + Send + 'static>>;

    /// Chunks are whatever the reader's buffer holds on each fill; an empty
    /// fill means the reader is exhausted.
    pub(crate) struct ReaderSource {
        reader: Option<BoxBufReader>,
        remaining: Option<usize>,
    }

    impl ReaderSource {
        pub(crate) fn new(reader: BoxBufReader, length: Option<usize>) -> Self {
            Self {
                reader: Some(reader),
                remaining: length,
            }
        }
    }

    impl Source for ReaderSource {
        fn poll_chunk(
            self: Pin<&mut Self>,
            cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Bytes, Error>>> {
            let this = self.get_mut();
            let Some(reader) = this.reader.as_mut() else {
                return Poll::Ready(None);
            };
            let data = ready!(reader.as_mut().poll_fill_buf(cx))?;
            if data.is_empty() {
                return Poll::Ready(None);
            }
            let chunk = Bytes::copy_from_slice(data);
            reader.as_mut().consume(chunk.len());
            if let Some(remaining) = this.remaining.as_mut() {
                *remaining = remaining.saturating_sub(chunk.len());
            }
            Poll::Ready(Some(Ok(chunk)))
        }

        fn release(self: Pin<&mut Self>) {
            self.get_mut().reader = None;
        }

        fn size_hint(&self) -> (usize, Option<usize>) {
            match self.remaining {
                Some(remaining) => (remaining, Some(remaining)),
                None => (0, None),
            }
        }
    }
}
