#[cfg(feature = "std")]
extern crate std;

use alloc::boxed::Box;
use core::error::Error as CoreError;
use core::fmt::{self, Display};

use http::StatusCode;

use crate::HttpError;

/// A boxed error from a body producer.
pub type BoxError = Box<dyn CoreError + Send + Sync + 'static>;

/// Error produced while pulling chunks from an [`Enumerator`](super::Enumerator).
///
/// ```rust
/// use http_app_kit::{BodyError, Enumerator};
///
/// # async fn example() {
/// let mut input = Enumerator::consumed();
/// assert!(matches!(input.next_chunk().await, Some(Err(BodyError::Consumed))));
/// # }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The underlying reader, file or socket failed.
    #[cfg(feature = "std")]
    Io(std::io::Error),
    /// The enumerator was already handed to someone else.
    Consumed,
    /// Any other producer failure.
    Other(BoxError),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "std")]
            Error::Io(error) => Display::fmt(error, f),
            Error::Consumed => f.write_str("body was already taken by another consumer"),
            Error::Other(error) => Display::fmt(error, f),
        }
    }
}

impl CoreError for Error {
    fn source(&self) -> Option<&(dyn CoreError + 'static)> {
        match self {
            #[cfg(feature = "std")]
            Error::Io(error) => Some(error),
            Error::Consumed => None,
            Error::Other(error) => Some(&**error),
        }
    }
}

impl HttpError for Error {
    fn status(&self) -> StatusCode {
        match self {
            #[cfg(feature = "std")]
            Error::Io(error) if error.kind() == std::io::ErrorKind::UnexpectedEof => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::Io(error)
    }
}

#[cfg(feature = "std")]
impl From<Error> for std::io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Io(error) => error,
            other => std::io::Error::other(other),
        }
    }
}

impl From<BoxError> for Error {
    fn from(error: BoxError) -> Self {
        Error::Other(error)
    }
}

impl From<core::convert::Infallible> for Error {
    fn from(error: core::convert::Infallible) -> Self {
        match error {}
    }
}
