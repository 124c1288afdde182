//! Error types shared by applications and servers.
//!
//! The interface itself defines no failure channel, so this crate settles it
//! here: every application error is an [`HttpError`], which knows the status
//! code it should be answered with. The main types are:
//!
//! - [`Error`] - a boxed [`HttpError`] for code that mixes several error sources
//! - [`Result`] - a `Result` alias defaulting to [`Error`]
//! - [`ResultExt`] - attaches a status code to foreign errors and `None`
//!
//! # Examples
//!
//! ```rust
//! use http_app_kit::{Error, Result, ResultExt, StatusCode};
//!
//! let err = Error::msg("no such user").set_status(StatusCode::NOT_FOUND);
//! assert_eq!(err.status(), StatusCode::NOT_FOUND);
//!
//! let found: Result<u32> = Some(7).status(StatusCode::NOT_FOUND);
//! assert_eq!(found.unwrap(), 7);
//! ```
use alloc::boxed::Box;
use core::{
    fmt::{self, Debug},
    ops::Deref,
};
use http::StatusCode;

/// An error paired with the HTTP status a server should answer with.
///
/// `Error` erases the concrete error type. Use it where an application
/// combines failures from several libraries; implement [`HttpError`] on a
/// dedicated enum where the set of failures is known.
pub struct Error {
    status: StatusCode,
    error: Box<dyn core::error::Error + Send + Sync + 'static>,
}

/// An error that knows its HTTP status code.
///
/// This is the bound on [`Application::Error`](crate::Application::Error).
/// Generic [`core::error::Error`] values can be lifted into [`Error`] with
/// [`ResultExt::status`].
pub trait HttpError: core::error::Error + Send + Sync + 'static {
    /// The status code a server should respond with.
    fn status(&self) -> StatusCode;
}

/// Owned, type-erased [`HttpError`].
///
/// Unlike [`Error`] this type implements [`HttpError`] itself, so it can be
/// used as the error type of a type-erased application.
pub struct BoxHttpError(Box<dyn HttpError>);

impl BoxHttpError {
    /// Boxes an [`HttpError`].
    pub fn new(error: impl HttpError) -> Self {
        Self(Box::new(error))
    }
}

impl Debug for BoxHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for BoxHttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl core::error::Error for BoxHttpError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        self.0.source()
    }
}

impl HttpError for BoxHttpError {
    fn status(&self) -> StatusCode {
        self.0.status()
    }
}

#[derive(Debug)]
struct Message<M: fmt::Display + Debug + Send + Sync + 'static>(M);

impl<M: fmt::Display + Debug + Send + Sync + 'static> fmt::Display for Message<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<M: fmt::Display + Debug + Send + Sync + 'static> core::error::Error for Message<M> {}

/// Pairs a plain error with a status so it can leave as an [`HttpError`].
struct Detached {
    status: StatusCode,
    error: Box<dyn core::error::Error + Send + Sync + 'static>,
}

impl Debug for Detached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.error, f)
    }
}

impl fmt::Display for Detached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl core::error::Error for Detached {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        self.error.source()
    }
}

impl HttpError for Detached {
    fn status(&self) -> StatusCode {
        self.status
    }
}

#[doc(hidden)]
pub mod __private {
    use http::StatusCode;

    pub const fn assert_status_literal(status: u16) -> u16 {
        if status < 100 || status > 599 {
            panic!("status code literal must be within 100..=599");
        }
        status
    }

    pub const fn assert_status_code(status: StatusCode) -> StatusCode {
        let value = status.as_u16();
        if value < 100 || value > 599 {
            panic!("status code must be within 100..=599");
        }
        status
    }
}

/// `Result` with [`Error`] as the default error type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

impl Error {
    /// Wraps any error with an explicit status code.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use http_app_kit::{Error, StatusCode};
    /// use std::io;
    ///
    /// let err = Error::new(io::Error::from(io::ErrorKind::NotFound), StatusCode::NOT_FOUND);
    /// assert_eq!(err.status(), StatusCode::NOT_FOUND);
    /// assert!(err.downcast_ref::<io::Error>().is_some());
    /// ```
    pub fn new<E>(error: E, status: StatusCode) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self {
            status,
            error: Box::new(error),
        }
    }

    /// Creates an error from a message, answered with `500 Internal Server Error`.
    pub fn msg<M>(msg: M) -> Self
    where
        M: fmt::Display + Debug + Send + Sync + 'static,
    {
        Self::new(Message(msg), StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Returns the status code a server should answer with.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Replaces the status code, keeping the message and source chain.
    pub fn set_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Attempts to recover the concrete error type.
    ///
    /// The status is not part of the match: an error built with
    /// [`Error::new`] or changed by [`set_status`](Self::set_status) still
    /// downcasts to the type it was created from. On failure the error is
    /// handed back unchanged.
    pub fn downcast<E>(self) -> core::result::Result<Box<E>, Self>
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        let Self { status, error } = self;
        error.downcast::<E>().map_err(|error| Self { status, error })
    }

    /// Borrows the concrete error if it has type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        self.error.downcast_ref()
    }

    /// Consumes the error, returning it as a boxed [`HttpError`] that
    /// reports the current status.
    pub fn into_inner(self) -> Box<dyn HttpError> {
        Box::new(Detached {
            status: self.status,
            error: self.error,
        })
    }
}

impl<E: HttpError> From<E> for Error {
    fn from(error: E) -> Self {
        let status = error.status();
        Self::new(error, status)
    }
}

impl From<Error> for BoxHttpError {
    fn from(error: Error) -> Self {
        Self(error.into_inner())
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("status", &self.status)
            .field("error", &self.error)
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl Deref for Error {
    type Target = dyn core::error::Error + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        self.error.as_ref()
    }
}

impl AsRef<dyn core::error::Error + Send + Sync + 'static> for Error {
    fn as_ref(&self) -> &(dyn core::error::Error + Send + Sync + 'static) {
        self.deref()
    }
}

/// Attaches a status code to errors that do not carry one.
///
/// ```rust
/// use http_app_kit::{Result, ResultExt, StatusCode};
///
/// fn parse_id(raw: &str) -> Result<u64> {
///     raw.parse::<u64>().status(StatusCode::BAD_REQUEST)
/// }
///
/// assert_eq!(parse_id("x").unwrap_err().status(), StatusCode::BAD_REQUEST);
/// ```
pub trait ResultExt<T>: Sized {
    /// Maps an `Err` (or `None`) to an [`Error`] with the given status.
    fn status(self, status: StatusCode) -> Result<T>;
}

impl<T, E> ResultExt<T> for core::result::Result<T, E>
where
    E: core::error::Error + Send + Sync + 'static,
{
    fn status(self, status: StatusCode) -> Result<T> {
        self.map_err(|error| Error::new(error, status))
    }
}

impl<T> ResultExt<T> for Option<T> {
    fn status(self, status: StatusCode) -> Result<T> {
        self.ok_or_else(|| Error::msg("value was absent").set_status(status))
    }
}

/// Builds an [`Error`] from a status and a format string.
///
/// The status is either a numeric literal, checked to lie in `100..=599` at
/// compile time, or a [`StatusCode`] constant path.
///
/// ```rust
/// use http_app_kit::{error, StatusCode};
///
/// let err = error!(404, "no route for {}", "/missing");
/// assert_eq!(err.status(), StatusCode::NOT_FOUND);
/// assert_eq!(err.to_string(), "no route for /missing");
/// ```
#[macro_export]
macro_rules! error {
    ($status:literal, $fmt:expr $(, $args:expr)* $(,)?) => {{
        const __STATUS: u16 = $crate::__private::assert_status_literal($status);
        match $crate::StatusCode::from_u16(__STATUS) {
            Ok(status) => $crate::Error::msg($crate::__private::format!($fmt $(, $args)*))
                .set_status(status),
            Err(_) => unreachable!("status literal validated at compile time"),
        }
    }};
    ($status:path, $fmt:expr $(, $args:expr)* $(,)?) => {{
        const __STATUS: $crate::StatusCode = $crate::__private::assert_status_code($status);
        $crate::Error::msg($crate::__private::format!($fmt $(, $args)*)).set_status(__STATUS)
    }};
}

/// Returns early with an [`Error`] built by [`error!`].
///
/// The error is converted with [`Into`], so the enclosing function may also
/// return [`BoxHttpError`].
///
/// ```rust
/// use http_app_kit::{bail, Result, StatusCode};
///
/// fn require_even(n: u32) -> Result<u32> {
///     if n % 2 != 0 {
///         bail!(StatusCode::BAD_REQUEST, "expected an even number, got {}", n);
///     }
///     Ok(n)
/// }
///
/// assert!(require_even(3).is_err());
/// ```
#[macro_export]
macro_rules! bail {
    ($status:literal, $fmt:expr $(, $args:expr)* $(,)?) => {
        return Err(::core::convert::Into::into($crate::error!($status, $fmt $(, $args)*)))
    };
    ($status:path, $fmt:expr $(, $args:expr)* $(,)?) => {
        return Err(::core::convert::Into::into($crate::error!($status, $fmt $(, $args)*)))
    };
}
