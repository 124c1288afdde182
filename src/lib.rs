#![deny(unsafe_code)]
#![no_std]
#![warn(missing_docs, missing_debug_implementations)]
//! A minimal contract between HTTP servers and the applications they run.
//!
//! A server turns each request into an [`Environment`] and hands it to an
//! [`Application`], which answers with a [`Response`]. Request and response
//! bodies are both [`Enumerator`]s: producers of binary chunks that the
//! consumer folds with a step function instead of buffering, and that
//! release whatever they hold open on every way out.
//!
//! Parsing requests, managing sockets, routing and middleware belong to the
//! server and are not part of this crate.
//!
//! # Features
//!
//! - `std` (default) - readers, writers and the std-only diagnostic sinks
//! - `json` (default) - JSON bodies via serde_json
//! - `form` (default) - URL-encoded bodies via serde_urlencoded
//! - `mime` (default) - typed `Content-Type` handling
//! - `fs` - file bodies with `Content-Type` guessed from the extension
//!
//! # Examples
//!
//! ## An application
//!
//! ```rust
//! use http_app_kit::enumerator::Step;
//! use http_app_kit::{Application, BodyError, Environment, Response, StatusCode};
//!
//! /// Answers with the number of bytes in the request body.
//! struct Count;
//!
//! impl Application for Count {
//!     type Error = BodyError;
//!
//!     async fn handle(&mut self, env: Environment) -> Result<Response, BodyError> {
//!         let total = env
//!             .into_input()
//!             .run(|n: usize, chunk| Step::Continue(n + chunk.len()), 0)
//!             .await?;
//!         Ok(Response::new(StatusCode::OK, total.to_string()))
//!     }
//! }
//! ```
//!
//! ## Driving it as a server would
//!
//! ```rust
//! # #[cfg(feature = "std")]
//! # {
//! use http_app_kit::enumerator::Step;
//! use http_app_kit::{application, BoxHttpError, Enumerator, Environment, Method, Response, StatusCode};
//!
//! # async fn example() -> Result<(), http_app_kit::BodyError> {
//! let mut app = application::from_fn(|env: Environment| async move {
//!     let upper = env.path_info().to_uppercase();
//!     Ok::<_, BoxHttpError>(Response::new(StatusCode::OK, upper))
//! });
//!
//! let env = Environment::builder(Method::Get)
//!     .path_info("/hello")
//!     .input(Enumerator::empty())
//!     .build();
//! let response = application::invoke(&mut app, env).await;
//!
//! let (status, reason, _headers, body) = response.into_parts();
//! let head = format!("HTTP/1.1 {} {}\r\n\r\n", status.as_u16(), reason.as_str());
//! let wire = body
//!     .run(|mut out: Vec<u8>, chunk| {
//!         out.extend_from_slice(&chunk);
//!         Step::Continue(out)
//!     }, head.into_bytes())
//!     .await?;
//! assert!(wire.ends_with(b"/HELLO"));
//! # Ok(())
//! # }
//! # }
//! ```
extern crate alloc;

pub mod error;
pub use error::{BoxHttpError, Error, HttpError, Result, ResultExt};

pub mod method;
#[doc(inline)]
pub use method::Method;

mod headers;
pub use headers::Headers;

pub mod diagnostic;
#[doc(inline)]
pub use diagnostic::DiagnosticSink;

pub mod enumerator;
pub use enumerator::Enumerator;
pub use enumerator::Error as BodyError;

mod environment;
pub use environment::{Environment, EnvironmentBuilder, ProtocolVersion};

mod response;
pub use response::{ReasonPhrase, Response};

pub mod application;
#[doc(inline)]
pub use application::Application;

pub mod adapter;

pub mod utils;

pub use http::{header, StatusCode};

#[doc(hidden)]
pub mod __private {
    pub use crate::error::__private::*;
    pub use alloc::format;
}
