//! Glue for servers built on the `http` crate.
//!
//! A server that already parses requests into [`http::Request`] can build an
//! [`Environment`] with [`Environment::from_http`] and write back the
//! [`http::Response`] produced by [`handle_http`].
//!
//! # Examples
//!
//! ```rust
//! use http_app_kit::diagnostic::NullSink;
//! use http_app_kit::Environment;
//!
//! let request = http::Request::get("/shop/cart?item=3")
//!     .body(http_body_util::Empty::<bytes::Bytes>::new())
//!     .unwrap();
//! let env = Environment::from_http(request, "/shop", NullSink).unwrap();
//!
//! assert_eq!(env.script_name(), "/shop");
//! assert_eq!(env.path_info(), "/cart");
//! assert_eq!(env.query_string(), Some("item=3"));
//! ```
use alloc::format;
use bytes::Bytes;

use crate::application::{self, Application};
use crate::diagnostic::DiagnosticSink;
use crate::method::UnsupportedMethod;
use crate::{BodyError, Enumerator, Environment, HttpError, Method, ProtocolVersion, Response};

/// Splits `path` into the mount prefix and the rest.
///
/// The prefix only matches whole segments: `/app` mounts `/app` and
/// `/app/x` but not `/apple`. Trailing slashes on the prefix are ignored.
fn split_mount<'a>(path: &'a str, script_name: &str) -> (&'a str, &'a str) {
    let prefix = script_name.trim_end_matches('/');
    if prefix.is_empty() {
        return ("", path);
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            (&path[..prefix.len()], rest)
        }
        _ => ("", path),
    }
}

impl Environment {
    /// Builds an environment from an [`http::Request`].
    ///
    /// `script_name` is the prefix the application is mounted at; a request
    /// outside it gets an empty script name and its whole path as path
    /// info. The query string is copied verbatim, so `/a?` yields an empty
    /// query and `/a` none at all. The request body becomes the input.
    ///
    /// Fails for methods outside [`Method`].
    pub fn from_http<B>(
        request: http::Request<B>,
        script_name: &str,
        sink: impl DiagnosticSink + 'static,
    ) -> Result<Self, UnsupportedMethod>
    where
        B: http_body::Body + Send + 'static,
        B::Data: Into<Bytes>,
        B::Error: Into<BodyError>,
    {
        let (parts, body) = request.into_parts();
        let method = Method::try_from(&parts.method).inspect_err(|error| {
            tracing::debug!(method = error.token(), "rejected request method");
        })?;
        let (script_name, path_info) = split_mount(parts.uri.path(), script_name);
        let protocol_version =
            ProtocolVersion::try_from(parts.version).unwrap_or(ProtocolVersion::HTTP_11);

        Ok(Environment::builder(method)
            .script_name(script_name)
            .path_info(path_info)
            .maybe_query_string(parts.uri.query())
            .protocol_version(protocol_version)
            .headers(parts.headers)
            .input(Enumerator::new(body))
            .diagnostics(sink)
            .build())
    }
}

/// Serves one [`http::Request`] with `application`.
///
/// Requests with an unsupported method are answered with
/// `501 Not Implemented` without reaching the application, and the rejection
/// is reported to `sink`. Application failures are handled by
/// [`invoke`](application::invoke).
pub async fn handle_http<A, B, S>(
    application: &mut A,
    request: http::Request<B>,
    script_name: &str,
    sink: S,
) -> http::Response<Enumerator>
where
    A: Application,
    B: http_body::Body + Send + 'static,
    B::Data: Into<Bytes>,
    B::Error: Into<BodyError>,
    S: DiagnosticSink + Clone + 'static,
{
    match Environment::from_http(request, script_name, sink.clone()) {
        Ok(environment) => application::invoke(application, environment)
            .await
            .into_http(),
        Err(error) => {
            sink.log_error(&format!("{error}"));
            Response::from_status(error.status()).into_http()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn mount_prefix_matches_whole_segments() {
        assert_eq!(split_mount("/app", "/app"), ("/app", ""));
        assert_eq!(split_mount("/app/x", "/app"), ("/app", "/x"));
        assert_eq!(split_mount("/app/x", "/app/"), ("/app", "/x"));
        assert_eq!(split_mount("/apple", "/app"), ("", "/apple"));
        assert_eq!(split_mount("/other", "/app"), ("", "/other"));
        assert_eq!(split_mount("/x", ""), ("", "/x"));
        assert_eq!(split_mount("/x", "/"), ("", "/x"));
    }

    #[test]
    fn status_of_rejected_method_is_not_implemented() {
        let error = Method::try_from(&http::Method::PATCH).unwrap_err();
        assert_eq!(error.status(), StatusCode::NOT_IMPLEMENTED);
    }
}
