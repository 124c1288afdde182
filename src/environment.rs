//! The per-request record a server hands to an application.
//!
//! A server builds one [`Environment`] per request, passes it by value to a
//! single [`Application::handle`](crate::Application::handle) call and never
//! looks at it again. Nothing in it can be changed after
//! [`build`](EnvironmentBuilder::build); the only thing an application can
//! take out is the request body.
//!
//! # Examples
//!
//! ```rust
//! use http_app_kit::{Enumerator, Environment, Method, ProtocolVersion};
//! use http_app_kit::header::{HeaderValue, HOST};
//!
//! let env = Environment::builder(Method::Post)
//!     .script_name("/api")
//!     .path_info("/users/7")
//!     .query_string("expand=teams")
//!     .protocol_version(ProtocolVersion::HTTP_11)
//!     .header(HOST, HeaderValue::from_static("example.com"))
//!     .input(Enumerator::from_bytes(r#"{"name":"Ada"}"#))
//!     .build();
//!
//! assert_eq!(env.method(), Method::Post);
//! assert_eq!(env.path_info(), "/users/7");
//! assert_eq!(env.query_string(), Some("expand=teams"));
//! ```
use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use bytestr::ByteStr;
use http::{HeaderName, HeaderValue, Version};

use crate::diagnostic::{DiagnosticSink, TracingSink};
use crate::{Enumerator, Headers, Method};

/// An HTTP protocol version as a `(major, minor)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolVersion {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
}

impl ProtocolVersion {
    /// HTTP/0.9
    pub const HTTP_09: Self = Self::new(0, 9);
    /// HTTP/1.0
    pub const HTTP_10: Self = Self::new(1, 0);
    /// HTTP/1.1
    pub const HTTP_11: Self = Self::new(1, 1);
    /// HTTP/2.0
    pub const HTTP_2: Self = Self::new(2, 0);
    /// HTTP/3.0
    pub const HTTP_3: Self = Self::new(3, 0);

    /// Creates a version from its parts.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::HTTP_11
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

impl From<(u8, u8)> for ProtocolVersion {
    fn from((major, minor): (u8, u8)) -> Self {
        Self::new(major, minor)
    }
}

impl From<ProtocolVersion> for (u8, u8) {
    fn from(version: ProtocolVersion) -> Self {
        (version.major, version.minor)
    }
}

impl TryFrom<Version> for ProtocolVersion {
    type Error = Version;

    /// Fails only for versions this crate does not know about.
    fn try_from(version: Version) -> Result<Self, Self::Error> {
        Ok(match version {
            Version::HTTP_09 => Self::HTTP_09,
            Version::HTTP_10 => Self::HTTP_10,
            Version::HTTP_11 => Self::HTTP_11,
            Version::HTTP_2 => Self::HTTP_2,
            Version::HTTP_3 => Self::HTTP_3,
            other => return Err(other),
        })
    }
}

impl TryFrom<ProtocolVersion> for Version {
    type Error = ProtocolVersion;

    fn try_from(version: ProtocolVersion) -> Result<Self, Self::Error> {
        Ok(match (version.major, version.minor) {
            (0, 9) => Version::HTTP_09,
            (1, 0) => Version::HTTP_10,
            (1, 1) => Version::HTTP_11,
            (2, 0) => Version::HTTP_2,
            (3, 0) => Version::HTTP_3,
            _ => return Err(version),
        })
    }
}

/// One incoming request, as seen by an application.
pub struct Environment {
    method: Method,
    script_name: ByteStr,
    path_info: ByteStr,
    query_string: Option<ByteStr>,
    protocol_version: ProtocolVersion,
    headers: Headers,
    input: Enumerator,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("method", &self.method)
            .field("script_name", &self.script_name.as_str())
            .field("path_info", &self.path_info.as_str())
            .field("query_string", &self.query_string.as_ref().map(ByteStr::as_str))
            .field("protocol_version", &self.protocol_version)
            .field("headers", &self.headers)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

impl Environment {
    /// Starts building an environment for a request with `method`.
    pub fn builder(method: Method) -> EnvironmentBuilder {
        EnvironmentBuilder::new(method)
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The path prefix the application is mounted at, possibly empty.
    pub fn script_name(&self) -> &str {
        self.script_name.as_str()
    }

    /// The rest of the path after [`script_name`](Self::script_name).
    pub fn path_info(&self) -> &str {
        self.path_info.as_str()
    }

    /// The raw query string.
    ///
    /// `None` means the request target had no `?` at all, while `Some("")`
    /// means it ended with a bare `?`.
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_ref().map(ByteStr::as_str)
    }

    /// The protocol version of the request.
    pub fn protocol_version(&self) -> ProtocolVersion {
        self.protocol_version
    }

    /// The request headers, in the order they were received.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The first value of the header `name`.
    pub fn header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// Takes the request body.
    ///
    /// A second call returns a consumed enumerator whose first chunk is
    /// [`BodyError::Consumed`](crate::BodyError::Consumed).
    pub fn take_input(&mut self) -> Enumerator {
        self.input.take()
    }

    /// Consumes the environment, keeping only the request body.
    pub fn into_input(mut self) -> Enumerator {
        self.input.take()
    }

    /// Reports a diagnostic message to the server.
    ///
    /// The message is passed on verbatim, without a trailing newline, and
    /// does not affect the response.
    pub fn log_error(&self, message: &str) {
        self.diagnostics.log_error(message);
    }

    /// The sink behind [`log_error`](Self::log_error).
    ///
    /// Clone it to keep reporting after the environment has been consumed,
    /// for example from a response body that is still streaming.
    pub fn diagnostics(&self) -> &Arc<dyn DiagnosticSink> {
        &self.diagnostics
    }
}

/// Builder for [`Environment`], used by servers.
///
/// Defaults: empty script name and path info, no query string, HTTP/1.1, no
/// headers, an empty body and a [`TracingSink`].
#[derive(Debug)]
pub struct EnvironmentBuilder {
    env: Environment,
}

impl EnvironmentBuilder {
    fn new(method: Method) -> Self {
        Self {
            env: Environment {
                method,
                script_name: ByteStr::from_static(""),
                path_info: ByteStr::from_static(""),
                query_string: None,
                protocol_version: ProtocolVersion::HTTP_11,
                headers: Headers::new(),
                input: Enumerator::empty(),
                diagnostics: Arc::new(TracingSink),
            },
        }
    }

    /// Sets the mount prefix.
    pub fn script_name(mut self, script_name: impl Into<String>) -> Self {
        self.env.script_name = ByteStr::from(script_name.into());
        self
    }

    /// Sets the path below the mount prefix.
    pub fn path_info(mut self, path_info: impl Into<String>) -> Self {
        self.env.path_info = ByteStr::from(path_info.into());
        self
    }

    /// Sets the raw query string; an empty string is kept as present.
    pub fn query_string(mut self, query_string: impl Into<String>) -> Self {
        self.env.query_string = Some(ByteStr::from(query_string.into()));
        self
    }

    /// Sets or clears the raw query string.
    pub fn maybe_query_string(mut self, query_string: Option<impl Into<String>>) -> Self {
        self.env.query_string = query_string.map(|query| ByteStr::from(query.into()));
        self
    }

    /// Sets the protocol version.
    pub fn protocol_version(mut self, version: impl Into<ProtocolVersion>) -> Self {
        self.env.protocol_version = version.into();
        self
    }

    /// Appends one header pair.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.env.headers.append(name, value);
        self
    }

    /// Replaces every header.
    pub fn headers(mut self, headers: impl Into<Headers>) -> Self {
        self.env.headers = headers.into();
        self
    }

    /// Sets the request body.
    pub fn input(mut self, input: impl Into<Enumerator>) -> Self {
        self.env.input = input.into();
        self
    }

    /// Sets the diagnostic sink.
    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.env.diagnostics = Arc::new(sink);
        self
    }

    /// Sets an already shared diagnostic sink.
    pub fn shared_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.env.diagnostics = sink;
        self
    }

    /// Finishes the environment.
    pub fn build(self) -> Environment {
        self.env
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::NullSink;
    use alloc::string::ToString;

    #[test]
    fn absent_and_empty_query_strings_differ() {
        let absent = Environment::builder(Method::Get).build();
        let empty = Environment::builder(Method::Get).query_string("").build();
        assert_eq!(absent.query_string(), None);
        assert_eq!(empty.query_string(), Some(""));
        assert_ne!(absent.query_string(), empty.query_string());

        let cleared = Environment::builder(Method::Get)
            .maybe_query_string(None::<&str>)
            .build();
        assert_eq!(cleared.query_string(), None);
    }

    #[test]
    fn builder_defaults() {
        let env = Environment::builder(Method::Head).diagnostics(NullSink).build();
        assert_eq!(env.script_name(), "");
        assert_eq!(env.path_info(), "");
        assert_eq!(env.protocol_version(), ProtocolVersion::HTTP_11);
        assert!(env.headers().is_empty());
        assert!(env.into_input().is_finished());
    }

    #[test]
    fn versions_convert_both_ways() {
        for version in [
            Version::HTTP_09,
            Version::HTTP_10,
            Version::HTTP_11,
            Version::HTTP_2,
            Version::HTTP_3,
        ] {
            let ours = ProtocolVersion::try_from(version).unwrap();
            assert_eq!(Version::try_from(ours), Ok(version));
        }
        assert_eq!(ProtocolVersion::from((1, 0)).to_string(), "HTTP/1.0");
        assert!(Version::try_from(ProtocolVersion::new(1, 2)).is_err());
    }

    #[test]
    fn input_can_only_be_taken_once() {
        let mut env = Environment::builder(Method::Post)
            .input("payload")
            .diagnostics(NullSink)
            .build();
        let first = env.take_input();
        assert!(!first.is_consumed());
        assert!(env.take_input().is_consumed());
    }
}
