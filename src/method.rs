//! The closed set of request methods an application can be handed.
use alloc::string::{String, ToString};
use core::{fmt, str::FromStr};

use http::StatusCode;

use crate::HttpError;

/// Request method.
///
/// The set is fixed; servers must reject anything else before building an
/// [`Environment`](crate::Environment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    /// `OPTIONS`
    Options,
    /// `GET`
    Get,
    /// `HEAD`
    Head,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `TRACE`
    Trace,
    /// `CONNECT`
    Connect,
}

impl Method {
    /// Every method, in declaration order.
    pub const ALL: [Method; 8] = [
        Method::Options,
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Trace,
        Method::Connect,
    ];

    /// The method token as it appears on the request line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Method::Options => "OPTIONS",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A method token outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedMethod {
    token: String,
}

impl UnsupportedMethod {
    /// The rejected token.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for UnsupportedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported request method `{}`", self.token)
    }
}

impl core::error::Error for UnsupportedMethod {}

impl HttpError for UnsupportedMethod {
    fn status(&self) -> StatusCode {
        StatusCode::NOT_IMPLEMENTED
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = UnsupportedMethod;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl TryFrom<http::Method> for Method {
    type Error = UnsupportedMethod;

    fn try_from(method: http::Method) -> Result<Self, Self::Error> {
        Method::try_from(&method)
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Options => http::Method::OPTIONS,
            Method::Get => http::Method::GET,
            Method::Head => http::Method::HEAD,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Delete => http::Method::DELETE,
            Method::Trace => http::Method::TRACE,
            Method::Connect => http::Method::CONNECT,
        }
    }
}

impl FromStr for Method {
    type Err = UnsupportedMethod;

    /// Parses an exact, upper-case method token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| UnsupportedMethod {
                token: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_and_from_http() {
        for method in Method::ALL {
            let http_method = http::Method::from(method);
            assert_eq!(http_method.as_str(), method.as_str());
            assert_eq!(Method::try_from(&http_method), Ok(method));
        }
    }

    #[test]
    fn rejects_methods_outside_the_set() {
        let err = Method::try_from(http::Method::PATCH).unwrap_err();
        assert_eq!(err.token(), "PATCH");
        assert_eq!(err.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(err.to_string(), "unsupported request method `PATCH`");
    }

    #[test]
    fn parses_exact_tokens_only() {
        assert_eq!("DELETE".parse::<Method>(), Ok(Method::Delete));
        assert!("get".parse::<Method>().is_err());
        assert_eq!("PURGE".parse::<Method>().unwrap_err().token(), "PURGE");
    }
}
