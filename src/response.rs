//! What an application hands back to the server.
//!
//! A [`Response`] is a status code, a reason phrase, an ordered list of
//! headers and an [`Enumerator`] over the body. The server drains the body
//! after writing the status line and headers.
//!
//! # Examples
//!
//! ```rust
//! use http_app_kit::{Response, StatusCode};
//! use http_app_kit::header::{HeaderValue, LOCATION};
//!
//! let response = Response::new(StatusCode::CREATED, "created")
//!     .header(LOCATION, HeaderValue::from_static("/users/7"));
//!
//! assert_eq!(response.status(), StatusCode::CREATED);
//! assert_eq!(response.reason(), "Created");
//! ```
#[cfg(feature = "std")]
extern crate std;

use alloc::string::String;
use core::fmt;

use bytestr::ByteStr;
use http::{header, HeaderName, HeaderValue, StatusCode};

use crate::{Enumerator, Headers};

/// An HTTP response: status, reason phrase, ordered headers and a body.
pub struct Response {
    status: StatusCode,
    reason: ByteStr,
    headers: Headers,
    body: Enumerator,
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("reason", &self.reason.as_str())
            .field("headers", &self.headers)
            .field("body", &self.body)
            .finish()
    }
}

/// The reason phrase of a response converted with [`Response::into_http`].
///
/// `http::Response` has no place for a custom reason phrase, so it travels
/// in the response extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonPhrase(ByteStr);

impl ReasonPhrase {
    /// The phrase as text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Drops characters that would break the status line.
fn sanitize_reason(reason: ByteStr) -> ByteStr {
    if !reason.as_str().chars().any(char::is_control) {
        return reason;
    }
    ByteStr::from(
        reason
            .as_str()
            .chars()
            .filter(|c| !c.is_control())
            .collect::<String>(),
    )
}

fn canonical_reason(status: StatusCode) -> ByteStr {
    ByteStr::from_static(status.canonical_reason().unwrap_or(""))
}

impl Response {
    /// Creates a response with the canonical reason phrase of `status`.
    ///
    /// Status codes without a registered phrase get an empty one.
    pub fn new(status: StatusCode, body: impl Into<Enumerator>) -> Self {
        Self {
            status,
            reason: canonical_reason(status),
            headers: Headers::new(),
            body: body.into(),
        }
    }

    /// A `200 OK` response with no body.
    pub fn empty() -> Self {
        Self::new(StatusCode::OK, Enumerator::empty())
    }

    /// A bodiless response carrying only `status`.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, Enumerator::empty())
    }

    /// Replaces the reason phrase.
    ///
    /// Control characters (CR and LF among them) cannot appear on a status
    /// line and are dropped.
    ///
    /// ```rust
    /// use http_app_kit::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::IM_A_TEAPOT, "").with_reason("Short and stout");
    /// assert_eq!(response.reason(), "Short and stout");
    /// ```
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = sanitize_reason(ByteStr::from(reason.into()));
        self
    }

    /// Appends a header, keeping any earlier values for the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// The status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Changes the status code; the reason phrase becomes its canonical one.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
        self.reason = canonical_reason(status);
    }

    /// The reason phrase.
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }

    /// The headers, in the order they will be written.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// The first value of the header `name`.
    pub fn get_header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// The body.
    pub fn body(&self) -> &Enumerator {
        &self.body
    }

    /// Mutable access to the body.
    pub fn body_mut(&mut self) -> &mut Enumerator {
        &mut self.body
    }

    /// Takes the body, leaving a consumed placeholder behind.
    pub fn take_body(&mut self) -> Enumerator {
        self.body.take()
    }

    /// Replaces the body, returning the previous one.
    pub fn replace_body(&mut self, body: impl Into<Enumerator>) -> Enumerator {
        core::mem::replace(&mut self.body, body.into())
    }

    /// Splits the response into status, reason, headers and body.
    pub fn into_parts(self) -> (StatusCode, ByteStr, Headers, Enumerator) {
        (self.status, self.reason, self.headers, self.body)
    }

    /// Reassembles a response from [`into_parts`](Self::into_parts).
    ///
    /// Control characters in `reason` are dropped as in
    /// [`with_reason`](Self::with_reason).
    pub fn from_parts(
        status: StatusCode,
        reason: ByteStr,
        headers: Headers,
        body: Enumerator,
    ) -> Self {
        Self {
            status,
            reason: sanitize_reason(reason),
            headers,
            body,
        }
    }

    fn set_content_type(&mut self, value: HeaderValue) {
        self.headers.remove(&header::CONTENT_TYPE);
        self.headers.append(header::CONTENT_TYPE, value);
    }

    /// Sets a UTF-8 text body with `Content-Type: text/plain; charset=utf-8`.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.set_content_type(HeaderValue::from_static("text/plain; charset=utf-8"));
        self.body = Enumerator::from_text(text);
        self
    }

    /// Sets a JSON body with `Content-Type: application/json`.
    ///
    /// ```rust
    /// # #[cfg(feature = "json")]
    /// # {
    /// use http_app_kit::Response;
    /// use http_app_kit::header::CONTENT_TYPE;
    ///
    /// let response = Response::empty().json(&serde_json::json!({ "id": 7 }))?;
    /// assert_eq!(response.get_header(&CONTENT_TYPE).unwrap(), "application/json");
    /// # }
    /// # Ok::<(), serde_json::Error>(())
    /// ```
    #[cfg(feature = "json")]
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.body = Enumerator::from_json(value)?;
        self.set_content_type(HeaderValue::from_static("application/json"));
        Ok(self)
    }

    /// Sets a form body with `Content-Type: application/x-www-form-urlencoded`.
    #[cfg(feature = "form")]
    pub fn form<T: serde::Serialize>(
        mut self,
        value: &T,
    ) -> Result<Self, serde_urlencoded::ser::Error> {
        self.body = Enumerator::from_form(value)?;
        self.set_content_type(HeaderValue::from_static(
            "application/x-www-form-urlencoded",
        ));
        Ok(self)
    }

    /// Streams a file as the body.
    ///
    /// `Content-Type` is guessed from the file extension, falling back to
    /// `application/octet-stream`.
    ///
    /// ```rust,no_run
    /// # #[cfg(feature = "fs")]
    /// # async fn example() -> std::io::Result<()> {
    /// use http_app_kit::Response;
    ///
    /// let response = Response::empty().file("static/index.html").await?;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(all(feature = "fs", feature = "std"))]
    pub async fn file(
        mut self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        self.body = Enumerator::from_file(path).await?;
        let guessed = mime_guess::from_path(path).first_or_octet_stream();
        if let Ok(value) = HeaderValue::from_str(guessed.as_ref()) {
            self.set_content_type(value);
        }
        Ok(self)
    }

    /// Sets `Content-Type` from a parsed MIME type.
    #[cfg(feature = "mime")]
    pub fn mime(mut self, mime: mime::Mime) -> Self {
        if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
            self.set_content_type(value);
        }
        self
    }

    /// Parses the `Content-Type` header, if present and well formed.
    #[cfg(feature = "mime")]
    pub fn content_type(&self) -> Option<mime::Mime> {
        self.get_header(&header::CONTENT_TYPE)?
            .to_str()
            .ok()?
            .parse()
            .ok()
    }

    /// Converts into an [`http::Response`] for servers built on the `http`
    /// ecosystem.
    ///
    /// Headers keep their order and repeated names. The reason phrase is
    /// stored as a [`ReasonPhrase`] extension.
    pub fn into_http(self) -> http::Response<Enumerator> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        let map = response.headers_mut();
        map.reserve(self.headers.len());
        for (name, value) in self.headers {
            map.append(name, value);
        }
        response.extensions_mut().insert(ReasonPhrase(self.reason));
        response
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::empty()
    }
}

impl<B> From<http::Response<B>> for Response
where
    B: Into<Enumerator>,
{
    /// Keeps a [`ReasonPhrase`] extension when there is one.
    fn from(response: http::Response<B>) -> Self {
        let (mut parts, body) = response.into_parts();
        let reason = parts
            .extensions
            .remove::<ReasonPhrase>()
            .map_or_else(|| canonical_reason(parts.status), |phrase| phrase.0);
        Self {
            status: parts.status,
            reason,
            headers: Headers::from(parts.headers),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::Step;
    use alloc::vec::Vec;

    async fn body_bytes(body: Enumerator) -> Vec<u8> {
        body.run(
            |mut acc: Vec<u8>, chunk| {
                acc.extend_from_slice(&chunk);
                Step::Continue(acc)
            },
            Vec::new(),
        )
        .await
        .unwrap()
    }

    #[test]
    fn reason_defaults_to_canonical_phrase() {
        assert_eq!(Response::from_status(StatusCode::NOT_FOUND).reason(), "Not Found");
        let unregistered = StatusCode::from_u16(599).unwrap();
        assert_eq!(Response::from_status(unregistered).reason(), "");
    }

    #[test]
    fn reason_drops_control_characters() {
        let response = Response::empty().with_reason("OK\r\nSet-Cookie: x=1");
        assert_eq!(response.reason(), "OKSet-Cookie: x=1");

        let (status, _, headers, body) = Response::empty().into_parts();
        let rebuilt = Response::from_parts(status, ByteStr::from_static("Fi\nne"), headers, body);
        assert_eq!(rebuilt.reason(), "Fine");
    }

    #[test]
    fn set_status_resets_reason() {
        let mut response = Response::empty().with_reason("Fine");
        response.set_status(StatusCode::ACCEPTED);
        assert_eq!(response.reason(), "Accepted");
    }

    #[tokio::test]
    async fn parts_keep_header_order() {
        let response = Response::new(StatusCode::OK, "hello")
            .header(header::SET_COOKIE, HeaderValue::from_static("a=1"))
            .header(header::SERVER, HeaderValue::from_static("test"))
            .header(header::SET_COOKIE, HeaderValue::from_static("b=2"));
        let (status, reason, headers, body) = response.into_parts();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reason.as_str(), "OK");
        let names: Vec<_> = headers.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["set-cookie", "server", "set-cookie"]);
        assert_eq!(body_bytes(body).await, b"hello");
    }

    #[test]
    fn text_replaces_content_type() {
        let response = Response::empty()
            .header(header::CONTENT_TYPE, HeaderValue::from_static("image/png"))
            .text("plain");
        let types: Vec<_> = response.headers().get_all(&header::CONTENT_TYPE).collect();
        assert_eq!(types, [&HeaderValue::from_static("text/plain; charset=utf-8")]);
    }

    #[test]
    fn into_http_carries_reason_phrase() {
        let response = Response::from_status(StatusCode::OK)
            .with_reason("Alright")
            .header(header::VARY, HeaderValue::from_static("accept"))
            .header(header::VARY, HeaderValue::from_static("origin"));
        let http = response.into_http();
        assert_eq!(http.status(), StatusCode::OK);
        assert_eq!(http.headers().get_all(header::VARY).iter().count(), 2);
        assert_eq!(
            http.extensions().get::<ReasonPhrase>().map(ReasonPhrase::as_str),
            Some("Alright")
        );

        let back = Response::from(http);
        assert_eq!(back.reason(), "Alright");
    }

    #[cfg(feature = "json")]
    #[tokio::test]
    async fn json_sets_body_and_type() {
        let response = Response::empty()
            .json(&serde_json::json!({ "ok": true }))
            .unwrap();
        assert_eq!(
            response.get_header(&header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let (_, _, _, body) = response.into_parts();
        assert_eq!(body_bytes(body).await, br#"{"ok":true}"#);
    }

    #[cfg(feature = "mime")]
    #[test]
    fn mime_round_trips_through_header() {
        let response = Response::empty().mime(mime::TEXT_HTML_UTF_8);
        assert_eq!(response.content_type(), Some(mime::TEXT_HTML_UTF_8));
    }
}
