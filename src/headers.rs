//! Ordered header sequences.
//!
//! [`Headers`] keeps every `(name, value)` pair in the order it was added,
//! across all names. Repeated names are kept as separate entries, which
//! matters for headers such as `Set-Cookie` where order and multiplicity are
//! meaningful.
//!
//! ```rust
//! use http_app_kit::Headers;
//! use http_app_kit::header::{HeaderValue, SET_COOKIE, CONTENT_TYPE};
//!
//! let headers = Headers::new()
//!     .header(SET_COOKIE, HeaderValue::from_static("a=1"))
//!     .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
//!     .header(SET_COOKIE, HeaderValue::from_static("b=2"));
//!
//! let cookies: Vec<_> = headers.get_all(&SET_COOKIE).collect();
//! assert_eq!(cookies, ["a=1", "b=2"]);
//! assert_eq!(headers.len(), 3);
//! ```
use alloc::vec::{self, Vec};
use core::slice;

use http::{HeaderMap, HeaderName, HeaderValue};

/// An ordered sequence of header pairs; names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl Headers {
    /// Creates an empty sequence.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates an empty sequence with room for `capacity` pairs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends a pair after every existing one.
    pub fn append(&mut self, name: HeaderName, value: HeaderValue) {
        self.entries.push((name, value));
    }

    /// Builder form of [`append`](Self::append).
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.append(name, value);
        self
    }

    /// The first value recorded for `name`.
    pub fn get(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Every value recorded for `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a HeaderName) -> impl Iterator<Item = &'a HeaderValue> {
        self.entries
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Whether at least one pair has this name.
    pub fn contains(&self, name: &HeaderName) -> bool {
        self.get(name).is_some()
    }

    /// Drops every pair named `name`, returning how many were removed.
    pub fn remove(&mut self, name: &HeaderName) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(key, _)| key != name);
        before - self.entries.len()
    }

    /// All pairs in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, (HeaderName, HeaderValue)> {
        self.entries.iter()
    }

    /// Number of pairs, counting repeated names separately.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies the pairs into an [`HeaderMap`].
    ///
    /// Values for a repeated name keep their relative order; the interleaving
    /// between different names is lost.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            map.append(name.clone(), value.clone());
        }
        map
    }
}

impl From<HeaderMap> for Headers {
    fn from(map: HeaderMap) -> Self {
        let mut headers = Headers::with_capacity(map.len());
        let mut current = None;
        // `HeaderMap::into_iter` yields the name only on the first value of
        // each run.
        for (name, value) in map {
            if let Some(name) = name {
                current = Some(name);
            }
            if let Some(name) = &current {
                headers.append(name.clone(), value);
            }
        }
        headers
    }
}

impl From<&HeaderMap> for Headers {
    fn from(map: &HeaderMap) -> Self {
        map.iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

impl FromIterator<(HeaderName, HeaderValue)> for Headers {
    fn from_iter<I: IntoIterator<Item = (HeaderName, HeaderValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(HeaderName, HeaderValue)> for Headers {
    fn extend<I: IntoIterator<Item = (HeaderName, HeaderValue)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl IntoIterator for Headers {
    type Item = (HeaderName, HeaderValue);
    type IntoIter = vec::IntoIter<(HeaderName, HeaderValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a (HeaderName, HeaderValue);
    type IntoIter = slice::Iter<'a, (HeaderName, HeaderValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{ACCEPT, CONTENT_LENGTH, SET_COOKIE};

    fn value(s: &'static str) -> HeaderValue {
        HeaderValue::from_static(s)
    }

    #[test]
    fn keeps_global_insertion_order() {
        let headers = Headers::new()
            .header(SET_COOKIE, value("a=1"))
            .header(ACCEPT, value("*/*"))
            .header(SET_COOKIE, value("b=2"));

        let names: Vec<&str> = headers.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["set-cookie", "accept", "set-cookie"]);
        assert_eq!(headers.get(&SET_COOKIE), Some(&value("a=1")));
        assert_eq!(headers.get_all(&SET_COOKIE).count(), 2);
    }

    #[test]
    fn remove_drops_every_occurrence() {
        let mut headers = Headers::new()
            .header(SET_COOKIE, value("a=1"))
            .header(CONTENT_LENGTH, value("3"))
            .header(SET_COOKIE, value("b=2"));

        assert_eq!(headers.remove(&SET_COOKIE), 2);
        assert_eq!(headers.len(), 1);
        assert!(!headers.contains(&SET_COOKIE));
        assert_eq!(headers.remove(&SET_COOKIE), 0);
    }

    #[test]
    fn header_map_round_trip_keeps_repeated_values() {
        let mut map = HeaderMap::new();
        map.append(SET_COOKIE, value("a=1"));
        map.append(SET_COOKIE, value("b=2"));
        map.insert(ACCEPT, value("text/html"));

        let headers = Headers::from(map.clone());
        assert_eq!(headers.len(), 3);
        let cookies: Vec<_> = headers.get_all(&SET_COOKIE).collect();
        assert_eq!(cookies, [&value("a=1"), &value("b=2")]);

        assert_eq!(Headers::from(&map), headers);
        assert_eq!(headers.to_header_map(), map);
    }
}
