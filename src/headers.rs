/* src/headers.rs */

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// Type alias for header maps. Keys are matched case-insensitively.
pub type HeaderMap = HashMap<String, String>;

/// Read access to a request's header values by name.
///
/// This is the only thing the resolver needs from a request, so any
/// framework can plug in without building a full request type.
pub trait HeaderLookup {
    /// Return the first value of the header `name`, matched
    /// case-insensitively, or `None` when it is absent.
    ///
    /// Sources holding raw bytes decode them lossily, so one bad byte only
    /// spoils the comma-separated entry it sits in.
    fn header(&self, name: &str) -> Option<Cow<'_, str>>;
}

impl<T: HeaderLookup + ?Sized> HeaderLookup for &T {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        (**self).header(name)
    }
}

impl HeaderLookup for HashMap<String, String> {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        if let Some(value) = self.get(name) {
            return Some(Cow::Borrowed(value.as_str()));
        }
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| Cow::Borrowed(value.as_str()))
    }
}

impl HeaderLookup for BTreeMap<String, String> {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        self.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| Cow::Borrowed(value.as_str()))
    }
}

#[cfg(feature = "axum")]
impl HeaderLookup for axum::http::HeaderMap {
    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
    }
}
