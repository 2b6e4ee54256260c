//! Path composition shared by the service façades.

/// A fixed path prefix owned by one façade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePath {
    prefix: &'static str,
}

impl ServicePath {
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    /// The prefix itself, e.g. `/users`.
    pub fn root(&self) -> String {
        self.prefix.to_string()
    }

    /// `prefix + subpath`, e.g. `/auth` + `/login`.
    pub fn join(&self, subpath: &str) -> String {
        format!("{}{}", self.prefix, subpath)
    }

    /// `prefix/<segment>` with the segment percent-encoded.
    pub fn segment(&self, segment: &str) -> String {
        format!("{}/{}", self.prefix, urlencoding::encode(segment))
    }
}
