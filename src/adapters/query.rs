//! Query-string parameter source.
//!
//! Implements [`ParamSource`] over `a=b&c=d`, or over a full request URI
//! (everything up to the first `?` is skipped).  Values are returned still
//! percent-encoded; decoding is the handler's job.

use crate::app::ports::ParamSource;

#[derive(Debug, Clone, Copy)]
pub struct QueryParams<'a> {
    query: &'a str,
}

impl<'a> QueryParams<'a> {
    pub fn new(uri_or_query: &'a str) -> Self {
        let query = match uri_or_query.split_once('?') {
            Some((_, q)) => q,
            None if uri_or_query.starts_with('/') => "",
            None => uri_or_query,
        };
        Self { query }
    }

    /// `(name, raw value)` pairs in request order.
    pub fn pairs(self) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
    }
}

impl ParamSource for QueryParams<'_> {
    /// First occurrence wins.
    fn param(&self, name: &str) -> Option<&str> {
        self.pairs().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}
