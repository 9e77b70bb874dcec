use url::Url;

/// Query parameters to send to the Hetzner DNS API.
///
/// Only values that differ from their default are kept, so unset filters
/// are absent from the query string rather than sent empty.
#[derive(Debug, Default)]
pub(crate) struct Query {
    pairs: Vec<(&'static str, String)>,
}

impl Query {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// In the case that `value` isn't zero, adds the key-value pair.
    pub(crate) fn add_if_nonzero(mut self, key: &'static str, value: u32) -> Self {
        if value != 0 {
            self.pairs.push((key, value.to_string()));
        }
        self
    }

    /// In the case that `value` isn't empty, adds the key-value pair.
    pub(crate) fn add_if_nonempty(mut self, key: &'static str, value: &str) -> Self {
        if !value.is_empty() {
            self.pairs.push((key, value.to_string()));
        }
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub(crate) fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Appends the pairs to the url, leaving it without a `?` when empty.
    pub(crate) fn apply(&self, url: &mut Url) {
        if self.is_empty() {
            return;
        }
        url.query_pairs_mut()
            .extend_pairs(self.pairs.iter().map(|(k, v)| (*k, v.as_str())));
    }
}
