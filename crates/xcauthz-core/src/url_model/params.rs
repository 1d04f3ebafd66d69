//! Query string as an ordered map with unique keys.

/// Query parameters kept in their raw (still percent-encoded) form.
///
/// Keys are unique: when a key repeats, the last value wins and the key keeps
/// the position of its first occurrence. Serialization is therefore stable,
/// which keeps URL customization idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        let mut params = QueryParams::default();
        for segment in query.split('&').filter(|s| !s.is_empty()) {
            match segment.split_once('=') {
                Some((k, v)) => params.set(k, Some(v.to_string())),
                None => params.set(segment, None),
            }
        }
        params
    }

    fn set(&mut self, key: &str, value: Option<String>) {
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Raw value for `key`; `Some(None)` for a bare key without `=`.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    /// Adds `key=value` unless `key` is already present. Returns whether it was added.
    pub fn insert_if_absent(&mut self, key: &str, value: String) -> bool {
        if self.contains_key(key) {
            return false;
        }
        self.pairs.push((key.to_string(), Some(value)));
        true
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn to_query_string(&self) -> String {
        let mut out = String::new();
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                out.push('&');
            }
            out.push_str(k);
            if let Some(v) = v {
                out.push('=');
                out.push_str(v);
            }
        }
        out
    }
}
