//! Query string parsing.
//!
//! Pairs are split and decoded with `serde_urlencoded` (`+` is a space, `%XX` is decoded), then
//! nested the way PHP's `parse_str` nests bracketed keys:
//!
//! | query                | value                          |
//! |----------------------|--------------------------------|
//! | `a=1&a=2`            | `{"a": "2"}`                   |
//! | `a[]=1&a[]=2`        | `{"a": ["1", "2"]}`            |
//! | `a[b][c]=1`          | `{"a": {"b": {"c": "1"}}}`     |
//! | `a[]=1&a[x]=2`       | `{"a": {"0": "1", "x": "2"}}`  |
//!
//! Keys are otherwise kept verbatim; a key whose brackets are not closed is treated as a plain key,
//! and a key starting with `[` is dropped. Like PHP, nesting is capped: a key with more than
//! [`MAX_NESTING`] bracket groups is dropped.

use serde_json::{Map, Value};
use tracing::warn;

/// Deepest bracket nesting accepted in a query key.
const MAX_NESTING: usize = 64;

/// A parsed query string, addressable by dot path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    inner: Map<String, Value>,
}

#[derive(Debug, PartialEq, Eq)]
enum KeyPart {
    Named(String),
    Append,
}

impl Query {
    /// Parses the raw query component, without the leading `?`.
    pub fn parse(raw: &str) -> Self {
        let pairs = match serde_urlencoded::from_str::<Vec<(String, String)>>(raw) {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!(cause = %e, "failed to decode query string, ignoring it");
                return Self::default();
            }
        };

        let mut inner = Map::new();
        for (key, value) in pairs {
            let Some((base, parts)) = split_key(&key) else {
                continue;
            };
            assign(inner.entry(base).or_insert(Value::Null), &parts, value);
        }

        Self { inner }
    }

    /// Looks up a value by dot path, e.g. `filter.tags.0`.
    ///
    /// Numeric components index into arrays.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut components = path.split('.');
        let first = components.next()?;
        let mut current = self.inner.get(first)?;

        for component in components {
            current = match current {
                Value::Object(map) => map.get(component)?,
                Value::Array(items) => items.get(component.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Like [`get`](Query::get), but only for string leaves.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.inner
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.inner)
    }
}

/// Splits `a[b][]` into `a` and `[Named(b), Append]`.
fn split_key(key: &str) -> Option<(String, Vec<KeyPart>)> {
    let Some(open) = key.find('[') else {
        return (!key.is_empty()).then(|| (key.to_string(), vec![]));
    };

    if open == 0 {
        return None;
    }

    let (base, mut rest) = key.split_at(open);
    let mut parts = Vec::new();

    while let Some(group) = rest.strip_prefix('[') {
        let Some(close) = group.find(']') else {
            break;
        };
        if parts.len() == MAX_NESTING {
            warn!(key = base, "query key nested deeper than {MAX_NESTING} levels, dropping it");
            return None;
        }
        let name = &group[..close];
        parts.push(if name.is_empty() { KeyPart::Append } else { KeyPart::Named(name.to_string()) });
        rest = &group[close + 1..];
    }

    if parts.is_empty() {
        return Some((key.to_string(), parts));
    }

    Some((base.to_string(), parts))
}

fn assign(slot: &mut Value, parts: &[KeyPart], value: String) {
    let Some((head, rest)) = parts.split_first() else {
        *slot = Value::String(value);
        return;
    };

    if !slot.is_array() && !slot.is_object() {
        *slot = match head {
            KeyPart::Append => Value::Array(Vec::new()),
            KeyPart::Named(_) => Value::Object(Map::new()),
        };
    }

    if matches!(head, KeyPart::Named(_)) && slot.is_array() {
        if let Value::Array(items) = slot.take() {
            *slot = Value::Object(items.into_iter().enumerate().map(|(i, item)| (i.to_string(), item)).collect());
        }
    }

    match slot {
        Value::Array(items) => {
            items.push(Value::Null);
            let last = items.len() - 1;
            assign(&mut items[last], rest, value);
        }
        Value::Object(map) => {
            let key = match head {
                KeyPart::Named(name) => name.clone(),
                KeyPart::Append => next_index(map).to_string(),
            };
            assign(map.entry(key).or_insert(Value::Null), rest, value);
        }
        _ => {}
    }
}

fn next_index(map: &Map<String, Value>) -> usize {
    map.keys().filter_map(|key| key.parse::<usize>().ok()).max().map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_pairs() {
        let query = Query::parse("a=1&b=hello+world&c=%2Fpath%3F&a=2&empty=");
        assert_eq!(query.into_value(), json!({ "a": "2", "b": "hello world", "c": "/path?", "empty": "" }));
    }

    #[test]
    fn empty_query() {
        assert!(Query::parse("").is_empty());
        assert!(Query::default().is_empty());
    }

    #[test]
    fn bracket_append() {
        let query = Query::parse("tags[]=rust&tags[]=web");
        assert_eq!(query.get("tags"), Some(&json!(["rust", "web"])));
        assert_eq!(query.get_str("tags.1"), Some("web"));
        assert_eq!(query.get("tags.2"), None);
    }

    #[test]
    fn bracket_nesting() {
        let query = Query::parse("user[name]=ann&user[address][city]=Oslo&user%5Broles%5D%5B%5D=admin");
        assert_eq!(
            query.into_value(),
            json!({ "user": { "name": "ann", "address": { "city": "Oslo" }, "roles": ["admin"] } })
        );
    }

    #[test]
    fn nesting_depth_is_capped() {
        let deepest = format!("a{}=1", "[]".repeat(MAX_NESTING));
        let query = Query::parse(&deepest);
        let mut value = query.get("a").unwrap();
        for _ in 1..MAX_NESTING {
            value = &value[0];
        }
        assert_eq!(value, &json!(["1"]));

        let too_deep = format!("a{}=1&b=2", "[]".repeat(MAX_NESTING + 1));
        assert_eq!(Query::parse(&too_deep).into_value(), json!({ "b": "2" }));

        let huge = format!("a{}=1", "[x]".repeat(20_000));
        assert!(Query::parse(&huge).is_empty());
    }

    #[test]
    fn mixed_append_and_named() {
        let query = Query::parse("a[]=1&a[x]=2&a[]=3");
        assert_eq!(query.get("a"), Some(&json!({ "0": "1", "x": "2", "1": "3" })));
    }

    #[test]
    fn scalar_overwritten_by_nested() {
        let query = Query::parse("a=1&a[b]=2");
        assert_eq!(query.get_str("a.b"), Some("2"));
    }

    #[test]
    fn array_of_objects() {
        let query = Query::parse("items[][id]=1&items[][id]=2");
        assert_eq!(query.get("items"), Some(&json!([{ "id": "1" }, { "id": "2" }])));
    }

    #[test]
    fn malformed_keys() {
        let query = Query::parse("[x]=1&a[b=2&c[d]e=3");
        assert_eq!(query.get("[x]"), None);
        assert_eq!(query.get_str("a[b"), Some("2"));
        assert_eq!(query.get_str("c.d"), Some("3"));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn dot_path_misses() {
        let query = Query::parse("a=1");
        assert_eq!(query.get("a.b"), None);
        assert_eq!(query.get("missing"), None);
        assert_eq!(query.get_str("a"), Some("1"));
    }
}
