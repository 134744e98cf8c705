//! The compiled route table and its records.
//!
//! A [`RouteTable`] is the artifact produced by the [`RouteCompiler`](crate::RouteCompiler) and
//! consumed on every request. It is immutable once built; share it behind an `Arc` when more
//! than one thread dispatches against it.
//!
//! The persisted shape is:
//!
//! ```json
//! { "assets": "/assets", "routes": [ { "path": "/posts/$", "method": "GET", "entry": "post" } ] }
//! ```

use crate::error::CompileError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Path of the synthetic record appended by the compiler.
pub const NOT_FOUND_PATH: &str = "/404";

/// The marker segment that captures exactly one request segment.
pub const WILDCARD: &str = "$";

/// One routable entry of a `.router` file.
///
/// The known keys get typed fields; any other key found in a route block is kept verbatim in
/// [`extras`](RouteRecord::extras).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_path")]
    path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_method")]
    method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entry: Option<String>,
    #[serde(flatten)]
    extras: BTreeMap<String, String>,
}

impl RouteRecord {
    pub(crate) fn not_found(entry: impl Into<String>) -> Self {
        Self {
            path: Some(NOT_FOUND_PATH.to_string()),
            method: Some("GET".to_string()),
            entry: Some(entry.into()),
            ..Self::default()
        }
    }

    /// Sets a field by its DSL key, the last value for a key wins.
    ///
    /// `method` is uppercased, and a blank `method` means "any method". A blank `path` is
    /// dropped, so the record never matches.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match key {
            "path" => self.path = normalize_path(value),
            "method" => self.method = normalize_method(value),
            "name" => self.name = Some(value),
            "entry" => self.entry = Some(value),
            _ => {
                self.extras.insert(key.to_string(), value);
            }
        }
    }

    /// Chained form of [`set`](RouteRecord::set).
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    /// Looks up a key that is not one of `path`, `method`, `name` or `entry`.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    pub fn extras(&self) -> &BTreeMap<String, String> {
        &self.extras
    }

    /// Returns true if the record accepts `method`, compared case-insensitively.
    #[inline]
    pub fn allows_method(&self, method: &str) -> bool {
        self.method.as_deref().is_none_or(|own| own.eq_ignore_ascii_case(method))
    }
}

fn normalize_path(path: String) -> Option<String> {
    (!path.trim().is_empty()).then_some(path)
}

fn normalize_method(method: String) -> Option<String> {
    let method = method.trim().to_ascii_uppercase();
    (!method.is_empty()).then_some(method)
}

fn deserialize_path<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(normalize_path))
}

fn deserialize_method<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(normalize_method))
}

/// The compiled, ordered route list plus the optional assets prefix.
///
/// Route order is match precedence. The last record is the terminal fallback used for both
/// 404 and 405 outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    assets: Option<String>,
    #[serde(default)]
    routes: Vec<RouteRecord>,
}

impl RouteTable {
    /// Creates a table from parts as-is.
    ///
    /// No fallback record is appended here; the compiler does that.
    pub fn new(assets: Option<String>, routes: Vec<RouteRecord>) -> Self {
        Self { assets, routes }
    }

    /// The normalized assets prefix, e.g. `/assets`.
    pub fn assets_path(&self) -> Option<&str> {
        self.assets.as_deref()
    }

    pub fn routes(&self) -> &[RouteRecord] {
        &self.routes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The terminal record, always the last one regardless of its path.
    pub fn fallback(&self) -> Option<&RouteRecord> {
        self.routes.last()
    }

    /// The first record declared with `name`.
    pub fn find_named(&self, name: &str) -> Option<&RouteRecord> {
        self.routes.iter().find(|record| record.name() == Some(name))
    }

    /// Reads a table previously written by [`save`](RouteTable::save).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CompileError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CompileError::io(path, e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Persists the table as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CompileError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| CompileError::persist(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|e| CompileError::persist(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_is_normalized() {
        let record = RouteRecord::default().with("method", "post");
        assert_eq!(record.method(), Some("POST"));
        assert!(record.allows_method("Post"));
        assert!(!record.allows_method("GET"));

        let record = RouteRecord::default().with("method", "");
        assert_eq!(record.method(), None);
        assert!(record.allows_method("DELETE"));
    }

    #[test]
    fn blank_path_is_absent() {
        assert_eq!(RouteRecord::default().with("path", "").path(), None);
        assert_eq!(RouteRecord::default().with("path", "  ").path(), None);
        assert_eq!(RouteRecord::default().with("path", "/").path(), Some("/"));
    }

    #[test]
    fn loaded_records_are_normalized() {
        let table: RouteTable = serde_json::from_value(serde_json::json!({
            "assets": null,
            "routes": [
                { "path": "/f", "method": "post", "entry": "a" },
                { "path": "", "method": " ", "entry": "b" },
                { "path": "/404", "method": "GET", "entry": "404" }
            ]
        }))
        .unwrap();

        assert_eq!(table.routes()[0].method(), Some("POST"));
        assert_eq!(table.routes()[1].path(), None);
        assert_eq!(table.routes()[1].method(), None);
        assert_eq!(table.routes()[2].method(), Some("GET"));
    }

    #[test]
    fn extra_keys_are_kept() {
        let record = RouteRecord::default().with("path", "/a").with("layout", "wide").with("layout", "narrow");
        assert_eq!(record.path(), Some("/a"));
        assert_eq!(record.extra("layout"), Some("narrow"));
        assert_eq!(record.extras().len(), 1);
    }

    #[test]
    fn json_shape() {
        let table = RouteTable::new(
            Some("/assets".into()),
            vec![RouteRecord::default().with("path", "/posts/$").with("entry", "post").with("layout", "wide")],
        );

        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "assets": "/assets",
                "routes": [{ "path": "/posts/$", "entry": "post", "layout": "wide" }]
            })
        );

        let back: RouteTable = serde_json::from_value(value).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn fallback_is_last_record() {
        let table = RouteTable::new(
            None,
            vec![RouteRecord::not_found("user-404"), RouteRecord::default().with("path", "/x"), RouteRecord::not_found("404")],
        );
        assert_eq!(table.fallback().and_then(RouteRecord::entry), Some("404"));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("routes.json");
        let table = RouteTable::new(None, vec![RouteRecord::default().with("path", "/"), RouteRecord::not_found("404")]);

        table.save(&file).unwrap();
        assert_eq!(RouteTable::load(&file).unwrap(), table);
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RouteTable::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CompileError::Io { .. }));
    }
}
