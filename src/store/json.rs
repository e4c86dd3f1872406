//! JSON-backed record store.

use super::RecordStore;
use crate::error::Result;
use serde_json::{Map, Value};
use std::path::Path;

/// Collects records into a JSON object.
///
/// Non-finite numbers have no JSON representation and are stored as `null`.
#[derive(Debug, Clone, Default)]
pub struct JsonStore {
    root: Map<String, Value>,
}

impl JsonStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// The collected object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn to_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    /// Writes the collected object to `path`, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = self.to_string_pretty()?;
        std::fs::write(path.as_ref(), text)?;
        tracing::debug!(path = %path.as_ref().display(), keys = self.root.len(), "wrote record");
        Ok(())
    }
}

fn number(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

fn array(values: &[f64]) -> Value {
    Value::Array(values.iter().copied().map(number).collect())
}

impl RecordStore for JsonStore {
    fn put_value(&mut self, key: &str, value: f64) -> Result<()> {
        self.root.insert(key.to_owned(), number(value));
        Ok(())
    }

    fn put_vector(&mut self, key: &str, values: &[f64]) -> Result<()> {
        self.root.insert(key.to_owned(), array(values));
        Ok(())
    }

    fn put_matrix(&mut self, key: &str, rows: &[Vec<f64>]) -> Result<()> {
        let rows = rows.iter().map(|r| array(r)).collect();
        self.root.insert(key.to_owned(), Value::Array(rows));
        Ok(())
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.root
            .insert(key.to_owned(), Value::String(value.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_store_layout() {
        let mut store = JsonStore::new();
        store.put_value("/f_x_best", 0.25).unwrap();
        store.put_vector("/x_best", &[0.5, -0.5]).unwrap();
        store
            .put_matrix("/param_hist_accepted", &[vec![1.0, 2.0]])
            .unwrap();
        store.put_string("/param_name_1", "alpha").unwrap();

        assert_eq!(
            store.to_value(),
            json!({
                "/f_x_best": 0.25,
                "/x_best": [0.5, -0.5],
                "/param_hist_accepted": [[1.0, 2.0]],
                "/param_name_1": "alpha",
            })
        );
    }

    #[test]
    fn test_json_store_non_finite_is_null() {
        let mut store = JsonStore::new();
        store.put_value("/f", f64::MAX).unwrap();
        store.put_value("/g", f64::INFINITY).unwrap();
        assert!(store.get("/f").is_some_and(Value::is_number));
        assert_eq!(store.get("/g"), Some(&Value::Null));
    }

    #[test]
    fn test_json_store_writes_file() {
        let mut store = JsonStore::new();
        store.put_value("/f", 1.0).unwrap();
        let path = std::env::temp_dir().join(format!("u_anneal_json_{}.json", std::process::id()));
        store.write_to(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!({ "/f": 1.0 }));
    }
}
