//! Persistence boundary.
//!
//! The engine hands its record to a [`RecordStore`], a typed key-value sink.
//! What the store does with it (keep it in memory, write JSON, write HDF5
//! from a downstream crate) is up to the implementation.
//!
//! - [`MemoryStore`]: in-process map, readable back with typed getters.
//! - [`JsonStore`]: builds a JSON object and writes it to disk (`serde` feature).

#[cfg(feature = "serde")]
mod json;

#[cfg(feature = "serde")]
pub use json::JsonStore;

use crate::error::Result;
use std::collections::BTreeMap;

/// A typed key-value sink.
pub trait RecordStore {
    /// Stores a scalar.
    fn put_value(&mut self, key: &str, value: f64) -> Result<()>;

    /// Stores a vector.
    fn put_vector(&mut self, key: &str, values: &[f64]) -> Result<()>;

    /// Stores a list of vectors.
    fn put_matrix(&mut self, key: &str, rows: &[Vec<f64>]) -> Result<()>;

    /// Stores a string.
    fn put_string(&mut self, key: &str, value: &str) -> Result<()>;
}

/// A value held by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Value(f64),
    Vector(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
    Text(String),
}

/// In-memory [`RecordStore`]. Later writes to a key replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, Record>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        match self.records.get(key)? {
            Record::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn vector(&self, key: &str) -> Option<&[f64]> {
        match self.records.get(key)? {
            Record::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn matrix(&self, key: &str) -> Option<&[Vec<f64>]> {
        match self.records.get(key)? {
            Record::Matrix(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        match self.records.get(key)? {
            Record::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl RecordStore for MemoryStore {
    fn put_value(&mut self, key: &str, value: f64) -> Result<()> {
        self.records.insert(key.to_owned(), Record::Value(value));
        Ok(())
    }

    fn put_vector(&mut self, key: &str, values: &[f64]) -> Result<()> {
        self.records
            .insert(key.to_owned(), Record::Vector(values.to_vec()));
        Ok(())
    }

    fn put_matrix(&mut self, key: &str, rows: &[Vec<f64>]) -> Result<()> {
        self.records
            .insert(key.to_owned(), Record::Matrix(rows.to_vec()));
        Ok(())
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.records
            .insert(key.to_owned(), Record::Text(value.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_typed_gets() {
        let mut store = MemoryStore::new();
        store.put_value("/f", 1.5).unwrap();
        store.put_vector("/x", &[1.0, 2.0]).unwrap();
        store.put_matrix("/h", &[vec![1.0], vec![2.0]]).unwrap();
        store.put_string("/name", "alpha").unwrap();

        assert_eq!(store.len(), 4);
        assert_eq!(store.value("/f"), Some(1.5));
        assert_eq!(store.vector("/x"), Some(&[1.0, 2.0][..]));
        assert_eq!(store.matrix("/h").map(|m| m.len()), Some(2));
        assert_eq!(store.string("/name"), Some("alpha"));
    }

    #[test]
    fn test_memory_store_wrong_type_is_none() {
        let mut store = MemoryStore::new();
        store.put_value("/f", 1.0).unwrap();
        assert!(store.vector("/f").is_none());
        assert!(store.string("/missing").is_none());
    }

    #[test]
    fn test_memory_store_overwrite() {
        let mut store = MemoryStore::new();
        store.put_value("/f", 1.0).unwrap();
        store.put_string("/f", "now text").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.string("/f"), Some("now text"));
    }
}
