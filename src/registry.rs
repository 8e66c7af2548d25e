//! Append-only category registry.
//!
//! Category indices are the canonical dimension of every per-category vector
//! in the system. They are assigned on first insertion and never reused.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{BubbleError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub index: usize,
}

#[derive(Debug, Default, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
    by_name: HashMap<String, usize>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with `names` in order.
    pub fn with_categories<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.add_category(name)?;
        }
        Ok(registry)
    }

    /// Append a category and return its index.
    pub fn add_category(&mut self, name: impl Into<String>) -> Result<usize> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BubbleError::InvalidInput("category name is blank".into()));
        }
        if self.by_name.contains_key(&name) {
            return Err(BubbleError::DuplicateCategory(name));
        }

        let index = self.categories.len();
        debug!(category = %name, index, "category registered");
        self.by_name.insert(name.clone(), index);
        self.categories.push(Category { name, index });
        Ok(index)
    }

    pub fn count(&self) -> usize {
        self.categories.len()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.categories.get(index).map(|c| c.name.as_str())
    }

    /// Categories in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Fails with `ShapeMismatch` unless `len` equals the current count.
    pub fn check_shape(&self, field: &'static str, len: usize) -> Result<()> {
        if len != self.count() {
            return Err(BubbleError::ShapeMismatch {
                field,
                expected: self.count(),
                actual: len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_insertion_order() {
        let mut registry = CategoryRegistry::new();
        assert_eq!(registry.add_category("Politics").unwrap(), 0);
        assert_eq!(registry.add_category("Technology").unwrap(), 1);
        assert_eq!(registry.add_category("Health").unwrap(), 2);
        assert_eq!(registry.count(), 3);
        assert_eq!(registry.index_of("Technology"), Some(1));
        assert_eq!(registry.name_of(2), Some("Health"));
    }

    #[test]
    fn duplicate_is_rejected_without_side_effects() {
        let mut registry = CategoryRegistry::with_categories(["Politics", "Health"]).unwrap();
        let err = registry.add_category("Politics").unwrap_err();
        assert!(matches!(err, BubbleError::DuplicateCategory(ref n) if n == "Politics"));
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.add_category("Science").unwrap(), 2);
    }

    #[test]
    fn blank_name_is_invalid() {
        let mut registry = CategoryRegistry::new();
        assert!(matches!(
            registry.add_category("  "),
            Err(BubbleError::InvalidInput(_))
        ));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn shape_check_reports_lengths() {
        let registry = CategoryRegistry::with_categories(["a", "b", "c"]).unwrap();
        assert!(registry.check_shape("bias_vector", 3).is_ok());
        match registry.check_shape("bias_vector", 2) {
            Err(BubbleError::ShapeMismatch {
                field,
                expected,
                actual,
            }) => {
                assert_eq!(field, "bias_vector");
                assert_eq!((expected, actual), (3, 2));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
