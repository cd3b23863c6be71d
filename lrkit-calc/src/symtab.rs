//! # symtab
//!
//! Variable bindings of the calculator, built on [`indexmap::IndexMap`].
//!
//! Each variable name gets a stable index in order of first assignment.
//!
//! ## Example
//! ```rust
//! # use lrkit_calc::SymTab;
//! let mut st = SymTab::new();
//! let i = st.assign("x", 42);
//! assert_eq!(st.get(i).unwrap(), 42);
//! assert_eq!(st.lookup("x").unwrap(), 42);
//! assert!(st.lookup("y").is_err());
//! ```

use indexmap::IndexMap;
use smartstring::alias::String;
use thiserror::Error;

/// Errors that can occur when operating on a [`SymTab`].
#[derive(Debug, Error)]
pub enum SymTabError {
    /// Attempted to access an invalid index (out of bounds).
    #[error("invalid symbol index {index} (table length {len})")]
    InvalidIndex { index: usize, len: usize },

    /// A variable was read before it was assigned.
    #[error("undefined variable {name:?}")]
    Undefined { name: std::string::String },
}

/// Maps variable names to integer values.
#[derive(Debug, Default)]
pub struct SymTab {
    tab: IndexMap<String, i64>,
}

impl SymTab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of variables defined so far.
    pub fn len(&self) -> usize {
        self.tab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tab.is_empty()
    }

    /// Binds `name` to `value` and returns its index.
    pub fn assign(&mut self, name: impl AsRef<str>, value: i64) -> usize {
        let (index, _) = self.tab.insert_full(String::from(name.as_ref()), value);
        index
    }

    /// Returns the value bound to `name`.
    pub fn lookup(&self, name: &str) -> Result<i64, SymTabError> {
        self.tab
            .get(name)
            .copied()
            .ok_or_else(|| SymTabError::Undefined { name: name.into() })
    }

    /// Returns the value stored at the given index.
    pub fn get(&self, index: usize) -> Result<i64, SymTabError> {
        let (_, value) = self.tab.get_index(index).ok_or(SymTabError::InvalidIndex {
            index,
            len: self.tab.len(),
        })?;
        Ok(*value)
    }

    /// Variables in order of first assignment.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.tab.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_is_empty() {
        let st = SymTab::new();
        assert_eq!(st.len(), 0);
        assert!(st.is_empty());
    }

    #[test]
    fn assign_keeps_first_index() {
        let mut st = SymTab::new();
        assert_eq!(st.assign("a", 1), 0);
        assert_eq!(st.assign("b", 2), 1);
        assert_eq!(st.assign("a", 3), 0);
        assert_eq!(st.len(), 2);
        assert_eq!(st.lookup("a").unwrap(), 3);
        let vars: Vec<(&str, i64)> = st.iter().collect();
        assert_eq!(vars, [("a", 3), ("b", 2)]);
    }

    #[test]
    fn undefined_variable() {
        let st = SymTab::new();
        match st.lookup("nope") {
            Err(SymTabError::Undefined { name }) => assert_eq!(name, "nope"),
            other => panic!("expected Undefined, got {:?}", other),
        }
    }

    #[test]
    fn get_invalid_index_errors() {
        let mut st = SymTab::new();
        st.assign("only_one", 1);
        match st.get(5) {
            Err(SymTabError::InvalidIndex { index, len }) => {
                assert_eq!(index, 5);
                assert_eq!(len, 1);
            }
            other => panic!("expected InvalidIndex, got {:?}", other),
        }
    }
}
