use std::collections::HashMap;
use std::slice::Iter;

/// Interns symbol names as dense indices, in insertion order.
#[derive(Default, Debug, Clone)]
pub struct Symtab {
    map: HashMap<String, usize>,
    vec: Vec<String>,
}

impl Symtab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sym: &str) -> usize {
        if let Some(&idx) = self.map.get(sym) {
            return idx;
        }
        let idx = self.vec.len();
        let owned = sym.to_owned();
        self.vec.push(owned.clone());
        self.map.insert(owned, idx);
        idx
    }

    pub fn iter(&self) -> Iter<'_, String> {
        self.vec.iter()
    }

    pub fn idx(&self, sym: &str) -> Option<usize> {
        self.map.get(sym).copied()
    }

    pub fn contains(&self, sym: &str) -> bool {
        self.map.contains_key(sym)
    }

    pub fn sym(&self, idx: usize) -> Option<&str> {
        self.vec.get(idx).map(|x| x.as_str())
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    /// Returns `base`, or `base_N` for the first `N` that is not taken.
    pub fn fresh(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_owned();
        }
        (1..)
            .map(|n| format!("{}_{}", base, n))
            .find(|name| !self.contains(name))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::Symtab;

    #[test]
    fn test_new_is_empty() {
        let st = Symtab::new();
        assert!(st.is_empty());
        assert_eq!(st.idx("anything"), None);
        assert_eq!(st.sym(0), None);
    }

    #[test]
    fn test_add_and_retrieve() {
        let mut st = Symtab::new();
        assert_eq!(st.add("foo"), 0);
        assert_eq!(st.add("bar"), 1);
        assert_eq!(st.idx("bar"), Some(1));
        assert_eq!(st.sym(0), Some("foo"));
        assert_eq!(st.len(), 2);
    }

    #[test]
    fn test_duplicate_add_returns_same_index() {
        let mut st = Symtab::new();
        let first = st.add("dup");
        let second = st.add("dup");
        assert_eq!(first, second);
        assert_eq!(st.sym(1), None);
    }

    #[test]
    fn test_insertion_order() {
        let mut st = Symtab::new();
        for name in ["c", "a", "b", "a"] {
            st.add(name);
        }
        let names: Vec<&str> = st.iter().map(String::as_str).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn test_fresh_names_avoid_collisions() {
        let mut st = Symtab::new();
        assert_eq!(st.fresh("__start"), "__start");
        st.add("__start");
        st.add("__start_1");
        assert_eq!(st.fresh("__start"), "__start_2");
    }
}
