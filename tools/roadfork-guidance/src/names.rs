//! Street name interning and the announcement test.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::{NameId, EMPTY_NAME};

/// Interned street names; a `NameId` is an index into the table.
#[derive(Debug, Default, Clone)]
pub struct NameTable {
    names: Vec<String>,
    by_name: FxHashMap<String, NameId>,
}

impl NameTable {
    pub fn intern(&mut self, name: &str) -> NameId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = self.names.len() as NameId;
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, id: NameId) -> Option<&str> {
        if id == EMPTY_NAME {
            return None;
        }
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Lowercase street-name designators ("street", "st", "road", ...) that do
/// not distinguish two names on their own.
#[derive(Debug, Default, Clone)]
pub struct SuffixTable {
    suffixes: FxHashSet<String>,
}

impl SuffixTable {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_suffix(&self, word: &str) -> bool {
        self.suffixes.contains(&word.to_lowercase())
    }
}

/// Whether a driver would perceive a street-name change between two roads.
/// Names agree when they are identical after lowercasing and dropping one
/// trailing suffix-table word from each ("Main Street" vs "Main St").
pub fn requires_name_announced(
    lhs: NameId,
    rhs: NameId,
    names: &NameTable,
    suffixes: &SuffixTable,
) -> bool {
    if lhs == rhs {
        return false;
    }
    let (Some(lhs_name), Some(rhs_name)) = (names.get(lhs), names.get(rhs)) else {
        return true;
    };
    canonical(lhs_name, suffixes) != canonical(rhs_name, suffixes)
}

fn canonical(name: &str, suffixes: &SuffixTable) -> Vec<String> {
    let mut words: Vec<String> = name
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if words.len() > 1 && suffixes.is_suffix(words[words.len() - 1].as_str()) {
        words.pop();
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffixes() -> SuffixTable {
        SuffixTable::new(["street", "st", "road", "rd", "avenue", "ave"])
    }

    #[test]
    fn interning_deduplicates() {
        let mut table = NameTable::default();
        let a = table.intern("Main Street");
        let b = table.intern("Main Street");
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(a), Some("Main Street"));
        assert_eq!(table.get(EMPTY_NAME), None);
    }

    #[test]
    fn same_id_is_never_announced() {
        let mut table = NameTable::default();
        let id = table.intern("Ringbahn");
        assert!(!requires_name_announced(id, id, &table, &suffixes()));
    }

    #[test]
    fn suffix_variants_are_not_announced() {
        let mut table = NameTable::default();
        let long = table.intern("Main Street");
        let short = table.intern("Main St");
        assert!(!requires_name_announced(long, short, &table, &suffixes()));
    }

    #[test]
    fn different_base_names_are_announced() {
        let mut table = NameTable::default();
        let main = table.intern("Main Street");
        let first = table.intern("First Street");
        assert!(requires_name_announced(main, first, &table, &suffixes()));
    }

    #[test]
    fn missing_names_are_announced() {
        let mut table = NameTable::default();
        let main = table.intern("Main Street");
        assert!(requires_name_announced(main, EMPTY_NAME, &table, &suffixes()));
    }

    #[test]
    fn bare_suffix_is_a_name_of_its_own() {
        let mut table = NameTable::default();
        let broadway = table.intern("Broadway");
        let street = table.intern("Street");
        // a single-word name is never stripped down to nothing
        assert!(requires_name_announced(broadway, street, &table, &suffixes()));
    }
}
