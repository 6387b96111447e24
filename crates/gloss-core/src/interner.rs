//! String interning for symbol and field names.
//!
//! The table compiler hands out dense `Name` handles in first-seen order,
//! which makes them usable directly as table indices.

use std::collections::HashMap;

/// Handle to an interned string. Ordered by insertion, not lexicographically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Name(u32);

impl Name {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Deduplicating string store.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    map: HashMap<String, Name>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing handle when `s` was seen before.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.map.get(s) {
            return name;
        }
        self.push(s.to_owned())
    }

    pub fn intern_owned(&mut self, s: String) -> Name {
        if let Some(&name) = self.map.get(&s) {
            return name;
        }
        self.push(s)
    }

    fn push(&mut self, s: String) -> Name {
        let name = Name(self.strings.len() as u32);
        self.strings.push(s.clone());
        self.map.insert(s, name);
        name
    }

    /// Looks up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).copied()
    }

    /// # Panics
    /// Panics if the handle came from another interner.
    #[inline]
    pub fn resolve(&self, name: Name) -> &str {
        &self.strings[name.index()]
    }

    #[inline]
    pub fn try_resolve(&self, name: Name) -> Option<&str> {
        self.strings.get(name.index()).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (Name(i as u32), s.as_str()))
    }

    /// Strings in handle order.
    pub fn into_strings(self) -> Vec<String> {
        self.strings
    }
}
