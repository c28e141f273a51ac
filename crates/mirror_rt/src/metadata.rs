//! Key/value metadata attached to types and members.
//!
//! Lists are kept sorted by key; the first value registered for a key wins.

use crate::Variant;

/// Metadata key: an integer tag or a name.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum MetadataKey {
    Int(i64),
    Name(String),
}

impl From<i64> for MetadataKey {
    fn from(key: i64) -> Self {
        MetadataKey::Int(key)
    }
}

impl From<i32> for MetadataKey {
    fn from(key: i32) -> Self {
        MetadataKey::Int(i64::from(key))
    }
}

impl From<&str> for MetadataKey {
    fn from(key: &str) -> Self {
        MetadataKey::Name(key.to_owned())
    }
}

impl From<String> for MetadataKey {
    fn from(key: String) -> Self {
        MetadataKey::Name(key)
    }
}

#[derive(Clone, Debug)]
pub struct Metadata {
    pub key: MetadataKey,
    pub value: Variant,
}

impl Metadata {
    pub fn new(key: impl Into<MetadataKey>, value: impl Into<Variant>) -> Self {
        Metadata {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MetadataList {
    items: Vec<Metadata>,
}

impl MetadataList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item` unless its key is already present.
    ///
    /// Returns `false` when the existing value was kept.
    pub fn insert(&mut self, item: Metadata) -> bool {
        match self.items.binary_search_by(|existing| existing.key.cmp(&item.key)) {
            Ok(_) => false,
            Err(pos) => {
                self.items.insert(pos, item);
                true
            }
        }
    }

    pub fn get(&self, key: &MetadataKey) -> Option<&Variant> {
        self.items
            .binary_search_by(|existing| existing.key.cmp(key))
            .ok()
            .map(|pos| &self.items[pos].value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metadata> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Metadata> for MetadataList {
    fn from_iter<I: IntoIterator<Item = Metadata>>(iter: I) -> Self {
        let mut list = MetadataList::new();
        for item in iter {
            list.insert(item);
        }
        list
    }
}

impl Extend<Metadata> for MetadataList {
    fn extend<I: IntoIterator<Item = Metadata>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}
