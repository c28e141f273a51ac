use mirror_ir::TypeId;

use super::{push_metadata, Member};
use crate::metadata::{MetadataKey, MetadataList};
use crate::Variant;

/// Name/value table of an enumeration type.
///
/// Each entry also carries its value in the underlying integer type, which
/// is what the enum converts to and from arithmetic values through.
/// Values are compared with the enum type's own equality, so the Rust type
/// behind them should implement [`Reflect::reflect_eq`](crate::Reflect).
#[derive(Clone, Debug)]
pub struct Enumeration {
    declaring_type: TypeId,
    underlying: TypeId,
    entries: Vec<Entry>,
    metadata: MetadataList,
}

#[derive(Clone, Debug)]
struct Entry {
    name: String,
    value: Variant,
    underlying: Variant,
}

impl Enumeration {
    pub fn new(underlying: TypeId) -> Self {
        Enumeration {
            declaring_type: TypeId::INVALID,
            underlying,
            entries: Vec::new(),
            metadata: MetadataList::new(),
        }
    }

    /// Add a named value that is its own underlying value, as for enums
    /// stored as plain integers. A repeated name keeps its first value.
    #[must_use]
    pub fn value(self, name: impl Into<String>, value: impl Into<Variant>) -> Self {
        let value = value.into();
        self.entry(name, value.clone(), value)
    }

    /// Add a named value together with its underlying integer, converted to
    /// the underlying type when it is a builtin. A repeated name keeps its
    /// first value.
    #[must_use]
    pub fn entry(
        mut self,
        name: impl Into<String>,
        value: impl Into<Variant>,
        underlying: impl Into<Variant>,
    ) -> Self {
        let name = name.into();
        if self.entries.iter().any(|entry| entry.name == name) {
            return self;
        }
        let underlying = underlying.into();
        let underlying = underlying
            .convert_builtin(self.underlying)
            .unwrap_or(underlying);
        self.entries.push(Entry {
            name,
            value: value.into(),
            underlying,
        });
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<MetadataKey>, value: impl Into<Variant>) -> Self {
        push_metadata(&mut self.metadata, key, value);
        self
    }

    pub fn declaring_type(&self) -> TypeId {
        self.declaring_type
    }

    pub fn underlying_type(&self) -> TypeId {
        self.underlying
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Variant> {
        self.entries.iter().map(|entry| &entry.value)
    }

    pub fn metadata(&self, key: impl Into<MetadataKey>) -> Variant {
        self.metadata.get(&key.into()).cloned().unwrap_or_default()
    }

    pub fn name_to_value(&self, name: &str) -> Option<Variant> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.clone())
    }

    pub fn value_to_name(&self, value: &Variant) -> Option<&str> {
        self.find_value(value).map(|entry| entry.name.as_str())
    }

    /// Underlying integer of `value`.
    pub fn value_to_underlying(&self, value: &Variant) -> Option<Variant> {
        self.find_value(value).map(|entry| entry.underlying.clone())
    }

    /// Enum value whose underlying integer equals `number`, compared
    /// numerically across integer widths.
    pub fn underlying_to_value(&self, number: &Variant) -> Option<Variant> {
        self.entries
            .iter()
            .find(|entry| entry.underlying.equals_direct(number) == Some(true))
            .map(|entry| entry.value.clone())
    }

    fn find_value(&self, value: &Variant) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|entry| entry.value.equals_direct(value) == Some(true))
    }
}

impl Member for Enumeration {
    fn name(&self) -> &str {
        ""
    }

    fn set_declaring_type(&mut self, ty: TypeId) {
        self.declaring_type = ty;
    }
}
