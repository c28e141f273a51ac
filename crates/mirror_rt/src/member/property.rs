use std::fmt;
use std::sync::Arc;

use mirror_ir::TypeId;

use super::{push_metadata, AccessLevel, Member};
use crate::metadata::{MetadataKey, MetadataList};
use crate::Variant;

/// Reads the property from the instance (empty for global properties).
pub type GetterFn = Arc<dyn Fn(&Variant) -> Variant + Send + Sync>;
/// Writes an already type-checked value; returns whether it was stored.
pub type SetterFn = Arc<dyn Fn(&mut Variant, Variant) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct Property {
    name: String,
    declaring_type: TypeId,
    ty: TypeId,
    access: AccessLevel,
    metadata: MetadataList,
    getter: GetterFn,
    setter: Option<SetterFn>,
}

impl Property {
    /// A read-only property; add a setter with [`Property::setter`].
    pub fn new<G>(name: impl Into<String>, ty: TypeId, getter: G) -> Self
    where
        G: Fn(&Variant) -> Variant + Send + Sync + 'static,
    {
        Property {
            name: name.into(),
            declaring_type: TypeId::INVALID,
            ty,
            access: AccessLevel::Public,
            metadata: MetadataList::new(),
            getter: Arc::new(getter),
            setter: None,
        }
    }

    #[must_use]
    pub fn setter<S>(mut self, setter: S) -> Self
    where
        S: Fn(&mut Variant, Variant) -> bool + Send + Sync + 'static,
    {
        self.setter = Some(Arc::new(setter));
        self
    }

    #[must_use]
    pub fn access(mut self, access: AccessLevel) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<MetadataKey>, value: impl Into<Variant>) -> Self {
        push_metadata(&mut self.metadata, key, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> TypeId {
        self.declaring_type
    }

    /// Type of the stored value.
    pub fn get_type(&self) -> TypeId {
        self.ty
    }

    pub fn access_level(&self) -> AccessLevel {
        self.access
    }

    pub fn is_readonly(&self) -> bool {
        self.setter.is_none()
    }

    pub fn metadata(&self, key: impl Into<MetadataKey>) -> Variant {
        self.metadata.get(&key.into()).cloned().unwrap_or_default()
    }

    /// Read from `instance` without checking its type; see
    /// [`Registry::get_property_value`](crate::Registry::get_property_value)
    /// for the checked form.
    pub fn get_value(&self, instance: &Variant) -> Variant {
        (self.getter)(instance)
    }

    /// Store `value` into `instance`.
    ///
    /// Fails for read-only properties and for values whose type is not
    /// exactly the property type. The instance type is left to the getter
    /// and setter closures.
    pub fn set_value(&self, instance: &mut Variant, value: Variant) -> bool {
        match &self.setter {
            Some(setter) if value.get_type() == self.ty => setter(instance, value),
            _ => false,
        }
    }
}

impl Member for Property {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_declaring_type(&mut self, ty: TypeId) {
        self.declaring_type = ty;
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("ty", &self.ty)
            .field("readonly", &self.is_readonly())
            .finish_non_exhaustive()
    }
}
