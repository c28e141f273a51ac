use std::fmt;
use std::sync::Arc;

use mirror_ir::TypeId;

use super::{bind_arguments, push_metadata, AccessLevel, Member, ParameterInfo};
use crate::error::ReflectResult;
use crate::metadata::{MetadataKey, MetadataList};
use crate::Variant;

pub type ConstructorFn = Arc<dyn Fn(&[Variant]) -> Variant + Send + Sync>;
/// Releases whatever the object owns outside of its own storage.
pub type DestructorFn = Arc<dyn Fn(&mut Variant) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct Constructor {
    declaring_type: TypeId,
    params: Vec<ParameterInfo>,
    access: AccessLevel,
    metadata: MetadataList,
    invoker: ConstructorFn,
}

impl Constructor {
    pub fn new<F>(invoker: F) -> Self
    where
        F: Fn(&[Variant]) -> Variant + Send + Sync + 'static,
    {
        Constructor {
            declaring_type: TypeId::INVALID,
            params: Vec::new(),
            access: AccessLevel::Public,
            metadata: MetadataList::new(),
            invoker: Arc::new(invoker),
        }
    }

    #[must_use]
    pub fn param(mut self, param: ParameterInfo) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn params(mut self, params: impl IntoIterator<Item = ParameterInfo>) -> Self {
        self.params.extend(params);
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

    pub fn declaring_type(&self) -> TypeId {
        self.declaring_type
    }

    pub fn parameter_infos(&self) -> &[ParameterInfo] {
        &self.params
    }

    pub fn access_level(&self) -> AccessLevel {
        self.access
    }

    pub fn metadata(&self, key: impl Into<MetadataKey>) -> Variant {
        self.metadata.get(&key.into()).cloned().unwrap_or_default()
    }

    /// Build a new instance; empty on an argument mismatch.
    pub fn invoke(&self, args: &[Variant]) -> Variant {
        self.try_invoke(args).unwrap_or_default()
    }

    pub fn try_invoke(&self, args: &[Variant]) -> ReflectResult<Variant> {
        let args = bind_arguments("constructor", &self.params, args)?;
        Ok((self.invoker)(&args))
    }
}

impl Member for Constructor {
    fn name(&self) -> &str {
        ""
    }

    fn set_declaring_type(&mut self, ty: TypeId) {
        self.declaring_type = ty;
    }

    fn parameters(&self) -> &[ParameterInfo] {
        &self.params
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("declaring_type", &self.declaring_type)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct Destructor {
    declaring_type: TypeId,
    invoker: DestructorFn,
}

impl Destructor {
    pub fn new<F>(invoker: F) -> Self
    where
        F: Fn(&mut Variant) -> bool + Send + Sync + 'static,
    {
        Destructor {
            declaring_type: TypeId::INVALID,
            invoker: Arc::new(invoker),
        }
    }

    /// A destructor for values that own nothing beyond their storage;
    /// dropping the payload is all there is to do.
    pub fn dropping() -> Self {
        Self::new(|_| true)
    }

    pub fn declaring_type(&self) -> TypeId {
        self.declaring_type
    }

    /// Destroy the object held by `object` and leave it empty.
    ///
    /// Fails without touching `object` when it does not hold an instance of
    /// the declaring type.
    pub fn invoke(&self, object: &mut Variant) -> bool {
        if object.get_type() != self.declaring_type {
            return false;
        }
        let destroyed = (self.invoker)(object);
        if destroyed {
            object.clear();
        }
        destroyed
    }
}

impl Member for Destructor {
    fn name(&self) -> &str {
        ""
    }

    fn set_declaring_type(&mut self, ty: TypeId) {
        self.declaring_type = ty;
    }
}

impl fmt::Debug for Destructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destructor")
            .field("declaring_type", &self.declaring_type)
            .finish_non_exhaustive()
    }
}
