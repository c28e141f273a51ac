use std::fmt;
use std::sync::Arc;

use mirror_ir::TypeId;

use super::{bind_arguments, push_metadata, AccessLevel, Member, ParameterInfo};
use crate::error::ReflectResult;
use crate::metadata::{MetadataKey, MetadataList};
use crate::Variant;

/// Method body: receives the instance (empty for static and global
/// methods) and the bound arguments.
pub type MethodFn = Arc<dyn Fn(&mut Variant, &[Variant]) -> Variant + Send + Sync>;

#[derive(Clone)]
pub struct Method {
    name: String,
    declaring_type: TypeId,
    return_type: TypeId,
    params: Vec<ParameterInfo>,
    access: AccessLevel,
    is_static: bool,
    metadata: MetadataList,
    invoker: MethodFn,
}

impl Method {
    pub fn new<F>(name: impl Into<String>, return_type: TypeId, invoker: F) -> Self
    where
        F: Fn(&mut Variant, &[Variant]) -> Variant + Send + Sync + 'static,
    {
        Method {
            name: name.into(),
            declaring_type: TypeId::INVALID,
            return_type,
            params: Vec::new(),
            access: AccessLevel::Public,
            is_static: false,
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
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
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

    /// Class the method was registered on; invalid for global methods.
    pub fn declaring_type(&self) -> TypeId {
        self.declaring_type
    }

    pub fn return_type(&self) -> TypeId {
        self.return_type
    }

    pub fn parameter_infos(&self) -> &[ParameterInfo] {
        &self.params
    }

    pub fn access_level(&self) -> AccessLevel {
        self.access
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn metadata(&self, key: impl Into<MetadataKey>) -> Variant {
        self.metadata.get(&key.into()).cloned().unwrap_or_default()
    }

    /// Invoke on `instance`. Returns the empty variant on an argument
    /// mismatch.
    ///
    /// The instance type is not checked here; [`Registry::invoke`] rejects
    /// instances that are not of the declaring class.
    ///
    /// [`Registry::invoke`]: crate::Registry::invoke
    pub fn invoke(&self, instance: &mut Variant, args: &[Variant]) -> Variant {
        self.try_invoke(instance, args).unwrap_or_default()
    }

    /// Invoke without an instance.
    pub fn invoke_static(&self, args: &[Variant]) -> Variant {
        self.invoke(&mut Variant::new(), args)
    }

    pub fn try_invoke(&self, instance: &mut Variant, args: &[Variant]) -> ReflectResult<Variant> {
        let args = bind_arguments(&self.name, &self.params, args)?;
        Ok((self.invoker)(instance, &args))
    }
}

impl Member for Method {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_declaring_type(&mut self, ty: TypeId) {
        self.declaring_type = ty;
    }

    fn parameters(&self) -> &[ParameterInfo] {
        &self.params
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("return_type", &self.return_type)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
