//! Registry configuration.

/// Capacity hints for a new [`Registry`](crate::Registry).
///
/// The registry grows without bound; these only size the initial columns.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RegistryConfig {
    /// Expected number of types, builtins included.
    pub type_capacity: usize,
    /// Expected number of members per member kind.
    pub member_capacity: usize,
}

impl RegistryConfig {
    pub const fn new() -> Self {
        RegistryConfig {
            type_capacity: 256,
            member_capacity: 64,
        }
    }

    #[must_use]
    pub const fn with_type_capacity(mut self, capacity: usize) -> Self {
        self.type_capacity = capacity;
        self
    }

    #[must_use]
    pub const fn with_member_capacity(mut self, capacity: usize) -> Self {
        self.member_capacity = capacity;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new()
    }
}
