//! Error types for object model operations

/// Result type for object model operations
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Object model error types
///
/// Every internal method of an object (ordinary or proxy) reports failure
/// through this type, so errors raised inside a proxy trap surface unchanged
/// to whoever triggered the structural operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectError {
    /// Mutation attempted through an immutable view
    #[error("Read-only violation: {0}")]
    ReadOnlyViolation(String),

    /// Strict operation rejected by the object (frozen write, redefinition
    /// of a non-configurable property, prototype reassignment, ...)
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Trap intentionally unsupported by a handler
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Proxy trap result contradicts its target
    #[error("Proxy invariant violation: {0}")]
    InvariantViolation(String),

    /// Call on a non-callable object
    #[error("Not callable: {0}")]
    NotCallable(String),

    /// Malformed property descriptor
    #[error("Invalid property descriptor: {0}")]
    InvalidDescriptor(String),
}

impl ObjectError {
    /// Short, stable name of the error kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            ObjectError::ReadOnlyViolation(_) => "ReadOnlyViolation",
            ObjectError::ProtocolViolation(_) => "ProtocolViolation",
            ObjectError::NotImplemented(_) => "NotImplemented",
            ObjectError::InvariantViolation(_) => "InvariantViolation",
            ObjectError::NotCallable(_) => "NotCallable",
            ObjectError::InvalidDescriptor(_) => "InvalidDescriptor",
        }
    }
}
