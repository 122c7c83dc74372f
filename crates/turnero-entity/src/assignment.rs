//! Operator window assignments and window-service bindings.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An operator assigned to a window at a branch.
///
/// At most one active assignment per operator per branch; enforced by
/// a partial unique index in the schema.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OperatorWindowAssignment {
    /// Unique assignment identifier.
    pub id: Uuid,
    /// The operator.
    pub operator_id: Uuid,
    /// The branch.
    pub branch_id: Uuid,
    /// The (branch, window) pair the operator sits at.
    pub branch_window_id: Uuid,
    /// Whether the assignment is currently active.
    pub is_active: bool,
}

/// Declares that a window at a branch may serve a service.
///
/// A claimed ticket records the binding id, which is how display
/// queries resolve the window a customer must walk to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WindowServiceBinding {
    /// Unique binding identifier.
    pub id: Uuid,
    /// The (branch, window) pair.
    pub branch_window_id: Uuid,
    /// The service the window may serve.
    pub service_id: Uuid,
    /// Whether the binding is currently active.
    pub is_active: bool,
}
