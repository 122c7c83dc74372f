//! Request context carrying the authenticated operator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use turnero_auth::{Claims, OperatorRole};

/// Context for the current authenticated request.
///
/// Extracted from the verified token and passed into service methods
/// so that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorContext {
    /// The authenticated operator's ID.
    pub operator_id: Uuid,
    /// The operator's display name.
    pub name: String,
    /// The operator's role at the time the token was issued.
    pub role: OperatorRole,
}

impl OperatorContext {
    /// Creates a new operator context.
    pub fn new(operator_id: Uuid, name: String, role: OperatorRole) -> Self {
        Self {
            operator_id,
            name,
            role,
        }
    }

    /// Returns whether the current operator is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, OperatorRole::Admin)
    }
}

impl From<Claims> for OperatorContext {
    fn from(claims: Claims) -> Self {
        Self {
            operator_id: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}
