//! Branch/service/window catalog read models.
//!
//! The catalog is managed by an external administration system; this
//! service only reads it to validate scopes and denormalize display
//! payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bank branch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Branch {
    /// Unique branch identifier.
    pub id: Uuid,
    /// Branch display name.
    pub name: String,
    /// Whether the branch is currently operating.
    pub is_active: bool,
    /// When the branch was registered.
    pub created_at: DateTime<Utc>,
}

/// A service offered at bank windows (teller, loans, ...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Service {
    /// Unique service identifier.
    pub id: Uuid,
    /// Service display name.
    pub name: String,
    /// Short code shown on displays.
    pub code: String,
    /// Whether the service is currently offered.
    pub is_active: bool,
}

/// A physical attention window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Window {
    /// Unique window identifier.
    pub id: Uuid,
    /// Window display name, e.g. `Ventanilla 3`.
    pub name: String,
}

/// A window installed at a branch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BranchWindow {
    /// Unique identifier of the (branch, window) pair.
    pub id: Uuid,
    /// The branch.
    pub branch_id: Uuid,
    /// The window.
    pub window_id: Uuid,
    /// Whether the window is currently in service at this branch.
    pub is_active: bool,
}
