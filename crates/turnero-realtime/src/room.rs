//! Room naming scheme.

use std::fmt;

use uuid::Uuid;

/// A realtime room a connection can join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    /// Operator-private queue scope.
    Queue { branch_id: Uuid, service_id: Uuid },
    /// Open display scope; joinable without identity.
    Public { branch_id: Uuid, service_id: Uuid },
    /// Per-identity private room.
    Operator { operator_id: Uuid },
}

impl Room {
    /// Parses a wire room name like `queue:{branch}:{service}`.
    pub fn parse(name: &str) -> Option<Room> {
        let mut parts = name.split(':');
        let kind = parts.next()?;
        let room = match kind {
            "queue" | "public" => {
                let branch_id = parts.next()?.parse().ok()?;
                let service_id = parts.next()?.parse().ok()?;
                if kind == "queue" {
                    Room::Queue {
                        branch_id,
                        service_id,
                    }
                } else {
                    Room::Public {
                        branch_id,
                        service_id,
                    }
                }
            }
            "operator" => Room::Operator {
                operator_id: parts.next()?.parse().ok()?,
            },
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(room)
    }

    /// Whether the room is joinable without a verified identity.
    pub fn is_public(&self) -> bool {
        matches!(self, Room::Public { .. })
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Queue {
                branch_id,
                service_id,
            } => write!(f, "queue:{branch_id}:{service_id}"),
            Room::Public {
                branch_id,
                service_id,
            } => write!(f, "public:{branch_id}:{service_id}"),
            Room::Operator { operator_id } => write!(f, "operator:{operator_id}"),
        }
    }
}
