//! Join-time room authorization.
//!
//! Authorization is always re-validated against current state at join
//! time; nothing is cached between joins.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use turnero_core::result::AppResult;
use turnero_service::context::OperatorContext;
use turnero_service::store::{AssignmentStore, CatalogStore};

use crate::room::Room;

/// Decides whether a connection may join a room.
#[async_trait]
pub trait RoomPolicy: Send + Sync {
    /// Whether the (possibly anonymous) connection may join the room.
    async fn can_join(&self, identity: Option<&OperatorContext>, room: &Room) -> AppResult<bool>;

    /// Every private room implied by the operator's current active
    /// window bindings, plus the operator's own room.
    async fn assigned_rooms(&self, operator_id: Uuid) -> AppResult<Vec<Room>>;
}

/// Store-backed policy.
pub struct StoreRoomPolicy {
    /// Assignment lookups.
    assignments: Arc<dyn AssignmentStore>,
    /// Catalog lookups.
    catalog: Arc<dyn CatalogStore>,
}

impl StoreRoomPolicy {
    /// Creates a new store-backed policy.
    pub fn new(assignments: Arc<dyn AssignmentStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            assignments,
            catalog,
        }
    }
}

#[async_trait]
impl RoomPolicy for StoreRoomPolicy {
    async fn can_join(&self, identity: Option<&OperatorContext>, room: &Room) -> AppResult<bool> {
        match room {
            Room::Public {
                branch_id,
                service_id,
            } => {
                if self.catalog.find_branch(*branch_id).await?.is_none() {
                    return Ok(false);
                }
                self.catalog
                    .branch_serves_service(*branch_id, *service_id)
                    .await
            }
            Room::Queue {
                branch_id,
                service_id,
            } => {
                let Some(identity) = identity else {
                    return Ok(false);
                };
                let Some(assignment) = self
                    .assignments
                    .active_assignment(identity.operator_id, *branch_id)
                    .await?
                else {
                    return Ok(false);
                };
                Ok(self
                    .assignments
                    .binding_for(assignment.branch_window_id, *service_id)
                    .await?
                    .is_some())
            }
            Room::Operator { operator_id } => {
                Ok(identity.is_some_and(|i| i.operator_id == *operator_id))
            }
        }
    }

    async fn assigned_rooms(&self, operator_id: Uuid) -> AppResult<Vec<Room>> {
        let mut rooms = vec![Room::Operator { operator_id }];
        for assignment in self.assignments.assignments_for_operator(operator_id).await? {
            for service_id in self
                .catalog
                .service_ids_for_window(assignment.branch_window_id)
                .await?
            {
                rooms.push(Room::Queue {
                    branch_id: assignment.branch_id,
                    service_id,
                });
            }
        }
        Ok(rooms)
    }
}

#[cfg(test)]
mod tests {
    use turnero_auth::OperatorRole;
    use turnero_core::result::AppResult;
    use turnero_entity::assignment::{OperatorWindowAssignment, WindowServiceBinding};
    use turnero_entity::catalog::{Branch, Service};

    use super::*;

    /// One operator assigned to one window serving one service.
    struct FixedWorld {
        operator_id: Uuid,
        branch_id: Uuid,
        service_id: Uuid,
        branch_window_id: Uuid,
    }

    #[async_trait]
    impl AssignmentStore for FixedWorld {
        async fn active_assignment(
            &self,
            operator_id: Uuid,
            branch_id: Uuid,
        ) -> AppResult<Option<OperatorWindowAssignment>> {
            if operator_id == self.operator_id && branch_id == self.branch_id {
                Ok(Some(OperatorWindowAssignment {
                    id: Uuid::new_v4(),
                    operator_id,
                    branch_id,
                    branch_window_id: self.branch_window_id,
                    is_active: true,
                }))
            } else {
                Ok(None)
            }
        }

        async fn binding_for(
            &self,
            branch_window_id: Uuid,
            service_id: Uuid,
        ) -> AppResult<Option<WindowServiceBinding>> {
            if branch_window_id == self.branch_window_id && service_id == self.service_id {
                Ok(Some(WindowServiceBinding {
                    id: Uuid::new_v4(),
                    branch_window_id,
                    service_id,
                    is_active: true,
                }))
            } else {
                Ok(None)
            }
        }

        async fn assignments_for_operator(
            &self,
            operator_id: Uuid,
        ) -> AppResult<Vec<OperatorWindowAssignment>> {
            Ok(self
                .active_assignment(operator_id, self.branch_id)
                .await?
                .into_iter()
                .collect())
        }
    }

    #[async_trait]
    impl CatalogStore for FixedWorld {
        async fn active_branches(&self) -> AppResult<Vec<Branch>> {
            Ok(vec![Branch {
                id: self.branch_id,
                name: "Sucursal Centro".to_string(),
                is_active: true,
                created_at: chrono::Utc::now(),
            }])
        }

        async fn find_branch(&self, branch_id: Uuid) -> AppResult<Option<Branch>> {
            Ok(self
                .active_branches()
                .await?
                .into_iter()
                .find(|b| b.id == branch_id))
        }

        async fn find_service(&self, service_id: Uuid) -> AppResult<Option<Service>> {
            if service_id == self.service_id {
                Ok(Some(Service {
                    id: service_id,
                    name: "Cajas".to_string(),
                    code: "CA".to_string(),
                    is_active: true,
                }))
            } else {
                Ok(None)
            }
        }

        async fn services_for_branch(&self, branch_id: Uuid) -> AppResult<Vec<Service>> {
            if branch_id == self.branch_id {
                Ok(self.find_service(self.service_id).await?.into_iter().collect())
            } else {
                Ok(Vec::new())
            }
        }

        async fn branch_serves_service(
            &self,
            branch_id: Uuid,
            service_id: Uuid,
        ) -> AppResult<bool> {
            Ok(branch_id == self.branch_id && service_id == self.service_id)
        }

        async fn service_ids_for_window(&self, branch_window_id: Uuid) -> AppResult<Vec<Uuid>> {
            if branch_window_id == self.branch_window_id {
                Ok(vec![self.service_id])
            } else {
                Ok(Vec::new())
            }
        }
    }

    fn policy() -> (StoreRoomPolicy, Arc<FixedWorld>) {
        let world = Arc::new(FixedWorld {
            operator_id: Uuid::new_v4(),
            branch_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            branch_window_id: Uuid::new_v4(),
        });
        (StoreRoomPolicy::new(world.clone(), world.clone()), world)
    }

    fn ctx(operator_id: Uuid) -> OperatorContext {
        OperatorContext::new(operator_id, "Ana".to_string(), OperatorRole::Operator)
    }

    #[tokio::test]
    async fn public_rooms_need_an_active_branch_serving_the_service() {
        let (policy, world) = policy();
        let ok = Room::Public {
            branch_id: world.branch_id,
            service_id: world.service_id,
        };
        let bad = Room::Public {
            branch_id: world.branch_id,
            service_id: Uuid::new_v4(),
        };

        assert!(policy.can_join(None, &ok).await.unwrap());
        assert!(!policy.can_join(None, &bad).await.unwrap());
    }

    #[tokio::test]
    async fn queue_rooms_require_an_assignment_serving_the_service() {
        let (policy, world) = policy();
        let room = Room::Queue {
            branch_id: world.branch_id,
            service_id: world.service_id,
        };

        assert!(!policy.can_join(None, &room).await.unwrap());
        assert!(
            policy
                .can_join(Some(&ctx(world.operator_id)), &room)
                .await
                .unwrap()
        );
        assert!(
            !policy
                .can_join(Some(&ctx(Uuid::new_v4())), &room)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn operator_rooms_admit_only_their_owner() {
        let (policy, world) = policy();
        let room = Room::Operator {
            operator_id: world.operator_id,
        };

        assert!(
            policy
                .can_join(Some(&ctx(world.operator_id)), &room)
                .await
                .unwrap()
        );
        assert!(
            !policy
                .can_join(Some(&ctx(Uuid::new_v4())), &room)
                .await
                .unwrap()
        );
        assert!(!policy.can_join(None, &room).await.unwrap());
    }

    #[tokio::test]
    async fn assigned_rooms_cover_bindings_and_the_identity_room() {
        let (policy, world) = policy();
        let rooms = policy.assigned_rooms(world.operator_id).await.unwrap();

        assert!(rooms.contains(&Room::Operator {
            operator_id: world.operator_id
        }));
        assert!(rooms.contains(&Room::Queue {
            branch_id: world.branch_id,
            service_id: world.service_id
        }));
        assert_eq!(rooms.len(), 2);
    }
}
