//! Ticket issuance.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use turnero_core::error::AppError;
use turnero_core::events::{DomainEvent, EventBus, TicketEvent};
use turnero_core::result::AppResult;
use turnero_entity::ticket::{Ticket, TicketType};

use crate::store::{CatalogStore, DisplayStore, TicketStore};

/// Issues new PENDIENTE tickets from kiosks.
#[derive(Clone)]
pub struct IssuanceService {
    /// Ticket store.
    tickets: Arc<dyn TicketStore>,
    /// Catalog for branch/service validation.
    catalog: Arc<dyn CatalogStore>,
    /// Display projection reads.
    display: Arc<dyn DisplayStore>,
    /// Domain event bus.
    bus: EventBus,
}

impl IssuanceService {
    /// Creates a new issuance service.
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        catalog: Arc<dyn CatalogStore>,
        display: Arc<dyn DisplayStore>,
        bus: EventBus,
    ) -> Self {
        Self {
            tickets,
            catalog,
            display,
            bus,
        }
    }

    /// Issues a ticket for a service at a branch, generating its code
    /// under the partition advisory lock, and announces it.
    pub async fn issue(
        &self,
        ticket_type: TicketType,
        branch_id: Uuid,
        service_id: Uuid,
        package_code: Option<String>,
    ) -> AppResult<Ticket> {
        self.catalog
            .find_branch(branch_id)
            .await?
            .ok_or_else(|| AppError::not_found("Branch not found or inactive"))?;
        self.catalog
            .find_service(service_id)
            .await?
            .ok_or_else(|| AppError::not_found("Service not found or inactive"))?;
        if !self
            .catalog
            .branch_serves_service(branch_id, service_id)
            .await?
        {
            return Err(AppError::validation(
                "Service is not attended at this branch",
            ));
        }

        let ticket = self
            .tickets
            .issue(ticket_type, branch_id, service_id, package_code)
            .await?;
        info!(
            ticket_id = %ticket.id,
            code = %ticket.code,
            branch_id = %branch_id,
            service_id = %service_id,
            "Ticket issued"
        );

        if let Some(view) = self.display.view(ticket.id).await? {
            self.bus
                .publish(DomainEvent::new(None, TicketEvent::Created(view.clone())));
            self.bus
                .publish(DomainEvent::new(None, TicketEvent::Updated(view)));
        }

        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use turnero_core::error::ErrorKind;
    use turnero_core::events::EventBus;
    use turnero_entity::ticket::{TicketStatus, TicketType};
    use uuid::Uuid;

    use super::*;
    use crate::testing::InMemoryWorld;

    fn service(world: &Arc<InMemoryWorld>) -> IssuanceService {
        IssuanceService::new(world.clone(), world.clone(), world.clone(), EventBus::new(64))
    }

    #[tokio::test]
    async fn issues_a_pending_ticket_and_announces_it() {
        let world = Arc::new(InMemoryWorld::new());
        let svc = service(&world);
        let mut rx = svc.bus.subscribe();

        let ticket = svc
            .issue(
                TicketType::Preferencial,
                world.branch_id,
                world.service_id,
                Some("PKG-42".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(ticket.status, TicketStatus::Pendiente);
        assert!(ticket.code.starts_with('P'));
        assert_eq!(ticket.package_code.as_deref(), Some("PKG-42"));

        assert_eq!(rx.recv().await.unwrap().payload.name(), "ticket:created");
        assert_eq!(rx.recv().await.unwrap().payload.name(), "ticket:updated");
    }

    #[tokio::test]
    async fn rejects_an_unknown_branch() {
        let world = Arc::new(InMemoryWorld::new());
        let svc = service(&world);

        let err = svc
            .issue(TicketType::Regular, Uuid::new_v4(), world.service_id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn rejects_a_service_the_branch_does_not_attend() {
        use async_trait::async_trait;
        use turnero_core::result::AppResult;
        use turnero_entity::catalog::{Branch, Service};

        use crate::store::CatalogStore;

        // Branch and service both exist, but no window binds them.
        struct DisjointCatalog {
            branches: Arc<InMemoryWorld>,
            services: Arc<InMemoryWorld>,
        }

        #[async_trait]
        impl CatalogStore for DisjointCatalog {
            async fn active_branches(&self) -> AppResult<Vec<Branch>> {
                self.branches.active_branches().await
            }
            async fn find_branch(&self, branch_id: Uuid) -> AppResult<Option<Branch>> {
                self.branches.find_branch(branch_id).await
            }
            async fn find_service(&self, service_id: Uuid) -> AppResult<Option<Service>> {
                self.services.find_service(service_id).await
            }
            async fn services_for_branch(&self, _branch_id: Uuid) -> AppResult<Vec<Service>> {
                Ok(Vec::new())
            }
            async fn branch_serves_service(
                &self,
                _branch_id: Uuid,
                _service_id: Uuid,
            ) -> AppResult<bool> {
                Ok(false)
            }
            async fn service_ids_for_window(
                &self,
                _branch_window_id: Uuid,
            ) -> AppResult<Vec<Uuid>> {
                Ok(Vec::new())
            }
        }

        let branches = Arc::new(InMemoryWorld::new());
        let services = Arc::new(InMemoryWorld::new());
        let catalog = Arc::new(DisjointCatalog {
            branches: branches.clone(),
            services: services.clone(),
        });
        let svc = IssuanceService::new(
            branches.clone(),
            catalog,
            branches.clone(),
            EventBus::new(64),
        );

        let err = svc
            .issue(
                TicketType::Regular,
                branches.branch_id,
                services.service_id,
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn concurrent_issuance_yields_distinct_sequential_codes() {
        let world = Arc::new(InMemoryWorld::new());
        let svc = Arc::new(service(&world));
        const N: usize = 12;

        let mut handles = Vec::new();
        for _ in 0..N {
            let svc = svc.clone();
            let world = world.clone();
            handles.push(tokio::spawn(async move {
                svc.issue(TicketType::Regular, world.branch_id, world.service_id, None)
                    .await
                    .unwrap()
                    .code
            }));
        }

        let mut codes = Vec::new();
        for handle in handles {
            codes.push(handle.await.unwrap());
        }
        codes.sort();

        let expected: Vec<String> = (1..=N).map(|n| format!("R{n:04}")).collect();
        assert_eq!(codes, expected, "codes are gap-free and never reused");
    }
}
