//! Store traits decoupling the orchestrator from Postgres.
//!
//! The database repositories implement these traits; tests drive the
//! same orchestrator against in-memory fakes.

use async_trait::async_trait;
use uuid::Uuid;

use turnero_core::events::TicketView;
use turnero_core::result::AppResult;
use turnero_database::repositories::assignment::AssignmentRepository;
use turnero_database::repositories::catalog::CatalogRepository;
use turnero_database::repositories::display::DisplayRepository;
use turnero_database::repositories::ticket::{TicketRepository, TransitionSpec};
use turnero_entity::assignment::{OperatorWindowAssignment, WindowServiceBinding};
use turnero_entity::catalog::{Branch, Service};
use turnero_entity::ticket::{Ticket, TicketType};

/// Ticket persistence and conditional transitions.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Issue a new PENDIENTE ticket with a generated code.
    async fn issue(
        &self,
        ticket_type: TicketType,
        branch_id: Uuid,
        service_id: Uuid,
        package_code: Option<String>,
    ) -> AppResult<Ticket>;

    /// Find a ticket by ID.
    async fn find(&self, id: Uuid) -> AppResult<Option<Ticket>>;

    /// Claimable candidate IDs in call order.
    async fn claim_candidates(
        &self,
        branch_id: Uuid,
        service_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Uuid>>;

    /// Execute a guarded transition; `None` means no row matched.
    async fn transition(&self, ticket_id: Uuid, spec: &TransitionSpec)
    -> AppResult<Option<Ticket>>;

    /// Count the operator's in-flight ATENDIENDO tickets.
    async fn count_attending(&self, operator_id: Uuid) -> AppResult<i64>;

    /// Count the operator's ESPERA tickets.
    async fn count_espera(&self, operator_id: Uuid) -> AppResult<i64>;

    /// Whether the operator has another LLAMADO or ATENDIENDO ticket.
    async fn has_other_active_call(&self, operator_id: Uuid, excluding: Uuid) -> AppResult<bool>;

    /// Unclaimed PENDIENTE tickets in scope, in call order.
    async fn pending_in_scope(
        &self,
        branch_id: Uuid,
        service_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Ticket>>;

    /// The operator's current ATENDIENDO ticket, if any.
    async fn current_attention(&self, operator_id: Uuid) -> AppResult<Option<Ticket>>;

    /// The operator's most recently called ticket in scope.
    async fn latest_called(
        &self,
        operator_id: Uuid,
        branch_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<Option<Ticket>>;
}

/// Operator window assignments and window-service bindings.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// The operator's active window assignment at a branch.
    async fn active_assignment(
        &self,
        operator_id: Uuid,
        branch_id: Uuid,
    ) -> AppResult<Option<OperatorWindowAssignment>>;

    /// The active binding between a branch window and a service.
    async fn binding_for(
        &self,
        branch_window_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<Option<WindowServiceBinding>>;

    /// All active window assignments for an operator, across branches.
    async fn assignments_for_operator(
        &self,
        operator_id: Uuid,
    ) -> AppResult<Vec<OperatorWindowAssignment>>;
}

/// Read-only branch/service catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All active branches.
    async fn active_branches(&self) -> AppResult<Vec<Branch>>;

    /// Find an active branch by ID.
    async fn find_branch(&self, branch_id: Uuid) -> AppResult<Option<Branch>>;

    /// Find an active service by ID.
    async fn find_service(&self, service_id: Uuid) -> AppResult<Option<Service>>;

    /// Active services attendable at a branch.
    async fn services_for_branch(&self, branch_id: Uuid) -> AppResult<Vec<Service>>;

    /// Whether the service is enabled on an active window of the branch.
    async fn branch_serves_service(&self, branch_id: Uuid, service_id: Uuid) -> AppResult<bool>;

    /// Service IDs attendable at the given branch window.
    async fn service_ids_for_window(&self, branch_window_id: Uuid) -> AppResult<Vec<Uuid>>;
}

/// Display projection reads.
#[async_trait]
pub trait DisplayStore: Send + Sync {
    /// The display projection of a single ticket.
    async fn view(&self, ticket_id: Uuid) -> AppResult<Option<TicketView>>;

    /// Recently called tickets at a branch, newest call first.
    async fn display_calls(
        &self,
        branch_id: Uuid,
        service_ids: Option<&[Uuid]>,
        limit: i64,
    ) -> AppResult<Vec<TicketView>>;
}

#[async_trait]
impl TicketStore for TicketRepository {
    async fn issue(
        &self,
        ticket_type: TicketType,
        branch_id: Uuid,
        service_id: Uuid,
        package_code: Option<String>,
    ) -> AppResult<Ticket> {
        TicketRepository::issue(self, ticket_type, branch_id, service_id, package_code).await
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Ticket>> {
        self.find_by_id(id).await
    }

    async fn claim_candidates(
        &self,
        branch_id: Uuid,
        service_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Uuid>> {
        TicketRepository::claim_candidates(self, branch_id, service_id, limit).await
    }

    async fn transition(
        &self,
        ticket_id: Uuid,
        spec: &TransitionSpec,
    ) -> AppResult<Option<Ticket>> {
        TicketRepository::transition(self, ticket_id, spec).await
    }

    async fn count_attending(&self, operator_id: Uuid) -> AppResult<i64> {
        TicketRepository::count_attending(self, operator_id).await
    }

    async fn count_espera(&self, operator_id: Uuid) -> AppResult<i64> {
        TicketRepository::count_espera(self, operator_id).await
    }

    async fn has_other_active_call(&self, operator_id: Uuid, excluding: Uuid) -> AppResult<bool> {
        TicketRepository::has_other_active_call(self, operator_id, excluding).await
    }

    async fn pending_in_scope(
        &self,
        branch_id: Uuid,
        service_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Ticket>> {
        TicketRepository::pending_in_scope(self, branch_id, service_id, limit).await
    }

    async fn current_attention(&self, operator_id: Uuid) -> AppResult<Option<Ticket>> {
        TicketRepository::current_attention(self, operator_id).await
    }

    async fn latest_called(
        &self,
        operator_id: Uuid,
        branch_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<Option<Ticket>> {
        TicketRepository::latest_called(self, operator_id, branch_id, service_id).await
    }
}

#[async_trait]
impl AssignmentStore for AssignmentRepository {
    async fn active_assignment(
        &self,
        operator_id: Uuid,
        branch_id: Uuid,
    ) -> AppResult<Option<OperatorWindowAssignment>> {
        AssignmentRepository::active_assignment(self, operator_id, branch_id).await
    }

    async fn binding_for(
        &self,
        branch_window_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<Option<WindowServiceBinding>> {
        AssignmentRepository::binding_for(self, branch_window_id, service_id).await
    }

    async fn assignments_for_operator(
        &self,
        operator_id: Uuid,
    ) -> AppResult<Vec<OperatorWindowAssignment>> {
        AssignmentRepository::assignments_for_operator(self, operator_id).await
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn active_branches(&self) -> AppResult<Vec<Branch>> {
        CatalogRepository::active_branches(self).await
    }

    async fn find_branch(&self, branch_id: Uuid) -> AppResult<Option<Branch>> {
        CatalogRepository::find_branch(self, branch_id).await
    }

    async fn find_service(&self, service_id: Uuid) -> AppResult<Option<Service>> {
        CatalogRepository::find_service(self, service_id).await
    }

    async fn services_for_branch(&self, branch_id: Uuid) -> AppResult<Vec<Service>> {
        CatalogRepository::services_for_branch(self, branch_id).await
    }

    async fn branch_serves_service(&self, branch_id: Uuid, service_id: Uuid) -> AppResult<bool> {
        CatalogRepository::branch_serves_service(self, branch_id, service_id).await
    }

    async fn service_ids_for_window(&self, branch_window_id: Uuid) -> AppResult<Vec<Uuid>> {
        CatalogRepository::service_ids_for_window(self, branch_window_id).await
    }
}

#[async_trait]
impl DisplayStore for DisplayRepository {
    async fn view(&self, ticket_id: Uuid) -> AppResult<Option<TicketView>> {
        DisplayRepository::view(self, ticket_id).await
    }

    async fn display_calls(
        &self,
        branch_id: Uuid,
        service_ids: Option<&[Uuid]>,
        limit: i64,
    ) -> AppResult<Vec<TicketView>> {
        DisplayRepository::display_calls(self, branch_id, service_ids, limit).await
    }
}
