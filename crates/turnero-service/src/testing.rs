//! In-memory store fakes for orchestrator tests.
//!
//! `InMemoryWorld` implements every store trait over a mutex-guarded
//! ticket table, interpreting transition specs with the same guard
//! semantics as the conditional UPDATE.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use turnero_core::error::AppError;
use turnero_core::events::TicketView;
use turnero_core::result::AppResult;
use turnero_database::repositories::ticket::{OwnerGuard, TransitionSpec};
use turnero_entity::assignment::{OperatorWindowAssignment, WindowServiceBinding};
use turnero_entity::catalog::{Branch, Service};
use turnero_entity::ticket::{Ticket, TicketStatus, TicketType};

use crate::store::{AssignmentStore, CatalogStore, DisplayStore, TicketStore};

pub(crate) const OPERATOR_QUEUE_LIMIT: i64 = 50;

/// One branch, one service, one shared window; tickets and operator
/// assignments accumulate as tests seed them.
pub(crate) struct InMemoryWorld {
    pub branch_id: Uuid,
    pub service_id: Uuid,
    pub branch_window_id: Uuid,
    pub binding_id: Uuid,
    tickets: Mutex<Vec<Ticket>>,
    assignments: Mutex<HashMap<Uuid, OperatorWindowAssignment>>,
    // Strictly increasing created_at offsets keep FIFO deterministic.
    clock_ticks: AtomicI64,
    sequence: AtomicI64,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self {
            branch_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            branch_window_id: Uuid::new_v4(),
            binding_id: Uuid::new_v4(),
            tickets: Mutex::new(Vec::new()),
            assignments: Mutex::new(HashMap::new()),
            clock_ticks: AtomicI64::new(0),
            sequence: AtomicI64::new(0),
        }
    }

    /// Registers a fresh operator with an active assignment to the
    /// shared window and returns its ID.
    pub fn assign_operator(&self) -> Uuid {
        let operator_id = Uuid::new_v4();
        let assignment = OperatorWindowAssignment {
            id: Uuid::new_v4(),
            operator_id,
            branch_id: self.branch_id,
            branch_window_id: self.branch_window_id,
            is_active: true,
        };
        self.assignments
            .lock()
            .unwrap()
            .insert(operator_id, assignment);
        operator_id
    }

    /// Inserts a PENDIENTE ticket in the shared scope.
    pub fn seed_ticket(&self, ticket_type: TicketType) -> Uuid {
        let ticket = self.build_ticket(ticket_type, None);
        let id = ticket.id;
        self.tickets.lock().unwrap().push(ticket);
        id
    }

    pub fn ticket(&self, id: Uuid) -> Ticket {
        self.tickets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .expect("ticket exists")
    }

    pub fn status_of(&self, id: Uuid) -> TicketStatus {
        self.ticket(id).status
    }

    fn build_ticket(&self, ticket_type: TicketType, package_code: Option<String>) -> Ticket {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let tick = self.clock_ticks.fetch_add(1, Ordering::SeqCst);
        let created_at = Utc::now() + Duration::milliseconds(tick);
        Ticket {
            id: Uuid::new_v4(),
            code: format!("{}{:04}", ticket_type.prefix(), seq),
            package_code,
            ticket_type,
            status: TicketStatus::Pendiente,
            branch_id: self.branch_id,
            service_id: self.service_id,
            branch_window_service_id: None,
            operator_id: None,
            called_at: None,
            attention_started_at: None,
            attention_finished_at: None,
            cancelled_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn guards_pass(ticket: &Ticket, spec: &TransitionSpec) -> bool {
        if ticket.status != spec.expected_status {
            return false;
        }
        if spec.require_prior_attention && ticket.attention_started_at.is_none() {
            return false;
        }
        match spec.owner {
            OwnerGuard::Any => true,
            OwnerGuard::Unowned => ticket.operator_id.is_none(),
            OwnerGuard::Owner(op) => ticket.operator_id == Some(op),
            OwnerGuard::UnownedOrOwner(op) => {
                ticket.operator_id.is_none() || ticket.operator_id == Some(op)
            }
        }
    }

    fn to_view(&self, ticket: &Ticket) -> TicketView {
        let claimed = ticket.branch_window_service_id.is_some();
        TicketView {
            id: ticket.id,
            code: ticket.code.clone(),
            package_code: ticket.package_code.clone(),
            ticket_type: ticket.ticket_type.as_str().to_string(),
            status: ticket.status.as_str().to_string(),
            branch_id: ticket.branch_id,
            branch_name: "Sucursal Centro".to_string(),
            service_id: ticket.service_id,
            service_name: "Cajas".to_string(),
            service_code: "CA".to_string(),
            window_id: claimed.then_some(self.branch_window_id),
            window_name: claimed.then(|| "Ventanilla 1".to_string()),
            called_at: ticket.called_at,
            created_at: ticket.created_at,
        }
    }
}

#[async_trait]
impl TicketStore for InMemoryWorld {
    async fn issue(
        &self,
        ticket_type: TicketType,
        branch_id: Uuid,
        service_id: Uuid,
        package_code: Option<String>,
    ) -> AppResult<Ticket> {
        let mut ticket = self.build_ticket(ticket_type, package_code);
        ticket.branch_id = branch_id;
        ticket.service_id = service_id;
        self.tickets.lock().unwrap().push(ticket.clone());
        Ok(ticket)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Ticket>> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn claim_candidates(
        &self,
        branch_id: Uuid,
        service_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Uuid>> {
        let guard = self.tickets.lock().unwrap();
        let mut candidates: Vec<&Ticket> = guard
            .iter()
            .filter(|t| t.branch_id == branch_id && t.service_id == service_id && t.is_claimable())
            .collect();
        candidates.sort_by_key(|t| {
            let priority = match t.ticket_type {
                TicketType::Preferencial => 0,
                TicketType::Regular => 1,
            };
            (priority, t.created_at)
        });
        Ok(candidates
            .into_iter()
            .take(limit as usize)
            .map(|t| t.id)
            .collect())
    }

    async fn transition(
        &self,
        ticket_id: Uuid,
        spec: &TransitionSpec,
    ) -> AppResult<Option<Ticket>> {
        let mut guard = self.tickets.lock().unwrap();
        let Some(idx) = guard.iter().position(|t| t.id == ticket_id) else {
            return Ok(None);
        };
        if !Self::guards_pass(&guard[idx], spec) {
            return Ok(None);
        }
        // Mirrors the partial unique index on attending operators.
        if spec.new_status == TicketStatus::Atendiendo {
            let operator = spec.claim.map(|(op, _)| op).or(guard[idx].operator_id);
            let busy = operator.is_some()
                && guard.iter().any(|t| {
                    t.id != ticket_id
                        && t.operator_id == operator
                        && t.status == TicketStatus::Atendiendo
                });
            if busy {
                return Err(AppError::conflict(
                    "Operator already has a ticket in attention",
                ));
            }
        }

        let now = Utc::now() + Duration::milliseconds(self.clock_ticks.fetch_add(1, Ordering::SeqCst));
        let ticket = &mut guard[idx];
        ticket.status = spec.new_status;
        if let Some((operator_id, binding_id)) = spec.claim {
            ticket.operator_id = Some(operator_id);
            ticket.branch_window_service_id = Some(binding_id);
        }
        if spec.touch_called_at {
            ticket.called_at = Some(now);
        }
        if spec.start_attention {
            ticket.attention_started_at.get_or_insert(now);
        }
        if spec.finish_attention {
            ticket.attention_finished_at = Some(now);
        }
        if spec.set_cancelled_at {
            ticket.cancelled_at = Some(now);
        }
        ticket.updated_at = now;
        Ok(Some(ticket.clone()))
    }

    async fn count_attending(&self, operator_id: Uuid) -> AppResult<i64> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.operator_id == Some(operator_id) && t.status == TicketStatus::Atendiendo
            })
            .count() as i64)
    }

    async fn count_espera(&self, operator_id: Uuid) -> AppResult<i64> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.operator_id == Some(operator_id) && t.status == TicketStatus::Espera)
            .count() as i64)
    }

    async fn has_other_active_call(&self, operator_id: Uuid, excluding: Uuid) -> AppResult<bool> {
        Ok(self.tickets.lock().unwrap().iter().any(|t| {
            t.operator_id == Some(operator_id)
                && t.id != excluding
                && matches!(t.status, TicketStatus::Llamado | TicketStatus::Atendiendo)
        }))
    }

    async fn pending_in_scope(
        &self,
        branch_id: Uuid,
        service_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Ticket>> {
        let ids = self.claim_candidates(branch_id, service_id, limit).await?;
        let guard = self.tickets.lock().unwrap();
        Ok(ids
            .into_iter()
            .filter_map(|id| guard.iter().find(|t| t.id == id).cloned())
            .collect())
    }

    async fn current_attention(&self, operator_id: Uuid) -> AppResult<Option<Ticket>> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.operator_id == Some(operator_id) && t.status == TicketStatus::Atendiendo)
            .cloned())
    }

    async fn latest_called(
        &self,
        operator_id: Uuid,
        branch_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<Option<Ticket>> {
        let guard = self.tickets.lock().unwrap();
        Ok(guard
            .iter()
            .filter(|t| {
                t.operator_id == Some(operator_id)
                    && t.branch_id == branch_id
                    && t.service_id == service_id
                    && t.status == TicketStatus::Llamado
            })
            .max_by_key(|t| t.called_at)
            .cloned())
    }
}

#[async_trait]
impl AssignmentStore for InMemoryWorld {
    async fn active_assignment(
        &self,
        operator_id: Uuid,
        branch_id: Uuid,
    ) -> AppResult<Option<OperatorWindowAssignment>> {
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .get(&operator_id)
            .filter(|a| a.branch_id == branch_id && a.is_active)
            .cloned())
    }

    async fn binding_for(
        &self,
        branch_window_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<Option<WindowServiceBinding>> {
        if branch_window_id == self.branch_window_id && service_id == self.service_id {
            Ok(Some(WindowServiceBinding {
                id: self.binding_id,
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
            .assignments
            .lock()
            .unwrap()
            .get(&operator_id)
            .filter(|a| a.is_active)
            .cloned()
            .into_iter()
            .collect())
    }
}

#[async_trait]
impl CatalogStore for InMemoryWorld {
    async fn active_branches(&self) -> AppResult<Vec<Branch>> {
        Ok(vec![Branch {
            id: self.branch_id,
            name: "Sucursal Centro".to_string(),
            is_active: true,
            created_at: Utc::now(),
        }])
    }

    async fn find_branch(&self, branch_id: Uuid) -> AppResult<Option<Branch>> {
        if branch_id == self.branch_id {
            Ok(self.active_branches().await?.pop())
        } else {
            Ok(None)
        }
    }

    async fn find_service(&self, service_id: Uuid) -> AppResult<Option<Service>> {
        if service_id == self.service_id {
            Ok(Some(Service {
                id: self.service_id,
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
            Ok(vec![self.find_service(self.service_id).await?.ok_or_else(
                || AppError::internal("world service missing"),
            )?])
        } else {
            Ok(Vec::new())
        }
    }

    async fn branch_serves_service(&self, branch_id: Uuid, service_id: Uuid) -> AppResult<bool> {
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

#[async_trait]
impl DisplayStore for InMemoryWorld {
    async fn view(&self, ticket_id: Uuid) -> AppResult<Option<TicketView>> {
        Ok(self
            .tickets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == ticket_id)
            .map(|t| self.to_view(t)))
    }

    async fn display_calls(
        &self,
        branch_id: Uuid,
        service_ids: Option<&[Uuid]>,
        limit: i64,
    ) -> AppResult<Vec<TicketView>> {
        let guard = self.tickets.lock().unwrap();
        let mut calls: Vec<&Ticket> = guard
            .iter()
            .filter(|t| {
                t.branch_id == branch_id
                    && t.status == TicketStatus::Llamado
                    && service_ids.is_none_or(|ids| ids.contains(&t.service_id))
            })
            .collect();
        calls.sort_by(|a, b| b.called_at.cmp(&a.called_at));
        Ok(calls
            .into_iter()
            .take(limit as usize)
            .map(|t| self.to_view(t))
            .collect())
    }
}
