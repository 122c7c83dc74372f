//! Queue orchestrator: call-next, recall, hold, start, finish, cancel.
//!
//! Every mutation is one guarded conditional transition against the
//! ticket store. Guard failures detected before the mutation abort
//! synchronously with no side effect; a zero-row transition is
//! classified post-hoc by re-reading current state. After each
//! successful mutation the display projection is re-read so the
//! broadcast payload reflects committed state.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use turnero_core::config::QueueConfig;
use turnero_core::error::AppError;
use turnero_core::events::{DomainEvent, EventBus, TicketEvent, TicketView};
use turnero_core::result::AppResult;
use turnero_database::repositories::ticket::TransitionSpec;
use turnero_entity::ticket::{Ticket, TicketStatus};

use crate::context::OperatorContext;
use crate::store::{AssignmentStore, DisplayStore, TicketStore};

/// Candidate batch size per claim attempt round.
const CLAIM_BATCH: i64 = 10;

/// Operator pull-reconciliation snapshot of a queue scope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSnapshot {
    /// Unclaimed PENDIENTE tickets in call order.
    pub pending: Vec<Ticket>,
    /// The operator's ticket currently in attention, if any.
    pub attending: Option<TicketView>,
    /// The operator's most recently called ticket in scope, if any.
    pub latest_called: Option<TicketView>,
}

/// Drives the ticket lifecycle on behalf of operators.
#[derive(Clone)]
pub struct QueueService {
    /// Ticket store.
    tickets: Arc<dyn TicketStore>,
    /// Assignment store for window authorization.
    assignments: Arc<dyn AssignmentStore>,
    /// Display projection reads.
    display: Arc<dyn DisplayStore>,
    /// Domain event bus.
    bus: EventBus,
    /// Queue policy knobs.
    config: QueueConfig,
}

impl QueueService {
    /// Creates a new queue service.
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        assignments: Arc<dyn AssignmentStore>,
        display: Arc<dyn DisplayStore>,
        bus: EventBus,
        config: QueueConfig,
    ) -> Self {
        Self {
            tickets,
            assignments,
            display,
            bus,
            config,
        }
    }

    /// Claims and calls the next ticket in a (branch, service) scope.
    ///
    /// Candidates are tried in call order; losing a claim race to a
    /// concurrent caller moves on to the next candidate instead of
    /// erroring. `Ok(None)` means the queue is empty.
    pub async fn call_next(
        &self,
        ctx: &OperatorContext,
        branch_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<Option<TicketView>> {
        let binding = self.authorize_scope(ctx, branch_id, service_id).await?;

        if self.tickets.count_attending(ctx.operator_id).await? > 0 {
            return Err(AppError::policy(
                "Operator already has a ticket in attention",
            ));
        }

        let spec = TransitionSpec::claim(ctx.operator_id, binding.id);
        loop {
            let candidates = self
                .tickets
                .claim_candidates(branch_id, service_id, CLAIM_BATCH)
                .await?;
            if candidates.is_empty() {
                debug!(
                    operator_id = %ctx.operator_id,
                    branch_id = %branch_id,
                    service_id = %service_id,
                    "No tickets available to call"
                );
                return Ok(None);
            }

            for candidate in candidates {
                match self.tickets.transition(candidate, &spec).await? {
                    Some(ticket) => {
                        info!(
                            ticket_id = %ticket.id,
                            code = %ticket.code,
                            operator_id = %ctx.operator_id,
                            "Claim won"
                        );
                        let view = self
                            .publish(ctx, ticket.id, TicketEvent::Called, true)
                            .await?;
                        return Ok(Some(view));
                    }
                    None => {
                        debug!(
                            ticket_id = %candidate,
                            operator_id = %ctx.operator_id,
                            "Claim lost, trying next candidate"
                        );
                    }
                }
            }
            // The whole batch was claimed elsewhere; reselect.
        }
    }

    /// Re-announces a ticket: refreshes called_at without changing
    /// status. Allowed from LLAMADO, or from ESPERA after attention
    /// has started at least once.
    pub async fn recall(&self, ctx: &OperatorContext, ticket_id: Uuid) -> AppResult<TicketView> {
        let ticket = self.require_ticket(ticket_id).await?;
        self.require_owner(&ticket, ctx)?;

        if !matches!(ticket.status, TicketStatus::Llamado | TicketStatus::Espera) {
            return Err(AppError::policy(format!(
                "Ticket is {} and cannot be recalled",
                ticket.status.as_str()
            )));
        }
        if self
            .tickets
            .has_other_active_call(ctx.operator_id, ticket_id)
            .await?
        {
            return Err(AppError::policy(
                "Operator has another called or in-attention ticket",
            ));
        }

        let spec = TransitionSpec::recall_from(ticket.status, ctx.operator_id);
        match self.tickets.transition(ticket_id, &spec).await? {
            Some(updated) => {
                // The called leg of a recall deliberately has no
                // ticket:updated companion.
                let view = self
                    .publish(ctx, updated.id, TicketEvent::Called, false)
                    .await?;
                self.bus.publish(DomainEvent::new(
                    Some(ctx.operator_id),
                    TicketEvent::Recalled(view.clone()),
                ));
                self.bus.publish(DomainEvent::new(
                    Some(ctx.operator_id),
                    TicketEvent::Updated(view.clone()),
                ));
                Ok(view)
            }
            None => Err(self.classify_failure(ticket_id, &spec, ctx).await),
        }
    }

    /// Starts (or resumes) attention on a called or held ticket.
    pub async fn start(&self, ctx: &OperatorContext, ticket_id: Uuid) -> AppResult<TicketView> {
        let ticket = self.require_ticket(ticket_id).await?;
        self.require_owner(&ticket, ctx)?;

        if !matches!(ticket.status, TicketStatus::Llamado | TicketStatus::Espera) {
            return Err(AppError::policy(format!(
                "Ticket is {} and cannot enter attention",
                ticket.status.as_str()
            )));
        }
        if self.tickets.count_attending(ctx.operator_id).await? > 0 {
            return Err(AppError::policy(
                "Operator already has a ticket in attention",
            ));
        }

        let spec = TransitionSpec::start_from(ticket.status, ctx.operator_id);
        match self.tickets.transition(ticket_id, &spec).await? {
            Some(updated) => self.publish(ctx, updated.id, TicketEvent::Started, true).await,
            None => Err(self.classify_failure(ticket_id, &spec, ctx).await),
        }
    }

    /// Puts an in-attention ticket on hold, subject to the per-operator
    /// ESPERA cap. The original attention_started_at is preserved.
    pub async fn hold(&self, ctx: &OperatorContext, ticket_id: Uuid) -> AppResult<TicketView> {
        let ticket = self.require_ticket(ticket_id).await?;
        self.require_owner(&ticket, ctx)?;

        let held = self.tickets.count_espera(ctx.operator_id).await?;
        if held >= i64::from(self.config.espera_cap) {
            return Err(AppError::policy(format!(
                "Operator already has {held} tickets on hold"
            )));
        }

        let spec = TransitionSpec::hold(ctx.operator_id);
        match self.tickets.transition(ticket_id, &spec).await? {
            Some(updated) => self.publish(ctx, updated.id, TicketEvent::Held, true).await,
            None => Err(self.classify_failure(ticket_id, &spec, ctx).await),
        }
    }

    /// Completes attention on a ticket. Terminal.
    pub async fn finish(&self, ctx: &OperatorContext, ticket_id: Uuid) -> AppResult<TicketView> {
        let spec = TransitionSpec::finish(ctx.operator_id);
        match self.tickets.transition(ticket_id, &spec).await? {
            Some(updated) => {
                info!(ticket_id = %updated.id, code = %updated.code, "Attention finished");
                self.publish(ctx, updated.id, TicketEvent::Finished, true).await
            }
            None => Err(self.classify_failure(ticket_id, &spec, ctx).await),
        }
    }

    /// Cancels a ticket from PENDIENTE, LLAMADO or ESPERA. Terminal.
    ///
    /// Admins may cancel any ticket; operators only unowned tickets or
    /// their own.
    pub async fn cancel(&self, ctx: &OperatorContext, ticket_id: Uuid) -> AppResult<TicketView> {
        let ticket = self.require_ticket(ticket_id).await?;

        if !matches!(
            ticket.status,
            TicketStatus::Pendiente | TicketStatus::Llamado | TicketStatus::Espera
        ) {
            return Err(AppError::policy(format!(
                "Ticket is {} and cannot be cancelled",
                ticket.status.as_str()
            )));
        }

        let actor = if ctx.is_admin() {
            None
        } else {
            Some(ctx.operator_id)
        };
        let spec = TransitionSpec::cancel_from(ticket.status, actor);
        match self.tickets.transition(ticket_id, &spec).await? {
            Some(updated) => {
                info!(ticket_id = %updated.id, code = %updated.code, "Ticket cancelled");
                self.publish(ctx, updated.id, TicketEvent::Cancelled, true).await
            }
            None => Err(self.classify_failure(ticket_id, &spec, ctx).await),
        }
    }

    /// Pull-reconciliation snapshot of a queue scope for the operator.
    pub async fn snapshot(
        &self,
        ctx: &OperatorContext,
        branch_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<QueueSnapshot> {
        self.authorize_scope(ctx, branch_id, service_id).await?;

        let pending = self
            .tickets
            .pending_in_scope(branch_id, service_id, self.config.operator_queue_limit)
            .await?;

        let attending = match self.tickets.current_attention(ctx.operator_id).await? {
            Some(t) => self.display.view(t.id).await?,
            None => None,
        };
        let latest_called = match self
            .tickets
            .latest_called(ctx.operator_id, branch_id, service_id)
            .await?
        {
            Some(t) => self.display.view(t.id).await?,
            None => None,
        };

        Ok(QueueSnapshot {
            pending,
            attending,
            latest_called,
        })
    }

    /// Resolves the operator's window-service binding in a scope, or
    /// fails with Authorization.
    async fn authorize_scope(
        &self,
        ctx: &OperatorContext,
        branch_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<turnero_entity::assignment::WindowServiceBinding> {
        let assignment = self
            .assignments
            .active_assignment(ctx.operator_id, branch_id)
            .await?
            .ok_or_else(|| {
                AppError::authorization("Operator has no active window assignment at this branch")
            })?;

        self.assignments
            .binding_for(assignment.branch_window_id, service_id)
            .await?
            .ok_or_else(|| {
                AppError::authorization("Assigned window does not serve the requested service")
            })
    }

    async fn require_ticket(&self, ticket_id: Uuid) -> AppResult<Ticket> {
        self.tickets
            .find(ticket_id)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket not found"))
    }

    fn require_owner(&self, ticket: &Ticket, ctx: &OperatorContext) -> AppResult<()> {
        if ticket.is_owned_by(ctx.operator_id) {
            Ok(())
        } else {
            Err(AppError::authorization(
                "Ticket is not owned by this operator",
            ))
        }
    }

    /// Re-reads the display projection of a committed mutation and
    /// publishes the event, optionally with its ticket:updated
    /// companion.
    async fn publish(
        &self,
        ctx: &OperatorContext,
        ticket_id: Uuid,
        make_event: fn(TicketView) -> TicketEvent,
        with_updated: bool,
    ) -> AppResult<TicketView> {
        let view = self
            .display
            .view(ticket_id)
            .await?
            .ok_or_else(|| AppError::internal("Committed ticket has no display projection"))?;

        self.bus.publish(DomainEvent::new(
            Some(ctx.operator_id),
            make_event(view.clone()),
        ));
        if with_updated {
            self.bus.publish(DomainEvent::new(
                Some(ctx.operator_id),
                TicketEvent::Updated(view.clone()),
            ));
        }
        Ok(view)
    }

    /// Classifies a zero-row conditional transition into the most
    /// specific error by re-reading current state.
    async fn classify_failure(
        &self,
        ticket_id: Uuid,
        spec: &TransitionSpec,
        ctx: &OperatorContext,
    ) -> AppError {
        match self.tickets.find(ticket_id).await {
            Err(e) => e,
            Ok(None) => AppError::not_found("Ticket not found"),
            Ok(Some(current)) => {
                if current.status != spec.expected_status {
                    AppError::policy(format!(
                        "Ticket is {} but {} was required",
                        current.status.as_str(),
                        spec.expected_status.as_str()
                    ))
                } else if current.operator_id.is_some()
                    && !current.is_owned_by(ctx.operator_id)
                {
                    AppError::authorization("Ticket is owned by another operator")
                } else if spec.require_prior_attention
                    && current.attention_started_at.is_none()
                {
                    AppError::policy("Ticket was never in attention")
                } else {
                    AppError::conflict("Ticket was modified concurrently")
                }
            }
        }
    }
}
