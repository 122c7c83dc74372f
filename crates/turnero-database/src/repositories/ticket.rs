//! Ticket repository implementation.
//!
//! Every state mutation is a single conditional UPDATE carrying all of
//! its guard predicates in the WHERE clause. Zero affected rows means
//! "no match"; callers re-read current state to classify the conflict.
//! This replaces row locking entirely.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use turnero_core::error::{AppError, ErrorKind};
use turnero_core::result::AppResult;
use turnero_entity::ticket::{NewTicket, Ticket, TicketStatus, TicketType};

use crate::sequencer;

/// Ownership guard applied by a conditional transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerGuard {
    /// No ownership predicate.
    Any,
    /// The ticket must be unclaimed.
    Unowned,
    /// The ticket must be owned by the given operator.
    Owner(Uuid),
    /// The ticket must be unclaimed or owned by the given operator.
    UnownedOrOwner(Uuid),
}

impl OwnerGuard {
    fn kind(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Unowned => "unowned",
            Self::Owner(_) => "owner",
            Self::UnownedOrOwner(_) => "unowned_or_owner",
        }
    }

    fn operator(&self) -> Option<Uuid> {
        match self {
            Self::Any | Self::Unowned => None,
            Self::Owner(id) | Self::UnownedOrOwner(id) => Some(*id),
        }
    }
}

/// A guarded state transition executed as one conditional UPDATE.
#[derive(Debug, Clone)]
pub struct TransitionSpec {
    /// Required current status.
    pub expected_status: TicketStatus,
    /// Required ownership.
    pub owner: OwnerGuard,
    /// Status to move to (may equal `expected_status` for a recall).
    pub new_status: TicketStatus,
    /// Operator and binding to record on a claim.
    pub claim: Option<(Uuid, Uuid)>,
    /// Refresh `called_at`.
    pub touch_called_at: bool,
    /// Set `attention_started_at` if it is still unset.
    pub start_attention: bool,
    /// Set `attention_finished_at`.
    pub finish_attention: bool,
    /// Set `cancelled_at`.
    pub set_cancelled_at: bool,
    /// Require a prior `attention_started_at` (recall from ESPERA).
    pub require_prior_attention: bool,
}

impl TransitionSpec {
    /// Exclusive claim of an unowned PENDIENTE ticket.
    pub fn claim(operator_id: Uuid, binding_id: Uuid) -> Self {
        Self {
            expected_status: TicketStatus::Pendiente,
            owner: OwnerGuard::Unowned,
            new_status: TicketStatus::Llamado,
            claim: Some((operator_id, binding_id)),
            touch_called_at: true,
            start_attention: false,
            finish_attention: false,
            set_cancelled_at: false,
            require_prior_attention: false,
        }
    }

    /// Recall: refresh `called_at` without changing status.
    pub fn recall_from(status: TicketStatus, operator_id: Uuid) -> Self {
        Self {
            expected_status: status,
            owner: OwnerGuard::Owner(operator_id),
            new_status: status,
            claim: None,
            touch_called_at: true,
            start_attention: false,
            finish_attention: false,
            set_cancelled_at: false,
            require_prior_attention: status == TicketStatus::Espera,
        }
    }

    /// Start (or resume) attention from LLAMADO or ESPERA.
    pub fn start_from(status: TicketStatus, operator_id: Uuid) -> Self {
        Self {
            expected_status: status,
            owner: OwnerGuard::Owner(operator_id),
            new_status: TicketStatus::Atendiendo,
            claim: None,
            touch_called_at: false,
            start_attention: true,
            finish_attention: false,
            set_cancelled_at: false,
            require_prior_attention: false,
        }
    }

    /// Put an in-attention ticket on hold.
    pub fn hold(operator_id: Uuid) -> Self {
        Self {
            expected_status: TicketStatus::Atendiendo,
            owner: OwnerGuard::Owner(operator_id),
            new_status: TicketStatus::Espera,
            claim: None,
            touch_called_at: false,
            start_attention: false,
            finish_attention: false,
            set_cancelled_at: false,
            require_prior_attention: false,
        }
    }

    /// Finish attention.
    pub fn finish(operator_id: Uuid) -> Self {
        Self {
            expected_status: TicketStatus::Atendiendo,
            owner: OwnerGuard::Owner(operator_id),
            new_status: TicketStatus::Finalizado,
            claim: None,
            touch_called_at: false,
            start_attention: false,
            finish_attention: true,
            set_cancelled_at: false,
            require_prior_attention: false,
        }
    }

    /// Cancel from the given non-terminal status.
    ///
    /// With an operator, the ticket must be unclaimed or owned by them;
    /// without one (kiosk/admin path), any ticket in the status matches.
    pub fn cancel_from(status: TicketStatus, operator_id: Option<Uuid>) -> Self {
        Self {
            expected_status: status,
            owner: match operator_id {
                Some(id) => OwnerGuard::UnownedOrOwner(id),
                None => OwnerGuard::Any,
            },
            new_status: TicketStatus::Cancelado,
            claim: None,
            touch_called_at: false,
            start_attention: false,
            finish_attention: false,
            set_cancelled_at: true,
            require_prior_attention: false,
        }
    }
}

/// Repository for ticket persistence and conditional transitions.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a ticket by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ticket", e))
    }

    /// Issue a new PENDIENTE ticket, generating its code under the
    /// partition advisory lock inside one transaction.
    pub async fn issue(
        &self,
        ticket_type: TicketType,
        branch_id: Uuid,
        service_id: Uuid,
        package_code: Option<String>,
    ) -> AppResult<Ticket> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let code = sequencer::next_code(&mut tx, ticket_type, branch_id, Utc::now()).await?;

        let new = NewTicket {
            code,
            package_code,
            ticket_type,
            branch_id,
            service_id,
        };
        let ticket = Self::insert_pending(&mut tx, &new).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit ticket issuance", e)
        })?;

        Ok(ticket)
    }

    /// Insert a PENDIENTE ticket within an open transaction.
    pub async fn insert_pending(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        new: &NewTicket,
    ) -> AppResult<Ticket> {
        sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (code, package_code, type, status, branch_id, service_id) \
             VALUES ($1, $2, $3, 'PENDIENTE', $4, $5) RETURNING *",
        )
        .bind(&new.code)
        .bind(&new.package_code)
        .bind(new.ticket_type)
        .bind(new.branch_id)
        .bind(new.service_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert ticket", e))
    }

    /// Claimable candidate IDs in a (branch, service) scope:
    /// PREFERENCIAL before REGULAR, then creation order.
    pub async fn claim_candidates(
        &self,
        branch_id: Uuid,
        service_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT id FROM tickets \
             WHERE branch_id = $1 AND service_id = $2 AND status = 'PENDIENTE' \
               AND operator_id IS NULL AND branch_window_service_id IS NULL \
             ORDER BY CASE WHEN type = 'PREFERENCIAL' THEN 0 ELSE 1 END, created_at ASC \
             LIMIT $3",
        )
        .bind(branch_id)
        .bind(service_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to select claim candidates", e)
        })
    }

    /// Execute a guarded transition as one conditional UPDATE.
    ///
    /// Returns the updated row, or `None` when no row matched every
    /// guard (wrong state, wrong owner, or lost race).
    pub async fn transition(&self, ticket_id: Uuid, spec: &TransitionSpec) -> AppResult<Option<Ticket>> {
        let (claim_operator, claim_binding) = match spec.claim {
            Some((operator, binding)) => (Some(operator), Some(binding)),
            None => (None, None),
        };

        sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET \
                status = $2, \
                operator_id = COALESCE($3, operator_id), \
                branch_window_service_id = COALESCE($4, branch_window_service_id), \
                called_at = CASE WHEN $5 THEN NOW() ELSE called_at END, \
                attention_started_at = CASE WHEN $6 \
                    THEN COALESCE(attention_started_at, NOW()) \
                    ELSE attention_started_at END, \
                attention_finished_at = CASE WHEN $7 THEN NOW() ELSE attention_finished_at END, \
                cancelled_at = CASE WHEN $8 THEN NOW() ELSE cancelled_at END, \
                updated_at = NOW() \
             WHERE id = $1 \
               AND status = $9 \
               AND ($10 = FALSE OR attention_started_at IS NOT NULL) \
               AND CASE $11 \
                     WHEN 'any' THEN TRUE \
                     WHEN 'unowned' THEN operator_id IS NULL \
                     WHEN 'owner' THEN operator_id = $12 \
                     ELSE operator_id IS NULL OR operator_id = $12 \
                   END \
             RETURNING *",
        )
        .bind(ticket_id)
        .bind(spec.new_status)
        .bind(claim_operator)
        .bind(claim_binding)
        .bind(spec.touch_called_at)
        .bind(spec.start_attention)
        .bind(spec.finish_attention)
        .bind(spec.set_cancelled_at)
        .bind(spec.expected_status)
        .bind(spec.require_prior_attention)
        .bind(spec.owner.kind())
        .bind(spec.owner.operator())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            // The partial unique index on attending operators rejects a
            // second concurrent move into ATENDIENDO.
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                AppError::conflict("Operator already has a ticket in attention")
            } else {
                AppError::with_source(
                    ErrorKind::Database,
                    "Failed to execute ticket transition",
                    e,
                )
            }
        })
    }

    /// Count the operator's in-flight ATENDIENDO tickets.
    pub async fn count_attending(&self, operator_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets \
             WHERE operator_id = $1 AND status = 'ATENDIENDO' AND attention_finished_at IS NULL",
        )
        .bind(operator_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count attending tickets", e)
        })
    }

    /// Count the operator's tickets currently in ESPERA.
    pub async fn count_espera(&self, operator_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets WHERE operator_id = $1 AND status = 'ESPERA'",
        )
        .bind(operator_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count held tickets", e)
        })
    }

    /// Whether the operator has another LLAMADO or ATENDIENDO ticket
    /// besides the given one.
    pub async fn has_other_active_call(
        &self,
        operator_id: Uuid,
        excluding: Uuid,
    ) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tickets \
             WHERE operator_id = $1 AND id <> $2 \
               AND status IN ('LLAMADO', 'ATENDIENDO')",
        )
        .bind(operator_id)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to check active calls", e)
        })?;
        Ok(count > 0)
    }

    /// Unclaimed PENDIENTE tickets in a scope, in call order.
    pub async fn pending_in_scope(
        &self,
        branch_id: Uuid,
        service_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets \
             WHERE branch_id = $1 AND service_id = $2 AND status = 'PENDIENTE' \
               AND operator_id IS NULL AND branch_window_service_id IS NULL \
             ORDER BY CASE WHEN type = 'PREFERENCIAL' THEN 0 ELSE 1 END, created_at ASC \
             LIMIT $3",
        )
        .bind(branch_id)
        .bind(service_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list pending tickets", e)
        })
    }

    /// The ticket the operator is currently attending, if any.
    pub async fn current_attention(&self, operator_id: Uuid) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets \
             WHERE operator_id = $1 AND status = 'ATENDIENDO' AND attention_finished_at IS NULL \
             LIMIT 1",
        )
        .bind(operator_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find attending ticket", e)
        })
    }

    /// The operator's most recently called ticket in a scope.
    pub async fn latest_called(
        &self,
        operator_id: Uuid,
        branch_id: Uuid,
        service_id: Uuid,
    ) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets \
             WHERE operator_id = $1 AND branch_id = $2 AND service_id = $3 AND status = 'LLAMADO' \
             ORDER BY called_at DESC NULLS LAST, created_at DESC LIMIT 1",
        )
        .bind(operator_id)
        .bind(branch_id)
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find latest called ticket", e)
        })
    }
}
