//! Ticket entity model and lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Customer class a ticket belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketType {
    /// Regular queue.
    Regular,
    /// Priority queue (elderly, pregnant, disabled); always served first.
    Preferencial,
}

impl TicketType {
    /// Code prefix letter for this type.
    pub fn prefix(self) -> char {
        match self {
            Self::Regular => 'R',
            Self::Preferencial => 'P',
        }
    }

    /// Discriminant used in the sequencer partition key.
    pub fn partition_discriminant(self) -> u32 {
        match self {
            Self::Regular => 1,
            Self::Preferencial => 2,
        }
    }

    /// Uppercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Preferencial => "PREFERENCIAL",
        }
    }
}

/// Ticket lifecycle status.
///
/// The legal transition graph is encoded in [`TicketStatus::can_transition`];
/// every mutation in the system moves along exactly one edge of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    /// Waiting in the queue, unclaimed.
    Pendiente,
    /// Claimed and called to a window.
    Llamado,
    /// Being attended at the window.
    Atendiendo,
    /// Attention paused; the ticket is on hold.
    Espera,
    /// Attention completed (terminal).
    Finalizado,
    /// Cancelled (terminal).
    Cancelado,
}

impl TicketStatus {
    /// Whether `self → to` is an edge of the lifecycle graph.
    pub fn can_transition(self, to: TicketStatus) -> bool {
        matches!(
            (self, to),
            (Self::Pendiente, Self::Llamado)
                | (Self::Llamado, Self::Atendiendo)
                | (Self::Llamado, Self::Cancelado)
                | (Self::Atendiendo, Self::Espera)
                | (Self::Espera, Self::Atendiendo)
                | (Self::Atendiendo, Self::Finalizado)
                | (Self::Pendiente, Self::Cancelado)
                | (Self::Espera, Self::Cancelado)
        )
    }

    /// Whether the status is terminal (no outgoing edges).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalizado | Self::Cancelado)
    }

    /// Uppercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "PENDIENTE",
            Self::Llamado => "LLAMADO",
            Self::Atendiendo => "ATENDIENDO",
            Self::Espera => "ESPERA",
            Self::Finalizado => "FINALIZADO",
            Self::Cancelado => "CANCELADO",
        }
    }
}

/// A customer's place in a service queue.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// Unique ticket identifier.
    pub id: Uuid,
    /// Human-readable code, unique per (day, branch, type).
    pub code: String,
    /// Optional package code printed on the ticket.
    pub package_code: Option<String>,
    /// Customer class.
    #[sqlx(rename = "type")]
    pub ticket_type: TicketType,
    /// Lifecycle status.
    pub status: TicketStatus,
    /// Branch the ticket was drawn at.
    pub branch_id: Uuid,
    /// Service the ticket was drawn for.
    pub service_id: Uuid,
    /// Window-service binding the ticket was claimed to.
    pub branch_window_service_id: Option<Uuid>,
    /// Operator who claimed the ticket.
    pub operator_id: Option<Uuid>,

    // -- Set-once lifecycle timestamps (called_at may be refreshed by recall) --
    /// When the ticket was last called.
    pub called_at: Option<DateTime<Utc>>,
    /// When attention first started (a resume never resets it).
    pub attention_started_at: Option<DateTime<Utc>>,
    /// When attention finished.
    pub attention_finished_at: Option<DateTime<Utc>>,
    /// When the ticket was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,

    /// When the ticket was created.
    pub created_at: DateTime<Utc>,
    /// When the ticket was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Whether the ticket is unclaimed and eligible for call-next.
    pub fn is_claimable(&self) -> bool {
        self.status == TicketStatus::Pendiente
            && self.operator_id.is_none()
            && self.branch_window_service_id.is_none()
    }

    /// Whether the given operator owns this ticket.
    pub fn is_owned_by(&self, operator_id: Uuid) -> bool {
        self.operator_id == Some(operator_id)
    }
}

/// Insert payload for a freshly issued PENDIENTE ticket.
#[derive(Debug, Clone)]
pub struct NewTicket {
    /// Generated human-readable code.
    pub code: String,
    /// Optional package code.
    pub package_code: Option<String>,
    /// Customer class.
    pub ticket_type: TicketType,
    /// Branch the ticket is drawn at.
    pub branch_id: Uuid,
    /// Service the ticket is drawn for.
    pub service_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TicketStatus; 6] = [
        TicketStatus::Pendiente,
        TicketStatus::Llamado,
        TicketStatus::Atendiendo,
        TicketStatus::Espera,
        TicketStatus::Finalizado,
        TicketStatus::Cancelado,
    ];

    #[test]
    fn transition_graph_accepts_exactly_the_legal_edges() {
        let legal = [
            (TicketStatus::Pendiente, TicketStatus::Llamado),
            (TicketStatus::Llamado, TicketStatus::Atendiendo),
            (TicketStatus::Llamado, TicketStatus::Cancelado),
            (TicketStatus::Atendiendo, TicketStatus::Espera),
            (TicketStatus::Espera, TicketStatus::Atendiendo),
            (TicketStatus::Atendiendo, TicketStatus::Finalizado),
            (TicketStatus::Pendiente, TicketStatus::Cancelado),
            (TicketStatus::Espera, TicketStatus::Cancelado),
        ];

        for from in ALL {
            for to in ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition(to),
                    expected,
                    "{} -> {}",
                    from.as_str(),
                    to.as_str()
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in [TicketStatus::Finalizado, TicketStatus::Cancelado] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition(to));
            }
        }
    }

    #[test]
    fn type_prefixes_match_code_format() {
        assert_eq!(TicketType::Regular.prefix(), 'R');
        assert_eq!(TicketType::Preferencial.prefix(), 'P');
        assert_ne!(
            TicketType::Regular.partition_discriminant(),
            TicketType::Preferencial.partition_discriminant()
        );
    }
}
