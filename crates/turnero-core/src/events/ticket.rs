//! Ticket lifecycle events and the denormalized display payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Denormalized ticket view broadcast to rooms and returned by pull
/// queries.
///
/// Built by re-reading the joined projection after every successful
/// mutation; never assembled from the raw update result, so observers
/// always see branch/service/window names consistent with the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    /// Ticket ID.
    pub id: Uuid,
    /// Human-readable code, e.g. `P0007`.
    pub code: String,
    /// Optional package code printed on the ticket. Omitted from the
    /// wire entirely when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_code: Option<String>,
    /// `REGULAR` or `PREFERENCIAL`.
    pub ticket_type: String,
    /// Current lifecycle status.
    pub status: String,
    /// Branch the ticket belongs to.
    pub branch_id: Uuid,
    /// Branch display name.
    pub branch_name: String,
    /// Service the ticket was drawn for.
    pub service_id: Uuid,
    /// Service display name.
    pub service_name: String,
    /// Short service code shown on displays.
    pub service_code: String,
    /// Window serving the ticket (set once claimed).
    pub window_id: Option<Uuid>,
    /// Window display name.
    pub window_name: Option<String>,
    /// When the ticket was last called.
    pub called_at: Option<DateTime<Utc>>,
    /// When the ticket was created.
    pub created_at: DateTime<Utc>,
}

impl TicketView {
    /// The subset safe for open public displays: the package code is
    /// dropped.
    pub fn public_subset(&self) -> TicketView {
        TicketView {
            package_code: None,
            ..self.clone()
        }
    }
}

/// A lifecycle event on a single ticket.
///
/// The serde tag doubles as the wire event name delivered to rooms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "ticket")]
pub enum TicketEvent {
    /// A customer drew a new ticket.
    #[serde(rename = "ticket:created")]
    Created(TicketView),
    /// An operator claimed the ticket (or a recall refreshed the call).
    #[serde(rename = "ticket:called")]
    Called(TicketView),
    /// The operator repeated the call for an unresponsive customer.
    #[serde(rename = "ticket:recalled")]
    Recalled(TicketView),
    /// Attention started at the window.
    #[serde(rename = "ticket:started")]
    Started(TicketView),
    /// The ticket was put on hold (ESPERA).
    #[serde(rename = "ticket:held")]
    Held(TicketView),
    /// Attention finished; the ticket is closed.
    #[serde(rename = "ticket:finished")]
    Finished(TicketView),
    /// The ticket was cancelled.
    #[serde(rename = "ticket:cancelled")]
    Cancelled(TicketView),
    /// Generic companion event emitted alongside every mutation.
    #[serde(rename = "ticket:updated")]
    Updated(TicketView),
}

impl TicketEvent {
    /// The wire event name, e.g. `ticket:called`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created(_) => "ticket:created",
            Self::Called(_) => "ticket:called",
            Self::Recalled(_) => "ticket:recalled",
            Self::Started(_) => "ticket:started",
            Self::Held(_) => "ticket:held",
            Self::Finished(_) => "ticket:finished",
            Self::Cancelled(_) => "ticket:cancelled",
            Self::Updated(_) => "ticket:updated",
        }
    }

    /// The display payload carried by the event.
    pub fn view(&self) -> &TicketView {
        match self {
            Self::Created(v)
            | Self::Called(v)
            | Self::Recalled(v)
            | Self::Started(v)
            | Self::Held(v)
            | Self::Finished(v)
            | Self::Cancelled(v)
            | Self::Updated(v) => v,
        }
    }
}
