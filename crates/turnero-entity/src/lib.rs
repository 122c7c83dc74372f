//! # turnero-entity
//!
//! Domain entity models for Turnero: tickets and their lifecycle
//! state machine, the branch/service/window catalog, and operator
//! window assignments.

pub mod assignment;
pub mod catalog;
pub mod ticket;

pub use assignment::{OperatorWindowAssignment, WindowServiceBinding};
pub use catalog::{Branch, BranchWindow, Service, Window};
pub use ticket::{NewTicket, Ticket, TicketStatus, TicketType};
