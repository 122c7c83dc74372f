//! Concrete repository implementations over the PostgreSQL pool.

pub mod assignment;
pub mod catalog;
pub mod display;
pub mod ticket;
