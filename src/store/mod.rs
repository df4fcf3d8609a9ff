//! Ticket persistence seam.
//!
//! The lifecycle controller talks to storage only through [`TicketStore`].
//! The file-backed store keeps one JSON document per ticket under the
//! data root; the in-memory store backs tests and ephemeral runs.

mod file;
mod memory;

pub use file::FileTicketStore;
pub use memory::MemoryTicketStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Ticket;

/// Document store for tickets.
///
/// Contract the controller relies on: concurrent status changes for the
/// same ticket are serialized by the store (single writer per ticket),
/// so a transition always validates against the latest persisted status.
/// The core never locks.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Fetch a ticket by ID, `None` when absent.
    async fn get(&self, id: &str) -> Result<Option<Ticket>>;

    /// Persist a new ticket. Fails if the ID is already taken.
    async fn create(&self, ticket: &Ticket) -> Result<()>;

    /// Replace an existing ticket. Fails with `TicketNotFound` when the
    /// ticket was never created.
    async fn update(&self, ticket: &Ticket) -> Result<()>;

    /// All tickets, in unspecified order.
    async fn list(&self) -> Result<Vec<Ticket>>;
}
