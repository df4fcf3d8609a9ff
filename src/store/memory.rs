//! In-memory concurrent ticket store.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::{InterveneError, Result};
use crate::store::TicketStore;
use crate::types::Ticket;

#[derive(Default)]
pub struct MemoryTicketStore {
    tickets: DashMap<String, Ticket>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn get(&self, id: &str) -> Result<Option<Ticket>> {
        Ok(self.tickets.get(id).map(|entry| entry.clone()))
    }

    async fn create(&self, ticket: &Ticket) -> Result<()> {
        if self.tickets.contains_key(&ticket.id) {
            return Err(InterveneError::Other(format!(
                "ticket '{}' already exists",
                ticket.id
            )));
        }
        self.tickets.insert(ticket.id.clone(), ticket.clone());
        Ok(())
    }

    async fn update(&self, ticket: &Ticket) -> Result<()> {
        if !self.tickets.contains_key(&ticket.id) {
            return Err(InterveneError::TicketNotFound(ticket.id.clone()));
        }
        self.tickets.insert(ticket.id.clone(), ticket.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Ticket>> {
        Ok(self.tickets.iter().map(|entry| entry.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;
    use jiff::Timestamp;

    fn ticket(title: &str) -> Ticket {
        let created: Timestamp = "2025-01-15T10:00:00Z".parse().unwrap();
        Ticket::builder(title).build(created)
    }

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let store = MemoryTicketStore::new();
        let mut t = ticket("Door handle loose");
        store.create(&t).await.unwrap();
        assert_eq!(store.len(), 1);

        t.status = Status::Cancelled;
        store.update(&t).await.unwrap();
        assert_eq!(
            store.get(&t.id).await.unwrap().unwrap().status,
            Status::Cancelled
        );
    }

    #[tokio::test]
    async fn test_update_missing_fails() {
        let store = MemoryTicketStore::new();
        let err = store.update(&ticket("Ghost")).await.unwrap_err();
        assert!(matches!(err, InterveneError::TicketNotFound(_)));
    }
}
