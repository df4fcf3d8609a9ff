//! JSON-file ticket store: one document per ticket under
//! `<root>/tickets/<id>.json`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{InterveneError, Result};
use crate::store::TicketStore;
use crate::types::Ticket;

const TICKETS_SUBDIR: &str = "tickets";

pub struct FileTicketStore {
    dir: PathBuf,
}

impl FileTicketStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join(TICKETS_SUBDIR),
        }
    }

    fn ticket_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn write_ticket(&self, ticket: &Ticket) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(ticket)?;
        tokio::fs::write(self.ticket_path(&ticket.id), json).await?;
        Ok(())
    }
}

#[async_trait]
impl TicketStore for FileTicketStore {
    async fn get(&self, id: &str) -> Result<Option<Ticket>> {
        let path = self.ticket_path(id);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, ticket: &Ticket) -> Result<()> {
        if self.get(&ticket.id).await?.is_some() {
            return Err(InterveneError::Other(format!(
                "ticket '{}' already exists",
                ticket.id
            )));
        }
        self.write_ticket(ticket).await
    }

    async fn update(&self, ticket: &Ticket) -> Result<()> {
        if self.get(&ticket.id).await?.is_none() {
            return Err(InterveneError::TicketNotFound(ticket.id.clone()));
        }
        self.write_ticket(ticket).await
    }

    async fn list(&self) -> Result<Vec<Ticket>> {
        let mut tickets = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(tickets),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let content = tokio::fs::read_to_string(&path).await?;
            match serde_json::from_str::<Ticket>(&content) {
                Ok(ticket) => tickets.push(ticket),
                Err(e) => {
                    tracing::warn!("skipping unreadable ticket {}: {e}", path.display());
                }
            }
        }

        Ok(tickets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Priority, Status};
    use jiff::Timestamp;

    fn ticket(title: &str) -> Ticket {
        let created: Timestamp = "2025-01-15T10:00:00Z".parse().unwrap();
        Ticket::builder(title)
            .category(Category::Electrical)
            .priority(Priority::High)
            .build(created)
    }

    #[tokio::test]
    async fn test_create_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTicketStore::new(dir.path());

        let t = ticket("Socket sparking in 312");
        store.create(&t).await.unwrap();

        let loaded = store.get(&t.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Socket sparking in 312");
        assert_eq!(loaded.priority, Priority::High);
        assert_eq!(loaded.created_at, t.created_at);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTicketStore::new(dir.path());
        assert!(store.get("elc-nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTicketStore::new(dir.path());

        let t = ticket("Dup");
        store.create(&t).await.unwrap();
        assert!(store.create(&t).await.is_err());
    }

    #[tokio::test]
    async fn test_update_requires_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTicketStore::new(dir.path());

        let mut t = ticket("Ghost");
        let err = store.update(&t).await.unwrap_err();
        assert!(matches!(err, InterveneError::TicketNotFound(_)));

        store.create(&t).await.unwrap();
        t.status = Status::Assigned;
        store.update(&t).await.unwrap();
        assert_eq!(
            store.get(&t.id).await.unwrap().unwrap().status,
            Status::Assigned
        );
    }

    #[tokio::test]
    async fn test_list_skips_non_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTicketStore::new(dir.path());

        store.create(&ticket("One")).await.unwrap();
        store.create(&ticket("Two")).await.unwrap();
        std::fs::write(dir.path().join("tickets/README.md"), "not a ticket").unwrap();

        let tickets = store.list().await.unwrap();
        assert_eq!(tickets.len(), 2);
    }
}
