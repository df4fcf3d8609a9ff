//! Ticket lifecycle orchestration.
//!
//! The controller validates a status-change request against the workflow
//! policy, applies timestamps, recomputes the SLA cache, persists through
//! the store seam, and appends history. Validation failures block the
//! whole operation; only history appends are best-effort.

use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use serde_json::json;

use crate::clock::Clock;
use crate::error::{InterveneError, Result};
use crate::events::{EventType, HistoryEvent, HistorySink};
use crate::recurrence::{self, RecurrenceRule};
use crate::sla::{self, SlaRecord};
use crate::store::TicketStore;
use crate::types::{Category, Priority, Status, Ticket, TicketBuilder};
use crate::workflow;

/// Resolves a user ID to a display name for history entries. Decoration
/// only; never part of transition or SLA decisions.
pub trait NameResolver: Send + Sync {
    fn display_name(&self, user_id: &str) -> String;
}

/// Passes user IDs through unchanged.
#[derive(Default)]
pub struct IdentityResolver;

impl NameResolver for IdentityResolver {
    fn display_name(&self, user_id: &str) -> String {
        user_id.to_string()
    }
}

/// A status-change request. `confirmed` must be set to re-submit a
/// transition that asked for confirmation.
#[derive(Debug, Clone)]
pub struct ChangeRequest {
    pub actor_id: String,
    pub confirmed: bool,
    pub resolution_notes: Option<String>,
    pub assignee: Option<String>,
}

impl ChangeRequest {
    pub fn by(actor_id: impl Into<String>) -> Self {
        ChangeRequest {
            actor_id: actor_id.into(),
            confirmed: false,
            resolution_notes: None,
            assignee: None,
        }
    }

    pub fn confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    pub fn resolution_notes(mut self, notes: Option<impl Into<String>>) -> Self {
        self.resolution_notes = notes.map(|n| n.into());
        self
    }

    pub fn assignee(mut self, assignee: Option<impl Into<String>>) -> Self {
        self.assignee = assignee.map(|a| a.into());
        self
    }
}

/// Outcome of an applied status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub ticket: Ticket,
    pub from: Status,
    pub to: Status,
    /// SLA recomputed at apply time, when derivable.
    pub sla: Option<SlaRecord>,
}

/// Template for the tickets of a recurring series. Each occurrence gets
/// its own ticket built from this.
#[derive(Debug, Clone)]
pub struct SeriesTemplate {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub room: Option<String>,
    pub priority: Priority,
    pub sla_target: Option<i64>,
}

/// Outcome of a committed recurring series.
#[derive(Debug, Clone)]
pub struct SeriesCreated {
    pub group_id: String,
    pub tickets: Vec<Ticket>,
    pub description: String,
}

pub struct LifecycleController<S, H, C, N> {
    store: S,
    history: H,
    clock: C,
    names: N,
}

impl<S, H, C, N> LifecycleController<S, H, C, N>
where
    S: TicketStore,
    H: HistorySink,
    C: Clock,
    N: NameResolver,
{
    pub fn new(store: S, history: H, clock: C, names: N) -> Self {
        Self {
            store,
            history,
            clock,
            names,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    async fn load(&self, id: &str) -> Result<Ticket> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| InterveneError::TicketNotFound(id.to_string()))
    }

    /// History appends never fail the primary operation.
    async fn record(&self, event: HistoryEvent) {
        let ticket_id = event.ticket_id.clone();
        if let Err(e) = self.history.append(event).await {
            tracing::warn!("history append failed for {ticket_id}: {e}");
        }
    }

    /// Create a single ticket and record its creation.
    pub async fn create_ticket(&self, builder: TicketBuilder, actor_id: &str) -> Result<Ticket> {
        let now = self.clock.now();
        let ticket = builder.build(now);
        self.store.create(&ticket).await?;

        let actor_name = self.names.display_name(actor_id);
        self.record(
            HistoryEvent::new(EventType::TicketCreated, &ticket.id, actor_id, actor_name, now)
                .with_data(json!({
                    "title": ticket.title,
                    "category": ticket.category.to_string(),
                    "priority": ticket.priority.to_string(),
                    "room": ticket.room,
                })),
        )
        .await;

        Ok(ticket)
    }

    /// Request a status change for a ticket.
    ///
    /// Errors come back synchronously, before anything is written:
    /// `InvalidTransition` when the move is not in the allowed set,
    /// `AssignmentRequired` when marking assigned with no technician,
    /// `ConfirmationRequired` when the move needs explicit confirmation
    /// and the request was not confirmed.
    pub async fn request_status_change(
        &self,
        id: &str,
        new_status: Status,
        request: &ChangeRequest,
    ) -> Result<StatusChange> {
        let mut ticket = self.load(id).await?;
        let from = ticket.status;

        if !workflow::is_transition_allowed(from, new_status) {
            let allowed = workflow::allowed_transitions(from)
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(InterveneError::InvalidTransition {
                from,
                to: new_status,
                allowed,
            });
        }

        if new_status == Status::Assigned
            && ticket.assignee.is_none()
            && request.assignee.is_none()
        {
            return Err(InterveneError::AssignmentRequired(ticket.id.clone()));
        }

        if let Some(message) = workflow::confirmation_message(from, new_status)
            && !request.confirmed
        {
            return Err(InterveneError::ConfirmationRequired(message.to_string()));
        }

        let now = self.clock.now();

        if let Some(assignee) = &request.assignee {
            ticket.assignee = Some(assignee.clone());
            if ticket.assigned_at.is_none() {
                ticket.assigned_at = Some(now);
            }
        }

        ticket.status = new_status;
        match new_status {
            Status::InProgress => {
                // First entry into in_progress stamps the start; a ticket
                // resumed from on_hold keeps its original start time.
                if ticket.started_at.is_none() {
                    ticket.started_at = Some(now);
                }
                // Reopened work is no longer complete.
                ticket.completed_at = None;
            }
            Status::Completed => {
                ticket.completed_at = Some(now);
                if let Some(notes) = &request.resolution_notes {
                    ticket.resolution_notes = Some(notes.clone());
                }
            }
            _ => {}
        }

        // Refresh the cached classification; the record stays derived.
        let sla = match sla::calculate(&ticket, now) {
            Ok(record) => {
                ticket.sla_status = Some(record.status);
                Some(record)
            }
            Err(e) => {
                tracing::warn!("SLA not recomputed for {}: {e}", ticket.id);
                None
            }
        };

        self.store.update(&ticket).await?;

        let actor_name = self.names.display_name(&request.actor_id);
        let mut event = HistoryEvent::new(
            EventType::StatusChange,
            &ticket.id,
            &request.actor_id,
            actor_name,
            now,
        )
        .with_values(Some(from.to_string()), Some(new_status.to_string()));
        if let Some(notes) = &request.resolution_notes {
            event = event.with_data(json!({ "resolution_notes": notes }));
        }
        self.record(event).await;

        Ok(StatusChange {
            ticket,
            from,
            to: new_status,
            sla,
        })
    }

    /// Assign a technician without changing status.
    pub async fn assign(&self, id: &str, technician: &str, actor_id: &str) -> Result<Ticket> {
        let mut ticket = self.load(id).await?;
        let previous = ticket.assignee.clone();

        let now = self.clock.now();
        ticket.assignee = Some(technician.to_string());
        if ticket.assigned_at.is_none() {
            ticket.assigned_at = Some(now);
        }
        self.store.update(&ticket).await?;

        let actor_name = self.names.display_name(actor_id);
        let technician_name = self.names.display_name(technician);
        self.record(
            HistoryEvent::new(EventType::Assigned, &ticket.id, actor_id, actor_name, now)
                .with_values(previous, Some(technician.to_string()))
                .with_data(json!({ "technician_name": technician_name })),
        )
        .await;

        Ok(ticket)
    }

    /// Add a comment; the first one stamps the response-time marker.
    pub async fn add_comment(&self, id: &str, text: &str, actor_id: &str) -> Result<Ticket> {
        let mut ticket = self.load(id).await?;

        let now = self.clock.now();
        if ticket.first_comment_at.is_none() {
            ticket.first_comment_at = Some(now);
        }
        self.store.update(&ticket).await?;

        let actor_name = self.names.display_name(actor_id);
        self.record(
            HistoryEvent::new(EventType::CommentAdded, &ticket.id, actor_id, actor_name, now)
                .with_data(json!({ "content_preview": preview(text) })),
        )
        .await;

        Ok(ticket)
    }

    /// SLA record for one ticket, computed at the current instant.
    pub async fn sla_report(&self, id: &str) -> Result<(Ticket, SlaRecord)> {
        let ticket = self.load(id).await?;
        let record = sla::calculate(&ticket, self.clock.now())?;
        Ok((ticket, record))
    }

    /// SLA records for every non-cancelled ticket. Tickets without a
    /// creation time are skipped with a warning.
    pub async fn sla_overview(&self) -> Result<Vec<(Ticket, SlaRecord)>> {
        let now = self.clock.now();
        let mut rows = Vec::new();
        for ticket in self.store.list().await? {
            if ticket.status == Status::Cancelled {
                continue;
            }
            match sla::calculate(&ticket, now) {
                Ok(record) => rows.push((ticket, record)),
                Err(e) => tracing::warn!("skipping SLA for {}: {e}", ticket.id),
            }
        }
        Ok(rows)
    }

    /// Materialize a recurring series: validate the rule, expand the
    /// occurrence dates, and create one ticket per occurrence sharing a
    /// fresh group ID. Validation failures and empty expansions commit
    /// nothing.
    pub async fn create_recurring_series(
        &self,
        template: &SeriesTemplate,
        rule: &RecurrenceRule,
        start: DateTime,
        actor_id: &str,
    ) -> Result<SeriesCreated> {
        let dates = recurrence::expand(start, rule)?;
        if dates.is_empty() {
            return Err(InterveneError::EmptySeries);
        }

        let group_id = recurrence::new_group_id();
        let now = self.clock.now();
        let actor_name = self.names.display_name(actor_id);

        let mut tickets = Vec::with_capacity(dates.len());
        for (index, occurrence) in dates.iter().enumerate() {
            let due = occurrence.to_zoned(TimeZone::UTC)?.timestamp();
            let ticket = Ticket::builder(&template.title)
                .description(template.description.as_deref())
                .category(template.category)
                .room(template.room.as_deref())
                .priority(template.priority)
                .sla_target(template.sla_target)
                .due_date(Some(due))
                .recurrence_group(Some(&group_id))
                .occurrence_index(Some(index))
                .build(now);

            self.store.create(&ticket).await?;
            self.record(
                HistoryEvent::new(
                    EventType::TicketCreated,
                    &ticket.id,
                    actor_id,
                    actor_name.clone(),
                    now,
                )
                .with_data(json!({
                    "title": ticket.title,
                    "recurrence_group": group_id,
                    "occurrence_index": index,
                    "due_date": due.to_string(),
                })),
            )
            .await;
            tickets.push(ticket);
        }

        self.record(
            HistoryEvent::new(EventType::SeriesCreated, &group_id, actor_id, &actor_name, now)
                .with_data(json!({
                    "occurrences": tickets.len(),
                    "rule": rule.describe(),
                })),
        )
        .await;

        Ok(SeriesCreated {
            group_id,
            tickets,
            description: rule.describe(),
        })
    }
}

/// Truncate comment text for history previews.
fn preview(text: &str) -> String {
    const MAX: usize = 100;
    if text.len() <= MAX {
        return text.to_string();
    }
    let end = text
        .char_indices()
        .nth(MAX - 3)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    format!("{}...", &text[..end])
}
