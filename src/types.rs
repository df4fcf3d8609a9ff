use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InterveneError;
use crate::sla::SlaStatus;

/// Lifecycle status of a maintenance ticket.
///
/// The set is closed: transition rules, ordering and confirmation policy
/// all live in exhaustive matches (see `workflow`), so adding a status
/// forces every consumer to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    Assigned,
    InProgress,
    OnHold,
    Completed,
    Validated,
    Cancelled,
}

impl Status {
    /// Human label for display surfaces.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Assigned => "Assigned",
            Status::InProgress => "In progress",
            Status::OnHold => "On hold",
            Status::Completed => "Completed",
            Status::Validated => "Validated",
            Status::Cancelled => "Cancelled",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Status::Pending => "Created, waiting for assignment",
            Status::Assigned => "Assigned to a technician",
            Status::InProgress => "Work underway",
            Status::OnHold => "Temporarily suspended",
            Status::Completed => "Done, awaiting validation",
            Status::Validated => "Validated and closed",
            Status::Cancelled => "Cancelled",
        }
    }

    /// True once no further work is expected (still reopenable).
    pub fn is_closed(&self) -> bool {
        matches!(self, Status::Completed | Status::Validated | Status::Cancelled)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pending => write!(f, "pending"),
            Status::Assigned => write!(f, "assigned"),
            Status::InProgress => write!(f, "in_progress"),
            Status::OnHold => write!(f, "on_hold"),
            Status::Completed => write!(f, "completed"),
            Status::Validated => write!(f, "validated"),
            Status::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for Status {
    type Err = InterveneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Status::Pending),
            "assigned" => Ok(Status::Assigned),
            "in_progress" => Ok(Status::InProgress),
            "on_hold" => Ok(Status::OnHold),
            "completed" => Ok(Status::Completed),
            "validated" => Ok(Status::Validated),
            "cancelled" => Ok(Status::Cancelled),
            _ => Err(InterveneError::InvalidStatus(s.to_string())),
        }
    }
}

pub const VALID_STATUSES: &[&str] = &[
    "pending",
    "assigned",
    "in_progress",
    "on_hold",
    "completed",
    "validated",
    "cancelled",
];

/// Ticket priority. Each level maps to a fixed SLA target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
    Critical,
}

impl Priority {
    /// SLA resolution target in minutes.
    pub fn target_minutes(&self) -> i64 {
        match self {
            Priority::Low => 24 * 60,
            Priority::Normal => 8 * 60,
            Priority::High => 4 * 60,
            Priority::Urgent => 2 * 60,
            Priority::Critical => 60,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Normal => write!(f, "normal"),
            Priority::High => write!(f, "high"),
            Priority::Urgent => write!(f, "urgent"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for Priority {
    type Err = InterveneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            "critical" => Ok(Priority::Critical),
            _ => Err(InterveneError::InvalidPriority(s.to_string())),
        }
    }
}

pub const VALID_PRIORITIES: &[&str] = &["low", "normal", "high", "urgent", "critical"];

/// Trade category of an intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Plumbing,
    Electrical,
    Hvac,
    Locksmith,
    Painting,
    Furniture,
    #[default]
    Other,
}

impl Category {
    /// Short code used as ticket ID prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Plumbing => "plb",
            Category::Electrical => "elc",
            Category::Hvac => "hvc",
            Category::Locksmith => "lck",
            Category::Painting => "pnt",
            Category::Furniture => "frn",
            Category::Other => "gen",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Plumbing => write!(f, "plumbing"),
            Category::Electrical => write!(f, "electrical"),
            Category::Hvac => write!(f, "hvac"),
            Category::Locksmith => write!(f, "locksmith"),
            Category::Painting => write!(f, "painting"),
            Category::Furniture => write!(f, "furniture"),
            Category::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Category {
    type Err = InterveneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plumbing" => Ok(Category::Plumbing),
            "electrical" => Ok(Category::Electrical),
            "hvac" => Ok(Category::Hvac),
            "locksmith" => Ok(Category::Locksmith),
            "painting" => Ok(Category::Painting),
            "furniture" => Ok(Category::Furniture),
            "other" => Ok(Category::Other),
            _ => Err(InterveneError::InvalidCategory(s.to_string())),
        }
    }
}

pub const VALID_CATEGORIES: &[&str] = &[
    "plumbing",
    "electrical",
    "hvac",
    "locksmith",
    "painting",
    "furniture",
    "other",
];

/// A maintenance intervention record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Category,

    /// Room or location within the establishment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,

    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub priority: Priority,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_comment_at: Option<Timestamp>,

    /// Custom deadline. Overrides the priority-based SLA due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Timestamp>,

    /// Custom SLA target in minutes. Overrides the priority default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_target: Option<i64>,

    /// Cached SLA classification from the last recomputation. Never
    /// authoritative; readers recompute from ticket fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_status: Option<SlaStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,

    /// Group identifier shared by all tickets of a recurring series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_group: Option<String>,

    /// Position of this ticket within its recurring series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_index: Option<usize>,
}

impl Ticket {
    pub fn builder(title: impl Into<String>) -> TicketBuilder {
        TicketBuilder::new(title)
    }

    /// True once the ticket no longer counts toward SLA monitoring.
    pub fn is_sla_exempt(&self) -> bool {
        matches!(self.status, Status::Completed | Status::Validated | Status::Cancelled)
    }
}

/// Builder for new tickets. The ID and creation timestamp are filled in
/// at build time so callers only describe the work.
pub struct TicketBuilder {
    title: String,
    description: Option<String>,
    category: Category,
    room: Option<String>,
    priority: Priority,
    assignee: Option<String>,
    due_date: Option<Timestamp>,
    sla_target: Option<i64>,
    recurrence_group: Option<String>,
    occurrence_index: Option<usize>,
}

impl TicketBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        TicketBuilder {
            title: title.into(),
            description: None,
            category: Category::default(),
            room: None,
            priority: Priority::default(),
            assignee: None,
            due_date: None,
            sla_target: None,
            recurrence_group: None,
            occurrence_index: None,
        }
    }

    pub fn description(mut self, desc: Option<impl Into<String>>) -> Self {
        self.description = desc.map(|d| d.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn room(mut self, room: Option<impl Into<String>>) -> Self {
        self.room = room.map(|r| r.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn assignee(mut self, assignee: Option<impl Into<String>>) -> Self {
        self.assignee = assignee.map(|a| a.into());
        self
    }

    pub fn due_date(mut self, due: Option<Timestamp>) -> Self {
        self.due_date = due;
        self
    }

    pub fn sla_target(mut self, minutes: Option<i64>) -> Self {
        self.sla_target = minutes;
        self
    }

    pub fn recurrence_group(mut self, group: Option<impl Into<String>>) -> Self {
        self.recurrence_group = group.map(|g| g.into());
        self
    }

    pub fn occurrence_index(mut self, index: Option<usize>) -> Self {
        self.occurrence_index = index;
        self
    }

    /// Materialize the ticket with a fresh ID and the given creation time.
    pub fn build(self, created_at: Timestamp) -> Ticket {
        let id = crate::utils::generate_id(self.category);
        Ticket {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            room: self.room,
            status: Status::Pending,
            priority: self.priority,
            assignee: self.assignee,
            created_at: Some(created_at),
            assigned_at: None,
            started_at: None,
            completed_at: None,
            first_comment_at: None,
            due_date: self.due_date,
            sla_target: self.sla_target,
            sla_status: None,
            resolution_notes: None,
            recurrence_group: self.recurrence_group,
            occurrence_index: self.occurrence_index,
        }
    }
}
