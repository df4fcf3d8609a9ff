//! SLA calculation for intervention tickets.
//!
//! Everything here is a pure function of ticket fields and a supplied
//! instant. The clock is always passed in, never read, so results are
//! reproducible under test and a stored `sla_status` is only ever a
//! cache of the last computation.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{InterveneError, Result};
use crate::types::{Priority, Status, Ticket};

/// Fraction of the target after which an open ticket is flagged at risk.
const AT_RISK_THRESHOLD_PCT: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaStatus {
    OnTrack,
    AtRisk,
    Breached,
}

impl SlaStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SlaStatus::OnTrack => "On track",
            SlaStatus::AtRisk => "At risk",
            SlaStatus::Breached => "Breached",
        }
    }
}

impl fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlaStatus::OnTrack => write!(f, "on_track"),
            SlaStatus::AtRisk => write!(f, "at_risk"),
            SlaStatus::Breached => write!(f, "breached"),
        }
    }
}

impl FromStr for SlaStatus {
    type Err = InterveneError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "on_track" => Ok(SlaStatus::OnTrack),
            "at_risk" => Ok(SlaStatus::AtRisk),
            "breached" => Ok(SlaStatus::Breached),
            _ => Err(InterveneError::Other(format!("invalid SLA status: {s}"))),
        }
    }
}

/// Derived SLA state for one ticket at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaRecord {
    pub status: SlaStatus,
    pub target_minutes: i64,
    pub elapsed_minutes: i64,
    pub remaining_minutes: i64,
    /// Share of the target consumed, rounded, capped at 100.
    pub percentage_used: u8,
    pub due_date: Timestamp,
    pub is_breached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breached_at: Option<Timestamp>,
    /// Minutes from creation to the first assignment or comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<i64>,
    /// Minutes from creation to completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_time: Option<i64>,
}

/// Whole minutes between two instants.
fn elapsed_minutes(start: Timestamp, end: Timestamp) -> i64 {
    end.duration_since(start).as_mins()
}

/// Resolve the deadline: a custom due date wins unconditionally, otherwise
/// creation time plus the effective target.
pub fn due_date(
    created_at: Timestamp,
    target_minutes: i64,
    custom_due_date: Option<Timestamp>,
) -> Result<Timestamp> {
    if let Some(due) = custom_due_date {
        return Ok(due);
    }
    Ok(created_at.checked_add(SignedDuration::from_mins(target_minutes))?)
}

/// Classify from the (uncapped) percentage of target consumed.
///
/// A completed ticket is never at risk: it either made the target or
/// breached it.
pub fn classify(percentage_used: f64, is_completed: bool) -> SlaStatus {
    if is_completed {
        return if percentage_used > 100.0 {
            SlaStatus::Breached
        } else {
            SlaStatus::OnTrack
        };
    }

    if percentage_used >= 100.0 {
        SlaStatus::Breached
    } else if percentage_used >= AT_RISK_THRESHOLD_PCT {
        SlaStatus::AtRisk
    } else {
        SlaStatus::OnTrack
    }
}

/// Compute the full SLA record for a ticket at `now`.
///
/// Fails with `MissingCreationTime` when the ticket lacks `created_at`;
/// no SLA can be derived without it.
pub fn calculate(ticket: &Ticket, now: Timestamp) -> Result<SlaRecord> {
    let created_at = ticket
        .created_at
        .ok_or_else(|| InterveneError::MissingCreationTime(ticket.id.clone()))?;

    let target_minutes = ticket
        .sla_target
        .unwrap_or_else(|| ticket.priority.target_minutes());
    let due = due_date(created_at, target_minutes, ticket.due_date)?;

    let end = ticket.completed_at.unwrap_or(now);
    let elapsed = elapsed_minutes(created_at, end);
    let remaining = (target_minutes - elapsed).max(0);

    let raw_percentage = elapsed as f64 * 100.0 / target_minutes as f64;
    let status = classify(raw_percentage, ticket.completed_at.is_some());
    let is_breached = status == SlaStatus::Breached;

    let response_time = match (ticket.assigned_at, ticket.first_comment_at) {
        (Some(a), Some(c)) => Some(elapsed_minutes(created_at, a.min(c))),
        (Some(a), None) => Some(elapsed_minutes(created_at, a)),
        (None, Some(c)) => Some(elapsed_minutes(created_at, c)),
        (None, None) => None,
    };

    let resolution_time = ticket
        .completed_at
        .map(|done| elapsed_minutes(created_at, done));

    Ok(SlaRecord {
        status,
        target_minutes,
        elapsed_minutes: elapsed,
        remaining_minutes: remaining,
        percentage_used: raw_percentage.min(100.0).round() as u8,
        due_date: due,
        is_breached,
        breached_at: is_breached.then_some(due),
        response_time,
        resolution_time,
    })
}

/// Default SLA target for a priority, in minutes.
pub fn target_for(priority: Priority) -> i64 {
    priority.target_minutes()
}

/// Open tickets currently at risk of breaching their SLA.
///
/// Tickets whose SLA cannot be computed (no creation time) are skipped
/// with a warning rather than failing the whole sweep.
pub fn tickets_at_risk<'a>(tickets: &'a [Ticket], now: Timestamp) -> Vec<&'a Ticket> {
    monitored(tickets)
        .filter(|t| matches!(sla_status_or_warn(t, now), Some(SlaStatus::AtRisk)))
        .collect()
}

/// Open tickets that have already breached their SLA.
pub fn breached_tickets<'a>(tickets: &'a [Ticket], now: Timestamp) -> Vec<&'a Ticket> {
    monitored(tickets)
        .filter(|t| matches!(sla_status_or_warn(t, now), Some(SlaStatus::Breached)))
        .collect()
}

fn monitored(tickets: &[Ticket]) -> impl Iterator<Item = &Ticket> {
    tickets
        .iter()
        .filter(|t| !matches!(t.status, Status::Completed | Status::Cancelled))
}

fn sla_status_or_warn(ticket: &Ticket, now: Timestamp) -> Option<SlaStatus> {
    match calculate(ticket, now) {
        Ok(record) => Some(record.status),
        Err(e) => {
            tracing::warn!("skipping SLA check for {}: {e}", ticket.id);
            None
        }
    }
}

/// Bucket a remaining-minutes value into a short human string.
///
/// Below an hour: minutes. Below a day: hours, with minutes only when
/// non-zero. From one day up: days and hours, minutes suppressed.
pub fn format_remaining_time(minutes: i64) -> String {
    if minutes <= 0 {
        return "overdue".to_string();
    }

    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours == 0 {
        return format!("{mins}min");
    }

    if hours < 24 {
        return if mins > 0 {
            format!("{hours}h {mins}min")
        } else {
            format!("{hours}h")
        };
    }

    let days = hours / 24;
    let remaining_hours = hours % 24;
    if remaining_hours > 0 {
        format!("{days}d {remaining_hours}h")
    } else {
        format!("{days}d")
    }
}
