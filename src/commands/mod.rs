mod create;
mod ls;
mod recur;
mod show;
mod sla;
mod status;

pub use create::{CreateOptions, cmd_create};
pub use ls::cmd_ls;
pub use recur::{RecurCreateOptions, cmd_recur_create, cmd_recur_preview};
pub use show::cmd_show;
pub use sla::{cmd_sla, cmd_sla_overview};
pub use status::{cmd_assign, cmd_note, cmd_status};

use owo_colors::OwoColorize;

use crate::clock::SystemClock;
use crate::error::Result;
use crate::events::FileHistorySink;
use crate::lifecycle::{IdentityResolver, LifecycleController};
use crate::sla::SlaStatus;
use crate::store::FileTicketStore;
use crate::types::{Status, Ticket};

/// The controller wired for CLI use: file-backed store and history,
/// wall-clock time.
pub type App = LifecycleController<FileTicketStore, FileHistorySink, SystemClock, IdentityResolver>;

pub fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a ticket for single-line display.
pub fn format_ticket_line(ticket: &Ticket) -> String {
    let id_padded = format!("{:12}", ticket.id);
    let status_str = format!("[{}]", ticket.status);

    let colored_status = match ticket.status {
        Status::Pending => status_str.yellow().to_string(),
        Status::Assigned | Status::InProgress => status_str.cyan().to_string(),
        Status::OnHold => status_str.magenta().to_string(),
        Status::Completed | Status::Validated => status_str.green().to_string(),
        Status::Cancelled => status_str.dimmed().to_string(),
    };

    let room = ticket
        .room
        .as_deref()
        .map(|r| format!(" ({r})"))
        .unwrap_or_default();

    format!(
        "{} {:13} {}{}",
        id_padded.cyan(),
        colored_status,
        ticket.title,
        room.dimmed()
    )
}

/// Color an SLA classification for terminal output.
pub fn format_sla_status(status: SlaStatus) -> String {
    let label = status.label();
    match status {
        SlaStatus::OnTrack => label.green().to_string(),
        SlaStatus::AtRisk => label.yellow().to_string(),
        SlaStatus::Breached => label.red().bold().to_string(),
    }
}

/// JSON shape shared by every command that prints a ticket.
pub fn ticket_json(ticket: &Ticket) -> serde_json::Value {
    serde_json::json!({
        "id": ticket.id,
        "title": ticket.title,
        "description": ticket.description,
        "category": ticket.category.to_string(),
        "room": ticket.room,
        "status": ticket.status.to_string(),
        "priority": ticket.priority.to_string(),
        "assignee": ticket.assignee,
        "created_at": ticket.created_at.map(|t| t.to_string()),
        "due_date": ticket.due_date.map(|t| t.to_string()),
        "sla_status": ticket.sla_status.map(|s| s.to_string()),
        "recurrence_group": ticket.recurrence_group,
        "occurrence_index": ticket.occurrence_index,
    })
}
