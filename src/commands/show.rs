use owo_colors::OwoColorize;

use crate::clock::Clock;
use crate::commands::{App, format_sla_status, print_json, ticket_json};
use crate::error::Result;
use crate::sla::{self, format_remaining_time};
use crate::store::TicketStore;

/// Display one ticket with its derived SLA state
pub async fn cmd_show(app: &App, id: &str, output_json: bool) -> Result<()> {
    let ticket = app
        .store()
        .get(id)
        .await?
        .ok_or_else(|| crate::error::InterveneError::TicketNotFound(id.to_string()))?;

    let record = sla::calculate(&ticket, app.clock().now()).ok();

    if output_json {
        let mut value = ticket_json(&ticket);
        if let (Some(obj), Some(record)) = (value.as_object_mut(), &record) {
            obj.insert("sla".to_string(), serde_json::to_value(record)?);
        }
        print_json(&value)?;
        return Ok(());
    }

    println!("{} {}", ticket.id.cyan().bold(), ticket.title.bold());
    println!(
        "  {} {} / {} priority",
        format!("[{}]", ticket.status.label()).yellow(),
        ticket.category,
        ticket.priority
    );
    if let Some(room) = &ticket.room {
        println!("  room: {room}");
    }
    if let Some(assignee) = &ticket.assignee {
        println!("  assignee: {assignee}");
    }
    if let Some(description) = &ticket.description {
        println!("\n{description}");
    }
    if let Some(notes) = &ticket.resolution_notes {
        println!("\nresolution: {notes}");
    }
    if let Some(group) = &ticket.recurrence_group {
        let index = ticket
            .occurrence_index
            .map(|i| format!(" #{}", i + 1))
            .unwrap_or_default();
        println!("  series: {group}{index}");
    }

    if let Some(record) = &record {
        println!(
            "\nSLA: {} ({}% of {}min, {})",
            format_sla_status(record.status),
            record.percentage_used,
            record.target_minutes,
            format_remaining_time(record.remaining_minutes)
        );
        println!("  due: {}", record.due_date);
    }

    Ok(())
}
