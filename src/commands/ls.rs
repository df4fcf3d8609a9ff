use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::clock::Clock;
use crate::commands::{App, format_ticket_line, print_json, ticket_json};
use crate::error::Result;
use crate::sla;
use crate::store::TicketStore;
use crate::types::{Status, Ticket};

/// A row in the ticket list table
#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Title")]
    title: String,
}

impl TicketRow {
    fn from_ticket(ticket: &Ticket) -> Self {
        TicketRow {
            id: ticket.id.clone(),
            status: ticket.status.to_string(),
            priority: ticket.priority.to_string(),
            room: ticket.room.clone().unwrap_or_else(|| "-".to_string()),
            assignee: ticket.assignee.clone().unwrap_or_else(|| "-".to_string()),
            title: ticket.title.clone(),
        }
    }
}

/// List tickets, optionally filtered by status or SLA state
pub async fn cmd_ls(
    app: &App,
    status: Option<Status>,
    at_risk: bool,
    breached: bool,
    output_json: bool,
) -> Result<()> {
    let all = app.store().list().await?;
    let now = app.clock().now();

    let filtered: Vec<Ticket> = if at_risk {
        sla::tickets_at_risk(&all, now).into_iter().cloned().collect()
    } else if breached {
        sla::breached_tickets(&all, now).into_iter().cloned().collect()
    } else {
        all
    };

    let tickets: Vec<&Ticket> = filtered
        .iter()
        .filter(|t| status.is_none_or(|s| t.status == s))
        .collect();

    if output_json {
        let json_tickets: Vec<serde_json::Value> =
            tickets.iter().map(|t| ticket_json(t)).collect();
        print_json(&serde_json::json!(json_tickets))?;
        return Ok(());
    }

    if tickets.is_empty() {
        println!("No tickets found.");
        return Ok(());
    }

    // The SLA triage views are quick scans; keep them line-based.
    if at_risk || breached {
        for ticket in &tickets {
            println!("{}", format_ticket_line(ticket));
        }
        println!("\n{} ticket(s)", tickets.len());
        return Ok(());
    }

    let rows: Vec<TicketRow> = tickets.iter().map(|t| TicketRow::from_ticket(t)).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    println!("\n{} ticket(s)", tickets.len());

    Ok(())
}
