use jiff::Timestamp;
use owo_colors::OwoColorize;

use crate::commands::{App, print_json, ticket_json};
use crate::error::Result;
use crate::types::{Category, Priority, Ticket};

/// Options for creating a new ticket
pub struct CreateOptions {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub room: Option<String>,
    pub priority: Priority,
    pub assignee: Option<String>,
    pub due: Option<Timestamp>,
    pub sla_target: Option<i64>,
}

impl Default for CreateOptions {
    fn default() -> Self {
        CreateOptions {
            title: "Untitled".to_string(),
            description: None,
            category: Category::Other,
            room: None,
            priority: Priority::Normal,
            assignee: None,
            due: None,
            sla_target: None,
        }
    }
}

/// Create a new ticket and print its ID
pub async fn cmd_create(
    app: &App,
    options: CreateOptions,
    actor: &str,
    output_json: bool,
) -> Result<()> {
    let builder = Ticket::builder(&options.title)
        .description(options.description.as_deref())
        .category(options.category)
        .room(options.room.as_deref())
        .priority(options.priority)
        .due_date(options.due)
        .sla_target(options.sla_target);

    let ticket = app.create_ticket(builder, actor).await?;

    // Assigning through the controller stamps assigned_at and records
    // the assignment event.
    let ticket = match options.assignee.as_deref() {
        Some(technician) => app.assign(&ticket.id, technician, actor).await?,
        None => ticket,
    };

    if output_json {
        print_json(&ticket_json(&ticket))?;
    } else {
        println!("{}", ticket.id);
        if let Some(assignee) = &ticket.assignee {
            println!("{}", format!("assigned to {assignee}").dimmed());
        }
    }

    Ok(())
}
