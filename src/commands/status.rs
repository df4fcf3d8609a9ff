use owo_colors::OwoColorize;

use crate::commands::{App, format_sla_status, print_json, ticket_json};
use crate::error::{InterveneError, Result};
use crate::lifecycle::ChangeRequest;
use crate::types::Status;
use crate::workflow;

/// Change a ticket's status through the workflow policy
pub async fn cmd_status(
    app: &App,
    id: &str,
    status: Status,
    yes: bool,
    notes: Option<String>,
    assignee: Option<String>,
    actor: &str,
    output_json: bool,
) -> Result<()> {
    let request = ChangeRequest::by(actor)
        .confirmed(yes)
        .resolution_notes(notes)
        .assignee(assignee);

    let change = match app.request_status_change(id, status, &request).await {
        Ok(change) => change,
        // Surface the confirmation prompt with the flag that answers it.
        Err(InterveneError::ConfirmationRequired(message)) => {
            return Err(InterveneError::ConfirmationRequired(format!(
                "{message} Re-run with --yes to confirm."
            )));
        }
        Err(e) => return Err(e),
    };

    if output_json {
        let mut value = ticket_json(&change.ticket);
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "transition".to_string(),
                serde_json::json!({
                    "from": change.from.to_string(),
                    "to": change.to.to_string(),
                    "direction": workflow::transition_direction(change.from, change.to).to_string(),
                }),
            );
            if let Some(sla) = &change.sla {
                obj.insert("sla".to_string(), serde_json::to_value(sla)?);
            }
        }
        print_json(&value)?;
        return Ok(());
    }

    println!(
        "{} {} -> {}",
        change.ticket.id.cyan(),
        change.from.to_string().dimmed(),
        change.to.to_string().green()
    );
    if let Some(sla) = &change.sla {
        println!("SLA: {}", format_sla_status(sla.status));
    }

    Ok(())
}

/// Assign a technician without changing status
pub async fn cmd_assign(
    app: &App,
    id: &str,
    technician: &str,
    actor: &str,
    output_json: bool,
) -> Result<()> {
    let ticket = app.assign(id, technician, actor).await?;

    if output_json {
        print_json(&ticket_json(&ticket))?;
    } else {
        println!("{} assigned to {}", ticket.id.cyan(), technician.bold());
    }

    Ok(())
}

/// Add a comment to a ticket
pub async fn cmd_note(
    app: &App,
    id: &str,
    text: &str,
    actor: &str,
    output_json: bool,
) -> Result<()> {
    let ticket = app.add_comment(id, text, actor).await?;

    if output_json {
        print_json(&ticket_json(&ticket))?;
    } else {
        println!("noted on {}", ticket.id.cyan());
    }

    Ok(())
}
