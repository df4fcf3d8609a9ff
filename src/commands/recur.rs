use jiff::civil::DateTime;
use owo_colors::OwoColorize;

use crate::commands::{App, print_json};
use crate::error::Result;
use crate::lifecycle::SeriesTemplate;
use crate::recurrence::{self, RecurrenceRule};
use crate::types::{Category, Priority};

/// Preview the occurrence dates a rule would generate
pub async fn cmd_recur_preview(
    start: DateTime,
    rule: &RecurrenceRule,
    output_json: bool,
) -> Result<()> {
    let dates = recurrence::expand(start, rule)?;

    if output_json {
        print_json(&serde_json::json!({
            "rule": rule.describe(),
            "occurrences": dates.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
        }))?;
        return Ok(());
    }

    println!("{}", rule.describe().bold());
    if dates.is_empty() {
        println!("No occurrences.");
        return Ok(());
    }
    for (index, date) in dates.iter().enumerate() {
        println!("{:4}. {date}", index + 1);
    }
    println!("\n{} occurrence(s)", dates.len());

    Ok(())
}

/// Template fields for `recur create`
pub struct RecurCreateOptions {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub room: Option<String>,
    pub priority: Priority,
    pub sla_target: Option<i64>,
}

/// Create a ticket series from a recurrence rule
pub async fn cmd_recur_create(
    app: &App,
    options: RecurCreateOptions,
    rule: &RecurrenceRule,
    start: DateTime,
    actor: &str,
    output_json: bool,
) -> Result<()> {
    let template = SeriesTemplate {
        title: options.title,
        description: options.description,
        category: options.category,
        room: options.room,
        priority: options.priority,
        sla_target: options.sla_target,
    };

    let series = app
        .create_recurring_series(&template, rule, start, actor)
        .await?;

    if output_json {
        print_json(&serde_json::json!({
            "group_id": series.group_id,
            "rule": series.description,
            "tickets": series
                .tickets
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "id": t.id,
                        "due_date": t.due_date.map(|d| d.to_string()),
                        "occurrence_index": t.occurrence_index,
                    })
                })
                .collect::<Vec<_>>(),
        }))?;
        return Ok(());
    }

    println!("{}", series.group_id.cyan().bold());
    println!("{}", series.description);
    for ticket in &series.tickets {
        let due = ticket
            .due_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {}  due {}", ticket.id, due);
    }
    println!("\n{} ticket(s) created", series.tickets.len());

    Ok(())
}
