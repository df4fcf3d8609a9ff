use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::commands::{App, format_sla_status, print_json};
use crate::error::Result;
use crate::sla::format_remaining_time;

#[derive(Tabled)]
struct SlaRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "SLA")]
    sla: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Title")]
    title: String,
}

/// SLA report for a single ticket
pub async fn cmd_sla(app: &App, id: &str, output_json: bool) -> Result<()> {
    let (ticket, record) = app.sla_report(id).await?;

    if output_json {
        print_json(&serde_json::json!({
            "id": ticket.id,
            "title": ticket.title,
            "priority": ticket.priority.to_string(),
            "sla": record,
        }))?;
        return Ok(());
    }

    println!("{}  {}", ticket.id, ticket.title);
    println!("status:    {}", format_sla_status(record.status));
    println!(
        "target:    {}min ({} priority)",
        record.target_minutes, ticket.priority
    );
    println!(
        "elapsed:   {}min ({}%)",
        record.elapsed_minutes, record.percentage_used
    );
    println!("remaining: {}", format_remaining_time(record.remaining_minutes));
    println!("due:       {}", record.due_date);
    if let Some(response) = record.response_time {
        println!("response:  {}min", response);
    }
    if let Some(resolution) = record.resolution_time {
        println!("resolved:  {}min", resolution);
    }

    Ok(())
}

/// SLA overview of every non-cancelled ticket
pub async fn cmd_sla_overview(app: &App, output_json: bool) -> Result<()> {
    let rows = app.sla_overview().await?;

    if output_json {
        let json_rows: Vec<serde_json::Value> = rows
            .iter()
            .map(|(ticket, record)| {
                serde_json::json!({
                    "id": ticket.id,
                    "title": ticket.title,
                    "priority": ticket.priority.to_string(),
                    "sla": record,
                })
            })
            .collect();
        print_json(&serde_json::json!(json_rows))?;
        return Ok(());
    }

    if rows.is_empty() {
        println!("No tickets to monitor.");
        return Ok(());
    }

    let table_rows: Vec<SlaRow> = rows
        .iter()
        .map(|(ticket, record)| SlaRow {
            id: ticket.id.clone(),
            priority: ticket.priority.to_string(),
            sla: format_sla_status(record.status),
            used: format!("{}%", record.percentage_used),
            remaining: format_remaining_time(record.remaining_minutes),
            title: ticket.title.clone(),
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    let breached = rows.iter().filter(|(_, r)| r.is_breached).count();
    if breached > 0 {
        println!("\n{breached} ticket(s) breached");
    }

    Ok(())
}
