use clap::{Args, Parser, Subcommand};
use jiff::civil::{Date, DateTime};

use crate::types::{
    Category, Priority, Status, VALID_CATEGORIES, VALID_PRIORITIES, VALID_STATUSES,
};
use crate::recurrence::{Frequency, VALID_FREQUENCIES};

#[derive(Parser)]
#[command(name = "intervene")]
#[command(about = "Hotel maintenance ticketing")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new intervention ticket
    #[command(visible_alias = "c")]
    Create {
        /// Ticket title
        title: String,

        /// Description text
        #[arg(short, long)]
        description: Option<String>,

        /// Trade category: plumbing, electrical, hvac, locksmith, painting, furniture, other
        #[arg(short, long, default_value = "other", value_parser = parse_category)]
        category: Category,

        /// Room or location
        #[arg(short, long)]
        room: Option<String>,

        /// Priority: low, normal, high, urgent, critical
        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<Priority>,

        /// Technician to assign immediately
        #[arg(short, long)]
        assignee: Option<String>,

        /// Custom due date (RFC 3339 instant)
        #[arg(long)]
        due: Option<String>,

        /// Custom SLA target in minutes
        #[arg(long)]
        sla_target: Option<i64>,

        /// Actor recorded in history (default from config)
        #[arg(long)]
        actor: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tickets
    Ls {
        /// Filter by status
        #[arg(short, long, value_parser = parse_status)]
        status: Option<Status>,

        /// Only tickets at risk of breaching their SLA
        #[arg(long)]
        at_risk: bool,

        /// Only tickets that have breached their SLA
        #[arg(long)]
        breached: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display one ticket with its SLA state
    #[command(visible_alias = "s")]
    Show {
        /// Ticket ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change a ticket's status
    Status {
        /// Ticket ID
        id: String,

        /// New status: pending, assigned, in_progress, on_hold, completed, validated, cancelled
        #[arg(value_parser = parse_status)]
        status: Status,

        /// Confirm a policy-sensitive transition (reopen/reactivate)
        #[arg(short = 'y', long)]
        yes: bool,

        /// Resolution notes (recorded when completing)
        #[arg(long)]
        notes: Option<String>,

        /// Technician to assign as part of the change
        #[arg(long)]
        assignee: Option<String>,

        /// Actor recorded in history (default from config)
        #[arg(long)]
        actor: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assign a technician without changing status
    Assign {
        /// Ticket ID
        id: String,

        /// Technician identifier
        technician: String,

        /// Actor recorded in history (default from config)
        #[arg(long)]
        actor: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a comment to a ticket
    Note {
        /// Ticket ID
        id: String,

        /// Comment text
        text: String,

        /// Actor recorded in history (default from config)
        #[arg(long)]
        actor: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// SLA report for one ticket, or an overview of all open tickets
    Sla {
        /// Ticket ID (omit for the overview)
        id: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recurring series
    #[command(subcommand)]
    Recur(RecurAction),
}

#[derive(Subcommand)]
pub enum RecurAction {
    /// Preview the occurrence dates a rule would generate
    Preview {
        #[command(flatten)]
        rule: RecurrenceArgs,

        /// Series start (date or date-time, e.g. 2025-03-01T09:00)
        #[arg(long, value_parser = parse_civil_datetime)]
        start: DateTime,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a ticket series from a rule
    Create {
        /// Ticket title used for every occurrence
        title: String,

        /// Description text
        #[arg(short, long)]
        description: Option<String>,

        /// Trade category
        #[arg(short, long, default_value = "other", value_parser = parse_category)]
        category: Category,

        /// Room or location
        #[arg(short, long)]
        room: Option<String>,

        /// Priority: low, normal, high, urgent, critical
        #[arg(short, long, value_parser = parse_priority)]
        priority: Option<Priority>,

        /// Custom SLA target in minutes
        #[arg(long)]
        sla_target: Option<i64>,

        #[command(flatten)]
        rule: RecurrenceArgs,

        /// Series start (date or date-time)
        #[arg(long, value_parser = parse_civil_datetime)]
        start: DateTime,

        /// Actor recorded in history (default from config)
        #[arg(long)]
        actor: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Recurrence rule flags shared by the `recur` subcommands.
#[derive(Args)]
pub struct RecurrenceArgs {
    /// Frequency: daily, weekly, monthly, yearly
    #[arg(short, long, value_parser = parse_frequency)]
    pub frequency: Frequency,

    /// Repeat every N units
    #[arg(short, long, default_value = "1")]
    pub interval: i32,

    /// Weekdays for weekly rules (0=Sun..6=Sat), comma separated
    #[arg(long, value_delimiter = ',')]
    pub days_of_week: Option<Vec<u8>>,

    /// Day of month for monthly rules (1-31)
    #[arg(long)]
    pub day_of_month: Option<i8>,

    /// Month for yearly rules (1-12)
    #[arg(long)]
    pub month_of_year: Option<i8>,

    /// Stop after N occurrences
    #[arg(long)]
    pub count: Option<usize>,

    /// Stop at this date (exclusive with --count)
    #[arg(long, value_parser = parse_civil_datetime)]
    pub end_date: Option<DateTime>,
}

impl RecurrenceArgs {
    pub fn into_rule(self) -> crate::recurrence::RecurrenceRule {
        crate::recurrence::RecurrenceRule {
            frequency: self.frequency,
            interval: self.interval,
            days_of_week: self.days_of_week,
            day_of_month: self.day_of_month,
            month_of_year: self.month_of_year,
            count: self.count,
            end_date: self.end_date,
        }
    }
}

fn parse_status(s: &str) -> Result<Status, String> {
    s.parse()
        .map_err(|_| format!("'{s}' is not a status. Must be one of: {}", VALID_STATUSES.join(", ")))
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    s.parse().map_err(|_| {
        format!(
            "'{s}' is not a priority. Must be one of: {}",
            VALID_PRIORITIES.join(", ")
        )
    })
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|_| {
        format!(
            "'{s}' is not a category. Must be one of: {}",
            VALID_CATEGORIES.join(", ")
        )
    })
}

fn parse_frequency(s: &str) -> Result<Frequency, String> {
    s.parse().map_err(|_| {
        format!(
            "'{s}' is not a frequency. Must be one of: {}",
            VALID_FREQUENCIES.join(", ")
        )
    })
}

/// Accept either a civil date ("2025-03-01", meaning midnight) or a full
/// civil date-time ("2025-03-01T09:00").
fn parse_civil_datetime(s: &str) -> Result<DateTime, String> {
    if let Ok(dt) = s.parse::<DateTime>() {
        return Ok(dt);
    }
    s.parse::<Date>()
        .map(|d| d.at(0, 0, 0, 0))
        .map_err(|_| format!("'{s}' is not a date or date-time"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_parse_civil_datetime_accepts_both_forms() {
        assert_eq!(
            parse_civil_datetime("2025-03-01").unwrap(),
            date(2025, 3, 1).at(0, 0, 0, 0)
        );
        assert_eq!(
            parse_civil_datetime("2025-03-01T09:30:00").unwrap(),
            date(2025, 3, 1).at(9, 30, 0, 0)
        );
        assert!(parse_civil_datetime("March 1st").is_err());
    }

    #[test]
    fn test_value_parsers_mention_valid_values() {
        let err = parse_status("done").unwrap_err();
        assert!(err.contains("in_progress"));
        let err = parse_priority("p0").unwrap_err();
        assert!(err.contains("critical"));
    }
}
