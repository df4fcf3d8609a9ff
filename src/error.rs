use thiserror::Error;

use crate::types::Status;

#[derive(Error, Debug)]
pub enum InterveneError {
    #[error("ticket '{0}' not found")]
    TicketNotFound(String),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("invalid category '{0}'")]
    InvalidCategory(String),

    #[error("cannot move from '{from}' to '{to}' (allowed: {allowed})")]
    InvalidTransition {
        from: Status,
        to: Status,
        allowed: String,
    },

    #[error("ticket '{0}' has no technician; assign one before marking it assigned")]
    AssignmentRequired(String),

    #[error("confirmation required: {0}")]
    ConfirmationRequired(String),

    #[error("ticket '{0}' has no creation time; SLA cannot be calculated")]
    MissingCreationTime(String),

    #[error("invalid recurrence rule: {0}")]
    InvalidRecurrenceConfig(String),

    #[error("recurrence rule produces no occurrences")]
    EmptySeries,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("date arithmetic error: {0}")]
    Date(#[from] jiff::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, InterveneError>;
