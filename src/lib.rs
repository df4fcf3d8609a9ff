pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod paths;
pub mod recurrence;
pub mod sla;
pub mod store;
pub mod types;
pub mod utils;
pub mod workflow;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{InterveneError, Result};
pub use events::{EventType, FileHistorySink, HistoryEvent, HistorySink, MemoryHistorySink};
pub use lifecycle::{
    ChangeRequest, IdentityResolver, LifecycleController, NameResolver, SeriesCreated,
    SeriesTemplate, StatusChange,
};
pub use recurrence::{Frequency, RecurrenceRule, VALID_FREQUENCIES};
pub use sla::{SlaRecord, SlaStatus};
pub use store::{FileTicketStore, MemoryTicketStore, TicketStore};
pub use types::{
    Category, Priority, Status, Ticket, TicketBuilder, VALID_CATEGORIES, VALID_PRIORITIES,
    VALID_STATUSES,
};
