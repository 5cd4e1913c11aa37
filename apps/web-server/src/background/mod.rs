//! Background jobs.

mod scheduler;

pub use scheduler::{Housekeeping, SchedulerConfig};
