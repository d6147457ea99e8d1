pub mod scheduler;

pub use scheduler::{CycleId, CycleOutcome, PollScheduler};
