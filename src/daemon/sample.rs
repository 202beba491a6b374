use chrono::{DateTime, Duration, Utc};

/// A single observation of the user's machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivitySample {
    pub timestamp: DateTime<Utc>,
    /// Time since the last keyboard or mouse input.
    pub idle: Duration,
}
