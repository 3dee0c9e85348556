use chrono::{DateTime, SubsecRound, Utc};

/// Represents an entity responsible for providing dates across application. This allows the
/// engine to be driven by a fake time source in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// Current UTC time. Timestamps are persisted with second precision, so implementations
    /// should not carry fractional seconds.
    fn time(&self) -> DateTime<Utc>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }
}
