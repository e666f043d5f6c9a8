//! Time source used for creation and signing instants.

use chrono::{DateTime, Duration, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for deterministic tests.
#[derive(Debug)]
pub struct FixedClock {
    current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(at),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        let mut guard = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *guard = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|p| p.into_inner())
    }
}
