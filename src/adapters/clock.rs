//! Implements Clock with the local system time.

use crate::ports::Clock;
use chrono::{Local, NaiveDateTime};

/// Local wall clock. Stored timestamps and report windows are in local time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
