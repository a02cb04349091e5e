//! Source of "today" for the rollover rules.
use chrono::{Local, NaiveDate};
use std::sync::Arc;

pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Today's date in the server's local time zone
pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().date_naive())
}

/// Always returns `date`
pub fn fixed_clock(date: NaiveDate) -> Clock {
    Arc::new(move || date)
}
