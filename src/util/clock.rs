//! Wall-clock helpers.

use chrono::{DateTime, Utc};

/// Current UTC time.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
