//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp carried by every reading.
pub type Timestamp = DateTime<Utc>;

/// Value a reading's timestamp takes when the payload omits it.
#[must_use]
pub fn epoch() -> Timestamp {
    Timestamp::default()
}
