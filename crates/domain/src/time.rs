//! Time and timestamp helpers.
//!
//! Every timestamp in the system is UTC. Cooldown arithmetic, cache
//! stamps, and time-series points all go through [`now`], so there is
//! never a naive/aware mismatch to reconcile.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `observed_at`, `last_triggered`, and
/// time-series points.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
