//! The envelope written to the substrate.
//!
//! Wire format (JSON, before optional encryption):
//! ```json
//! { "obj": <payload>, "time": <epoch millis deadline> }
//! ```
//! `time` is omitted for records that never expire.

use serde::{Deserialize, Serialize};

use crate::time::DAY_MILLIS;

/// A caller value plus its optional expiry deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord<T> {
    /// The caller's value.
    #[serde(rename = "obj")]
    pub payload: T,
    /// Absolute deadline in epoch milliseconds. `None` never expires.
    #[serde(rename = "time", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl<T> StoredRecord<T> {
    /// A record that never expires.
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            expires_at: None,
        }
    }

    /// A record expiring `ttl_days` after `now`. Zero days means no expiry.
    pub fn with_ttl(payload: T, now: u64, ttl_days: u32) -> Self {
        let expires_at =
            (ttl_days > 0).then(|| now.saturating_add(u64::from(ttl_days) * DAY_MILLIS));
        Self {
            payload,
            expires_at,
        }
    }

    /// A record is expired once the clock reaches its deadline.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }
}
