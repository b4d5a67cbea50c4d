//! Slack user profile cache.
//!
//! Profiles are fetched once per user ID and kept for the lifetime of the
//! process. Remote profile changes (new display name, new avatar) are not
//! picked up until restart.
//!
//! Concurrent misses for the same user ID share a single lookup: each ID
//! owns a `OnceCell` slot, and every caller awaits the same initialization.
//! A failed lookup leaves the slot empty so the next caller retries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::common::error::LookupError;
use crate::common::UserProfile;

/// Identity lookup against the Slack Web API (or a stand-in).
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// Fetch the profile of a Slack user.
    async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, LookupError>;
}

type Slot = Arc<OnceCell<UserProfile>>;

/// Read-through, write-once-per-key profile cache.
pub struct ProfileCache {
    lookup: Arc<dyn ProfileLookup>,
    slots: Mutex<HashMap<String, Slot>>,
    timeout: Duration,
}

impl ProfileCache {
    /// Create an empty cache in front of `lookup`.
    ///
    /// Each lookup is abandoned after `timeout`.
    pub fn new(lookup: Arc<dyn ProfileLookup>, timeout: Duration) -> Self {
        Self {
            lookup,
            slots: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Get a user's profile, fetching it on first use.
    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile, LookupError> {
        let slot = self.slot(user_id);

        let profile = slot
            .get_or_try_init(|| async {
                debug!(user_id, "Profile cache miss");
                match tokio::time::timeout(self.timeout, self.lookup.fetch_profile(user_id)).await {
                    Ok(result) => result,
                    Err(_) => Err(LookupError::Timeout {
                        user_id: user_id.to_string(),
                    }),
                }
            })
            .await?;

        Ok(profile.clone())
    }

    /// Number of users with a cached profile.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    fn slot(&self, user_id: &str) -> Slot {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(slots.entry(user_id.to_string()).or_default())
    }
}
