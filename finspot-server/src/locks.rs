//! Per-user write serialization
//!
//! Recording or undoing a sighting is a read-modify-write of the user's
//! progress row. Holding the user's guard for the whole operation keeps two
//! concurrent submissions from losing an update.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`'s progress
    pub async fn acquire(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            // Drop entries nobody is holding or waiting on
            map.retain(|_, l| Arc::strong_count(l) > 1);
            map.entry(user_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of users with a live guard or waiter
    #[cfg(test)]
    async fn active_count(&self) -> usize {
        self.inner
            .lock()
            .await
            .values()
            .filter(|l| Arc::strong_count(l) > 1)
            .count()
    }
}
