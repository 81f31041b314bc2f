//! Guard against the same booking submission running twice at once.

use std::sync::Arc;

use dashmap::DashSet;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InFlight {
    keys: Arc<DashSet<Uuid>>,
}

impl InFlight {
    /// Claims `key`; `None` while another submission holds it.
    pub fn begin(&self, key: Uuid) -> Option<InFlightGuard> {
        self.keys.insert(key).then(|| InFlightGuard {
            keys: self.keys.clone(),
            key,
        })
    }

    pub fn is_running(&self, key: Uuid) -> bool {
        self.keys.contains(&key)
    }
}

/// Releases its key when dropped, whether the call succeeded or not.
pub struct InFlightGuard {
    keys: Arc<DashSet<Uuid>>,
    key: Uuid,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys.remove(&self.key);
    }
}
