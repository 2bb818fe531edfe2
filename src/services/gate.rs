use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One in-flight request per host.
///
/// Cloning shares the underlying lock table, so independent searches can be
/// fanned out while each host still sees strictly sequential traffic.
#[derive(Debug, Clone, Default)]
pub struct HostGate {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl HostGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `host` is free and hold it until the guard is dropped.
    pub async fn acquire(&self, host: &str) -> OwnedMutexGuard<()> {
        // Clone the lock out so the map shard is released before awaiting.
        let lock = self
            .locks
            .entry(host.to_ascii_lowercase())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    pub fn hosts(&self) -> usize {
        self.locks.len()
    }
}
