//! Per-session serialization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async mutex per session id.
///
/// Operations on the same session run one at a time; different sessions
/// proceed in parallel. Entries nobody holds are pruned on the next acquire.
#[derive(Debug, Default)]
pub struct SessionLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one session operation.
#[derive(Debug)]
pub struct SessionGuard {
    _guard: OwnedMutexGuard<()>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, session_id: &str) -> SessionGuard {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            map.retain(|id, lock| id == session_id || Arc::strong_count(lock) > 1);
            Arc::clone(map.entry(session_id.to_owned()).or_default())
        };
        SessionGuard { _guard: lock.lock_owned().await }
    }

    /// Number of tracked sessions, held or recently released.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_session_is_exclusive() {
        let locks = SessionLocks::new();
        let _held = locks.acquire("s1").await;

        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire("s1")).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn different_sessions_do_not_block() {
        let locks = SessionLocks::new();
        let _a = locks.acquire("a").await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire("b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = SessionLocks::new();
        drop(locks.acquire("a").await);
        drop(locks.acquire("b").await);
        let _c = locks.acquire("c").await;
        assert_eq!(locks.len(), 1);
    }
}
