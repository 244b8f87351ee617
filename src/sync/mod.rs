// ============================================================================
// Group Serialization
// One mutex per group so cascade runs on the same group never interleave
// ============================================================================

use crate::domain::GroupId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-group locks.
///
/// Runs on different groups proceed in parallel; runs on one group queue up
/// behind each other. The lock must wrap the whole load-compute-save unit,
/// transaction included.
#[derive(Debug, Default)]
pub struct GroupLocks {
    locks: Mutex<HashMap<GroupId, Arc<Mutex<()>>>>,
}

impl GroupLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared lock handle for a group, created on first use.
    pub fn handle(&self, group_id: GroupId) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(group_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `f` while holding the group's lock.
    pub fn with_group<T>(&self, group_id: GroupId, f: impl FnOnce() -> T) -> T {
        let handle = self.handle(group_id);
        let _guard = handle.lock();
        f()
    }

    /// Drop the lock entry of a deleted group.
    ///
    /// The entry is kept while any run still holds its handle, so a later
    /// caller cannot get a fresh mutex and overlap with that run. Returns
    /// whether the entry was removed.
    pub fn forget(&self, group_id: GroupId) -> bool {
        let mut locks = self.locks.lock();
        let unused = locks
            .get(&group_id)
            .is_some_and(|handle| Arc::strong_count(handle) == 1);
        if unused {
            locks.remove(&group_id);
        }
        unused
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_same_group_shares_handle() {
        let locks = GroupLocks::new();
        let group_id = GroupId::new();

        assert!(Arc::ptr_eq(&locks.handle(group_id), &locks.handle(group_id)));
        assert!(!Arc::ptr_eq(&locks.handle(group_id), &locks.handle(GroupId::new())));
        assert_eq!(locks.len(), 2);

        assert!(locks.forget(group_id));
        assert_eq!(locks.len(), 1);
        assert!(!locks.forget(group_id));
    }

    #[test]
    fn test_forget_keeps_lock_held_by_a_run() {
        let locks = GroupLocks::new();
        let group_id = GroupId::new();

        let held = locks.handle(group_id);
        let _guard = held.lock();

        assert!(!locks.forget(group_id));
        let later = locks.handle(group_id);
        assert!(Arc::ptr_eq(&held, &later));
        assert!(later.try_lock().is_none());
    }

    #[test]
    fn test_runs_on_one_group_do_not_overlap() {
        let locks = Arc::new(GroupLocks::new());
        let group_id = GroupId::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let (locks, inside, max_inside) = (locks.clone(), inside.clone(), max_inside.clone());
                thread::spawn(move || {
                    for _ in 0..50 {
                        locks.with_group(group_id, || {
                            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                            max_inside.fetch_max(now, Ordering::SeqCst);
                            inside.fetch_sub(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }
}
