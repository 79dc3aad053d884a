use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide run lock.
///
/// At most one scan runs at a time. A trigger that finds the lock held is
/// dropped, never queued, so a manual scan requested during a scheduled one
/// cannot move the same files twice.
///
/// Create one at startup and share it through an `Arc`.
#[derive(Debug, Default)]
pub struct ScanCoordinator {
    held: AtomicBool,
}

impl ScanCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic test-and-set: `true` if the lock was free and is now held by the caller
    pub fn try_acquire(&self) -> bool {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Mark the lock free again, whatever its current state
    pub fn release(&self) {
        self.held.store(false, Ordering::Release);
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Acquire the lock for the lifetime of the returned guard.
    ///
    /// Returns `None` when another run holds it. Dropping the guard releases the
    /// lock, including during unwinding.
    pub fn try_lock(&self) -> Option<RunGuard<'_>> {
        self.try_acquire().then_some(RunGuard { coordinator: self })
    }
}

/// Releases the run lock on drop
#[derive(Debug)]
pub struct RunGuard<'a> {
    coordinator: &'a ScanCoordinator,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.release();
    }
}
