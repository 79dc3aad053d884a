// State management module
//
// StateManager wraps AppState with thread-safe access using Arc<RwLock<T>> and
// emits change events for whoever listens (the command loop logs them).
// ScanCoordinator holds the run lock.

pub mod coordinator;

pub use coordinator::{RunGuard, ScanCoordinator};

use crate::models::{AppState, MediaType, ScanTrigger};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// A run took the lock and started scanning
    ScanStarted { trigger: ScanTrigger },

    /// The run moved on to another media type
    MediaTypeChanged { media_type: Option<MediaType> },

    /// A run finished and released the lock
    ScanFinished { processed: usize },

    /// A trigger was dropped because a run was in progress
    ScanSkipped { trigger: ScanTrigger },

    /// The recurring timer was paused or resumed
    TimerChanged { active: bool },
}

/// Thread-safe state manager with event emission
///
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// `is_scanning` is informational. Mutual exclusion of runs is the job of
/// [`ScanCoordinator`].
pub struct StateManager {
    state: Arc<RwLock<AppState>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with a broadcast buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> AppState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let scanning = state_manager.read(|state| state.is_scanning);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// Returns the events that were emitted.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);
        for change in &changes {
            // No subscriber is fine
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.timer_active != new.timer_active {
            changes.push(StateChange::TimerChanged {
                active: new.timer_active,
            });
        }

        if old.is_scanning != new.is_scanning {
            if new.is_scanning {
                changes.push(StateChange::ScanStarted {
                    trigger: new.current_trigger.unwrap_or(ScanTrigger::Manual),
                });
            } else {
                changes.push(StateChange::ScanFinished {
                    processed: new.last_titles.len(),
                });
            }
        }

        if old.current_media_type != new.current_media_type && new.is_scanning {
            changes.push(StateChange::MediaTypeChanged {
                media_type: new.current_media_type,
            });
        }

        changes
    }

    // Convenience methods for common state updates

    pub fn start_scan(&self, trigger: ScanTrigger) -> Vec<StateChange> {
        self.update(|state| {
            state.is_scanning = true;
            state.current_trigger = Some(trigger);
            state.current_media_type = None;
        })
    }

    pub fn set_media_type(&self, media_type: MediaType) -> Vec<StateChange> {
        self.update(|state| {
            state.current_media_type = Some(media_type);
        })
    }

    /// End the current run and record the titles it produced
    pub fn finish_scan(&self, titles: Vec<String>) -> Vec<StateChange> {
        self.update(|state| {
            state.is_scanning = false;
            state.current_trigger = None;
            state.current_media_type = None;
            state.record_run(titles);
        })
    }

    /// Count a dropped trigger and emit [`StateChange::ScanSkipped`]
    pub fn record_skipped(&self, trigger: ScanTrigger) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.scans_skipped += 1;
        });

        let event = StateChange::ScanSkipped { trigger };
        let _ = self.state_tx.send(event.clone());
        changes.push(event);

        changes
    }

    pub fn set_timer_active(&self, active: bool) -> Vec<StateChange> {
        self.update(|state| {
            state.timer_active = active;
        })
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(!state.is_scanning);
        assert!(!state.timer_active);
        assert_eq!(state.scans_completed, 0);
    }

    #[test]
    fn test_start_and_finish_scan() {
        let manager = StateManager::new();

        let changes = manager.start_scan(ScanTrigger::Scheduled);
        assert_eq!(
            changes,
            vec![StateChange::ScanStarted {
                trigger: ScanTrigger::Scheduled
            }]
        );

        let changes = manager.set_media_type(MediaType::Series);
        assert_eq!(
            changes,
            vec![StateChange::MediaTypeChanged {
                media_type: Some(MediaType::Series)
            }]
        );

        let changes = manager.finish_scan(vec!["A".to_string(), "B".to_string()]);
        assert_eq!(changes, vec![StateChange::ScanFinished { processed: 2 }]);

        let state = manager.snapshot();
        assert!(!state.is_scanning);
        assert_eq!(state.scans_completed, 1);
        assert_eq!(state.files_processed, 2);
    }

    #[test]
    fn test_record_skipped() {
        let manager = StateManager::new();
        let changes = manager.record_skipped(ScanTrigger::Manual);

        assert!(changes.contains(&StateChange::ScanSkipped {
            trigger: ScanTrigger::Manual
        }));
        assert_eq!(manager.read(|s| s.scans_skipped), 1);
    }

    #[test]
    fn test_timer_change_only_on_transition() {
        let manager = StateManager::new();

        let changes = manager.set_timer_active(true);
        assert_eq!(changes, vec![StateChange::TimerChanged { active: true }]);

        let changes = manager.set_timer_active(true);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_subscribe_to_changes() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.start_scan(ScanTrigger::Manual);

        let event = rx.try_recv();
        assert!(matches!(event, Ok(StateChange::ScanStarted { .. })));
    }

    #[test]
    fn test_clone_shares_state() {
        let manager1 = StateManager::new();
        let manager2 = manager1.clone();

        manager1.set_timer_active(true);

        assert!(manager2.snapshot().timer_active);
    }
}
