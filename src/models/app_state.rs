use crate::models::{MediaType, ScanTrigger};

/// Observable runtime state of the extractor.
///
/// Mutated only through [`crate::state::StateManager`], which emits a
/// [`crate::state::StateChange`] for every transition it detects. The run lock
/// itself lives in [`crate::state::ScanCoordinator`]; `is_scanning` mirrors it for
/// observers and is never used for mutual exclusion.
#[derive(Clone, Debug)]
pub struct AppState {
    // Timer
    pub timer_active: bool,

    // Runtime state
    pub is_scanning: bool,
    pub current_trigger: Option<ScanTrigger>,
    pub current_media_type: Option<MediaType>,

    // Totals since process start
    pub scans_completed: usize,
    pub scans_skipped: usize,
    pub files_processed: usize,
    pub last_titles: Vec<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            timer_active: false,
            is_scanning: false,
            current_trigger: None,
            current_media_type: None,
            scans_completed: 0,
            scans_skipped: 0,
            files_processed: 0,
            last_titles: Vec::new(),
        }
    }
}

impl AppState {
    /// Record the titles produced by one finished run
    pub fn record_run(&mut self, titles: Vec<String>) {
        self.scans_completed += 1;
        self.files_processed += titles.len();
        self.last_titles = titles;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = AppState::default();
        assert!(!state.timer_active);
        assert!(!state.is_scanning);
        assert_eq!(state.scans_completed, 0);
        assert!(state.last_titles.is_empty());
    }

    #[test]
    fn test_record_run_accumulates() {
        let mut state = AppState::default();
        state.record_run(vec!["A".to_string(), "B".to_string()]);
        state.record_run(vec!["C".to_string()]);

        assert_eq!(state.scans_completed, 2);
        assert_eq!(state.files_processed, 3);
        assert_eq!(state.last_titles, vec!["C".to_string()]);
    }
}
