//! Transient "copied" marker for batch rows.

use crate::lifecycle::TaskGuard;

/// Marks at most one row as just copied. Each `set` bumps the generation
/// and replaces the clear timer, so an older timer can never clear a newer
/// mark.
#[derive(Debug, Default)]
pub(crate) struct CopyIndicator {
    row: Option<usize>,
    generation: u64,
    clear_timer: Option<TaskGuard>,
}

impl CopyIndicator {
    pub fn row(&self) -> Option<usize> {
        self.row
    }

    /// Mark `row` and return the generation its clear timer must present.
    pub fn set(&mut self, row: usize) -> u64 {
        self.clear_timer.take();
        self.generation += 1;
        self.row = Some(row);
        self.generation
    }

    pub fn arm(&mut self, generation: u64, timer: TaskGuard) {
        if generation == self.generation {
            self.clear_timer = Some(timer);
        }
    }

    /// Clear the mark if it is still the one set at `generation`.
    pub fn expire(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.row.is_none() {
            return false;
        }
        self.row = None;
        self.clear_timer.take();
        true
    }

    /// Clear unconditionally (rows replaced, teardown).
    pub fn reset(&mut self) {
        self.generation += 1;
        self.row = None;
        self.clear_timer.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_mark_survives_older_expiry() {
        let mut indicator = CopyIndicator::default();
        let first = indicator.set(0);
        let second = indicator.set(3);
        assert_eq!(indicator.row(), Some(3));

        assert!(!indicator.expire(first));
        assert_eq!(indicator.row(), Some(3));

        assert!(indicator.expire(second));
        assert_eq!(indicator.row(), None);
        assert!(!indicator.expire(second));
    }

    #[test]
    fn test_reset_invalidates_pending_expiry() {
        let mut indicator = CopyIndicator::default();
        let generation = indicator.set(1);
        indicator.reset();
        assert_eq!(indicator.row(), None);
        assert!(!indicator.expire(generation));
    }
}
