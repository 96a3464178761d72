//! Process-wide busy indicator.
//!
//! Every asynchronous store operation holds a [`BusyGuard`] for its whole duration. The guard
//! decrements the counter when dropped, so the indicator balances on early returns and `?`
//! exits as well as on success.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct BusyIndicator {
    pending: Arc<AtomicUsize>,
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks one operation as in flight until the returned guard is dropped.
    #[must_use = "the indicator clears as soon as the guard is dropped"]
    pub fn acquire(&self) -> BusyGuard {
        if self.pending.fetch_add(1, Ordering::SeqCst) == 0 {
            tracing::trace!("busy");
        }
        BusyGuard {
            pending: Arc::clone(&self.pending),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending() > 0
    }

    /// Number of operations currently in flight.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct BusyGuard {
    pending: Arc<AtomicUsize>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            tracing::trace!("idle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards_nest() {
        let busy = BusyIndicator::new();
        assert!(!busy.is_busy());
        let outer = busy.acquire();
        let inner = busy.acquire();
        assert_eq!(busy.pending(), 2);
        drop(inner);
        assert!(busy.is_busy());
        drop(outer);
        assert!(!busy.is_busy());
    }

    #[test]
    fn test_guard_released_on_error_path() {
        fn failing(busy: &BusyIndicator) -> Result<(), &'static str> {
            let _guard = busy.acquire();
            Err::<(), _>("store down")?;
            Ok(())
        }

        let busy = BusyIndicator::new();
        assert!(failing(&busy).is_err());
        assert_eq!(busy.pending(), 0);
    }

    #[test]
    fn test_clones_share_the_counter() {
        let busy = BusyIndicator::new();
        let view = busy.clone();
        let _guard = busy.acquire();
        assert!(view.is_busy());
    }
}
