//! Busy flag shared between a board and its exporter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-entry gate held for the duration of one export.
///
/// Clones share the same flag. A second acquisition while the gate is held
/// fails immediately; callers never wait on it.
#[derive(Debug, Clone, Default)]
pub struct ExportGate {
    busy: Arc<AtomicBool>,
}

impl ExportGate {
    /// Create an open gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to enter the gate.
    ///
    /// Returns `None` if another holder is active.
    #[must_use]
    pub fn try_acquire(&self) -> Option<ExportPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExportPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Whether an export currently holds the gate.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of holding the gate. Dropping it reopens the gate.
#[derive(Debug)]
pub struct ExportPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for ExportPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_rejects_second_holder() {
        let gate = ExportGate::new();
        let shared = gate.clone();

        let permit = gate.try_acquire().expect("first acquire");
        assert!(shared.is_busy());
        assert!(shared.try_acquire().is_none());

        drop(permit);
        assert!(!gate.is_busy());
        assert!(shared.try_acquire().is_some());
    }
}
