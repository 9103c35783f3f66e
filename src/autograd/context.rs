//! Gradient-tracking context
//!
//! Validation runs forward passes under [`NoGradGuard`]; ops created while the
//! guard is alive never record backward ops, so no parameter can receive a
//! gradient from a validation batch.

use std::cell::Cell;

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Whether ops on this thread record backward ops
pub fn is_grad_enabled() -> bool {
    GRAD_ENABLED.with(Cell::get)
}

/// RAII guard disabling gradient tracking on the current thread
pub struct NoGradGuard {
    previous: bool,
}

impl NoGradGuard {
    /// Disable gradient tracking until the guard is dropped
    pub fn new() -> Self {
        let previous = GRAD_ENABLED.with(|g| g.replace(false));
        Self { previous }
    }
}

impl Default for NoGradGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for NoGradGuard {
    fn drop(&mut self) {
        GRAD_ENABLED.with(|g| g.set(self.previous));
    }
}

/// Run `f` with gradient tracking disabled
pub fn no_grad<T>(f: impl FnOnce() -> T) -> T {
    let _guard = NoGradGuard::new();
    f()
}
