//! Process-wide interrupt flag.
//!
//! Ctrl+C sets a flag instead of killing the process so that long-running
//! tool loops can stop at a clean point and the driver can report the
//! cancellation through its normal error path.

use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static INSTALL: Once = Once::new();

/// Check whether the user has interrupted the run.
#[inline]
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Set the interrupted flag (called from the signal handler).
#[inline]
pub fn set_interrupted() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Reset the interrupted flag.
#[inline]
pub fn reset() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

/// Install the Ctrl+C handler. Safe to call more than once; only the first
/// call registers the handler.
pub fn install() {
    INSTALL.call_once(|| {
        let _ = ctrlc::set_handler(|| {
            set_interrupted();
            eprintln!("\nInterrupted");
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_flag() {
        reset();
        assert!(!interrupted());

        set_interrupted();
        assert!(interrupted());

        reset();
        assert!(!interrupted());
    }
}
