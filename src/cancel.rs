use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const CANCEL_ORDERING: Ordering = Ordering::SeqCst;

/// Flag shared between the filter and whoever may want to stop it.
///
/// The filter checks the flag before reading each line. Once set it stays
/// set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, CANCEL_ORDERING);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(CANCEL_ORDERING)
    }
}
