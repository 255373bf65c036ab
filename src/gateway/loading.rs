//! gateway::loading
//!
//! Observable "a create is in flight" flag.
//!
//! The flag is a `tokio::sync::watch` channel: subscribers get the current
//! value immediately and are woken on every transition. It starts `false`,
//! becomes `true` when the first create begins, and returns to `false` when
//! the last overlapping create settles. The reset lives in
//! [`LoadingGuard`]'s `Drop`, so it also happens on error returns and when
//! the create future is dropped mid-flight.
//!
//! Only the gateway can raise the flag; outside the crate it is read-only.
//!
//! ```compile_fail
//! use forgegate::gateway::LoadingFlag;
//!
//! let flag = LoadingFlag::new();
//! let _guard = flag.begin();
//! ```

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

/// Instance-scoped loading flag.
#[derive(Debug)]
pub struct LoadingFlag {
    tx: watch::Sender<bool>,
    in_flight: Mutex<usize>,
}

impl Default for LoadingFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingFlag {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            tx,
            in_flight: Mutex::new(0),
        }
    }

    /// Current value.
    pub fn is_loading(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribe to transitions. The receiver sees the current value first.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Mark one operation in flight until the returned guard is dropped.
    pub(crate) fn begin(&self) -> LoadingGuard<'_> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *in_flight += 1;
        if *in_flight == 1 {
            self.tx.send_replace(true);
        }
        LoadingGuard { flag: self }
    }

    fn end(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *in_flight = in_flight.saturating_sub(1);
        if *in_flight == 0 {
            self.tx.send_replace(false);
        }
    }
}

/// Scope of one in-flight operation.
#[derive(Debug)]
#[must_use = "the flag resets as soon as the guard is dropped"]
pub(crate) struct LoadingGuard<'a> {
    flag: &'a LoadingFlag,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.end();
    }
}
