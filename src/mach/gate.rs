use crate::error;
use crate::lang::Error;
use std::sync::{Condvar, Mutex};

type Result<T> = std::result::Result<T, Error>;

/// ## Single step gate
///
/// A counting semaphore. Every `advance` lets exactly one `wait` through.

#[derive(Debug, Default)]
pub struct Gate {
    permits: Mutex<usize>,
    opened: Condvar,
}

impl Gate {
    pub fn new() -> Gate {
        Gate::default()
    }

    pub fn advance(&self) {
        let mut permits = match self.permits.lock() {
            Ok(permits) => permits,
            Err(poisoned) => poisoned.into_inner(),
        };
        *permits += 1;
        self.opened.notify_one();
    }

    pub fn wait(&self) -> Result<()> {
        let mut permits = self
            .permits
            .lock()
            .map_err(|_| error!(InternalError; "GATE POISONED"))?;
        while *permits == 0 {
            permits = self
                .opened
                .wait(permits)
                .map_err(|_| error!(InternalError; "GATE WAIT INTERRUPTED"))?;
        }
        *permits -= 1;
        Ok(())
    }
}
