use super::DEFAULT_TIMER;
use std::path::PathBuf;

/// ## Machine settings
///
/// Fixed when the driver is built.

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// TI after every `STVM`.
    pub timer: i32,
    /// External memory file. `None` keeps external memory in process.
    pub external_memory: Option<PathBuf>,
    /// Leave the external memory BUSY bit set after `WD` completes.
    pub sticky_write_busy: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            timer: DEFAULT_TIMER,
            external_memory: None,
            sticky_write_busy: false,
        }
    }
}
