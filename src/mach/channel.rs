use crate::error;
use crate::lang::{Error, Word};
use std::sync::{Condvar, Mutex, MutexGuard};

type Result<T> = std::result::Result<T, Error>;

/// ## I/O channel
///
/// A device behind a monitor. `acquire` waits until no other operation is
/// in progress and marks the channel busy until the returned guard is
/// dropped. A waiter is only released by that drop; a poisoned monitor is
/// an internal error.

pub struct Channel<D> {
    index: u8,
    state: Mutex<State<D>>,
    freed: Condvar,
}

struct State<D> {
    busy: bool,
    device: D,
}

pub struct ChannelGuard<'a, D> {
    channel: &'a Channel<D>,
}

impl<D> Channel<D> {
    pub fn new(index: u8, device: D) -> Channel<D> {
        debug_assert!((1..=8).contains(&index));
        Channel {
            index,
            state: Mutex::new(State {
                busy: false,
                device,
            }),
            freed: Condvar::new(),
        }
    }

    /// Bit of this channel in the BUSY and IOI registers.
    pub fn bit(&self) -> u8 {
        1 << (self.index - 1)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State<D>>> {
        self.state
            .lock()
            .map_err(|_| error!(InternalError; "CHANNEL MONITOR POISONED"))
    }

    pub fn is_busy(&self) -> Result<bool> {
        Ok(self.lock()?.busy)
    }

    pub fn acquire(&self) -> Result<ChannelGuard<'_, D>> {
        let mut state = self.lock()?;
        while state.busy {
            state = self
                .freed
                .wait(state)
                .map_err(|_| error!(InternalError; "CHANNEL WAIT INTERRUPTED"))?;
        }
        state.busy = true;
        Ok(ChannelGuard { channel: self })
    }

    /// Read the device without taking the channel.
    pub fn peek<R, F: FnOnce(&D) -> R>(&self, f: F) -> Result<R> {
        Ok(f(&self.lock()?.device))
    }
}

impl<'a, D> ChannelGuard<'a, D> {
    pub fn with<R, F: FnOnce(&mut D) -> R>(&self, f: F) -> Result<R> {
        Ok(f(&mut self.channel.lock()?.device))
    }
}

impl<'a, D> Drop for ChannelGuard<'a, D> {
    fn drop(&mut self) {
        let mut state = match self.channel.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.busy = false;
        self.channel.freed.notify_all();
    }
}

impl<D> std::fmt::Debug for Channel<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Channel({})", self.index)
    }
}

/// Input buffer: holds the last word typed, until a `GD` consumes it.
#[derive(Debug, Default)]
pub struct Keyboard {
    pending: Option<Word>,
}

impl Keyboard {
    pub const INDEX: u8 = 1;

    pub fn feed(&mut self, word: Word) {
        self.pending = Some(word);
    }

    pub fn take(&mut self) -> Option<Word> {
        self.pending.take()
    }

    pub fn word(&self) -> Option<Word> {
        self.pending
    }
}

impl Channel<Keyboard> {
    pub fn keyboard() -> Channel<Keyboard> {
        Channel::new(Keyboard::INDEX, Keyboard::default())
    }

    pub fn feed(&self, word: Word) -> Result<()> {
        self.acquire()?.with(|keyboard| keyboard.feed(word))
    }
}

/// Output buffer: the word most recently displayed.
#[derive(Debug, Default)]
pub struct Screen {
    word: Option<Word>,
}

impl Screen {
    pub const INDEX: u8 = 2;

    pub fn publish(&mut self, word: Word) {
        self.word = Some(word);
    }

    pub fn word(&self) -> Option<Word> {
        self.word
    }
}

impl Channel<Screen> {
    pub fn screen() -> Channel<Screen> {
        Channel::new(Screen::INDEX, Screen::default())
    }
}
