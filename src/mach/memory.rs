use super::{Address, BLOCK_SIZE};
use crate::error;
use crate::lang::{Error, Word};
use std::sync::{Arc, Mutex, MutexGuard};

type Result<T> = std::result::Result<T, Error>;

/// ## Word addressable memory
///
/// A `Memory` is a window of `len` words starting at `offset` in a shared
/// backing store. Cloning a `Memory` or taking a `slice` never copies words:
/// every view writes through to the same cells.

#[derive(Clone)]
pub struct Memory {
    cells: Arc<Mutex<Vec<Word>>>,
    offset: usize,
    len: usize,
}

impl Memory {
    pub fn new(size: usize) -> Memory {
        Memory::from_words(vec![Word::default(); size])
    }

    pub fn from_words(words: Vec<Word>) -> Memory {
        let len = words.len();
        Memory {
            cells: Arc::new(Mutex::new(words)),
            offset: 0,
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Word>> {
        // A panic while holding the lock cannot leave a Word half written.
        self.cells.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self, index: Address, count: usize) -> Result<()> {
        match index.checked_add(count) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(error!(OutOfBounds, index; format!(
                "{} WORDS OUTSIDE MEMORY OF {}",
                count, self.len
            ))),
        }
    }

    pub fn get(&self, index: Address) -> Result<Word> {
        self.check(index, 1)?;
        Ok(self.lock()[self.offset + index])
    }

    pub fn get_range(&self, start: Address, count: usize) -> Result<Vec<Word>> {
        self.check(start, count)?;
        let begin = self.offset + start;
        Ok(self.lock()[begin..begin + count].to_vec())
    }

    pub fn replace(&self, index: Address, word: Word) -> Result<()> {
        self.check(index, 1)?;
        self.lock()[self.offset + index] = word;
        Ok(())
    }

    /// Writes one word at a time. Words before an out of bounds index stay
    /// written.
    pub fn replace_all(&self, start: Address, words: &[Word]) -> Result<()> {
        for (i, word) in words.iter().enumerate() {
            self.replace(start + i, *word)?;
        }
        Ok(())
    }

    /// An aliasing view of `len` words starting at `from`.
    pub fn slice(&self, from: Address, len: usize) -> Result<Memory> {
        self.check(from, len)?;
        Ok(Memory {
            cells: Arc::clone(&self.cells),
            offset: self.offset + from,
            len,
        })
    }

    /// Copy of block `block`, starting at word `block * 10`, for display.
    pub fn block(&self, block: usize) -> Result<Vec<Word>> {
        let at = block
            .checked_mul(BLOCK_SIZE)
            .ok_or_else(|| error!(InvalidArguments; format!("NO BLOCK {}", block)))?;
        Ok(self.slice(at, BLOCK_SIZE)?.words())
    }

    /// Copy of every word in this view, for display.
    pub fn words(&self) -> Vec<Word> {
        let begin = self.offset;
        self.lock()[begin..begin + self.len].to_vec()
    }

    /// Index of this view's first word in the backing store.
    pub fn offset(&self) -> Address {
        self.offset
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Memory({}..{})", self.offset, self.offset + self.len)
    }
}
