use super::{Address, Memory, BLOCK_SIZE, VM_MEMORY_SIZE};
use crate::error;
use crate::lang::{Error, Word};

type Result<T> = std::result::Result<T, Error>;

/// ## Address translation
///
/// Maps each 10 word block of a 100 word virtual window to the absolute
/// address of a block in real memory. Real memory holds the authoritative
/// copy, a `PageTable` is only ever read from it or written to it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTable {
    bases: [Address; PageTable::LEN],
}

impl PageTable {
    pub const LEN: usize = VM_MEMORY_SIZE / BLOCK_SIZE;

    pub fn new(bases: [Address; PageTable::LEN]) -> PageTable {
        PageTable { bases }
    }

    /// Blocks laid out one after another starting at `base`.
    pub fn contiguous(base: Address) -> PageTable {
        let mut bases = [0; PageTable::LEN];
        for (i, b) in bases.iter_mut().enumerate() {
            *b = base + i * BLOCK_SIZE;
        }
        PageTable { bases }
    }

    pub fn bases(&self) -> &[Address] {
        &self.bases
    }

    pub fn translate(&self, relative: Address) -> Result<Address> {
        if relative >= VM_MEMORY_SIZE {
            return Err(error!(OutOfBounds, relative; "VIRTUAL ADDRESS"));
        }
        Ok(self.bases[relative / BLOCK_SIZE] + relative % BLOCK_SIZE)
    }

    pub fn load(memory: &Memory, at: Address) -> Result<PageTable> {
        let mut bases = [0; PageTable::LEN];
        for (b, word) in bases.iter_mut().zip(memory.get_range(at, PageTable::LEN)?) {
            *b = word.to_number()? as Address;
        }
        Ok(PageTable { bases })
    }

    pub fn store(&self, memory: &Memory, at: Address) -> Result<()> {
        let mut words = Vec::with_capacity(PageTable::LEN);
        for &base in self.bases.iter() {
            words.push(Word::from_number(base as i64)?);
        }
        memory.replace_all(at, &words)
    }
}
