use super::{Channel, BLOCK_SIZE};
use crate::error;
use crate::lang::{Error, Word};
use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

type Result<T> = std::result::Result<T, Error>;

/// Anything external memory can live in.
pub trait Storage: Read + Write + Seek + Send {
    fn sync(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Storage for File {
    fn sync(&mut self) -> std::io::Result<()> {
        self.sync_data()
    }
}

impl Storage for Cursor<Vec<u8>> {}

/// ## Block addressed external memory
///
/// A text file of `SIZE` lines, each holding one block of ten words
/// separated by spaces. The pointer picks the line for the next read or
/// write and never moves by itself.

pub struct ExternalMemory {
    storage: Box<dyn Storage>,
    pointer: usize,
}

impl ExternalMemory {
    pub const INDEX: u8 = 3;
    /// Size in blocks.
    pub const SIZE: usize = 1000;
    /// Ten words, nine separators and a newline.
    pub const LINE_LEN: usize = Word::LENGTH * BLOCK_SIZE + (BLOCK_SIZE - 1) + 1;

    pub fn open<P: AsRef<Path>>(path: P) -> Result<ExternalMemory> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path.as_ref())
            .map_err(|e| error!(DiskError; format!("{}: {}", path.as_ref().display(), e)))?;
        ExternalMemory::with_storage(Box::new(file))
    }

    pub fn in_memory() -> Result<ExternalMemory> {
        ExternalMemory::with_storage(Box::new(Cursor::new(Vec::new())))
    }

    /// Complete lines already present are kept, the rest of the store is
    /// filled with zero words.
    pub fn with_storage(mut storage: Box<dyn Storage>) -> Result<ExternalMemory> {
        let len = storage.seek(SeekFrom::End(0))? as usize;
        let present = len / ExternalMemory::LINE_LEN;
        if present < ExternalMemory::SIZE {
            let zeros = [Word::default(); BLOCK_SIZE];
            let line = ExternalMemory::encode(&zeros);
            storage.seek(SeekFrom::Start((present * ExternalMemory::LINE_LEN) as u64))?;
            for _ in present..ExternalMemory::SIZE {
                storage.write_all(&line)?;
            }
            storage.flush()?;
            storage.sync()?;
        }
        Ok(ExternalMemory {
            storage,
            pointer: 0,
        })
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn set_pointer(&mut self, pointer: usize) -> Result<()> {
        if pointer > ExternalMemory::SIZE {
            return Err(error!(OutOfBounds, pointer; "EXTERNAL MEMORY POINTER"));
        }
        self.pointer = pointer;
        Ok(())
    }

    fn seek(&mut self) -> Result<()> {
        let at = (self.pointer * ExternalMemory::LINE_LEN) as u64;
        self.storage.seek(SeekFrom::Start(at))?;
        Ok(())
    }

    pub fn read(&mut self) -> Result<Vec<Word>> {
        self.seek()?;
        let mut line = [0u8; ExternalMemory::LINE_LEN];
        self.storage.read_exact(&mut line)?;
        line.chunks(Word::LENGTH + 1)
            .map(|chunk| {
                let text = String::from_utf8_lossy(&chunk[..Word::LENGTH]);
                Word::new(&text)
            })
            .collect()
    }

    pub fn write(&mut self, words: &[Word]) -> Result<()> {
        if words.len() != BLOCK_SIZE {
            return Err(error!(InternalError; format!(
                "EXTERNAL MEMORY WRITES {} WORDS, GOT {}",
                BLOCK_SIZE,
                words.len()
            )));
        }
        self.seek()?;
        self.storage.write_all(&ExternalMemory::encode(words))?;
        self.storage.flush()?;
        self.storage.sync()?;
        Ok(())
    }

    fn encode(words: &[Word]) -> Vec<u8> {
        let mut line = Vec::with_capacity(ExternalMemory::LINE_LEN);
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                line.push(b' ');
            }
            line.extend_from_slice(word.as_bytes());
        }
        line.push(b'\n');
        line
    }
}

impl std::fmt::Debug for ExternalMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExternalMemory {{ pointer: {} }}", self.pointer)
    }
}

impl Channel<ExternalMemory> {
    pub fn external_memory(device: ExternalMemory) -> Channel<ExternalMemory> {
        Channel::new(ExternalMemory::INDEX, device)
    }
}
