use super::{Command, Error};
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// ## Memory cell
///
/// Every cell of memory holds exactly five ASCII characters. The same cell
/// can be read as an instruction (`AD015`), a number (`00042`) or plain text.
/// Numbers are always non-negative and zero-padded, so comparing two numeric
/// words as text gives the same order as comparing them as numbers.

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word([u8; Word::LENGTH]);

impl Word {
    pub const LENGTH: usize = 5;
    pub const MAX_NUMBER: u32 = 99_999;

    pub fn new(s: &str) -> Result<Word> {
        if !s.is_ascii() || s.len() != Word::LENGTH {
            return Err(error!(InvalidWord; format!("{:?}", s)));
        }
        let mut bytes = [0u8; Word::LENGTH];
        bytes.copy_from_slice(s.as_bytes());
        Ok(Word(bytes))
    }

    pub fn from_number<T: Into<i64>>(number: T) -> Result<Word> {
        let number = number.into();
        if number < 0 || number > Word::MAX_NUMBER as i64 {
            return Err(error!(NumberOverflow; format!("{} DOES NOT FIT IN A WORD", number)));
        }
        Word::new(&format!("{:05}", number))
    }

    pub fn to_number(&self) -> Result<u32> {
        if !self.0.iter().all(u8::is_ascii_digit) {
            return Err(error!(NotANumber; format!("{:?}", self.as_str())));
        }
        Ok(self
            .0
            .iter()
            .fold(0, |acc, digit| acc * 10 + (digit - b'0') as u32))
    }

    pub fn as_str(&self) -> &str {
        // Construction only admits ASCII.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for Word {
    fn default() -> Word {
        Word(*b"00000")
    }
}

impl TryFrom<&str> for Word {
    type Error = Error;
    fn try_from(s: &str) -> Result<Word> {
        Word::new(s)
    }
}

impl std::str::FromStr for Word {
    type Err = Error;
    fn from_str(s: &str) -> Result<Word> {
        Word::new(s)
    }
}

impl From<&Command> for Word {
    /// Instruction text padded with trailing spaces, `HALT` becomes `"HALT "`.
    fn from(command: &Command) -> Word {
        let mut bytes = [b' '; Word::LENGTH];
        for (cell, ch) in bytes.iter_mut().zip(command.to_string().bytes()) {
            *cell = ch;
        }
        Word(bytes)
    }
}

impl From<Command> for Word {
    fn from(command: Command) -> Word {
        Word::from(&command)
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::fmt::Debug for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Word({:?})", self.as_str())
    }
}
