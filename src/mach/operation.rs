use super::Comparison;
use crate::error;
use crate::lang::{Error, Word};

type Result<T> = std::result::Result<T, Error>;

/// ## Word arithmetic
///
/// Both operands must be numeric words. Results that do not fit back into
/// five digits, including negative ones, are an overflow.

pub struct Operation {}

impl Operation {
    pub fn sum(lhs: Word, rhs: Word) -> Result<Word> {
        let (l, r) = Operation::numbers(lhs, rhs)?;
        Operation::store(l + r, || format!("{} + {}", l, r))
    }

    pub fn subtract(lhs: Word, rhs: Word) -> Result<Word> {
        let (l, r) = Operation::numbers(lhs, rhs)?;
        Operation::store(l - r, || format!("{} - {}", l, r))
    }

    pub fn multiply(lhs: Word, rhs: Word) -> Result<Word> {
        let (l, r) = Operation::numbers(lhs, rhs)?;
        Operation::store(l * r, || format!("{} * {}", l, r))
    }

    pub fn modulo(lhs: Word, rhs: Word) -> Result<Word> {
        let (l, r) = Operation::numbers(lhs, rhs)?;
        match l.checked_rem(r) {
            Some(n) => Operation::store(n, || format!("{} % {}", l, r)),
            None => Err(error!(NumberOverflow; "DIVISION BY ZERO")),
        }
    }

    pub fn divide(lhs: Word, rhs: Word) -> Result<Word> {
        let (l, r) = Operation::numbers(lhs, rhs)?;
        match l.checked_div(r) {
            Some(n) => Operation::store(n, || format!("{} / {}", l, r)),
            None => Err(error!(NumberOverflow; "DIVISION BY ZERO")),
        }
    }

    /// Text comparison. Numbers are zero-padded to the same width so this
    /// orders them numerically as well.
    pub fn compare(lhs: Word, rhs: Word) -> Comparison {
        match lhs.as_bytes().cmp(rhs.as_bytes()) {
            std::cmp::Ordering::Equal => Comparison::Equal,
            std::cmp::Ordering::Less => Comparison::Less,
            std::cmp::Ordering::Greater => Comparison::More,
        }
    }

    fn numbers(lhs: Word, rhs: Word) -> Result<(i64, i64)> {
        Ok((lhs.to_number()? as i64, rhs.to_number()? as i64))
    }

    fn store<F: Fn() -> String>(result: i64, expression: F) -> Result<Word> {
        Word::from_number(result).map_err(|_| {
            error!(NumberOverflow; format!("{} = {} DOES NOT FIT IN A WORD", expression(), result))
        })
    }
}
