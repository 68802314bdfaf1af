/*!
# Rust Language Module

This Rust module provides the instruction language of the machine:
five character words and the commands they encode.

*/

#[macro_use]
mod error;
mod command;
mod word;

pub use command::parse;
pub use command::Command;
pub use command::Opcode;
pub use error::Error;
pub use error::ErrorCode;
pub use word::Word;
