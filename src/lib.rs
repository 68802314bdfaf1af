//! # VRM
//!
//! A real machine hosting up to six paged virtual machines.
//!
//! Programs are written in five character words such as `AD015` or `HALT `.
//! The real machine starts at word 670 in supervisor mode, creates virtual
//! machines with `STVM`, and services their traps and interrupts.
//!
//! Start the terminal with a program file and step through it.
//! ```text
//! vrm program.txt
//! 670 S STVM0
//! >
//! ```
//!
//! Press ENTER to execute one step. The tutorial below walks through a
//! complete program.

#[path = "doc/introduction.rs"]
#[allow(non_snake_case)]
pub mod _Introduction;

#[path = "doc/chapter_1.rs"]
#[allow(non_snake_case)]
pub mod __Chapter_1;

#[path = "doc/chapter_2.rs"]
#[allow(non_snake_case)]
pub mod __Chapter_2;

#[path = "doc/appendix_a.rs"]
#[allow(non_snake_case)]
pub mod ___Appendix_A;

pub mod lang;
pub mod mach;
