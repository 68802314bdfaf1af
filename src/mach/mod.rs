/*!
## Rust Machine Module

This Rust module is the two tier machine: a real machine with devices,
interrupts and six slots of virtual machines, and the driver that steps it.

Real memory layout:

| words     | content                                              |
|-----------|------------------------------------------------------|
| 0..10     | interrupt vector, word 9 holds the interrupted slot  |
| 10..70    | page tables, one block per slot                      |
| 70..670   | virtual machine windows, 100 words per slot          |
| 670..1000 | supervisor, where the real machine starts            |

*/

pub type Address = usize;

pub const MEMORY_SIZE: usize = 1000;
pub const BLOCK_SIZE: usize = 10;
pub const VM_MEMORY_SIZE: usize = 100;
pub const VM_COUNT: usize = 6;
pub const INTERRUPT_VECTOR: Address = 0;
pub const INTERRUPTED_SLOT: Address = INTERRUPT_VECTOR + 9;
pub const PAGE_TABLE_BASE: Address = 10;
pub const VM_MEMORY_BASE: Address = PAGE_TABLE_BASE + VM_COUNT * BLOCK_SIZE;
pub const SUPERVISOR_BASE: Address = VM_MEMORY_BASE + VM_COUNT * VM_MEMORY_SIZE;
pub const DEFAULT_TIMER: i32 = 10;

mod channel;
mod config;
mod driver;
mod external_memory;
mod gate;
mod interrupt;
mod machine;
mod memory;
mod operation;
mod page_table;
mod real_machine;
mod virtual_machine;

#[cfg(test)]
mod tests;

pub use channel::Channel;
pub use channel::ChannelGuard;
pub use channel::Keyboard;
pub use channel::Screen;
pub use config::Config;
pub use driver::Driver;
pub use driver::Event;
pub use driver::LogEntry;
pub use driver::Origin;
pub use external_memory::ExternalMemory;
pub use external_memory::Storage;
pub use gate::Gate;
pub use interrupt::Interrupt;
pub use interrupt::Mode;
pub use interrupt::ProgramInterrupt;
pub use interrupt::SuperInterrupt;
pub use machine::Comparison;
pub use machine::Flow;
pub use machine::Machine;
pub use memory::Memory;
pub use operation::Operation;
pub use page_table::PageTable;
pub use real_machine::RealMachine;
pub use virtual_machine::VirtualMachine;
