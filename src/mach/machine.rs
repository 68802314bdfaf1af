use super::{Address, Memory, Operation, SuperInterrupt};
use crate::error;
use crate::lang::{Command, Error, Opcode, Word};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    Less,
    More,
}

impl Comparison {
    pub fn digit(self) -> u8 {
        match self {
            Comparison::Equal => 0,
            Comparison::Less => 1,
            Comparison::More => 2,
        }
    }

    pub fn from_digit(digit: u8) -> Option<Comparison> {
        match digit {
            0 => Some(Comparison::Equal),
            1 => Some(Comparison::Less),
            2 => Some(Comparison::More),
            _ => None,
        }
    }
}

impl Default for Comparison {
    fn default() -> Comparison {
        Comparison::Equal
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Comparison::Equal => write!(f, "EQUAL"),
            Comparison::Less => write!(f, "LESS"),
            Comparison::More => write!(f, "MORE"),
        }
    }
}

/// What the caller does after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Advance IC by one.
    Next,
    /// IC already points at the next instruction.
    Jumped,
    /// A virtual machine asked its real machine to do this for it.
    Trap(SuperInterrupt),
    /// The real machine stops.
    Halt,
}

/// ## Registers and memory shared by both kinds of machine
///
/// Real and virtual machines intercept their own opcodes and hand
/// everything else to `Machine::execute`.

#[derive(Debug, Clone)]
pub struct Machine {
    pub ic: Address,
    pub tmp: Word,
    pub c: Comparison,
    memory: Memory,
}

impl Machine {
    pub fn new(memory: Memory) -> Machine {
        Machine {
            ic: 0,
            tmp: Word::default(),
            c: Comparison::default(),
            memory,
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn fetch(&self) -> Result<Word> {
        self.memory.get(self.ic)
    }

    pub fn execute(&mut self, command: &Command) -> Result<Flow> {
        let arg = command.argument();
        match command.opcode() {
            Opcode::Cr => self.tmp = self.memory.get(arg)?,
            Opcode::Cm => self.memory.replace(arg, self.tmp)?,
            Opcode::Ad => self.tmp = Operation::sum(self.tmp, self.memory.get(arg)?)?,
            Opcode::Sb => self.tmp = Operation::subtract(self.tmp, self.memory.get(arg)?)?,
            Opcode::Ml => self.tmp = Operation::multiply(self.tmp, self.memory.get(arg)?)?,
            Opcode::Md => self.tmp = Operation::modulo(self.tmp, self.memory.get(arg)?)?,
            Opcode::Dv => self.tmp = Operation::divide(self.tmp, self.memory.get(arg)?)?,
            Opcode::Cp => self.c = Operation::compare(self.tmp, self.memory.get(arg)?),
            Opcode::Jp => return self.jump(arg),
            Opcode::Je if self.c == Comparison::Equal => return self.jump(arg),
            Opcode::Jl if self.c == Comparison::Less => return self.jump(arg),
            Opcode::Jm if self.c == Comparison::More => return self.jump(arg),
            Opcode::Je | Opcode::Jl | Opcode::Jm => {}
            _ => return Err(error!(UnhandledCommand; command.to_string())),
        }
        Ok(Flow::Next)
    }

    fn jump(&mut self, target: Address) -> Result<Flow> {
        if target >= self.memory.len() {
            return Err(error!(OutOfBounds, target; "JUMP TARGET"));
        }
        self.ic = target;
        Ok(Flow::Jumped)
    }
}
