use crate::lang::Opcode;

/// Cause stored in PI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramInterrupt {
    /// Invalid memory address.
    InvAddress,
    /// Invalid operation code or operands.
    InvOp,
    Overflow,
    /// Invalid assignment: a word that is not a number, or not a word.
    InvAssign,
}

/// Cause stored in SI: the privileged opcode a virtual machine asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperInterrupt {
    Gd,
    Pd,
    Rd,
    Wd,
    Sd,
    Halt,
}

impl SuperInterrupt {
    pub fn from_opcode(opcode: Opcode) -> Option<SuperInterrupt> {
        match opcode {
            Opcode::Gd => Some(SuperInterrupt::Gd),
            Opcode::Pd => Some(SuperInterrupt::Pd),
            Opcode::Rd => Some(SuperInterrupt::Rd),
            Opcode::Wd => Some(SuperInterrupt::Wd),
            Opcode::Sd => Some(SuperInterrupt::Sd),
            Opcode::Halt => Some(SuperInterrupt::Halt),
            _ => None,
        }
    }

    pub fn opcode(self) -> Opcode {
        match self {
            SuperInterrupt::Gd => Opcode::Gd,
            SuperInterrupt::Pd => Opcode::Pd,
            SuperInterrupt::Rd => Opcode::Rd,
            SuperInterrupt::Wd => Opcode::Wd,
            SuperInterrupt::Sd => Opcode::Sd,
            SuperInterrupt::Halt => Opcode::Halt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Supervisor,
    User,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Mode::Supervisor => write!(f, "S"),
            Mode::User => write!(f, "U"),
        }
    }
}

/// An interrupt the driver can service, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Super(SuperInterrupt),
    Program(ProgramInterrupt),
    Timer,
    Io(u8),
}

impl Interrupt {
    /// Word of the interrupt vector holding the handler address. Super
    /// interrupts are replayed by the driver and have no handler.
    pub fn vector(self) -> Option<usize> {
        match self {
            Interrupt::Super(_) => None,
            Interrupt::Program(_) => Some(0),
            Interrupt::Timer => Some(1),
            Interrupt::Io(_) => Some(2),
        }
    }
}

impl std::fmt::Display for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Interrupt::Super(si) => write!(f, "SI {:?}", si),
            Interrupt::Program(pi) => write!(f, "PI {:?}", pi),
            Interrupt::Timer => write!(f, "TI"),
            Interrupt::Io(mask) => write!(f, "IOI {:03b}", mask),
        }
    }
}
