use super::{Address, Comparison, Flow, Machine, Memory, SuperInterrupt, BLOCK_SIZE, VM_MEMORY_SIZE};
use crate::error;
use crate::lang::{Command, Error, Opcode, Word};

type Result<T> = std::result::Result<T, Error>;

/// ## Unprivileged machine
///
/// Runs against a 100 word window of real memory using relative
/// addresses. Anything touching a device is handed back to the real
/// machine as a trap, the virtual machine never performs it itself.
///
/// Registers are saved into the last two words of the window:
///
/// | word | content                               |
/// |------|---------------------------------------|
/// | 98   | TMP                                   |
/// | 99   | IC (2 digits), C (1 digit), `00`      |

#[derive(Debug)]
pub struct VirtualMachine {
    slot: usize,
    machine: Machine,
}

impl VirtualMachine {
    pub const TMP_ADDRESS: Address = VM_MEMORY_SIZE - 2;
    pub const REGISTERS_ADDRESS: Address = VM_MEMORY_SIZE - 1;

    pub fn new(slot: usize, window: Memory) -> VirtualMachine {
        debug_assert_eq!(window.len(), VM_MEMORY_SIZE);
        VirtualMachine {
            slot,
            machine: Machine::new(window),
        }
    }

    /// Slot of the owning real machine this machine occupies.
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn memory(&self) -> &Memory {
        self.machine.memory()
    }

    pub fn ic(&self) -> Address {
        self.machine.ic
    }

    /// Move past the current instruction. The counter wraps inside the
    /// window.
    pub fn advance(&mut self) {
        self.machine.ic = (self.machine.ic + 1) % VM_MEMORY_SIZE;
    }

    /// Fetch, decode and execute the instruction at IC. A trap leaves IC
    /// on the trapping instruction.
    pub fn step(&mut self) -> Result<(Command, Flow)> {
        let ic = self.machine.ic;
        let command = self
            .machine
            .fetch()
            .and_then(|word| Command::parse(&word))
            .map_err(|e| e.in_address(ic))?;
        let flow = self.execute(&command).map_err(|e| e.in_address(ic))?;
        if flow == Flow::Next {
            self.advance();
        }
        Ok((command, flow))
    }

    pub fn execute(&mut self, command: &Command) -> Result<Flow> {
        let opcode = command.opcode();
        if opcode.arity() == 3 && command.x() != 0 {
            return Err(error!(OutOfBounds; format!("VIRTUAL OPERAND {:03}", command.argument())));
        }
        match opcode {
            Opcode::Rd | Opcode::Wd if command.argument() + BLOCK_SIZE > VM_MEMORY_SIZE => {
                Err(error!(OutOfBounds; format!("BLOCK AT {:03} PAST END OF WINDOW", command.argument())))
            }
            // Input must not land on the saved registers, the replay
            // restores them right after.
            Opcode::Gd if command.argument() >= VirtualMachine::TMP_ADDRESS => {
                Err(error!(OutOfBounds; format!("INPUT AT {:03} OVER REGISTERS", command.argument())))
            }
            Opcode::Rd if command.argument() + BLOCK_SIZE > VirtualMachine::TMP_ADDRESS => {
                Err(error!(OutOfBounds; format!("BLOCK AT {:03} OVER REGISTERS", command.argument())))
            }
            Opcode::Gd | Opcode::Pd | Opcode::Rd | Opcode::Wd | Opcode::Sd | Opcode::Halt => {
                match SuperInterrupt::from_opcode(opcode) {
                    Some(cause) => Ok(Flow::Trap(cause)),
                    None => Err(error!(InternalError; command.to_string())),
                }
            }
            Opcode::Stvm | Opcode::Svrg | Opcode::Ldrg | Opcode::Gt | Opcode::Pt => {
                Err(error!(UnhandledCommand; format!("{} IN VIRTUAL MACHINE", command)))
            }
            _ => self.machine.execute(command),
        }
    }

    pub fn save_registers(&self) -> Result<()> {
        let memory = self.machine.memory();
        let registers = format!(
            "{:02}{}00",
            self.machine.ic % VM_MEMORY_SIZE,
            self.machine.c.digit()
        );
        memory.replace(VirtualMachine::TMP_ADDRESS, self.machine.tmp)?;
        memory.replace(VirtualMachine::REGISTERS_ADDRESS, Word::new(&registers)?)
    }

    pub fn restore_registers(&mut self) -> Result<()> {
        let memory = self.machine.memory();
        let tmp = memory.get(VirtualMachine::TMP_ADDRESS)?;
        let registers = memory.get(VirtualMachine::REGISTERS_ADDRESS)?;
        let digits = registers.as_bytes();
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(error!(NotANumber, VirtualMachine::REGISTERS_ADDRESS; "SAVED REGISTERS"));
        }
        let ic = ((digits[0] - b'0') * 10 + (digits[1] - b'0')) as Address;
        let c = match Comparison::from_digit(digits[2] - b'0') {
            Some(c) => c,
            None => {
                return Err(error!(InvalidWord, VirtualMachine::REGISTERS_ADDRESS; "SAVED COMPARISON"))
            }
        };
        self.machine.tmp = tmp;
        self.machine.ic = ic;
        self.machine.c = c;
        Ok(())
    }
}
