use super::{
    Address, Channel, Comparison, Config, ExternalMemory, Flow, Interrupt, Keyboard, Machine,
    Memory, Mode, PageTable, ProgramInterrupt, Screen, SuperInterrupt, VirtualMachine,
    BLOCK_SIZE, PAGE_TABLE_BASE, SUPERVISOR_BASE, VM_COUNT, VM_MEMORY_BASE, VM_MEMORY_SIZE,
};
use crate::error;
use crate::lang::{Command, Error, Opcode, Word};
use std::sync::Arc;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, Error>;

/// ## Privileged machine
///
/// Owns real memory, the interrupt registers, the I/O channels and the
/// virtual machine slots. Device opcodes run here, either from the real
/// machine's own program or replayed on behalf of a virtual machine.

#[derive(Debug)]
pub struct RealMachine {
    machine: Machine,
    ptr: Address,
    pi: Option<ProgramInterrupt>,
    ti: i32,
    si: Option<SuperInterrupt>,
    ioi: u8,
    mode: Mode,
    busy: u8,
    keyboard: Arc<Channel<Keyboard>>,
    screen: Arc<Channel<Screen>>,
    external: Arc<Channel<ExternalMemory>>,
    vms: Vec<Option<VirtualMachine>>,
    current: Option<usize>,
    suspended: Option<usize>,
    halted: bool,
    config: Config,
}

impl RealMachine {
    pub fn new(memory: Memory, config: Config) -> Result<RealMachine> {
        let external = match &config.external_memory {
            Some(path) => ExternalMemory::open(path)?,
            None => ExternalMemory::in_memory()?,
        };
        Ok(RealMachine::with_external_memory(memory, config, external))
    }

    pub fn with_external_memory(
        memory: Memory,
        config: Config,
        external: ExternalMemory,
    ) -> RealMachine {
        let mut machine = Machine::new(memory);
        machine.ic = SUPERVISOR_BASE;
        RealMachine {
            machine,
            ptr: PAGE_TABLE_BASE,
            pi: None,
            ti: config.timer,
            si: None,
            ioi: 0,
            mode: Mode::Supervisor,
            busy: 0,
            keyboard: Arc::new(Channel::keyboard()),
            screen: Arc::new(Channel::screen()),
            external: Arc::new(Channel::external_memory(external)),
            vms: (0..VM_COUNT).map(|_| None).collect(),
            current: None,
            suspended: None,
            halted: false,
            config,
        }
    }

    pub fn memory(&self) -> &Memory {
        self.machine.memory()
    }

    pub fn ic(&self) -> Address {
        self.machine.ic
    }

    pub fn set_ic(&mut self, ic: Address) {
        self.machine.ic = ic;
    }

    pub fn tmp(&self) -> Word {
        self.machine.tmp
    }

    pub fn c(&self) -> Comparison {
        self.machine.c
    }

    pub fn ptr(&self) -> Address {
        self.ptr
    }

    pub fn pi(&self) -> Option<ProgramInterrupt> {
        self.pi
    }

    pub fn ti(&self) -> i32 {
        self.ti
    }

    pub fn si(&self) -> Option<SuperInterrupt> {
        self.si
    }

    pub fn ioi(&self) -> u8 {
        self.ioi
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn busy(&self) -> u8 {
        self.busy
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn keyboard(&self) -> &Arc<Channel<Keyboard>> {
        &self.keyboard
    }

    pub fn screen(&self) -> &Arc<Channel<Screen>> {
        &self.screen
    }

    pub fn external_memory(&self) -> &Arc<Channel<ExternalMemory>> {
        &self.external
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn suspended(&self) -> Option<usize> {
        self.suspended
    }

    pub fn vm(&self, slot: usize) -> Option<&VirtualMachine> {
        self.vms.get(slot).and_then(Option::as_ref)
    }

    pub fn current_vm(&self) -> Option<&VirtualMachine> {
        self.current.and_then(|slot| self.vm(slot))
    }

    pub fn raise_program_interrupt(&mut self, cause: ProgramInterrupt) {
        self.pi = Some(cause);
    }

    pub fn set_timer(&mut self, ti: i32) {
        self.ti = ti;
    }

    pub fn reset_timer(&mut self) {
        self.ti = self.config.timer;
    }

    pub fn clear_program_interrupt(&mut self) {
        self.pi = None;
    }

    pub fn clear_super_interrupt(&mut self) {
        self.si = None;
    }

    pub fn clear_io_interrupt(&mut self) {
        self.ioi = 0;
    }

    /// Clear the register belonging to `interrupt` and nothing else.
    pub fn clear_interrupt(&mut self, interrupt: Interrupt) {
        match interrupt {
            Interrupt::Super(_) => self.clear_super_interrupt(),
            Interrupt::Program(_) => self.clear_program_interrupt(),
            Interrupt::Timer => self.reset_timer(),
            Interrupt::Io(_) => self.clear_io_interrupt(),
        }
    }

    pub fn enter_supervisor(&mut self) {
        self.mode = Mode::Supervisor;
    }

    pub fn is_interrupted(&self) -> bool {
        self.pi.is_some() || self.si.is_some() || self.ioi != 0 || self.ti <= 0
    }

    /// The interrupt to service next: SI, then PI, then TI, then IOI.
    pub fn pending_interrupt(&self) -> Option<Interrupt> {
        if let Some(si) = self.si {
            Some(Interrupt::Super(si))
        } else if let Some(pi) = self.pi {
            Some(Interrupt::Program(pi))
        } else if self.ti <= 0 {
            Some(Interrupt::Timer)
        } else if self.ioi != 0 {
            Some(Interrupt::Io(self.ioi))
        } else {
            None
        }
    }

    /// Translate a relative address of the virtual machine whose page
    /// table PTR points at.
    pub fn absolute_address(&self, relative: Address) -> Result<Address> {
        let table = PageTable::load(self.memory(), self.ptr)?;
        let absolute = table.translate(relative)?;
        if absolute >= self.memory().len() {
            return Err(error!(OutOfBounds, absolute; "PAGE TABLE POINTS OUTSIDE MEMORY"));
        }
        Ok(absolute)
    }

    /// Fetch, decode and execute the instruction at IC. With `absolute`,
    /// an instruction inside a virtual machine window has its address
    /// operand translated through the page table first.
    pub fn step(&mut self, absolute: bool) -> Result<Command> {
        let ic = self.machine.ic;
        let mut command = self
            .machine
            .fetch()
            .and_then(|word| Command::parse(&word))
            .map_err(|e| e.in_address(ic))?;
        let in_window = (VM_MEMORY_BASE..SUPERVISOR_BASE).contains(&ic);
        if absolute && in_window && command.opcode().addresses_memory() {
            let address = self
                .absolute_address(command.argument())
                .map_err(|e| e.in_address(ic))?;
            command = command.with_argument(address)?;
        }
        if self.execute(&command).map_err(|e| e.in_address(ic))? == Flow::Next {
            self.machine.ic += 1;
        }
        Ok(command)
    }

    pub fn execute(&mut self, command: &Command) -> Result<Flow> {
        let arg = command.argument();
        match command.opcode() {
            Opcode::Gd => self.get_data(arg)?,
            Opcode::Pd => self.put_data(arg)?,
            Opcode::Rd => self.read_block(arg)?,
            Opcode::Wd => self.write_block(arg)?,
            Opcode::Sd => {
                let guard = self.external.acquire()?;
                guard.with(|external| external.set_pointer(arg))??;
            }
            Opcode::Gt => self.memory().replace(arg, Word::from_number(self.ti)?)?,
            Opcode::Pt => self.ti = self.memory().get(arg)?.to_number()? as i32,
            Opcode::Stvm => self.start_vm(command.x() as usize)?,
            Opcode::Svrg => self.save_registers(command.x() as usize)?,
            Opcode::Ldrg => self.load_registers(command.x() as usize)?,
            Opcode::Halt => {
                info!(ic = self.machine.ic, "real machine halted");
                self.halted = true;
                return Ok(Flow::Halt);
            }
            _ => return self.machine.execute(command),
        }
        Ok(Flow::Next)
    }

    /// Run one instruction of the current virtual machine. Every
    /// instruction costs one timer tick, trapping and faulting ones
    /// included. A trap is latched into SI; `HALT` also frees the slot.
    pub fn step_vm(&mut self) -> Result<Command> {
        let slot = match self.current {
            Some(slot) => slot,
            None => return Err(error!(InternalError; "NO VIRTUAL MACHINE IN USER MODE")),
        };
        self.ti -= 1;
        let (command, flow) = self.vm_mut(slot)?.step()?;
        if let Flow::Trap(cause) = flow {
            debug!(slot, %command, "trap");
            self.si = Some(cause);
            if cause == SuperInterrupt::Halt {
                self.halt_vm(slot);
            }
        }
        Ok(command)
    }

    fn vm_mut(&mut self, slot: usize) -> Result<&mut VirtualMachine> {
        match self.vms.get_mut(slot) {
            Some(Some(vm)) => Ok(vm),
            Some(None) => Err(error!(ArgumentError; format!("SLOT {} IS EMPTY", slot))),
            None => Err(error!(ArgumentError; format!("NO SLOT {}", slot))),
        }
    }

    /// Skip the instruction at the current virtual machine's IC.
    pub fn advance_vm(&mut self) -> Result<()> {
        match self.current {
            Some(slot) => {
                self.vm_mut(slot)?.advance();
                Ok(())
            }
            None => Err(error!(InternalError; "NO CURRENT VIRTUAL MACHINE")),
        }
    }

    fn start_vm(&mut self, slot: usize) -> Result<()> {
        if slot >= VM_COUNT {
            return Err(error!(ArgumentError; format!("NO SLOT {}", slot)));
        }
        let table_at = PAGE_TABLE_BASE + slot * BLOCK_SIZE;
        if self.vms[slot].is_some() {
            self.load_registers(slot)?;
        } else {
            let base = VM_MEMORY_BASE + slot * VM_MEMORY_SIZE;
            let window = self.memory().slice(base, VM_MEMORY_SIZE)?;
            PageTable::contiguous(base).store(self.memory(), table_at)?;
            self.vms[slot] = Some(VirtualMachine::new(slot, window));
            info!(slot, base, "virtual machine created");
        }
        self.suspended = None;
        self.mode = Mode::User;
        self.reset_timer();
        self.ptr = table_at;
        self.current = Some(slot);
        Ok(())
    }

    fn save_registers(&mut self, slot: usize) -> Result<()> {
        self.vm_mut(slot)?.save_registers()
    }

    fn load_registers(&mut self, slot: usize) -> Result<()> {
        self.vm_mut(slot)?.restore_registers()
    }

    /// Free `slot`. Its window and page table stay in memory.
    pub fn halt_vm(&mut self, slot: usize) {
        if let Some(Some(_)) = self.vms.get(slot) {
            info!(slot, "virtual machine halted");
            self.vms[slot] = None;
        }
        if self.current == Some(slot) {
            self.current = None;
        }
        if self.suspended == Some(slot) {
            self.suspended = None;
        }
    }

    pub fn suspend_vm(&mut self, slot: usize) -> Result<()> {
        if self.current != Some(slot) {
            return Ok(());
        }
        self.save_registers(slot)?;
        self.mode = Mode::Supervisor;
        self.suspended = Some(slot);
        self.current = None;
        Ok(())
    }

    pub fn resume_vm(&mut self) -> Result<()> {
        let slot = match self.suspended {
            Some(slot) => slot,
            None => return Ok(()),
        };
        self.load_registers(slot)?;
        self.suspended = None;
        self.mode = Mode::User;
        self.current = Some(slot);
        Ok(())
    }

    fn get_data(&mut self, at: Address) -> Result<()> {
        self.memory().get(at)?;
        let keyboard = Arc::clone(&self.keyboard);
        let guard = keyboard.acquire()?;
        self.busy |= keyboard.bit();
        let stored = guard.with(Keyboard::take).and_then(|word| match word {
            Some(word) => self.memory().replace(at, word),
            None => Ok(()),
        });
        self.busy &= !keyboard.bit();
        stored?;
        self.ioi |= keyboard.bit();
        Ok(())
    }

    fn put_data(&mut self, at: Address) -> Result<()> {
        let word = self.memory().get(at)?;
        let screen = Arc::clone(&self.screen);
        let guard = screen.acquire()?;
        self.busy |= screen.bit();
        let shown = guard.with(|s| s.publish(word));
        self.busy &= !screen.bit();
        shown?;
        self.ioi |= screen.bit();
        Ok(())
    }

    fn read_block(&mut self, at: Address) -> Result<()> {
        let target = self.memory().slice(at, BLOCK_SIZE)?;
        let external = Arc::clone(&self.external);
        let guard = external.acquire()?;
        self.busy |= external.bit();
        let read = guard
            .with(ExternalMemory::read)
            .and_then(|words| target.replace_all(0, &words?));
        self.busy &= !external.bit();
        read?;
        self.ioi |= external.bit();
        Ok(())
    }

    fn write_block(&mut self, at: Address) -> Result<()> {
        let words = self.memory().get_range(at, BLOCK_SIZE)?;
        let external = Arc::clone(&self.external);
        let guard = external.acquire()?;
        self.busy |= external.bit();
        let written = guard.with(|e| e.write(&words)).and_then(|result| result);
        if written.is_err() || !self.config.sticky_write_busy {
            self.busy &= !external.bit();
        }
        written?;
        self.ioi |= external.bit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{parse, ErrorCode};
    use crate::mach::MEMORY_SIZE;

    fn rm() -> RealMachine {
        RealMachine::new(Memory::new(MEMORY_SIZE), Config::default()).unwrap()
    }

    fn exec(rm: &mut RealMachine, text: &str) -> Result<Flow> {
        rm.execute(&parse(text).unwrap())
    }

    #[test]
    fn test_starts_in_supervisor() {
        let rm = rm();
        assert_eq!(rm.ic(), SUPERVISOR_BASE);
        assert_eq!(rm.mode(), Mode::Supervisor);
        assert!(!rm.is_interrupted());
    }

    #[test]
    fn test_stvm_allocates_once() {
        let mut rm = rm();
        exec(&mut rm, "STVM2").unwrap();
        assert_eq!(rm.mode(), Mode::User);
        assert_eq!(rm.current(), Some(2));
        assert_eq!(rm.ptr(), 30);
        assert_eq!(rm.memory().get(30).unwrap().as_str(), "00270");
        assert_eq!(rm.memory().get(39).unwrap().as_str(), "00360");
        rm.vm(2).unwrap().memory().replace(5, Word::new("00042").unwrap()).unwrap();
        exec(&mut rm, "STVM2").unwrap();
        assert_eq!(rm.vm(2).unwrap().memory().get(5).unwrap().as_str(), "00042");
        assert_eq!(rm.memory().get(275).unwrap().as_str(), "00042");
        assert_eq!(rm.vms.iter().filter(|vm| vm.is_some()).count(), 1);
    }

    #[test]
    fn test_stvm_out_of_range() {
        let mut rm = rm();
        let e = exec(&mut rm, "STVM6").unwrap_err();
        assert_eq!(e.code(), ErrorCode::ArgumentError);
    }

    #[test]
    fn test_svrg_empty_slot() {
        let mut rm = rm();
        assert_eq!(exec(&mut rm, "SVRG1").unwrap_err().code(), ErrorCode::ArgumentError);
        assert_eq!(exec(&mut rm, "LDRG9").unwrap_err().code(), ErrorCode::ArgumentError);
    }

    #[test]
    fn test_absolute_address_reads_memory() {
        let mut rm = rm();
        exec(&mut rm, "STVM0").unwrap();
        assert_eq!(rm.absolute_address(23).unwrap(), 93);
        rm.memory().replace(12, Word::new("00500").unwrap()).unwrap();
        assert_eq!(rm.absolute_address(23).unwrap(), 503);
        assert_eq!(rm.absolute_address(100).unwrap_err().code(), ErrorCode::OutOfBounds);
    }

    #[test]
    fn test_put_data_raises_io() {
        let mut rm = rm();
        rm.memory().replace(700, Word::new("HELLO").unwrap()).unwrap();
        exec(&mut rm, "PD700").unwrap();
        assert_eq!(rm.screen().peek(|s| s.word()).unwrap(), Some(Word::new("HELLO").unwrap()));
        assert_eq!(rm.ioi(), 0b010);
        assert_eq!(rm.busy(), 0);
        assert!(rm.is_interrupted());
    }

    #[test]
    fn test_get_data_without_input() {
        let mut rm = rm();
        rm.memory().replace(700, Word::new("ABCDE").unwrap()).unwrap();
        exec(&mut rm, "GD700").unwrap();
        assert_eq!(rm.memory().get(700).unwrap().as_str(), "ABCDE");
        rm.keyboard().feed(Word::new("00012").unwrap()).unwrap();
        exec(&mut rm, "GD700").unwrap();
        assert_eq!(rm.memory().get(700).unwrap().as_str(), "00012");
        assert_eq!(rm.ioi(), 0b001);
    }

    #[test]
    fn test_block_transfer() {
        let mut rm = rm();
        for i in 0..BLOCK_SIZE {
            let word = Word::from_number(i as i64 + 1).unwrap();
            rm.memory().replace(800 + i, word).unwrap();
        }
        exec(&mut rm, "SD007").unwrap();
        assert_eq!(rm.ioi(), 0);
        exec(&mut rm, "WD800").unwrap();
        exec(&mut rm, "RD900").unwrap();
        assert_eq!(rm.memory().get_range(900, 10).unwrap(), rm.memory().get_range(800, 10).unwrap());
        assert_eq!(rm.external_memory().peek(|e| e.pointer()).unwrap(), 7);
        assert_eq!(rm.ioi(), 0b100);
    }

    #[test]
    fn test_sticky_write_busy() {
        let config = Config {
            sticky_write_busy: true,
            ..Config::default()
        };
        let mut rm = RealMachine::new(Memory::new(MEMORY_SIZE), config).unwrap();
        exec(&mut rm, "WD800").unwrap();
        assert_eq!(rm.busy(), 0b100);
        assert!(!rm.external_memory().is_busy().unwrap());
    }

    #[test]
    fn test_failed_read_clears_busy() {
        let mut rm = rm();
        rm.external_memory()
            .acquire()
            .unwrap()
            .with(|e| e.set_pointer(1000))
            .unwrap()
            .unwrap();
        let e = exec(&mut rm, "RD800").unwrap_err();
        assert_eq!(e.code(), ErrorCode::DiskError);
        assert_eq!(rm.busy(), 0);
        assert_eq!(rm.ioi(), 0);
        assert!(!rm.external_memory().is_busy().unwrap());
    }

    #[test]
    fn test_timer_registers() {
        let mut rm = rm();
        exec(&mut rm, "GT700").unwrap();
        assert_eq!(rm.memory().get(700).unwrap().as_str(), "00010");
        rm.memory().replace(701, Word::new("00003").unwrap()).unwrap();
        exec(&mut rm, "PT701").unwrap();
        assert_eq!(rm.ti(), 3);
    }

    #[test]
    fn test_suspend_resume_idempotent() {
        let mut rm = rm();
        exec(&mut rm, "STVM1").unwrap();
        rm.suspend_vm(1).unwrap();
        rm.suspend_vm(1).unwrap();
        assert_eq!(rm.mode(), Mode::Supervisor);
        assert_eq!(rm.suspended(), Some(1));
        rm.resume_vm().unwrap();
        rm.resume_vm().unwrap();
        assert_eq!(rm.mode(), Mode::User);
        assert_eq!(rm.current(), Some(1));
    }

    #[test]
    fn test_interrupt_truth_table() {
        let mut rm = rm();
        assert_eq!(rm.pending_interrupt(), None);
        rm.ioi = 0b001;
        rm.set_timer(0);
        rm.raise_program_interrupt(ProgramInterrupt::Overflow);
        rm.si = Some(SuperInterrupt::Gd);
        assert_eq!(rm.pending_interrupt(), Some(Interrupt::Super(SuperInterrupt::Gd)));
        rm.clear_interrupt(Interrupt::Super(SuperInterrupt::Gd));
        assert_eq!(rm.pending_interrupt(), Some(Interrupt::Program(ProgramInterrupt::Overflow)));
        rm.clear_program_interrupt();
        assert_eq!(rm.pending_interrupt(), Some(Interrupt::Timer));
        rm.reset_timer();
        assert_eq!(rm.pending_interrupt(), Some(Interrupt::Io(0b001)));
        rm.clear_io_interrupt();
        assert!(!rm.is_interrupted());
    }

    #[test]
    fn test_halt() {
        let mut rm = rm();
        assert_eq!(exec(&mut rm, "HALT").unwrap(), Flow::Halt);
        assert!(rm.is_halted());
    }
}
