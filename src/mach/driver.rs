use super::{
    Address, Config, Gate, Interrupt, Memory, Mode, RealMachine, SuperInterrupt,
    INTERRUPTED_SLOT, INTERRUPT_VECTOR, MEMORY_SIZE, PAGE_TABLE_BASE,
};
use crate::error;
use crate::lang::{Command, Error, Opcode, Word};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, Error>;

/// ## Driver events
///
/// `step` reports one of the first six. `execute` and `run` only return
/// `Halted` and `Errors`, plus `Stopped` when `interrupt` was called and
/// `Running` when the cycle budget ran out.

#[derive(Debug, Clone)]
pub enum Event {
    Executed(Command),
    Trapped(SuperInterrupt),
    Interrupted(Interrupt),
    Faulted(Error),
    Halted,
    Errors(Arc<Vec<Error>>),
    Running,
    Stopped,
}

/// Machine an entry of the command log ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Real,
    Virtual(usize),
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Origin::Real => f.pad("RM"),
            Origin::Virtual(slot) => f.pad(&format!("VM{}", slot)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: DateTime<Local>,
    pub origin: Origin,
    pub command: Command,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {:<3} {}",
            self.time.format("%H:%M:%S%.3f"),
            self.origin,
            self.command
        )
    }
}

/// ## Fetch, decode, execute
///
/// One `step` is one externally visible thing: an instruction in the real
/// or the current virtual machine, a trap replay, or an interrupt
/// dispatch. Interrupts are only looked at while a virtual machine is in
/// control and are serviced one per step, SI first, then PI, TI and IOI.
///
/// A trap (SI) is replayed by the real machine at the translated address
/// of the trapping instruction, after which the virtual machine resumes
/// past it. PI, TI and IOI jump the real machine to the handler address
/// in the interrupt vector; the handler ends by issuing `STVM`, which
/// clears the serviced register and returns the real machine to where it
/// was interrupted.

pub struct Driver {
    rm: RealMachine,
    servicing: Option<Interrupt>,
    return_ic: Address,
    log: Vec<LogEntry>,
    errors: Option<Arc<Vec<Error>>>,
    stopped: bool,
}

impl Driver {
    pub fn new(memory: Memory, config: Config) -> Result<Driver> {
        if memory.len() != MEMORY_SIZE {
            return Err(error!(InternalError; format!(
                "REAL MEMORY MUST HOLD {} WORDS, GOT {}",
                MEMORY_SIZE,
                memory.len()
            )));
        }
        Ok(Driver::with_machine(RealMachine::new(memory, config)?))
    }

    pub fn with_machine(rm: RealMachine) -> Driver {
        Driver {
            rm,
            servicing: None,
            return_ic: 0,
            log: Vec::new(),
            errors: None,
            stopped: false,
        }
    }

    pub fn real_machine(&self) -> &RealMachine {
        &self.rm
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn servicing(&self) -> Option<Interrupt> {
        self.servicing
    }

    pub fn errors(&self) -> Option<&Arc<Vec<Error>>> {
        self.errors.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.rm.is_halted() || self.errors.is_some()
    }

    /// Ask `execute` to return `Event::Stopped` before its next step.
    pub fn interrupt(&mut self) {
        self.stopped = true;
    }

    pub fn execute(&mut self, cycles: usize) -> Event {
        for _ in 0..cycles {
            if self.stopped {
                self.stopped = false;
                return Event::Stopped;
            }
            match self.step() {
                event @ Event::Halted | event @ Event::Errors(_) => return event,
                _ => {}
            }
        }
        Event::Running
    }

    /// Step each time the gate opens until the machine halts. `observer`
    /// sees every event.
    pub fn run<F>(&mut self, gate: &Gate, mut observer: F) -> Event
    where
        F: FnMut(&Event),
    {
        loop {
            let event = match gate.wait() {
                Ok(()) => self.step(),
                Err(error) => self.fail(error),
            };
            observer(&event);
            if let Event::Halted | Event::Errors(_) = event {
                return event;
            }
        }
    }

    pub fn step(&mut self) -> Event {
        if self.is_halted() {
            return Event::Halted;
        }
        let result = if self.servicing.is_none() && self.rm.mode() == Mode::User {
            match self.rm.pending_interrupt() {
                Some(interrupt) => self.service(interrupt),
                None => self.step_virtual(),
            }
        } else {
            self.step_real()
        };
        match result {
            Ok(event) => event,
            Err(error) => self.fail(error),
        }
    }

    fn fail(&mut self, error: Error) -> Event {
        tracing::error!(%error, ic = self.rm.ic(), "machine stopped");
        let errors = Arc::new(vec![error]);
        self.errors = Some(Arc::clone(&errors));
        Event::Errors(errors)
    }

    fn record(&mut self, origin: Origin, command: Command) {
        debug!(%origin, %command, "executed");
        self.log.push(LogEntry {
            time: Local::now(),
            origin,
            command,
        });
    }

    fn current_slot(&self) -> Result<usize> {
        self.rm
            .current()
            .ok_or_else(|| error!(InternalError; "USER MODE WITHOUT VIRTUAL MACHINE"))
    }

    fn step_real(&mut self) -> Result<Event> {
        let command = self.rm.step(false)?;
        self.record(Origin::Real, command);
        if command.opcode() == Opcode::Stvm {
            if let Some(interrupt) = self.servicing.take() {
                self.rm.clear_interrupt(interrupt);
                self.rm.set_ic(self.return_ic);
                info!(%interrupt, ic = self.return_ic, "interrupt serviced");
            }
        }
        if self.rm.is_halted() {
            return Ok(Event::Halted);
        }
        Ok(Event::Executed(command))
    }

    fn step_virtual(&mut self) -> Result<Event> {
        let slot = self.current_slot()?;
        match self.rm.step_vm() {
            Ok(command) => {
                self.record(Origin::Virtual(slot), command);
                Ok(Event::Executed(command))
            }
            Err(error) => match error.program_interrupt() {
                Some(cause) => {
                    warn!(slot, %error, "program interrupt");
                    self.rm.raise_program_interrupt(cause);
                    self.rm.advance_vm()?;
                    Ok(Event::Faulted(error))
                }
                None => Err(error),
            },
        }
    }

    fn service(&mut self, interrupt: Interrupt) -> Result<Event> {
        match interrupt {
            Interrupt::Super(SuperInterrupt::Halt) => {
                self.rm.clear_super_interrupt();
                self.rm.enter_supervisor();
                info!("virtual machine halted, supervisor continues");
                Ok(Event::Trapped(SuperInterrupt::Halt))
            }
            Interrupt::Super(cause) => {
                let slot = self.current_slot()?;
                self.replay(slot)?;
                self.rm.clear_super_interrupt();
                self.rm.resume_vm()?;
                self.rm.advance_vm()?;
                Ok(Event::Trapped(cause))
            }
            _ => {
                let slot = self.current_slot()?;
                let handler = self.handler(interrupt)?;
                self.rm.suspend_vm(slot)?;
                self.rm
                    .memory()
                    .replace(INTERRUPTED_SLOT, Word::from_number(slot as i64)?)?;
                self.return_ic = self.rm.ic();
                self.rm.set_ic(handler);
                self.servicing = Some(interrupt);
                info!(slot, %interrupt, handler, "interrupt dispatched");
                Ok(Event::Interrupted(interrupt))
            }
        }
    }

    /// Run the instruction the virtual machine in `slot` trapped on in the
    /// real machine, with its operand translated.
    fn replay(&mut self, slot: usize) -> Result<()> {
        self.rm.suspend_vm(slot)?;
        let relative = match self.rm.vm(slot) {
            Some(vm) => vm.ic(),
            None => return Err(error!(InternalError; format!("SLOT {} LOST ITS MACHINE", slot))),
        };
        let return_ic = self.rm.ic();
        let absolute = self.rm.absolute_address(relative)?;
        self.rm.set_ic(absolute);
        let replayed = self.rm.step(true);
        self.rm.set_ic(return_ic);
        let command = replayed?;
        info!(slot, %command, "trap replayed");
        self.record(Origin::Real, command);
        Ok(())
    }

    fn handler(&self, interrupt: Interrupt) -> Result<Address> {
        let vector = match interrupt.vector() {
            Some(vector) => INTERRUPT_VECTOR + vector,
            None => return Err(error!(InternalError; format!("{} HAS NO HANDLER", interrupt))),
        };
        let handler = self
            .rm
            .memory()
            .get(vector)?
            .to_number()
            .map_err(|_| error!(InternalError, vector; "BAD INTERRUPT VECTOR"))?
            as Address;
        if handler < PAGE_TABLE_BASE || handler >= self.rm.memory().len() {
            return Err(error!(InternalError, vector; format!("NO HANDLER AT {:03}", handler)));
        }
        Ok(handler)
    }
}
