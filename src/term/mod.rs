extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;
use crate::Args;
use ansi_term::Style;
use linefeed::{Interface, ReadResult, Terminal};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vrm::error;
use vrm::lang::{Error, Word};
use vrm::mach::{Config, Driver, Event, Memory, BLOCK_SIZE, MEMORY_SIZE};

const RUN_CHUNK: usize = 100;
const LOG_TAIL: usize = 10;

pub fn main(args: Args) {
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");
    if let Err(error) = main_loop(args, interrupted) {
        eprintln!("{}", error);
    }
}

fn main_loop(args: Args, interrupted: Arc<AtomicBool>) -> std::io::Result<()> {
    let command = Interface::new("VRM")?;
    let memory = match &args.program {
        Some(path) => match load(path) {
            Ok(words) => Memory::from_words(words),
            Err(error) => return print_error(&command, &error),
        },
        None => Memory::new(MEMORY_SIZE),
    };
    let config = Config {
        timer: args.timer,
        external_memory: args.external_memory.clone(),
        sticky_write_busy: args.sticky_write_busy,
    };
    let mut driver = match Driver::new(memory, config) {
        Ok(driver) => driver,
        Err(error) => return print_error(&command, &error),
    };
    let mut screen = None;
    command.set_prompt("> ")?;

    loop {
        command.write_fmt(format_args!("{}\n", status(&driver)))?;
        let string = match command.read_line()? {
            ReadResult::Input(string) => string,
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        let mut words = string.split_whitespace();
        let verb = words.next().unwrap_or("s");
        let rest: Vec<&str> = words.collect();
        match verb {
            "s" => {
                let event = driver.step();
                print_event(&command, &driver, &event)?;
            }
            "r" => {
                let limit = match rest.first().map(|n| n.parse::<usize>()) {
                    Some(Ok(n)) => n,
                    Some(Err(_)) => {
                        print_error(&command, &error!(InvalidArguments; "r [steps]"))?;
                        continue;
                    }
                    None => usize::MAX,
                };
                interrupted.store(false, Ordering::SeqCst);
                let mut remaining = limit;
                while remaining > 0 {
                    if interrupted.load(Ordering::SeqCst) {
                        driver.interrupt();
                        interrupted.store(false, Ordering::SeqCst);
                    }
                    let cycles = remaining.min(RUN_CHUNK);
                    remaining -= cycles;
                    let event = driver.execute(cycles);
                    show_screen(&command, &driver, &mut screen)?;
                    match event {
                        Event::Running => {}
                        _ => {
                            print_event(&command, &driver, &event)?;
                            break;
                        }
                    }
                }
            }
            "k" => match keyboard_word(&rest.join(" ")) {
                Ok(word) => {
                    if let Err(error) = driver.real_machine().keyboard().feed(word) {
                        print_error(&command, &error)?;
                    }
                }
                Err(error) => print_error(&command, &error)?,
            },
            "m" => match rest.first().map(|n| n.parse::<usize>()) {
                Some(Ok(block)) => match driver.real_machine().memory().block(block) {
                    Ok(words) => {
                        let text: Vec<String> = words.iter().map(Word::to_string).collect();
                        let at = block * BLOCK_SIZE;
                        command.write_fmt(format_args!("{:03} {}\n", at, text.join(" ")))?;
                    }
                    Err(error) => print_error(&command, &error)?,
                },
                _ => print_error(&command, &error!(InvalidArguments; "m <block>"))?,
            },
            "l" => {
                let log = driver.log();
                for entry in &log[log.len().saturating_sub(LOG_TAIL)..] {
                    command.write_fmt(format_args!("{}\n", entry))?;
                }
            }
            "q" => break,
            _ => print_error(&command, &error!(InvalidCommand; verb.to_string()))?,
        }
        show_screen(&command, &driver, &mut screen)?;
        if !string.is_empty() {
            command.add_history_unique(string);
        }
    }
    Ok(())
}

fn status(driver: &Driver) -> String {
    let rm = driver.real_machine();
    let mut s = format!(
        "{:03} {} TMP {} C {} PTR {:03} PI {} SI {} TI {} IOI {:03b} BUSY {:03b}",
        rm.ic(),
        rm.mode(),
        rm.tmp(),
        rm.c(),
        rm.ptr(),
        rm.pi().map_or("-".to_string(), |pi| format!("{:?}", pi)),
        rm.si().map_or("-".to_string(), |si| format!("{:?}", si)),
        rm.ti(),
        rm.ioi(),
        rm.busy(),
    );
    if let Some(vm) = rm.current_vm() {
        let m = vm.machine();
        s.push_str(&format!(
            " | VM{} {:02} TMP {} C {}",
            vm.slot(),
            m.ic,
            m.tmp,
            m.c
        ));
    }
    s
}

fn print_event<T: Terminal>(
    command: &Interface<T>,
    driver: &Driver,
    event: &Event,
) -> std::io::Result<()> {
    match event {
        Event::Executed(_) => {
            if let Some(entry) = driver.log().last() {
                command.write_fmt(format_args!("{:<3} {}\n", entry.origin, entry.command))?;
            }
        }
        Event::Trapped(cause) => {
            command.write_fmt(format_args!("TRAP {:?}\n", cause))?;
        }
        Event::Interrupted(interrupt) => {
            command.write_fmt(format_args!("INTERRUPT {}\n", interrupt))?;
        }
        Event::Faulted(error) => {
            command.write_fmt(format_args!(
                "{}\n",
                Style::new().bold().paint(error.to_string())
            ))?;
        }
        Event::Errors(errors) => {
            for error in errors.iter() {
                print_error(command, error)?;
            }
        }
        Event::Halted => {
            command.write_fmt(format_args!("HALTED\n"))?;
        }
        Event::Stopped => {
            command.write_fmt(format_args!("BREAK IN {:03}\n", driver.real_machine().ic()))?;
        }
        Event::Running => {}
    }
    Ok(())
}

fn print_error<T: Terminal>(command: &Interface<T>, error: &Error) -> std::io::Result<()> {
    command.write_fmt(format_args!(
        "{}\n",
        Style::new().bold().paint(error.to_string())
    ))
}

fn show_screen<T: Terminal>(
    command: &Interface<T>,
    driver: &Driver,
    shown: &mut Option<Word>,
) -> std::io::Result<()> {
    let word = match driver.real_machine().screen().peek(|s| s.word()) {
        Ok(word) => word,
        Err(error) => return print_error(command, &error),
    };
    if word != *shown {
        if let Some(word) = word {
            command.write_fmt(format_args!(
                "{}\n",
                Style::new().reverse().paint(word.to_string())
            ))?;
        }
        *shown = word;
    }
    Ok(())
}

/// Numbers are zero-padded, anything else is right aligned.
fn keyboard_word(text: &str) -> Result<Word, Error> {
    if text.len() > Word::LENGTH {
        return Err(error!(InvalidWord; format!("{:?} IS LONGER THAN {}", text, Word::LENGTH)));
    }
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        Word::new(&format!("{:0>5}", text))
    } else {
        Word::new(&format!("{:>5}", text))
    }
}

fn load(path: &Path) -> Result<Vec<Word>, Error> {
    let reader = match File::open(path) {
        Ok(file) => BufReader::new(file),
        Err(error) => {
            let msg = format!("{}: {}", path.display(), error);
            match error.kind() {
                ErrorKind::NotFound => return Err(error!(DiskError; msg)),
                _ => return Err(error!(InternalError; msg)),
            }
        }
    };
    let mut words = vec![Word::default(); MEMORY_SIZE];
    let mut at = 0;
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|error| error!(DiskError; error.to_string()))?;
        let in_line = |error: Error| error.message(format!("LINE {} OF {}", index + 1, path.display()));
        let text = line.trim_end();
        if text.trim().is_empty() || text.starts_with(';') {
            continue;
        }
        if let Some(address) = text.strip_prefix('@') {
            at = address
                .trim()
                .parse::<usize>()
                .map_err(|_| in_line(error!(InvalidArguments)))?;
            continue;
        }
        if text.len() > Word::LENGTH {
            return Err(in_line(error!(InvalidWord)));
        }
        let word = Word::new(&format!("{:<5}", text)).map_err(|_| in_line(error!(InvalidWord)))?;
        match words.get_mut(at) {
            Some(cell) => *cell = word,
            None => return Err(in_line(error!(OutOfBounds, at))),
        }
        at += 1;
    }
    Ok(words)
}
