use crate::lang::Word;
use crate::mach::{Address, Config, Driver, Event, Memory, MEMORY_SIZE};


/// Real memory with `cells` filled in, padded like the loader pads.
fn driver_with(config: Config, cells: &[(Address, &str)]) -> Driver {
    let mut words = vec![Word::default(); MEMORY_SIZE];
    for (at, text) in cells {
        words[*at] = Word::new(&format!("{:<5}", text)).unwrap();
    }
    Driver::new(Memory::from_words(words), config).unwrap()
}

fn driver(cells: &[(Address, &str)]) -> Driver {
    driver_with(Config::default(), cells)
}

/// One line per step until the driver halts.
fn run(driver: &mut Driver) -> String {
    run_steps(driver, 5000)
}

fn run_steps(driver: &mut Driver, steps: usize) -> String {
    let mut s = String::new();
    for _ in 0..steps {
        let event = driver.step();
        s.push_str(&describe(driver, &event));
        s.push('\n');
        if let Event::Halted | Event::Errors(_) = event {
            return s;
        }
    }
    s.push_str(&format!("{} steps exceeded\n", steps));
    s
}

fn describe(driver: &Driver, event: &Event) -> String {
    match event {
        Event::Executed(command) => match driver.log().last() {
            Some(entry) => format!("{} {}", entry.origin, command),
            None => format!("?? {}", command),
        },
        Event::Trapped(cause) => format!("TRAP {:?}", cause),
        Event::Interrupted(interrupt) => format!("INTERRUPT {}", interrupt),
        Event::Faulted(error) => format!("FAULT {}", error),
        Event::Halted => "HALTED".to_string(),
        Event::Errors(errors) => errors
            .iter()
            .map(|e| format!("ERROR {}", e))
            .collect::<Vec<_>>()
            .join("\n"),
        Event::Running => "RUNNING".to_string(),
        Event::Stopped => "STOPPED".to_string(),
    }
}
