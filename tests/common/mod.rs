#![allow(dead_code)]
use vrm::lang::Word;
use vrm::mach::{Address, Config, Driver, Event, Memory, MEMORY_SIZE};

/// Real memory image with `cells` filled in, padded like the loader pads.
pub fn image(cells: &[(Address, &str)]) -> Vec<Word> {
    let mut words = vec![Word::default(); MEMORY_SIZE];
    for (at, text) in cells {
        words[*at] = Word::new(&format!("{:<5}", text)).unwrap();
    }
    words
}

pub fn driver(cells: &[(Address, &str)]) -> Driver {
    driver_with(Config::default(), cells)
}

pub fn driver_with(config: Config, cells: &[(Address, &str)]) -> Driver {
    Driver::new(Memory::from_words(image(cells)), config).unwrap()
}

pub fn word(s: &str) -> Word {
    Word::new(s).unwrap()
}

pub fn run(driver: &mut Driver) -> String {
    run_cycles(driver, 5000)
}

pub fn run_cycles(driver: &mut Driver, cycles: usize) -> String {
    match driver.execute(cycles) {
        Event::Halted => "HALTED".to_string(),
        Event::Errors(errors) => errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
        Event::Running => format!("{} Execution cycles exceeded.", cycles),
        event => format!("{:?}", event),
    }
}
