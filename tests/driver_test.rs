mod common;
use common::*;
use std::fs;
use vrm::mach::{Config, Mode, Origin, PageTable};

fn vector(handler: &'static str) -> Vec<(usize, &'static str)> {
    vec![(0, "00700"), (1, "00700"), (2, "00700"), (700, handler)]
}

#[test]
fn test_two_virtual_machines() {
    let mut cells = vector("STVM0");
    cells.extend_from_slice(&[
        (70, "CR010"),
        (71, "AD011"),
        (72, "CM012"),
        (73, "HALT"),
        (80, "00040"),
        (81, "00002"),
        (170, "CR010"),
        (171, "ML011"),
        (172, "CM012"),
        (173, "HALT"),
        (180, "00003"),
        (181, "00005"),
        (670, "STVM0"),
        (671, "STVM1"),
        (672, "HALT"),
    ]);
    let mut d = driver(&cells);
    assert_eq!(run(&mut d), "HALTED");
    let rm = d.real_machine();
    assert_eq!(rm.memory().get(82).unwrap(), word("00042"));
    assert_eq!(rm.memory().get(182).unwrap(), word("00015"));
    assert_eq!(rm.ptr(), 20);
    assert_eq!(rm.mode(), Mode::Supervisor);
    assert_eq!(PageTable::load(rm.memory(), 20).unwrap(), PageTable::contiguous(170));
    let origins: Vec<Origin> = d.log().iter().map(|e| e.origin).collect();
    assert_eq!(origins.iter().filter(|o| **o == Origin::Virtual(1)).count(), 4);
}

#[test]
fn test_block_write_reaches_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("external.txt");
    let config = Config {
        external_memory: Some(path.clone()),
        ..Config::default()
    };
    let mut cells = vector("STVM0");
    cells.extend_from_slice(&[
        (70, "SD002"),
        (71, "WD010"),
        (72, "HALT"),
        (670, "STVM0"),
        (671, "HALT"),
    ]);
    let texts = ["AAAAA", "BBBBB", "CCCCC", "DDDDD", "EEEEE", "FFFFF", "GGGGG", "HHHHH", "IIIII", "JJJJJ"];
    for (i, text) in texts.iter().enumerate() {
        cells.push((80 + i, *text));
    }
    let mut d = driver_with(config, &cells);
    assert_eq!(run(&mut d), "HALTED");
    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[2], texts.join(" "));
    assert_eq!(lines[1], vec!["00000"; 10].join(" "));
}

#[test]
fn test_block_read_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("external.txt");
    fs::write(&path, "00001 00002 00003 00004 00005 00006 00007 00008 00009 00010\n").unwrap();
    let config = Config {
        external_memory: Some(path),
        ..Config::default()
    };
    let mut cells = vector("STVM3");
    cells.extend_from_slice(&[(370, "RD050"), (371, "HALT"), (670, "STVM3"), (671, "HALT")]);
    let mut d = driver_with(config, &cells);
    assert_eq!(run(&mut d), "HALTED");
    let rm = d.real_machine();
    assert_eq!(rm.memory().get(420).unwrap(), word("00001"));
    assert_eq!(rm.memory().get(429).unwrap(), word("00010"));
    assert_eq!(rm.memory().get(9).unwrap(), word("00003"));
}

#[test]
fn test_keyboard_fed_between_steps() {
    let mut cells = vector("STVM0");
    cells.extend_from_slice(&[
        (70, "GD020"),
        (71, "PD020"),
        (72, "HALT"),
        (670, "STVM0"),
        (671, "HALT"),
    ]);
    let mut d = driver(&cells);
    let keyboard = d.real_machine().keyboard().clone();
    keyboard.feed(word("   HI")).unwrap();
    assert_eq!(run(&mut d), "HALTED");
    let screen = d.real_machine().screen().peek(|s| s.word()).unwrap();
    assert_eq!(screen, Some(word("   HI")));
    assert_eq!(keyboard.peek(|k| k.word()).unwrap(), None);
}

#[test]
fn test_supervisor_runs_after_vm_halt() {
    let mut cells = vector("STVM0");
    cells.extend_from_slice(&[
        (70, "HALT"),
        (670, "STVM0"),
        (671, "CR680"),
        (672, "CM681"),
        (673, "HALT"),
        (680, "DONE "),
    ]);
    let mut d = driver(&cells);
    assert_eq!(run(&mut d), "HALTED");
    assert_eq!(d.real_machine().memory().get(681).unwrap(), word("DONE "));
    assert!(d.real_machine().vm(0).is_none());
}
