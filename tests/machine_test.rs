mod common;
use common::*;
use vrm::mach::Comparison;

#[test]
fn test_arithmetic() {
    let mut d = driver(&[
        (670, "CR690"),
        (671, "ML691"),
        (672, "AD692"),
        (673, "SB693"),
        (674, "DV694"),
        (675, "MD695"),
        (676, "CM696"),
        (677, "HALT"),
        (690, "00006"),
        (691, "00007"),
        (692, "00058"),
        (693, "00010"),
        (694, "00003"),
        (695, "00007"),
    ]);
    assert_eq!(run(&mut d), "HALTED");
    // ((6 * 7 + 58 - 10) / 3) % 7
    assert_eq!(d.real_machine().memory().get(696).unwrap(), word("00002"));
}

#[test]
fn test_add_overflow() {
    let mut d = driver(&[(670, "CR680"), (671, "AD681"), (680, "99999"), (681, "00001")]);
    assert_eq!(
        run(&mut d),
        "NUMBER OVERFLOW IN 671; 99999 + 1 = 100000 DOES NOT FIT IN A WORD"
    );
}

#[test]
fn test_negative_is_overflow() {
    let mut d = driver(&[(670, "SB680"), (680, "00001")]);
    assert_eq!(
        run(&mut d),
        "NUMBER OVERFLOW IN 670; 0 - 1 = -1 DOES NOT FIT IN A WORD"
    );
}

#[test]
fn test_divide_by_zero() {
    for tmp in &["00000", "00042", "99999"] {
        let mut d = driver(&[(670, "CR680"), (671, "DV681"), (680, *tmp)]);
        assert_eq!(run(&mut d), "NUMBER OVERFLOW IN 671; DIVISION BY ZERO");
    }
}

#[test]
fn test_compare_and_jump() {
    let mut d = driver(&[
        (670, "CR680"),
        (671, "CP681"),
        (672, "JL675"),
        (673, "CR682"),
        (674, "HALT"),
        (675, "CR683"),
        (676, "HALT"),
        (680, "00002"),
        (681, "00010"),
        (682, "WRONG"),
        (683, "RIGHT"),
    ]);
    assert_eq!(run(&mut d), "HALTED");
    assert_eq!(d.real_machine().c(), Comparison::Less);
    assert_eq!(d.real_machine().tmp(), word("RIGHT"));
}

#[test]
fn test_compare_text() {
    let mut d = driver(&[
        (670, "CR680"),
        (671, "CP681"),
        (672, "HALT"),
        (680, "ABD  "),
        (681, "ABC  "),
    ]);
    assert_eq!(run(&mut d), "HALTED");
    assert_eq!(d.real_machine().c(), Comparison::More);
}

#[test]
fn test_jump_outside_memory() {
    let mut d = driver(&[(670, "JP999"), (999, "HALT")]);
    assert_eq!(run(&mut d), "HALTED");
}

#[test]
fn test_invalid_instruction_in_supervisor() {
    let mut d = driver(&[(670, "XY123")]);
    assert_eq!(run(&mut d), "INVALID COMMAND IN 670; \"XY123\"");
}
