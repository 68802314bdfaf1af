use proptest::prelude::*;
use std::convert::TryFrom;
use vrm::lang::{parse, Command, ErrorCode, Opcode, Word};

fn any_command() -> impl Strategy<Value = Command> {
    (0..Opcode::ALL.len(), 0u8..10, 0u8..10, 0u8..10).prop_map(|(i, x, y, z)| {
        let opcode = Opcode::ALL[i];
        let digits = [x, y, z];
        Command::new(opcode, &digits[..opcode.arity()]).unwrap()
    })
}

proptest! {
    #[test]
    fn test_parse_serialize(command in any_command()) {
        prop_assert_eq!(parse(&command.to_string()).unwrap(), command);
        let word = Word::from(command);
        prop_assert_eq!(Command::try_from(word).unwrap(), command);
    }
}

#[test]
fn test_halt_forms() {
    let halt = parse("HALT").unwrap();
    assert_eq!(parse("HALT ").unwrap(), halt);
    assert_eq!(Word::from(halt).as_str(), "HALT ");
    assert_eq!(parse("HALT0").unwrap_err().code(), ErrorCode::InvalidArguments);
}

#[test]
fn test_bad_words() {
    assert_eq!(parse("XX123").unwrap_err().code(), ErrorCode::InvalidCommand);
    assert_eq!(parse("CR01").unwrap_err().code(), ErrorCode::InvalidArguments);
    assert_eq!(parse("CR0A1").unwrap_err().code(), ErrorCode::InvalidArguments);
    assert_eq!(parse("STVM").unwrap_err().code(), ErrorCode::InvalidArguments);
}

#[test]
fn test_argument() {
    let c = parse("JM123").unwrap();
    assert_eq!(c.argument(), 123);
    assert_eq!(c.with_argument(987).unwrap().to_string(), "JM987");
    assert!(parse("STVM3").unwrap().with_argument(1).is_err());
}
