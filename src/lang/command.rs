use super::{Error, Word};
use crate::mach::Address;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// ## Instruction set
///
/// Mnemonics are matched against a word in declaration order and the
/// first one that is a prefix wins, so the order of this enum is part of
/// the instruction encoding.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // *** Shared by every machine
    /// TMP := memory[xyz]
    Cr,
    /// memory[xyz] := TMP
    Cm,
    Ad,
    Sb,
    Ml,
    Md,
    Dv,
    /// Compare TMP to memory[xyz] and set C.
    Cp,
    Jp,
    Je,
    Jl,
    Jm,

    // *** Privileged
    Halt,
    /// Keyboard to memory[xyz].
    Gd,
    /// memory[xyz] to screen.
    Pd,
    /// External memory block to memory[xyz..xyz+10].
    Rd,
    /// memory[xyz..xyz+10] to external memory block.
    Wd,
    /// Set the external memory pointer.
    Sd,
    /// Timer to memory[xyz].
    Gt,
    /// memory[xyz] to timer.
    Pt,
    /// Start or resume the virtual machine in slot x.
    Stvm,
    Svrg,
    Ldrg,
}

impl Opcode {
    pub const ALL: [Opcode; 23] = [
        Opcode::Cr,
        Opcode::Cm,
        Opcode::Ad,
        Opcode::Sb,
        Opcode::Ml,
        Opcode::Md,
        Opcode::Dv,
        Opcode::Cp,
        Opcode::Jp,
        Opcode::Je,
        Opcode::Jl,
        Opcode::Jm,
        Opcode::Halt,
        Opcode::Gd,
        Opcode::Pd,
        Opcode::Rd,
        Opcode::Wd,
        Opcode::Sd,
        Opcode::Gt,
        Opcode::Pt,
        Opcode::Stvm,
        Opcode::Svrg,
        Opcode::Ldrg,
    ];

    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Cr => "CR",
            Cm => "CM",
            Ad => "AD",
            Sb => "SB",
            Ml => "ML",
            Md => "MD",
            Dv => "DV",
            Cp => "CP",
            Jp => "JP",
            Je => "JE",
            Jl => "JL",
            Jm => "JM",
            Halt => "HALT",
            Gd => "GD",
            Pd => "PD",
            Rd => "RD",
            Wd => "WD",
            Sd => "SD",
            Gt => "GT",
            Pt => "PT",
            Stvm => "STVM",
            Svrg => "SVRG",
            Ldrg => "LDRG",
        }
    }

    pub fn arity(self) -> usize {
        use Opcode::*;
        match self {
            Halt => 0,
            Stvm | Svrg | Ldrg => 1,
            _ => 3,
        }
    }

    /// True when the operand names a memory cell, as opposed to a slot
    /// number or a device position.
    pub fn addresses_memory(self) -> bool {
        use Opcode::*;
        match self {
            Cr | Cm | Ad | Sb | Ml | Md | Dv | Cp | Jp | Je | Jl | Jm => true,
            Gd | Pd | Rd | Wd | Gt | Pt => true,
            Halt | Sd | Stvm | Svrg | Ldrg => false,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// ## Decoded instruction
///
/// Unused operands are zero. The operand count always equals the arity of
/// the opcode.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    opcode: Opcode,
    x: u8,
    y: u8,
    z: u8,
}

impl Command {
    pub fn new(opcode: Opcode, args: &[u8]) -> Result<Command> {
        if args.len() != opcode.arity() {
            return Err(error!(InvalidArguments; format!(
                "{} EXPECTS {} DIGITS, GOT {}",
                opcode,
                opcode.arity(),
                args.len()
            )));
        }
        if let Some(bad) = args.iter().find(|&&d| d > 9) {
            return Err(error!(InvalidArguments; format!("{} IS NOT A DIGIT", bad)));
        }
        let digit = |i: usize| args.get(i).copied().unwrap_or(0);
        Ok(Command {
            opcode,
            x: digit(0),
            y: digit(1),
            z: digit(2),
        })
    }

    pub fn parse(word: &Word) -> Result<Command> {
        parse(word.as_str())
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn z(&self) -> u8 {
        self.z
    }

    pub fn argument(&self) -> Address {
        self.x as Address * 100 + self.y as Address * 10 + self.z as Address
    }

    /// The same instruction with a different three digit operand.
    pub fn with_argument(&self, argument: Address) -> Result<Command> {
        if self.opcode.arity() != 3 || argument > 999 {
            return Err(error!(InvalidArguments; format!("{} CANNOT TAKE {}", self, argument)));
        }
        Command::new(
            self.opcode,
            &[
                (argument / 100) as u8,
                (argument / 10 % 10) as u8,
                (argument % 10) as u8,
            ],
        )
    }
}

/// Decode instruction text. Trailing spaces are padding, so both `"HALT"`
/// and the stored word `"HALT "` decode to the same command.
pub fn parse(text: &str) -> Result<Command> {
    let text = text.trim_end_matches(' ');
    let opcode = match Opcode::ALL
        .iter()
        .find(|opcode| text.starts_with(opcode.mnemonic()))
    {
        Some(opcode) => *opcode,
        None => return Err(error!(InvalidCommand; format!("{:?}", text))),
    };
    let operands = &text[opcode.mnemonic().len()..];
    if operands.len() != opcode.arity() || !operands.bytes().all(|b| b.is_ascii_digit()) {
        return Err(error!(InvalidArguments; format!("{:?}", text)));
    }
    let digits: Vec<u8> = operands.bytes().map(|b| b - b'0').collect();
    Command::new(opcode, &digits)
}

impl std::str::FromStr for Command {
    type Err = Error;
    fn from_str(s: &str) -> Result<Command> {
        parse(s)
    }
}

impl TryFrom<Word> for Command {
    type Error = Error;
    fn try_from(word: Word) -> Result<Command> {
        Command::parse(&word)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.opcode.arity() {
            0 => write!(f, "{}", self.opcode),
            1 => write!(f, "{}{}", self.opcode, self.x),
            _ => write!(f, "{}{}{}{}", self.opcode, self.x, self.y, self.z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_parse_three_digits() {
        let c = parse("AD015").unwrap();
        assert_eq!(c.opcode(), Opcode::Ad);
        assert_eq!((c.x(), c.y(), c.z()), (0, 1, 5));
        assert_eq!(c.argument(), 15);
    }

    #[test]
    fn test_parse_halt_and_slots() {
        assert_eq!(parse("HALT ").unwrap().opcode(), Opcode::Halt);
        assert_eq!(parse("HALT").unwrap().opcode(), Opcode::Halt);
        let c = parse("STVM3").unwrap();
        assert_eq!(c.opcode(), Opcode::Stvm);
        assert_eq!(c.argument(), 300);
        assert_eq!(c.x(), 3);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("XX015").unwrap_err().code(), ErrorCode::InvalidCommand);
        assert_eq!(parse("AD01A").unwrap_err().code(), ErrorCode::InvalidArguments);
        assert_eq!(parse("AD01 ").unwrap_err().code(), ErrorCode::InvalidArguments);
        assert_eq!(parse("HALT1").unwrap_err().code(), ErrorCode::InvalidArguments);
        assert_eq!(parse("STVMX").unwrap_err().code(), ErrorCode::InvalidArguments);
    }

    #[test]
    fn test_arity_enforced_on_construction() {
        assert!(Command::new(Opcode::Halt, &[1]).is_err());
        assert!(Command::new(Opcode::Cr, &[0, 1]).is_err());
        assert!(Command::new(Opcode::Cr, &[0, 1, 10]).is_err());
        assert!(Command::new(Opcode::Stvm, &[2]).is_ok());
    }

    #[test]
    fn test_serialize() {
        assert_eq!(Command::new(Opcode::Jm, &[0, 2, 4]).unwrap().to_string(), "JM024");
        assert_eq!(Command::new(Opcode::Halt, &[]).unwrap().to_string(), "HALT");
        assert_eq!(Word::from(parse("HALT").unwrap()).as_str(), "HALT ");
        assert_eq!(Command::new(Opcode::Ldrg, &[5]).unwrap().to_string(), "LDRG5");
    }

    #[test]
    fn test_with_argument() {
        let c = parse("PD013").unwrap().with_argument(683).unwrap();
        assert_eq!(c.to_string(), "PD683");
        assert!(parse("STVM1").unwrap().with_argument(1).is_err());
        assert!(parse("PD013").unwrap().with_argument(1000).is_err());
    }
}
