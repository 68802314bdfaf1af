use crate::mach::{Address, ProgramInterrupt};

#[derive(Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    address: Option<Address>,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, $addr:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_address($addr)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $addr:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_address($addr)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            address: None,
            message: String::new(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// Attach the address of the instruction that failed. An address that
    /// is already set is kept, the innermost location wins.
    pub fn in_address(self, address: Address) -> Error {
        Error {
            address: self.address.or(Some(address)),
            ..self
        }
    }

    pub fn message<S: Into<String>>(self, message: S) -> Error {
        debug_assert!(self.message.is_empty());
        Error {
            message: message.into(),
            ..self
        }
    }

    /// Program faults are recoverable through the interrupt protocol.
    /// Everything else is fatal for the caller.
    pub fn program_interrupt(&self) -> Option<ProgramInterrupt> {
        use ErrorCode::*;
        match self.code {
            OutOfBounds => Some(ProgramInterrupt::InvAddress),
            InvalidCommand | InvalidArguments => Some(ProgramInterrupt::InvOp),
            NumberOverflow => Some(ProgramInterrupt::Overflow),
            NotANumber | InvalidWord => Some(ProgramInterrupt::InvAssign),
            UnhandledCommand | ArgumentError | DiskError | InternalError => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    OutOfBounds = 1,
    InvalidCommand = 2,
    InvalidArguments = 3,
    NumberOverflow = 4,
    NotANumber = 5,
    InvalidWord = 6,
    UnhandledCommand = 7,
    ArgumentError = 8,
    DiskError = 9,
    InternalError = 51,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ErrorCode::*;
        let code_str = match self {
            OutOfBounds => "OUT OF BOUNDS",
            InvalidCommand => "INVALID COMMAND",
            InvalidArguments => "INVALID ARGUMENTS",
            NumberOverflow => "NUMBER OVERFLOW",
            NotANumber => "NOT A NUMBER",
            InvalidWord => "INVALID WORD",
            UnhandledCommand => "UNHANDLED COMMAND",
            ArgumentError => "ARGUMENT ERROR",
            DiskError => "DISK ERROR",
            InternalError => "INTERNAL ERROR",
        };
        write!(f, "{}", code_str)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut suffix = String::new();
        if let Some(address) = self.address {
            suffix.push_str(&format!(" {:03}", address));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        if suffix.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} IN{}", self.code, suffix)
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        Error::new(ErrorCode::DiskError).message(error.to_string())
    }
}
