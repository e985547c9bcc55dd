use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
  #[error("unknown opcode {byte:08b}")]
  UnknownOpcode { byte: u8 },
  #[error("no register for index {index:03b} (wide: {wide})")]
  UnknownRegisterEncoding { index: u8, wide: bool },
  #[error("no effective address base for rm {rm:03b}")]
  UnknownAddressingBase { rm: u8 },
  #[error("unsupported sub-operation {subop:03b} for opcode {opcode:08b}")]
  UnsupportedArithmeticSubop { opcode: u8, subop: u8 },
  #[error("immediate mov {opcode:08b} requires reg field 000, found {subop:03b}")]
  UnsupportedMovSubop { opcode: u8, subop: u8 },
  #[error("unexpected end of input, needed {needed} more byte(s)")]
  UnexpectedEndOfInput { needed: usize },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// A run that stopped on a fatal error, along with everything it decoded
/// before that point.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid instruction at offset {offset}: {source}")]
pub struct PartialListing {
  pub listing: String,
  pub offset: usize,
  pub source: DecodeError,
}
