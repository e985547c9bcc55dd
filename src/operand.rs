use std::fmt;

use crate::cursor::{Cursor, Width};
use crate::error::DecodeResult;
use crate::tables;

const RM_DIRECT_ADDRESS: u8 = 0b_110;

/// The MOD field: register operand, or memory with 0, 8 or 16 bits of
/// displacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
  Memory,
  MemoryDisp8,
  MemoryDisp16,
  Register,
}

/// The MOD, REG and RM fields of the byte following the opcode. Only built
/// by `parse`, so `reg` and `rm` always fit in three bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModRm {
  mode: Mode,
  reg: u8,
  rm: u8,
}

impl ModRm {
  pub fn parse(byte: u8) -> Self {
    let mode = match byte >> 6 {
      0b_00 => Mode::Memory,
      0b_01 => Mode::MemoryDisp8,
      0b_10 => Mode::MemoryDisp16,
      _ => Mode::Register,
    };
    ModRm {
      mode,
      reg: (byte >> 3) & 0b_111,
      rm: byte & 0b_111,
    }
  }

  pub fn reg(self) -> u8 {
    self.reg
  }

  pub fn rm(self) -> u8 {
    self.rm
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectiveAddress {
  Based {
    bases: &'static [&'static str],
    displacement: i16,
  },
  Direct(u16),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
  Register(&'static str),
  Memory(EffectiveAddress),
  /// Byte immediates are sign-extended into `value`.
  Immediate { value: i16, width: Width },
}

impl Operand {
  pub fn is_memory(&self) -> bool {
    matches!(self, Operand::Memory(_))
  }
}

impl fmt::Display for EffectiveAddress {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EffectiveAddress::Direct(address) => write!(f, "[{address}]"),
      EffectiveAddress::Based {
        bases,
        displacement,
      } => {
        write!(f, "[{}", bases.join(" + "))?;
        match *displacement {
          0 => {}
          d if d > 0 => write!(f, " + {d}")?,
          d => write!(f, " - {}", d.unsigned_abs())?,
        }
        write!(f, "]")
      }
    }
  }
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operand::Register(name) => f.write_str(name),
      Operand::Memory(address) => write!(f, "{address}"),
      Operand::Immediate { value, .. } => write!(f, "{value}"),
    }
  }
}

/// Decodes the operand selected by MOD and RM, consuming any displacement
/// or direct address bytes that follow the ModRM byte.
pub fn decode_rm(modrm: ModRm, w_bit_set: bool, cursor: &mut Cursor) -> DecodeResult<Operand> {
  let displacement = match modrm.mode {
    Mode::Register => return Ok(Operand::Register(tables::register(modrm.rm, w_bit_set)?)),
    Mode::Memory if modrm.rm == RM_DIRECT_ADDRESS => {
      let address = cursor.read_unsigned(Width::Word)?;
      return Ok(Operand::Memory(EffectiveAddress::Direct(address)));
    }
    Mode::Memory => 0,
    Mode::MemoryDisp8 => cursor.read_signed(Width::Byte)?,
    Mode::MemoryDisp16 => cursor.read_signed(Width::Word)?,
  };
  Ok(Operand::Memory(EffectiveAddress::Based {
    bases: tables::address_bases(modrm.rm)?,
    displacement,
  }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::DecodeError;
  use pretty_assertions::assert_eq;

  fn decode(modrm: u8, w: bool, rest: &[u8]) -> (String, usize) {
    let mut cursor = Cursor::new(rest);
    let operand = decode_rm(ModRm::parse(modrm), w, &mut cursor).unwrap();
    (operand.to_string(), cursor.position())
  }

  #[test]
  fn test_parse_modrm() {
    let modrm = ModRm::parse(0b11_011_001);
    assert_eq!(modrm.mode, Mode::Register);
    assert_eq!(modrm.reg(), 0b011);
    assert_eq!(modrm.rm(), 0b001);
  }

  #[test]
  fn test_parse_every_mode() {
    assert_eq!(ModRm::parse(0b00_111_111).mode, Mode::Memory);
    assert_eq!(ModRm::parse(0b01_000_000).mode, Mode::MemoryDisp8);
    assert_eq!(ModRm::parse(0b10_000_000).mode, Mode::MemoryDisp16);
    assert_eq!(ModRm::parse(0b11_000_000).mode, Mode::Register);
  }

  #[test]
  fn test_immediate_renders_value_only() {
    let immediate = Operand::Immediate {
      value: -2,
      width: Width::Word,
    };
    assert_eq!(immediate.to_string(), "-2");
  }

  #[test]
  fn test_register_direct() {
    assert_eq!(decode(0b11_000_011, true, &[]), ("bx".to_string(), 0));
    assert_eq!(decode(0b11_000_011, false, &[]), ("bl".to_string(), 0));
  }

  #[test]
  fn test_memory_no_displacement() {
    assert_eq!(decode(0b00_000_000, true, &[]), ("[bx + si]".to_string(), 0));
    assert_eq!(decode(0b00_000_111, false, &[]), ("[bx]".to_string(), 0));
  }

  #[test]
  fn test_direct_address_is_not_bp() {
    assert_eq!(
      decode(0b00_000_110, true, &[0x00, 0x01]),
      ("[256]".to_string(), 2)
    );
  }

  #[test]
  fn test_direct_address_is_unsigned() {
    assert_eq!(
      decode(0b00_000_110, true, &[0x00, 0x90]),
      ("[36864]".to_string(), 2)
    );
  }

  #[test]
  fn test_bp_with_zero_displacement() {
    assert_eq!(decode(0b01_000_110, true, &[0x00]), ("[bp]".to_string(), 1));
  }

  #[test]
  fn test_disp8_sign() {
    assert_eq!(decode(0b01_000_001, true, &[0xff]), ("[bx + di - 1]".to_string(), 1));
    assert_eq!(decode(0b01_000_100, true, &[0x04]), ("[si + 4]".to_string(), 1));
    assert_eq!(decode(0b01_000_010, true, &[0x80]), ("[bp + si - 128]".to_string(), 1));
  }

  #[test]
  fn test_disp16() {
    assert_eq!(
      decode(0b10_000_000, true, &[0x87, 0x13]),
      ("[bx + si + 4999]".to_string(), 2)
    );
    assert_eq!(
      decode(0b10_000_101, true, &[0x00, 0x80]),
      ("[di - 32768]".to_string(), 2)
    );
  }

  #[test]
  fn test_truncated_displacement() {
    let mut cursor = Cursor::new(&[0x01]);
    assert_eq!(
      decode_rm(ModRm::parse(0b10_000_000), true, &mut cursor),
      Err(DecodeError::UnexpectedEndOfInput { needed: 1 })
    );
  }
}
