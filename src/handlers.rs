use std::fmt;

use crate::cursor::{Cursor, Width};
use crate::error::{DecodeError, DecodeResult};
use crate::operand::{decode_rm, EffectiveAddress, ModRm, Operand};
use crate::tables;

const D_BIT: u8 = 0b_0000_0010;
const S_BIT: u8 = 0b_0000_0010;
const W_BIT: u8 = 0b_0000_0001;
const SHORT_FORM_W_BIT: u8 = 0b_0000_1000;
const ACCUMULATOR: u8 = 0b_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mnemonic {
  Mov,
  Add,
  Sub,
}

impl fmt::Display for Mnemonic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Mnemonic::Mov => "mov",
      Mnemonic::Add => "add",
      Mnemonic::Sub => "sub",
    })
  }
}

/// The encoding families a leading byte can belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
  /// `...dw` + ModRM: register to/from register or memory
  RegMem(Mnemonic),
  /// `1011wrrr` + data: mov immediate to register
  ImmediateToRegister,
  /// `1100011w` + ModRM + data: mov immediate to register or memory
  ImmediateToRegMem,
  /// `100000sw` + ModRM + data: add/sub immediate, selected by ModRM REG
  ArithmeticImmediate,
  /// `1010000w` + addr
  MemoryToAccumulator,
  /// `1010001w` + addr
  AccumulatorToMemory,
  /// `...w` + data: add/sub immediate to al/ax
  ImmediateToAccumulator(Mnemonic),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
  pub mnemonic: Mnemonic,
  pub dest: Operand,
  pub src: Operand,
}

impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}, ", self.mnemonic, self.dest)?;
    // a memory destination leaves the immediate's width ambiguous
    if let Operand::Immediate { width, .. } = self.src {
      if self.dest.is_memory() {
        write!(f, "{} ", width.keyword())?;
      }
    }
    write!(f, "{}", self.src)
  }
}

impl Family {
  /// Decodes the rest of an instruction whose leading byte was `opcode`.
  pub fn decode(self, opcode: u8, cursor: &mut Cursor) -> DecodeResult<Instruction> {
    match self {
      Family::RegMem(mnemonic) => reg_mem(mnemonic, opcode, cursor),
      Family::ImmediateToRegister => immediate_to_register(opcode, cursor),
      Family::ImmediateToRegMem => immediate_to_reg_mem(opcode, cursor, false, |subop| {
        match subop {
          0b_000 => Ok(Mnemonic::Mov),
          _ => Err(DecodeError::UnsupportedMovSubop { opcode, subop }),
        }
      }),
      Family::ArithmeticImmediate => {
        immediate_to_reg_mem(opcode, cursor, opcode & S_BIT != 0, |subop| match subop {
          0b_000 => Ok(Mnemonic::Add),
          0b_101 => Ok(Mnemonic::Sub),
          _ => Err(DecodeError::UnsupportedArithmeticSubop { opcode, subop }),
        })
      }
      Family::MemoryToAccumulator => {
        let (accumulator, memory) = accumulator_and_address(opcode, cursor)?;
        Ok(two_operand(Mnemonic::Mov, accumulator, memory))
      }
      Family::AccumulatorToMemory => {
        let (accumulator, memory) = accumulator_and_address(opcode, cursor)?;
        Ok(two_operand(Mnemonic::Mov, memory, accumulator))
      }
      Family::ImmediateToAccumulator(mnemonic) => {
        let w_bit_set = opcode & W_BIT != 0;
        let dest = Operand::Register(tables::register(ACCUMULATOR, w_bit_set)?);
        let src = immediate(cursor, Width::from_w_bit(w_bit_set))?;
        Ok(two_operand(mnemonic, dest, src))
      }
    }
  }
}

fn two_operand(mnemonic: Mnemonic, dest: Operand, src: Operand) -> Instruction {
  Instruction {
    mnemonic,
    dest,
    src,
  }
}

fn read_modrm(cursor: &mut Cursor) -> DecodeResult<ModRm> {
  Ok(ModRm::parse(cursor.read_byte()?))
}

fn immediate(cursor: &mut Cursor, width: Width) -> DecodeResult<Operand> {
  let value = cursor.read_signed(width)?;
  Ok(Operand::Immediate { value, width })
}

fn reg_mem(mnemonic: Mnemonic, opcode: u8, cursor: &mut Cursor) -> DecodeResult<Instruction> {
  let d_bit_set = opcode & D_BIT != 0;
  let w_bit_set = opcode & W_BIT != 0;
  let modrm = read_modrm(cursor)?;
  let reg = Operand::Register(tables::register(modrm.reg(), w_bit_set)?);
  let rm = decode_rm(modrm, w_bit_set, cursor)?;
  Ok(if d_bit_set {
    two_operand(mnemonic, reg, rm)
  } else {
    two_operand(mnemonic, rm, reg)
  })
}

fn immediate_to_register(opcode: u8, cursor: &mut Cursor) -> DecodeResult<Instruction> {
  let w_bit_set = opcode & SHORT_FORM_W_BIT != 0;
  let dest = Operand::Register(tables::register(opcode & 0b_111, w_bit_set)?);
  let src = immediate(cursor, Width::from_w_bit(w_bit_set))?;
  Ok(two_operand(Mnemonic::Mov, dest, src))
}

/// The sub-operation lives in the ModRM REG field; `select` maps it to a
/// mnemonic or to the error for this family.
fn immediate_to_reg_mem(
  opcode: u8,
  cursor: &mut Cursor,
  s_bit_set: bool,
  select: impl Fn(u8) -> DecodeResult<Mnemonic>,
) -> DecodeResult<Instruction> {
  let w_bit_set = opcode & W_BIT != 0;
  let modrm = read_modrm(cursor)?;
  let mnemonic = select(modrm.reg())?;
  let dest = decode_rm(modrm, w_bit_set, cursor)?;
  // s=1 w=1: one data byte, sign-extended to a word
  let data_width = Width::from_w_bit(w_bit_set && !s_bit_set);
  let value = cursor.read_signed(data_width)?;
  let src = Operand::Immediate {
    value,
    width: Width::from_w_bit(w_bit_set),
  };
  Ok(two_operand(mnemonic, dest, src))
}

fn accumulator_and_address(opcode: u8, cursor: &mut Cursor) -> DecodeResult<(Operand, Operand)> {
  let w_bit_set = opcode & W_BIT != 0;
  let accumulator = Operand::Register(tables::register(ACCUMULATOR, w_bit_set)?);
  let address = cursor.read_unsigned(Width::Word)?;
  Ok((accumulator, Operand::Memory(EffectiveAddress::Direct(address))))
}
