use crate::error::{DecodeError, DecodeResult};

/// Operand size in bytes for multi-byte reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
  Byte,
  Word,
}

impl Width {
  pub fn from_w_bit(w: bool) -> Self {
    if w {
      Width::Word
    } else {
      Width::Byte
    }
  }

  pub fn bytes(self) -> usize {
    match self {
      Width::Byte => 1,
      Width::Word => 2,
    }
  }

  pub fn keyword(self) -> &'static str {
    match self {
      Width::Byte => "byte",
      Width::Word => "word",
    }
  }
}

/// Single-pass reader over the instruction stream.
pub struct Cursor<'a> {
  bytes: &'a [u8],
  pos: usize,
  mark: usize,
}

impl<'a> Cursor<'a> {
  pub fn new(bytes: &'a [u8]) -> Self {
    Cursor { bytes, pos: 0, mark: 0 }
  }

  pub fn position(&self) -> usize {
    self.pos
  }

  pub fn read_byte(&mut self) -> DecodeResult<u8> {
    let byte = self.next().ok_or(DecodeError::UnexpectedEndOfInput { needed: 1 })?;
    Ok(byte)
  }

  pub fn read_unsigned(&mut self, width: Width) -> DecodeResult<u16> {
    let needed = width.bytes();
    let remaining = self.bytes.len() - self.pos;
    if remaining < needed {
      return Err(DecodeError::UnexpectedEndOfInput {
        needed: needed - remaining,
      });
    }
    let span = &self.bytes[self.pos..self.pos + needed];
    self.pos += needed;
    Ok(match width {
      Width::Byte => u16::from(span[0]),
      Width::Word => u16::from_le_bytes([span[0], span[1]]),
    })
  }

  pub fn read_signed(&mut self, width: Width) -> DecodeResult<i16> {
    let raw = self.read_unsigned(width)?;
    Ok(match width {
      Width::Byte => i16::from(raw as u8 as i8),
      Width::Word => raw as i16,
    })
  }

  pub fn mark(&mut self) {
    self.mark = self.pos;
  }

  pub fn bytes_since_mark(&self) -> &'a [u8] {
    &self.bytes[self.mark..self.pos]
  }
}

/// Yields `None` once the buffer is exhausted; a zero byte is just a byte.
impl Iterator for Cursor<'_> {
  type Item = u8;

  fn next(&mut self) -> Option<u8> {
    let byte = *self.bytes.get(self.pos)?;
    self.pos += 1;
    Some(byte)
  }
}
