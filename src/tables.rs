use crate::error::{DecodeError, DecodeResult};

// table 4-9 of the 8086 manual, REG field (and RM when MOD=11)
static REGISTERS: [[&str; 8]; 2] = [
  ["al", "cl", "dl", "bl", "ah", "ch", "dh", "bh"],
  ["ax", "cx", "dx", "bx", "sp", "bp", "si", "di"],
];

// table 4-10, RM field when MOD != 11
static EFFECTIVE_ADDRESS_BASES: [&[&str]; 8] = [
  &["bx", "si"],
  &["bx", "di"],
  &["bp", "si"],
  &["bp", "di"],
  &["si"],
  &["di"],
  &["bp"], // direct address when MOD=00
  &["bx"],
];

pub fn register(index: u8, w_bit_set: bool) -> DecodeResult<&'static str> {
  REGISTERS[usize::from(w_bit_set)]
    .get(usize::from(index))
    .copied()
    .ok_or(DecodeError::UnknownRegisterEncoding {
      index,
      wide: w_bit_set,
    })
}

pub fn address_bases(rm: u8) -> DecodeResult<&'static [&'static str]> {
  EFFECTIVE_ADDRESS_BASES
    .get(usize::from(rm))
    .copied()
    .ok_or(DecodeError::UnknownAddressingBase { rm })
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn test_register_names() {
    assert_eq!(register(0b_000, false), Ok("al"));
    assert_eq!(register(0b_100, false), Ok("ah"));
    assert_eq!(register(0b_111, false), Ok("bh"));
    assert_eq!(register(0b_000, true), Ok("ax"));
    assert_eq!(register(0b_100, true), Ok("sp"));
    assert_eq!(register(0b_111, true), Ok("di"));
  }

  #[test]
  fn test_register_out_of_range() {
    assert_eq!(
      register(8, true),
      Err(DecodeError::UnknownRegisterEncoding {
        index: 8,
        wide: true
      })
    );
  }

  #[test]
  fn test_address_bases() {
    assert_eq!(address_bases(0b_000), Ok(&["bx", "si"][..]));
    assert_eq!(address_bases(0b_110), Ok(&["bp"][..]));
    assert_eq!(
      address_bases(0b_1000),
      Err(DecodeError::UnknownAddressingBase { rm: 8 })
    );
  }
}
