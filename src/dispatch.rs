use std::sync::OnceLock;

use crate::error::{DecodeError, DecodeResult};
use crate::handlers::{Family, Mnemonic};

/// Leading-byte templates from table 4-12 of the 8086 manual. `x` marks a
/// format bit (d, w, s or an inline register field), `_` is ignored.
pub static TEMPLATES: &[(&str, Family)] = &[
  ("100010_xx", Family::RegMem(Mnemonic::Mov)),
  ("000000_xx", Family::RegMem(Mnemonic::Add)),
  ("001010_xx", Family::RegMem(Mnemonic::Sub)),
  ("1011_x_xxx", Family::ImmediateToRegister),
  ("1100011_x", Family::ImmediateToRegMem),
  ("100000_xx", Family::ArithmeticImmediate),
  ("1010000_x", Family::MemoryToAccumulator),
  ("1010001_x", Family::AccumulatorToMemory),
  ("0000010_x", Family::ImmediateToAccumulator(Mnemonic::Add)),
  ("0010110_x", Family::ImmediateToAccumulator(Mnemonic::Sub)),
];

pub struct DispatchTable {
  entries: [Option<Family>; 256],
}

impl DispatchTable {
  /// Later templates overwrite earlier ones on collision.
  pub fn build(templates: &[(&str, Family)]) -> Self {
    let mut entries = [None; 256];
    for (template, family) in templates {
      for byte in expand(template) {
        entries[usize::from(byte)] = Some(*family);
      }
    }
    let table = DispatchTable { entries };
    log::debug!(
      "dispatch table built: {} of 256 opcodes registered",
      table.entries.iter().flatten().count()
    );
    table
  }

  pub fn lookup(&self, byte: u8) -> DecodeResult<Family> {
    self.entries[usize::from(byte)].ok_or(DecodeError::UnknownOpcode { byte })
  }
}

pub fn table() -> &'static DispatchTable {
  static TABLE: OnceLock<DispatchTable> = OnceLock::new();
  TABLE.get_or_init(|| DispatchTable::build(TEMPLATES))
}

/// Every concrete byte a template matches, in ascending wildcard order.
pub fn expand(template: &str) -> Vec<u8> {
  let bits: Vec<char> = template.chars().filter(|c| *c != '_').collect();
  assert!(bits.len() == 8, "template `{template}` is not 8 bits wide");
  let wildcards = bits.iter().filter(|bit| **bit == 'x').count();

  (0..1u16 << wildcards)
    .map(|assignment| {
      let mut remaining = wildcards;
      bits.iter().fold(0u8, |byte, bit| {
        let value = match bit {
          '0' => 0,
          '1' => 1,
          'x' => {
            remaining -= 1;
            (assignment >> remaining) as u8 & 1
          }
          other => panic!("invalid bit `{other}` in template `{template}`"),
        };
        (byte << 1) | value
      })
    })
    .collect()
}
