use crate::cursor::Cursor;
use crate::dispatch;
use crate::error::{DecodeResult, PartialListing};

#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
  /// Prefix each line with the bytes it was decoded from.
  pub annotate: bool,
}

/// Decodes the whole buffer into a nasm listing. Stops at the first
/// undecodable instruction, handing back what was decoded before it.
pub fn disassemble(instructions: &[u8], options: Options) -> Result<String, PartialListing> {
  let table = dispatch::table();
  let mut listing = Listing::new(options);
  let mut cursor = Cursor::new(instructions);

  loop {
    cursor.mark();
    let offset = cursor.position();
    let Some(opcode) = cursor.next() else {
      break;
    };
    match decode(table, opcode, &mut cursor) {
      Ok(line) => {
        log::trace!("{offset:>6}: {line}");
        listing.push(&line, cursor.bytes_since_mark());
      }
      Err(source) => {
        log::debug!("decoding stopped at offset {offset}: {source}");
        return Err(PartialListing {
          listing: listing.finish(),
          offset,
          source,
        });
      }
    }
  }
  Ok(listing.finish())
}

fn decode(table: &dispatch::DispatchTable, opcode: u8, cursor: &mut Cursor) -> DecodeResult<String> {
  let family = table.lookup(opcode)?;
  let instruction = family.decode(opcode, cursor)?;
  Ok(instruction.to_string())
}

struct Listing {
  lines: Vec<String>,
  options: Options,
}

impl Listing {
  fn new(options: Options) -> Self {
    Listing {
      lines: vec!["bits 16".to_string()],
      options,
    }
  }

  fn push(&mut self, line: &str, bytes: &[u8]) {
    if self.options.annotate {
      let bits: Vec<String> = bytes.iter().map(|byte| format!("{byte:08b}")).collect();
      self.lines.push(format!("({}) {line}", bits.join(" ")));
    } else {
      self.lines.push(line.to_string());
    }
  }

  fn finish(self) -> String {
    let mut listing = self.lines.join("\n\n");
    listing.push('\n');
    listing
  }
}
