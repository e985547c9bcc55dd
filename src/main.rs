mod cursor;
mod decode;
mod dispatch;
mod error;
mod handlers;
mod operand;
mod tables;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sim8086", version, about = "Disassemble 8086 machine code into a nasm listing")]
struct Args {
  /// Binary file of assembled 8086 instructions
  path: PathBuf,

  /// Prefix each instruction with the raw bytes it was decoded from
  #[arg(long, env = "DEBUG", value_parser = clap::builder::FalseyValueParser::new())]
  annotate: bool,
}

fn main() -> anyhow::Result<()> {
  env_logger::init();
  let args = Args::parse();

  let data = std::fs::read(&args.path)
    .with_context(|| format!("Error reading file `{}`", args.path.display()))?;
  log::debug!("read {} bytes from {}", data.len(), args.path.display());

  let options = decode::Options {
    annotate: args.annotate,
  };
  let code = write_listing(&data, options, &mut std::io::stdout().lock())?;
  if code != 0 {
    std::process::exit(code);
  }
  Ok(())
}

/// Writes the listing, or as much of it as decoded, and returns the exit code.
fn write_listing(data: &[u8], options: decode::Options, out: &mut impl Write) -> anyhow::Result<i32> {
  let (listing, code) = match decode::disassemble(data, options) {
    Ok(listing) => (listing, 0),
    Err(partial) => {
      eprintln!("error: {partial}");
      (partial.listing, 1)
    }
  };
  out.write_all(listing.as_bytes()).context("Error writing listing")?;
  out.flush().context("Error flushing listing")?;
  Ok(code)
}
