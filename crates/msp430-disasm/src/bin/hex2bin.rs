use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use msp430_disasm::hex_to_bytes;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert plain hex text into a binary file")]
struct Opts {
    /// Hex text, two digits per byte
    input: PathBuf,
    /// Binary output
    output: PathBuf,
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;
    let bytes = hex_to_bytes(&text)?;
    fs::write(&opts.output, bytes).with_context(|| format!("writing {}", opts.output.display()))?;
    Ok(())
}
