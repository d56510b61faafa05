use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use msp430_disasm::{load_dump, parse_offset};
use msp430_rs::disasm::fmt_listing;
use msp430_rs::{disassemble, DisasmConfig, Follow};

#[derive(Parser, Debug)]
#[command(author, version, about = "Disassemble an MSP430 hex dump", long_about = None)]
struct Cli {
    /// Hex dump to disassemble (`<offset>: <words>` per line)
    #[arg(value_name = "DUMP")]
    input: PathBuf,
    /// Offset (hex) at which to start disassembly
    #[arg(short, long)]
    offset: Option<String>,
    /// Load settings from a JSON config; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// When to continue decoding at a `jmp` target
    #[arg(long, value_enum)]
    follow_jmp: Option<JmpFollow>,
    /// Keep decoding sequentially after `br #imm`
    #[arg(long)]
    no_follow_branch: bool,
    /// Also decode `call #imm` targets
    #[arg(long)]
    follow_calls: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum JmpFollow {
    Never,
    #[value(name = "self")]
    SelfLoop,
    Always,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn config(cli: &Cli) -> Result<DisasmConfig> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            DisasmConfig::from_json(&text)?
        }
        None => DisasmConfig::default(),
    };
    if let Some(off) = &cli.offset {
        cfg.start = Some(parse_offset(off)?);
    }
    if let Some(jmp) = cli.follow_jmp {
        cfg.follow.remove(Follow::JMP | Follow::SELF_JMP);
        match jmp {
            JmpFollow::Never => {}
            JmpFollow::SelfLoop => cfg.follow.insert(Follow::SELF_JMP),
            JmpFollow::Always => cfg.follow.insert(Follow::JMP),
        }
    }
    if cli.no_follow_branch {
        cfg.follow.remove(Follow::BRANCH);
    }
    if cli.follow_calls {
        cfg.follow.insert(Follow::CALL);
    }
    cfg.validate()?;
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    // alignment is checked before the dump is even read
    let cfg = config(&cli)?;
    let mut store = load_dump(&cli.input)?;
    info!(records = store.records().len(), words = store.len(), "loaded dump");

    let listing = disassemble(&mut store, &cfg)?;
    info!(
        insns = listing.instructions().count(),
        followed = listing.followed.len(),
        unresolved = listing.unresolved.len(),
        "disassembly done"
    );

    let text = match cli.format {
        OutputFormat::Text => fmt_listing(&listing),
        OutputFormat::Json => serde_json::to_string_pretty(&listing)? + "\n",
    };
    if let Some(path) = cli.out {
        std::fs::write(path, text)?;
    } else {
        print!("{text}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("msp430-disasm").chain(args.iter().copied()))
    }

    #[test]
    fn flags_shape_follow_policy() {
        let cfg = config(&cli(&["dump.txt"])).unwrap();
        assert_eq!(cfg, DisasmConfig::default());

        let cfg = config(&cli(&["dump.txt", "--follow-jmp", "always", "--follow-calls"])).unwrap();
        assert_eq!(cfg.follow, Follow::JMP | Follow::BRANCH | Follow::CALL);

        let cfg = config(&cli(&["dump.txt", "--follow-jmp", "never", "--no-follow-branch"])).unwrap();
        assert!(cfg.follow.is_empty());
    }

    #[test]
    fn misaligned_offset_is_fatal() {
        let err = config(&cli(&["dump.txt", "-o", "1001"])).unwrap_err();
        assert!(err.to_string().contains("2 byte boundary"));
        assert_eq!(config(&cli(&["dump.txt", "-o", "0x1000"])).unwrap().start, Some(0x1000));
    }
}
