//! `tjson`: reads a TJSON document and writes it back out in canonical form.

use clap::{Parser, ValueEnum};
use failure::Error;
use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};
use tjson::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tjson")]
#[command(about = "Validate and re-serialize TJSON documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Input file, standard input if absent
    file: Option<PathBuf>,

    /// Write object members sorted by name
    #[arg(long)]
    sort_keys: bool,

    /// Pretty-print with this many spaces per level
    #[arg(long, value_name = "N")]
    indent: Option<usize>,

    /// Encoding for binary data
    #[arg(long, value_enum, default_value_t = Binary::B64)]
    binary: Binary,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Binary {
    B16,
    B32,
    B64,
}

impl From<Binary> for BinaryEncoding {
    fn from(b: Binary) -> BinaryEncoding {
        match b {
            Binary::B16 => BinaryEncoding::Base16,
            Binary::B32 => BinaryEncoding::Base32,
            Binary::B64 => BinaryEncoding::Base64,
        }
    }
}

impl Cli {
    fn config(&self) -> DumpConfig {
        DumpConfig {
            key_order: if self.sort_keys {
                KeyOrder::Sorted
            } else {
                KeyOrder::Preserve
            },
            indent: self.indent.map_or(Indent::None, Indent::Pretty),
            binary: self.binary.into(),
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TJSON_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<String, Error> {
    let input = match &cli.file {
        Some(path) => fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let value = parse_slice(&input)?;
    Ok(dump_with(&value, &cli.config())?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("tjson: {}", e);
            ExitCode::FAILURE
        }
    }
}
