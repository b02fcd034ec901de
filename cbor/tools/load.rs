/*!
Load command - decode one CBOR item and report the result
*/

use super::io::{Input, Output};
use cbor_load::{Flags, decode::DEFAULT_MAX_DEPTH, load};
use clap::Parser;

/// Decode a single CBOR item
#[derive(Parser, Debug)]
#[command(about = "Decode a single CBOR item and report the result", long_about = None)]
pub struct Command {
    /// Treat the input as hexadecimal text
    #[arg(long)]
    hex: bool,

    /// Maximum nesting depth of arrays, maps and tags
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, value_name = "DEPTH")]
    max_depth: usize,

    /// Keep text strings that are not valid UTF-8 instead of failing
    #[arg(long)]
    lenient_text: bool,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<Output>,

    /// Input file (use '-' for stdin)
    input: Input,
}

impl Command {
    fn flags(&self) -> Flags {
        Flags {
            max_depth: self.max_depth,
            strict_text: !self.lenient_text,
        }
    }

    pub fn exec(self) -> anyhow::Result<()> {
        let data = self.input.read_bytes(self.hex)?;
        let flags = self.flags();
        tracing::debug!("Loading {} bytes with {flags:?}", data.len());

        let result = load(&data, &flags);
        let mut report = format!(
            "read: {} of {}\nstatus: {:?}\n",
            result.read,
            data.len(),
            result.status()
        );
        if let Some(item) = &result.item {
            if result.read < data.len() {
                tracing::warn!("{} trailing bytes after item", data.len() - result.read);
            }
            report.push_str(&format!("{item:?}\n"));
        }

        self.output.unwrap_or_default().write_str(&report)?;

        match result.error {
            Some(e) => Err(anyhow::anyhow!(
                "Failed to load CBOR item at offset {}: {e}",
                result.read
            )),
            None => Ok(()),
        }
    }
}
