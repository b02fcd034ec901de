/*!
CBOR Tools - A CLI for loading CBOR data into an item graph

# Commands

- `load`: Decode a single CBOR item and report the outcome

# Examples

```bash
# Load a CBOR file
cbor load data.cbor

# Load hex text from stdin, allowing malformed UTF-8 in text strings
echo '7f61616162ff' | cbor load --hex --lenient-text -

# Bound nesting depth
cbor load --max-depth 16 data.cbor
```
*/

use clap::{Parser, Subcommand};

mod io;
mod load;

/// A CLI tool for working with CBOR data
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "A CLI tool for loading and inspecting CBOR data"
)]
struct Cli {
    /// Log level: error, warn, info, debug or trace
    #[arg(long, global = true, default_value = "warn", value_name = "LEVEL")]
    log_level: tracing_subscriber::filter::LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a single CBOR item and report the result
    Load(load::Command),
}

fn init_logger(log_level: tracing_subscriber::filter::LevelFilter) {
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(
            log_level > tracing_subscriber::filter::LevelFilter::from_level(tracing::Level::INFO),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    match cli.command {
        Commands::Load(args) => args.exec(),
    }
}
