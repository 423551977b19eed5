//! OxiLZ CLI - configurable LZSS/RLE decompression
//!
//! Decodes compressed regions of legacy game and archive files using
//! built-in presets or JSON format descriptions.

mod commands;
mod utils;

use clap::{Args, Parser, Subcommand};
use commands::decode::DecodeRequest;
use commands::{cmd_batch, cmd_decode, cmd_inspect, cmd_presets};
use oxilz_codec::Preset;
use std::path::PathBuf;
use utils::resolve_config;

#[derive(Parser)]
#[command(name = "oxilz")]
#[command(author, version, about = "Configurable LZSS/RLE decompression - Pure Rust")]
#[command(long_about = "
OxiLZ decodes the LZSS and LZ/RLE variants used by many legacy game and
archive formats. Formats are chosen by preset or described in a JSON file.

Examples:
  oxilz decode data.pak --offset 4096 --length 1800 --size 4096 -o out.bin
  oxilz decode script.bin --size 65536 --preset kaguya -o script.txt
  oxilz decode image.dat --size 307200 --config custom.json --strict -o image.raw
  oxilz batch entries.json -o extracted --progress
  oxilz presets --json
  oxilz inspect --preset black-butterfly
")]
struct Cli {
    /// Log decoder activity (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Format selection shared by commands.
#[derive(Args)]
struct FormatArgs {
    /// Built-in format (see `oxilz presets`)
    #[arg(short, long, conflicts_with = "config")]
    preset: Option<Preset>,

    /// JSON format description
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one compressed region
    #[command(alias = "d")]
    Decode {
        /// File holding the compressed data
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Declared decompressed size in bytes
        #[arg(short, long)]
        size: usize,

        /// Start of the compressed data
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Length of the compressed data (default: to end of file)
        #[arg(long)]
        length: Option<u64>,

        #[command(flatten)]
        format: FormatArgs,

        /// Fail instead of writing a short output when input runs out
        #[arg(long)]
        strict: bool,
    },

    /// Decode every entry listed in a JSON manifest
    Batch {
        /// Manifest file
        manifest: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// List built-in presets
    Presets {
        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Validate and print a format configuration
    Inspect {
        #[command(flatten)]
        format: FormatArgs,

        /// Output as JSON (usable with --config)
        #[arg(short, long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let result = match cli.command {
        Commands::Decode {
            input,
            output,
            size,
            offset,
            length,
            format,
            strict,
        } => resolve_config(format.preset, format.config.as_ref()).and_then(|config| {
            let request = DecodeRequest {
                input: &input,
                output: &output,
                size,
                offset,
                length,
            };
            cmd_decode(&request, config, strict)
        }),
        Commands::Batch {
            manifest,
            output,
            progress,
        } => cmd_batch(&manifest, &output, progress),
        Commands::Presets { json } => cmd_presets(json),
        Commands::Inspect { format, json } => {
            resolve_config(format.preset, format.config.as_ref())
                .and_then(|config| cmd_inspect(&config, json))
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
