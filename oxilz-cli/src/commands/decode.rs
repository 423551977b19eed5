//! Decode command implementation.

use crate::utils::{CliResult, read_region};
use log::info;
use oxilz_codec::{CompressionConfig, DecodeStatus, decompress};
use std::path::Path;

/// Where to find the compressed bytes and how many to produce.
pub struct DecodeRequest<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub size: usize,
    pub offset: u64,
    pub length: Option<u64>,
}

pub fn cmd_decode(
    request: &DecodeRequest<'_>,
    config: CompressionConfig,
    strict: bool,
) -> CliResult<()> {
    let config = if strict {
        config.with_truncation(false)
    } else {
        config
    };

    let data = read_region(request.input, request.offset, request.length)?;
    info!(
        "decode: {} bytes at offset {} of {} ({})",
        data.len(),
        request.offset,
        request.input.display(),
        config.variant_name()
    );

    let decoded = decompress(&data, request.size, &config)?;
    std::fs::write(request.output, &decoded.data)?;

    match decoded.status {
        DecodeStatus::Complete => {
            println!(
                "Decoded {} -> {} bytes: {}",
                data.len(),
                decoded.data.len(),
                request.output.display()
            );
        }
        DecodeStatus::Truncated { missing } => {
            eprintln!(
                "Warning: input ended early, {} of {} bytes written ({missing} missing): {}",
                decoded.data.len(),
                request.size,
                request.output.display()
            );
        }
    }

    Ok(())
}
