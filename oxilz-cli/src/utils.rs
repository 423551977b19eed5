//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use oxilz_codec::{CompressionConfig, OxiLzError, Preset};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Boxed error used by every command.
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb
}

/// Load a JSON format description and validate it.
pub fn load_config(path: &Path) -> CliResult<CompressionConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
    let config: CompressionConfig = serde_json::from_str(&text)
        .map_err(|e| format!("invalid config {}: {e}", path.display()))?;
    config.validate()?;
    debug!("loaded {} config from {}", config.variant_name(), path.display());
    Ok(config)
}

/// Pick the configuration named by `--preset` or loaded from `--config`.
pub fn resolve_config(
    preset: Option<Preset>,
    config: Option<&PathBuf>,
) -> CliResult<CompressionConfig> {
    match (preset, config) {
        (Some(preset), None) => Ok(preset.config()),
        (None, Some(path)) => load_config(path),
        (None, None) => Ok(Preset::default().config()),
        (Some(_), Some(_)) => Err("--preset and --config are mutually exclusive".into()),
    }
}

/// Read `length` bytes at `offset` (to end of file when `length` is `None`).
///
/// A region reaching past the end of the file is an `UnexpectedEof` I/O error.
pub fn read_region(path: &Path, offset: u64, length: Option<u64>) -> oxilz_codec::Result<Vec<u8>> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    if offset > file_len {
        return Err(region_error(format!(
            "offset {offset} is past the end of {} ({file_len} bytes)",
            path.display()
        )));
    }

    let available = file_len - offset;
    let length = length.unwrap_or(available);
    if length > available {
        return Err(region_error(format!(
            "region {offset}+{length} overruns {} ({file_len} bytes)",
            path.display()
        )));
    }

    let mut reader = BufReader::new(file);
    reader.seek(SeekFrom::Start(offset))?;
    let mut data = Vec::with_capacity(length as usize);
    reader.take(length).read_to_end(&mut data)?;
    Ok(data)
}

fn region_error(message: String) -> OxiLzError {
    OxiLzError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, message))
}

/// Slice a region out of an in-memory container.
pub fn slice_region(data: &[u8], offset: u64, length: u64) -> Option<&[u8]> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(usize::try_from(length).ok()?)?;
    data.get(start..end)
}
