//! Batch command implementation.
//!
//! A manifest names one container file and the compressed entries inside
//! it. Every entry is decoded independently; a corrupt entry is reported
//! and skipped without stopping the others.

use crate::utils::{CliResult, create_progress_bar, load_config, slice_region};
use log::{info, warn};
use oxilz_codec::{
    CompressionConfig, DecodeJob, DecodeLimits, DecodeStatus, Decoder, Preset, decompress_batch,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Batch manifest (JSON).
#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// Container file, relative to the manifest.
    pub source: PathBuf,
    /// Entries to decode.
    pub entries: Vec<ManifestEntry>,
}

/// One compressed region of the container.
#[derive(Debug, Deserialize)]
pub struct ManifestEntry {
    /// Output file name.
    pub name: String,
    /// Start of the compressed bytes.
    pub offset: u64,
    /// Length of the compressed bytes.
    pub length: u64,
    /// Declared decompressed size.
    pub size: usize,
    /// Preset name.
    #[serde(default)]
    pub preset: Option<String>,
    /// Inline format description, or a path to one.
    #[serde(default)]
    pub config: Option<ConfigSource>,
}

/// Inline config or a file holding one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ConfigSource {
    /// Path relative to the manifest.
    File(PathBuf),
    /// Config object.
    Inline(Box<CompressionConfig>),
}

impl ManifestEntry {
    fn config(&self, base: &Path) -> CliResult<CompressionConfig> {
        match (&self.preset, &self.config) {
            (Some(name), None) => Ok(name.parse::<Preset>()?.config()),
            (None, Some(ConfigSource::File(path))) => load_config(&base.join(path)),
            (None, Some(ConfigSource::Inline(config))) => {
                config.validate()?;
                Ok(config.as_ref().clone())
            }
            (None, None) => Err("needs a preset or a config".into()),
            (Some(_), Some(_)) => Err("has both a preset and a config".into()),
        }
    }

    /// Output file name with any directory part dropped.
    fn file_name(&self) -> CliResult<&std::ffi::OsStr> {
        Path::new(&self.name)
            .file_name()
            .ok_or_else(|| format!("invalid entry name '{}'", self.name).into())
    }
}

/// Parse a manifest file.
pub fn load_manifest(path: &Path) -> CliResult<Manifest> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read manifest {}: {e}", path.display()))?;
    let manifest: Manifest = serde_json::from_str(&text)
        .map_err(|e| format!("invalid manifest {}: {e}", path.display()))?;
    Ok(manifest)
}

pub fn cmd_batch(manifest_path: &Path, output: &Path, progress: bool) -> CliResult<()> {
    let manifest = load_manifest(manifest_path)?;
    let base = manifest_path.parent().unwrap_or(Path::new("."));
    let source = base.join(&manifest.source);
    let container = std::fs::read(&source)
        .map_err(|e| format!("cannot read {}: {e}", source.display()))?;

    info!(
        "batch: {} entries from {} ({} bytes)",
        manifest.entries.len(),
        source.display(),
        container.len()
    );

    std::fs::create_dir_all(output)?;

    // Entries whose config or region is bad fail here, before decoding.
    let mut failures: Vec<(String, String)> = Vec::new();
    let mut prepared = Vec::with_capacity(manifest.entries.len());
    for entry in &manifest.entries {
        let setup = entry.config(base).and_then(|config| {
            let decoder = Decoder::new(config)?;
            let input = slice_region(&container, entry.offset, entry.length).ok_or_else(|| {
                format!(
                    "region {}+{} is outside the container",
                    entry.offset, entry.length
                )
            })?;
            Ok((decoder, input))
        });
        match setup {
            Ok((decoder, input)) => prepared.push((entry, decoder, input)),
            Err(e) => failures.push((entry.name.clone(), e.to_string())),
        }
    }

    let jobs: Vec<DecodeJob<'_>> = prepared
        .iter()
        .map(|(entry, decoder, input)| DecodeJob::new(input, entry.size, decoder))
        .collect();
    let results = decompress_batch(&jobs, &DecodeLimits::default());

    let pb = create_progress_bar(results.len() as u64, progress);
    let mut written = 0usize;
    for ((entry, _, _), result) in prepared.iter().zip(results) {
        pb.set_message(entry.name.clone());

        let outcome = result
            .map_err(|e| e.to_string())
            .and_then(|decoded| {
                let name = entry.file_name().map_err(|e| e.to_string())?;
                std::fs::write(output.join(name), &decoded.data).map_err(|e| e.to_string())?;
                Ok(decoded.status)
            });

        match outcome {
            Ok(DecodeStatus::Complete) => written += 1,
            Ok(DecodeStatus::Truncated { missing }) => {
                warn!("{}: truncated, {missing} bytes missing", entry.name);
                written += 1;
            }
            Err(e) => failures.push((entry.name.clone(), e)),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "Decoded {written} of {} entries into {}",
        manifest.entries.len(),
        output.display()
    );
    for (name, error) in &failures {
        eprintln!("  {name}: {error}");
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} entries failed", failures.len()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_parsing() {
        let json = r#"{
            "source": "data.pak",
            "entries": [
                {"name": "a.bin", "offset": 0, "length": 9, "size": 8, "preset": "lzss"},
                {"name": "b.bin", "offset": 9, "length": 4, "size": 4, "config": "fmt.json"},
                {"name": "c.bin", "offset": 13, "length": 2, "size": 2,
                 "config": {"window_size": 256, "initial_fill_position": 0}}
            ]
        }"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();

        assert_eq!(manifest.entries.len(), 3);
        assert!(matches!(
            manifest.entries[1].config,
            Some(ConfigSource::File(_))
        ));

        let base = Path::new(".");
        assert_eq!(
            manifest.entries[0].config(base).unwrap(),
            Preset::Lzss.config()
        );
        // an 8-bit window cannot hold 12-bit absolute offsets
        assert!(manifest.entries[2].config(base).is_err());
    }

    #[test]
    fn test_entry_names_lose_directories() {
        let entry = ManifestEntry {
            name: "../../etc/passwd".to_string(),
            offset: 0,
            length: 0,
            size: 0,
            preset: Some("lzss".to_string()),
            config: None,
        };
        assert_eq!(entry.file_name().unwrap(), "passwd");
    }
}
