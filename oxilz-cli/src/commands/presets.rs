//! Presets command implementation.

use crate::utils::CliResult;
use oxilz_codec::Preset;
use serde::Serialize;

#[derive(Serialize)]
struct PresetSummary {
    name: &'static str,
    description: &'static str,
    variant: &'static str,
    window_size: usize,
    initial_fill_position: usize,
}

impl From<Preset> for PresetSummary {
    fn from(preset: Preset) -> Self {
        let config = preset.config();
        Self {
            name: preset.name(),
            description: preset.description(),
            variant: config.variant_name(),
            window_size: config.window_size,
            initial_fill_position: config.initial_fill_position,
        }
    }
}

pub fn cmd_presets(json: bool) -> CliResult<()> {
    let summaries: Vec<PresetSummary> = Preset::ALL.into_iter().map(PresetSummary::from).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!(
        "{:<16} {:<20} {:>8} {:>8}  Description",
        "Name", "Variant", "Window", "Start"
    );
    println!("{}", "-".repeat(100));
    for s in &summaries {
        println!(
            "{:<16} {:<20} {:>8} {:>8}  {}",
            s.name,
            s.variant,
            format!("{:#x}", s.window_size),
            format!("{:#x}", s.initial_fill_position),
            s.description
        );
    }

    Ok(())
}
