//! Inspect command implementation.

use crate::utils::CliResult;
use oxilz_codec::{CompressionConfig, ControlGranularity, OpcodeKind};

pub fn cmd_inspect(config: &CompressionConfig, json: bool) -> CliResult<()> {
    config.validate()?;

    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("Format Configuration");
    println!("====================");
    println!("Variant: {}", config.variant_name());
    println!("Window: {:#x} bytes", config.window_size);
    println!("Start position: {:#x}", config.initial_fill_position);
    match &config.initial_fill {
        Some(fill) => println!("Window seed: {fill:?}"),
        None => println!("Window seed: none (references limited to decoded output)"),
    }
    println!("Truncation: {}", if config.allow_truncation { "allowed" } else { "error" });

    match &config.control {
        ControlGranularity::OpcodeRangeTable(table) => {
            println!();
            println!("Opcodes:");
            if table.leading_literals > 0 {
                println!("  {} leading literal byte(s)", table.leading_literals);
            }
            for op in &table.entries {
                let kind = match op.kind {
                    OpcodeKind::LiteralRun => "literal run".to_string(),
                    OpcodeKind::BackReference(field) => format!(
                        "back-reference ({}-bit distance{})",
                        field.total_bits(),
                        if field.complement { ", complemented" } else { "" }
                    ),
                    OpcodeKind::ZeroFill => "zero fill".to_string(),
                    OpcodeKind::ByteFill => "byte fill".to_string(),
                    OpcodeKind::ZeroPaddedLiterals => "zero-padded literals".to_string(),
                };
                let operand = if op.kind.has_fill_byte() { ", fill byte follows" } else { "" };
                println!(
                    "  {:#04x}..={:#04x}  {kind}, count +{}{operand}",
                    op.start, op.end, op.length_bias
                );
            }
            if let Some([first, second]) = table.end_marker {
                println!("  end marker: {first:#04x} {second:#04x}");
            }
        }
        _ => {
            println!("Bit order: {}", config.bit_order);
            println!("Literal flag: {}", u8::from(config.literal_flag));
            println!("Match layout: {:?}", config.match_layout);
            println!("Offset: {} bits, {:?}", config.offset_bits, config.offset_mode);
            match config.alt_length_bits {
                Some(alt) => println!(
                    "Length: {} or {alt} bits, {:?}",
                    config.length_bits, config.length_code
                ),
                None => println!("Length: {} bits, {:?}", config.length_bits, config.length_code),
            }
            println!("Length bias: {}", config.length_bias);
            if let Some(max) = config.max_match_length() {
                println!("Longest match: {max} bytes");
            }
        }
    }

    Ok(())
}
