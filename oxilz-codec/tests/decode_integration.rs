//! Integration tests for the public decode API.
//!
//! These drive both decoder variants through `decompress`, the presets and
//! the batch entry point, covering truncation, corruption, and limits.

use oxilz_codec::{
    BitOrder, CompressionConfig, ControlGranularity, DecodeJob, DecodeLimits, DecodeStatus,
    Decoder, Decompressor, LengthCode, MatchLayout, OffsetMode, OxiLzError, Preset, decompress,
    decompress_batch, decompress_with_limits,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

/// Byte-mask LZSS input made only of literal tokens.
fn literal_stream(data: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(data.len() + data.len() / 8 + 1);
    for group in data.chunks(8) {
        input.push(0xFF);
        input.extend_from_slice(group);
    }
    input
}

/// Pandora input: one leading literal, then a single 64-byte literal run.
fn pandora_literals() -> (Vec<u8>, Vec<u8>) {
    let expected: Vec<u8> = (0..65u8).collect();
    let mut input = vec![expected[0], 0x3F];
    input.extend_from_slice(&expected[1..]);
    (input, expected)
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_scenario_a_literal_tokens() {
    let config = CompressionConfig::new(4096, 12, 4, 3).with_initial_fill_position(0xFEE);
    let input = literal_stream(&[0x01; 255]);

    let decoded = decompress(&input, 255, &config).expect("decode failed");

    assert_eq!(decoded.data, vec![0x01; 255]);
    assert_eq!(decoded.status, DecodeStatus::Complete);
}

#[test]
fn test_scenario_b_zero_fill_of_40() {
    // 0xFF + 8 -> 40 zeros, then a one-byte literal run
    let input = [0xFF, 8, 0x80, b'x'];

    let decoded = decompress(&input, 41, &Preset::BlackButterfly.config()).unwrap();

    assert_eq!(&decoded.data[..40], &[0u8; 40][..]);
    assert_eq!(decoded.data[40], b'x');
}

#[test]
fn test_scenario_c_input_ten_bytes_short() {
    let (input, expected) = pandora_literals();
    let short = &input[..input.len() - 10];

    let decoded = decompress(short, expected.len(), &Preset::Pandora.config()).unwrap();
    assert_eq!(decoded.data.len(), expected.len() - 10);
    assert_eq!(decoded.data, &expected[..expected.len() - 10]);
    assert_eq!(decoded.status, DecodeStatus::Truncated { missing: 10 });

    let strict = Preset::Pandora.config().with_truncation(false);
    let err = decompress(short, expected.len(), &strict).unwrap_err();
    assert!(matches!(
        err,
        OxiLzError::TruncatedInput {
            produced: 55,
            expected: 65
        }
    ));
    assert!(err.is_recoverable());
}

#[test]
fn test_scenario_d_periodic_expansion() {
    // "PQ", then copy 10 bytes from distance 2
    let input = [b'P', 0x00, b'Q', 0x87, 0x01];

    let decoded = decompress(&input, 12, &Preset::Pandora.config()).unwrap();

    assert_eq!(decoded.data, b"PQPQPQPQPQPQ");
}

// ============================================================================
// Corruption
// ============================================================================

#[test]
fn test_relative_offset_zero_is_corrupt() {
    let config = CompressionConfig::new(0x1000, 12, 4, 3)
        .with_initial_fill(None)
        .with_initial_fill_position(0)
        .with_match_layout(MatchLayout::OffsetFirst)
        .with_offset_mode(OffsetMode::Relative { bias: 0 });

    // control: literal then match; the match word is all zero
    let input = [0b0000_0001, b'a', 0x00, 0x00];
    let err = decompress(&input, 8, &config).unwrap_err();

    assert!(err.is_corrupt());
    assert!(matches!(err, OxiLzError::CorruptStream { .. }));
}

#[test]
fn test_reference_before_output_start_is_corrupt() {
    // Pandora: distance 0x101 with two bytes of history
    let input = [b'a', 0x00, b'b', 0xC0, 0x00];
    let err = decompress(&input, 16, &Preset::Pandora.config()).unwrap_err();
    assert!(matches!(err, OxiLzError::CorruptStream { offset: 5, .. }));
}

#[test]
fn test_configuration_errors_fail_fast() {
    let config = CompressionConfig::new(0x1000, 13, 3, 3);
    assert!(matches!(
        Decoder::new(config),
        Err(OxiLzError::Configuration { .. })
    ));

    let opcode = Preset::BlackButterfly.config().with_initial_fill_position(0x1000);
    assert!(Decoder::new(opcode).is_err());
}

// ============================================================================
// Presets
// ============================================================================

#[test]
fn test_squadra_d_selects_wide_length() {
    // LSB order: flag 0 literal 'S', flag 1 match, selector 1 (6 bits),
    // offset 0xFC0 (the literal's cell), length 20 + 3
    let mut bits = Vec::new();
    let mut push = |value: u32, width: u32| {
        for i in 0..width {
            bits.push((value >> i) & 1);
        }
    };
    push(0, 1);
    push(u32::from(b'S'), 8);
    push(1, 1);
    push(1, 1);
    push(0xFC0, 12);
    push(20, 6);

    let input: Vec<u8> = bits
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | (bit as u8) << i)
        })
        .collect();

    let decoded = decompress(&input, 24, &Preset::SquadraD.config()).unwrap();
    assert_eq!(decoded.data, vec![b'S'; 24]);
}

#[test]
fn test_msb_byte_mask_reverses_control() {
    let config = Preset::Lzss.config().with_bit_order(BitOrder::Msb);
    // MSB literals read the byte unchanged; mask 0x80 = literal first
    let input = [0b1000_0000, b'm', 0xEE, 0xF2];

    let decoded = decompress(&input, 6, &config).unwrap();
    assert_eq!(decoded.data, b"mmmmmm");
}

#[test]
fn test_per_bit_flag_decoder_variant() {
    let config = Preset::Kaguya.config();
    assert_eq!(config.control, ControlGranularity::PerBitFlag);
    assert!(matches!(Decoder::new(config), Ok(Decoder::Bit(_))));
}

// ============================================================================
// Limits and batches
// ============================================================================

#[test]
fn test_cancel_flag_stops_decoding() {
    let flag = Arc::new(AtomicBool::new(true));
    let limits = DecodeLimits::new().with_cancel_flag(Arc::clone(&flag));
    let input = literal_stream(&[7; 64]);

    let err = decompress_with_limits(&input, 64, &Preset::Lzss.config(), &limits).unwrap_err();
    assert!(matches!(err, OxiLzError::Cancelled));

    flag.store(false, std::sync::atomic::Ordering::Relaxed);
    let decoded = decompress_with_limits(&input, 64, &Preset::Lzss.config(), &limits).unwrap();
    assert_eq!(decoded.data, vec![7; 64]);
}

#[test]
fn test_expired_deadline() {
    let limits = DecodeLimits::new().with_deadline(Instant::now());
    let input = literal_stream(b"deadline");

    let err = decompress_with_limits(&input, 8, &Preset::Lzss.config(), &limits).unwrap_err();
    assert!(matches!(err, OxiLzError::DeadlineExceeded));
}

#[test]
fn test_declared_size_over_limit() {
    let limits = DecodeLimits::new().with_max_output(4096);
    let err = decompress_with_limits(&[0xFF], 4097, &Preset::Lzss.config(), &limits).unwrap_err();
    assert!(matches!(
        err,
        OxiLzError::OutputTooLarge {
            requested: 4097,
            limit: 4096
        }
    ));
}

#[test]
fn test_batch_mixed_formats() {
    let lzss = Decoder::new(Preset::Lzss.config()).unwrap();
    let pandora = Decoder::new(Preset::Pandora.config()).unwrap();

    let text = literal_stream(b"batch entry one");
    let (literals, expected) = pandora_literals();
    let corrupt = [b'a', 0xC0, 0x00];

    let jobs = vec![
        DecodeJob::new(&text, 15, &lzss),
        DecodeJob::new(&corrupt, 8, &pandora),
        DecodeJob::new(&literals, expected.len(), &pandora),
    ];
    let results = decompress_batch(&jobs, &DecodeLimits::default());

    assert_eq!(results[0].as_ref().unwrap().data, b"batch entry one");
    assert!(results[1].as_ref().is_err_and(OxiLzError::is_corrupt));
    assert_eq!(results[2].as_ref().unwrap().data, expected);
}

#[test]
fn test_decoders_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Decoder>();

    let decoder = Arc::new(Decoder::new(Preset::Lzss.config()).unwrap());
    let handles: Vec<_> = (0..4u8)
        .map(|n| {
            let decoder = Arc::clone(&decoder);
            std::thread::spawn(move || {
                let input = literal_stream(&[n; 16]);
                decoder.decompress(&input, 16).unwrap().data
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), vec![n as u8; 16]);
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_arbitrary_input_never_panics(
        input in proptest::collection::vec(any::<u8>(), 0..256),
        size in 0usize..1024,
        preset in proptest::sample::select(Preset::ALL.to_vec()),
    ) {
        match decompress(&input, size, &preset.config()) {
            Ok(decoded) => {
                prop_assert!(decoded.data.len() <= size);
                prop_assert_eq!(decoded.is_truncated(), decoded.data.len() < size);
            }
            Err(err) => prop_assert!(err.is_corrupt(), "{preset}: {err}"),
        }
    }

    #[test]
    fn prop_any_field_widths_fail_fast_or_decode(
        input in proptest::collection::vec(any::<u8>(), 0..64),
        offset_bits in 0u8..40,
        length_bits in 0u8..40,
        gamma in any::<bool>(),
    ) {
        let length_code = if gamma { LengthCode::EliasGamma } else { LengthCode::Fixed };
        let config = CompressionConfig::new(0x100, offset_bits, length_bits, 1)
            .with_initial_fill(None)
            .with_initial_fill_position(0)
            .with_control(ControlGranularity::PerBitFlag)
            .with_match_layout(MatchLayout::OffsetFirst)
            .with_length_code(length_code)
            .with_offset_mode(OffsetMode::Relative { bias: 1 });

        match decompress(&input, 64, &config) {
            Ok(decoded) => prop_assert!(decoded.data.len() <= 64),
            Err(OxiLzError::Configuration { .. }) => {
                prop_assert!(config.validate().is_err());
            }
            Err(err) => prop_assert!(err.is_corrupt(), "{err}"),
        }
    }

    #[test]
    fn prop_literal_streams_round_trip(data in proptest::collection::vec(any::<u8>(), 1..512)) {
        let config = Preset::Lzss.config();
        let decoded = decompress(&literal_stream(&data), data.len(), &config).unwrap();
        prop_assert_eq!(decoded.data, data);
    }
}
