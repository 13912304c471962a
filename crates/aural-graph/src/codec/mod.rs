//! Binary wire codec for node payloads and whole graphs.
//!
//! Node payloads are `[tag:u8][fields...]`, where the tag is the
//! [`NodeKind`](crate::NodeKind) discriminant and the fields are written by the
//! variant itself. Whole graphs are framed by [`encode_graph`]/[`decode_graph`].
//!
//! Decoding never panics on malformed input: every failure is a [`WireError`]
//! and no partially decoded value is returned.

mod graph;
mod wire;

pub use graph::{
    GRAPH_HEADER_LEN, GraphSection, decode_graph, decode_graph_with_rate, encode_graph,
};
pub use wire::{WireDecoder, WireEncoder};

use thiserror::Error;

use crate::limits::CompileLimits;
use crate::nodes::GraphNodeDescription;

/// Errors produced by the wire codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A read ran past the end of the payload.
    #[error("payload truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the payload.
        remaining: usize,
    },

    /// A decoded array count exceeds the configured limit.
    #[error("array length {len} exceeds limit {max}")]
    ArrayTooLong {
        /// Declared element count.
        len: u32,
        /// Configured maximum.
        max: u32,
    },

    /// The leading tag byte names no known node kind.
    #[error("unknown node tag {0}")]
    UnknownNodeTag(u8),

    /// An enum or boolean field holds an undefined discriminant.
    #[error("invalid value {value} for field '{field}'")]
    InvalidEnum {
        /// Name of the field being decoded.
        field: &'static str,
        /// The offending byte.
        value: u8,
    },

    /// A string field is not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    /// Bytes remain after a complete value was decoded.
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),

    /// A length or index does not fit the 32-bit wire field.
    #[error("length {0} does not fit in 32 bits")]
    LengthOverflow(usize),
}

/// Encodes one node description into a standalone payload.
pub fn encode_node(node: &GraphNodeDescription) -> Result<Vec<u8>, WireError> {
    let mut enc = WireEncoder::new();
    node.encode(&mut enc)?;
    Ok(enc.into_bytes())
}

/// Decodes a standalone node payload; the payload must be consumed exactly.
pub fn decode_node(bytes: &[u8], limits: &CompileLimits) -> Result<GraphNodeDescription, WireError> {
    let mut dec = WireDecoder::new(bytes, limits);
    let node = GraphNodeDescription::decode(&mut dec)?;
    dec.finish()?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{
        Analyser, AudioBufferSource, AudioListener, AudioWorklet, BiquadFilter, BiquadFilterType,
        ChannelMerger, ChannelSplitter, ConstantSource, Convolver, Delay, Destination,
        DistanceModel, DynamicsCompressor, Gain, IirFilter, Oscillator, OscillatorType,
        OverSampleType, Panner, PanningModel, PeriodicWave, StereoPanner, WaveShaper,
    };
    use crate::mixing::{ChannelCountMode, ChannelInterpretation, ChannelMixing};

    fn roundtrip(node: GraphNodeDescription) {
        let bytes = encode_node(&node).unwrap();
        assert_eq!(bytes[0], node.kind().tag());
        let decoded = decode_node(&bytes, &CompileLimits::default()).unwrap();
        assert_eq!(decoded, node);
    }

    fn mixing() -> ChannelMixing {
        ChannelMixing::new(4, ChannelCountMode::ClampedMax, ChannelInterpretation::Discrete)
    }

    #[test]
    fn test_roundtrip_every_variant() {
        roundtrip(GraphNodeDescription::Destination(Destination { channel_count: 6 }));
        roundtrip(GraphNodeDescription::ConstantSource(ConstantSource {
            offset: 0.25,
            start_frame: Some(128),
            stop_frame: None,
        }));
        roundtrip(GraphNodeDescription::Gain(Gain {
            gain: 0.5,
            mixing: mixing(),
        }));
        roundtrip(GraphNodeDescription::Delay(Delay {
            delay_time: 0.1,
            max_delay_time: 2.0,
            mixing: mixing(),
        }));
        roundtrip(GraphNodeDescription::BiquadFilter(BiquadFilter {
            filter_type: BiquadFilterType::Peaking,
            frequency: 1000.0,
            detune: -10.0,
            q: 0.7,
            gain: 3.0,
        }));
        roundtrip(GraphNodeDescription::Convolver(Convolver {
            buffer_id: Some(9),
            normalize: false,
            mixing: mixing(),
        }));
        roundtrip(GraphNodeDescription::StereoPanner(StereoPanner {
            pan: -0.5,
            mixing: mixing(),
        }));
        roundtrip(GraphNodeDescription::Panner(Panner {
            panning_model: PanningModel::Hrtf,
            distance_model: DistanceModel::Exponential,
            position: [1.0, 2.0, 3.0],
            orientation: [0.0, 0.0, -1.0],
            ref_distance: 2.0,
            max_distance: 100.0,
            rolloff_factor: 0.5,
            cone_inner_angle: 90.0,
            cone_outer_angle: 180.0,
            cone_outer_gain: 0.1,
        }));
        roundtrip(GraphNodeDescription::Analyser(Analyser {
            fft_size: 4096,
            min_decibels: -90.0,
            max_decibels: -20.0,
            smoothing_time_constant: 0.5,
            mixing: mixing(),
        }));
        roundtrip(GraphNodeDescription::AudioWorklet(AudioWorklet {
            processor_name: "bitcrusher".to_string(),
            number_of_inputs: 2,
            number_of_outputs: 1,
            output_channel_count: vec![2],
            parameter_names: vec!["bits".to_string(), "rate".to_string()],
            mixing: mixing(),
        }));
        roundtrip(GraphNodeDescription::ChannelSplitter(ChannelSplitter {
            number_of_outputs: 4,
        }));
        roundtrip(GraphNodeDescription::ChannelMerger(ChannelMerger {
            number_of_inputs: 3,
        }));
        roundtrip(GraphNodeDescription::AudioListener(AudioListener {
            position: [0.0, 1.0, 0.0],
            forward: [0.0, 0.0, -1.0],
            up: [0.0, 1.0, 0.0],
        }));
        roundtrip(GraphNodeDescription::DynamicsCompressor(DynamicsCompressor {
            threshold: -30.0,
            knee: 10.0,
            ratio: 4.0,
            attack: 0.01,
            release: 0.1,
            mixing: mixing(),
        }));
        roundtrip(GraphNodeDescription::AudioBufferSource(AudioBufferSource {
            buffer_id: Some(7),
            playback_rate: 0.5,
            detune: 100.0,
            loop_enabled: true,
            loop_start: 64,
            loop_end: 4096,
            offset_frame: 32,
            start_frame: Some(256),
            stop_frame: None,
        }));
        roundtrip(GraphNodeDescription::WaveShaper(WaveShaper {
            curve: vec![-1.0, -0.5, 0.0, 0.5, 1.0],
            oversample: OverSampleType::X2,
            mixing: mixing(),
        }));
        roundtrip(GraphNodeDescription::IirFilter(IirFilter {
            feedforward: vec![0.2, 0.4, 0.2],
            feedback: vec![1.0, -0.5, 0.1],
            mixing: mixing(),
        }));
    }

    #[test]
    fn test_roundtrip_oscillator_periodic_wave_variants() {
        let base = Oscillator {
            waveform: OscillatorType::Custom,
            frequency: 220.0,
            detune: 5.0,
            start_frame: Some(0),
            stop_frame: Some(48000),
            periodic_wave: None,
        };
        roundtrip(GraphNodeDescription::Oscillator(base.clone()));
        roundtrip(GraphNodeDescription::Oscillator(Oscillator {
            periodic_wave: Some(PeriodicWave::default()),
            ..base.clone()
        }));
        roundtrip(GraphNodeDescription::Oscillator(Oscillator {
            periodic_wave: Some(PeriodicWave {
                real: vec![0.0, 1.0, 0.5],
                imag: vec![0.0, 0.0, 0.25],
                disable_normalization: true,
            }),
            ..base
        }));
    }

    #[test]
    fn test_unknown_tag() {
        let err = decode_node(&[200], &CompileLimits::default()).unwrap_err();
        assert_eq!(err, WireError::UnknownNodeTag(200));
    }

    #[test]
    fn test_empty_payload_is_truncated() {
        let err = decode_node(&[], &CompileLimits::default()).unwrap_err();
        assert_eq!(
            err,
            WireError::Truncated {
                needed: 1,
                remaining: 0
            }
        );
    }

    #[test]
    fn test_every_truncation_of_a_payload_fails() {
        let node = GraphNodeDescription::Oscillator(Oscillator {
            periodic_wave: Some(PeriodicWave {
                real: vec![0.0, 1.0],
                imag: vec![0.0, 1.0],
                disable_normalization: false,
            }),
            ..Oscillator::default()
        });
        let bytes = encode_node(&node).unwrap();
        for cut in 0..bytes.len() {
            let err = decode_node(&bytes[..cut], &CompileLimits::default()).unwrap_err();
            assert!(matches!(err, WireError::Truncated { .. }), "cut {cut}: {err}");
        }
    }

    #[test]
    fn test_oversized_periodic_wave_rejected() {
        let node = GraphNodeDescription::Oscillator(Oscillator {
            periodic_wave: Some(PeriodicWave {
                real: vec![0.0; 16],
                imag: vec![0.0; 16],
                disable_normalization: false,
            }),
            ..Oscillator::default()
        });
        let bytes = encode_node(&node).unwrap();
        let limits = CompileLimits {
            max_wire_array_len: 8,
            ..CompileLimits::default()
        };
        assert_eq!(
            decode_node(&bytes, &limits).unwrap_err(),
            WireError::ArrayTooLong { len: 16, max: 8 }
        );
    }

    #[test]
    fn test_invalid_waveform_byte() {
        let mut bytes = encode_node(&GraphNodeDescription::Oscillator(Oscillator::default())).unwrap();
        bytes[1] = 99;
        assert_eq!(
            decode_node(&bytes, &CompileLimits::default()).unwrap_err(),
            WireError::InvalidEnum {
                field: "waveform",
                value: 99
            }
        );
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode_node(&GraphNodeDescription::Gain(Gain::default())).unwrap();
        bytes.push(0);
        assert_eq!(
            decode_node(&bytes, &CompileLimits::default()).unwrap_err(),
            WireError::TrailingBytes(1)
        );
    }
}
