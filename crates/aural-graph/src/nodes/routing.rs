//! Routing and sink nodes: destination, analyser, splitter, merger and worklet.

use crate::classify::{GraphUpdateKind, UpdateCheck};
use crate::codec::{WireDecoder, WireEncoder, WireError};
use crate::mixing::{ChannelCountMode, ChannelInterpretation, ChannelMixing};
use crate::node::NodeKind;

use super::NodeDescription;

/// Final output of the graph.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Destination {
    /// Device channel count.
    pub channel_count: usize,
}

impl Default for Destination {
    fn default() -> Self {
        Self { channel_count: 2 }
    }
}

impl NodeDescription for Destination {
    const KIND: NodeKind = NodeKind::Destination;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_len(self.channel_count)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            channel_count: dec.index()?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .topology_if(self.channel_count != new.channel_count)
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        ChannelMixing::new(
            self.channel_count,
            ChannelCountMode::Explicit,
            ChannelInterpretation::Speakers,
        )
    }
}

/// Pass-through node exposing time- and frequency-domain data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Analyser {
    /// FFT size; sizes the analysis buffers.
    pub fft_size: u32,
    /// Lower bound of the byte-scaled magnitude range.
    pub min_decibels: f32,
    /// Upper bound of the byte-scaled magnitude range.
    pub max_decibels: f32,
    /// Averaging constant between frames.
    pub smoothing_time_constant: f32,
    /// Input mixing.
    pub mixing: ChannelMixing,
}

impl Default for Analyser {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            min_decibels: -100.0,
            max_decibels: -30.0,
            smoothing_time_constant: 0.8,
            mixing: ChannelMixing::default(),
        }
    }
}

impl NodeDescription for Analyser {
    const KIND: NodeKind = NodeKind::Analyser;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_u32(self.fft_size);
        enc.put_f32(self.min_decibels);
        enc.put_f32(self.max_decibels);
        enc.put_f32(self.smoothing_time_constant);
        self.mixing.encode(enc)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            fft_size: dec.u32()?,
            min_decibels: dec.f32()?,
            max_decibels: dec.f32()?,
            smoothing_time_constant: dec.f32()?,
            mixing: ChannelMixing::decode(dec)?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .rebuild_if(self.fft_size != new.fft_size)
            .topology_if(self.mixing != new.mixing)
            .parameter_if(
                self.min_decibels != new.min_decibels
                    || self.max_decibels != new.max_decibels
                    || self.smoothing_time_constant != new.smoothing_time_constant,
            )
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        self.mixing
    }
}

/// Splits the channels of its input into one mono output each.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChannelSplitter {
    /// Number of outputs (and channels consumed).
    pub number_of_outputs: usize,
}

impl Default for ChannelSplitter {
    fn default() -> Self {
        Self {
            number_of_outputs: 6,
        }
    }
}

impl NodeDescription for ChannelSplitter {
    const KIND: NodeKind = NodeKind::ChannelSplitter;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_len(self.number_of_outputs)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            number_of_outputs: dec.index()?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .rebuild_if(self.number_of_outputs != new.number_of_outputs)
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        ChannelMixing::new(
            self.number_of_outputs,
            ChannelCountMode::Explicit,
            ChannelInterpretation::Discrete,
        )
    }

    fn output_count(&self) -> usize {
        self.number_of_outputs
    }
}

/// Merges mono inputs into the channels of one output.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChannelMerger {
    /// Number of inputs (and output channels).
    pub number_of_inputs: usize,
}

impl Default for ChannelMerger {
    fn default() -> Self {
        Self {
            number_of_inputs: 6,
        }
    }
}

impl NodeDescription for ChannelMerger {
    const KIND: NodeKind = NodeKind::ChannelMerger;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_len(self.number_of_inputs)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            number_of_inputs: dec.index()?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .rebuild_if(self.number_of_inputs != new.number_of_inputs)
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        ChannelMixing::new(1, ChannelCountMode::Explicit, ChannelInterpretation::Speakers)
    }

    fn input_count(&self) -> usize {
        self.number_of_inputs
    }
}

/// Script-defined processor.
///
/// Parameters: one per entry of `parameter_names`, in order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AudioWorklet {
    /// Registered processor name.
    pub processor_name: String,
    /// Declared input count; exposed even when unconnected.
    pub number_of_inputs: usize,
    /// Declared output count.
    pub number_of_outputs: usize,
    /// Channel count per output.
    pub output_channel_count: Vec<u32>,
    /// Names of the processor's parameters.
    pub parameter_names: Vec<String>,
    /// Input mixing.
    pub mixing: ChannelMixing,
}

impl Default for AudioWorklet {
    fn default() -> Self {
        Self {
            processor_name: String::new(),
            number_of_inputs: 1,
            number_of_outputs: 1,
            output_channel_count: Vec::new(),
            parameter_names: Vec::new(),
            mixing: ChannelMixing::default(),
        }
    }
}

impl NodeDescription for AudioWorklet {
    const KIND: NodeKind = NodeKind::AudioWorklet;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_str(&self.processor_name)?;
        enc.put_len(self.number_of_inputs)?;
        enc.put_len(self.number_of_outputs)?;
        enc.put_u32_array(&self.output_channel_count)?;
        enc.put_str_array(&self.parameter_names)?;
        self.mixing.encode(enc)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            processor_name: dec.string()?,
            number_of_inputs: dec.index()?,
            number_of_outputs: dec.index()?,
            output_channel_count: dec.u32_array()?,
            parameter_names: dec.string_array()?,
            mixing: ChannelMixing::decode(dec)?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .rebuild_if(self.processor_name != new.processor_name)
            .rebuild_if(
                self.number_of_inputs != new.number_of_inputs
                    || self.number_of_outputs != new.number_of_outputs
                    || self.output_channel_count != new.output_channel_count,
            )
            .rebuild_if(self.parameter_names != new.parameter_names)
            .topology_if(self.mixing != new.mixing)
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        self.mixing
    }

    fn param_values(&self) -> Vec<f32> {
        vec![0.0; self.parameter_names.len()]
    }

    fn input_count(&self) -> usize {
        self.number_of_inputs
    }

    fn output_count(&self) -> usize {
        self.number_of_outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_mixing_rules() {
        let splitter = ChannelSplitter {
            number_of_outputs: 4,
        };
        assert_eq!(
            splitter.channel_mixing(),
            ChannelMixing::new(4, ChannelCountMode::Explicit, ChannelInterpretation::Discrete)
        );
        assert_eq!(
            ChannelMerger::default().channel_mixing(),
            ChannelMixing::new(1, ChannelCountMode::Explicit, ChannelInterpretation::Speakers)
        );
        assert_eq!(
            Destination { channel_count: 6 }.channel_mixing(),
            ChannelMixing::new(6, ChannelCountMode::Explicit, ChannelInterpretation::Speakers)
        );
    }

    #[test]
    fn test_destination_channels_is_topology() {
        let old = Destination::default();
        let new = Destination { channel_count: 1 };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::Topology);
    }

    #[test]
    fn test_port_counts_are_rebuild() {
        assert_eq!(
            ChannelSplitter::default().classify_update(&ChannelSplitter {
                number_of_outputs: 2
            }),
            GraphUpdateKind::RebuildRequired
        );
        assert_eq!(
            ChannelMerger::default().classify_update(&ChannelMerger {
                number_of_inputs: 2
            }),
            GraphUpdateKind::RebuildRequired
        );
    }

    #[test]
    fn test_worklet_parameter_names_are_rebuild() {
        let old = AudioWorklet {
            parameter_names: vec!["a".to_string()],
            ..AudioWorklet::default()
        };
        let new = AudioWorklet {
            parameter_names: vec!["a".to_string(), "b".to_string()],
            ..AudioWorklet::default()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::RebuildRequired);
        assert_eq!(new.param_count(), 2);
    }

    #[test]
    fn test_analyser_smoothing_is_parameter() {
        let old = Analyser::default();
        let new = Analyser {
            smoothing_time_constant: 0.1,
            ..Analyser::default()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::Parameter);
        let new = Analyser {
            fft_size: 1024,
            ..Analyser::default()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::RebuildRequired);
    }
}
