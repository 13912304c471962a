//! Channel-mixing rules applied where connections meet a node input.
//!
//! Every compiled node carries a resolved [`ChannelMixing`]. Variants that
//! accept audio input expose the three mixing fields directly; the rest get a
//! fixed rule from their variant (see
//! [`GraphNodeDescription::channel_mixing`](crate::GraphNodeDescription::channel_mixing)).

use crate::codec::{WireDecoder, WireEncoder, WireError};

/// How the computed channel count of an input is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChannelCountMode {
    /// Maximum channel count over all connections.
    #[default]
    Max = 0,
    /// Like `Max`, clamped to the node's channel count.
    ClampedMax = 1,
    /// Exactly the node's channel count.
    Explicit = 2,
}

impl ChannelCountMode {
    fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Max),
            1 => Some(Self::ClampedMax),
            2 => Some(Self::Explicit),
            _ => None,
        }
    }
}

/// How channels are up- or down-mixed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ChannelInterpretation {
    /// Speaker-layout aware mixing.
    #[default]
    Speakers = 0,
    /// Channel-by-channel copy, padding or dropping.
    Discrete = 1,
}

impl ChannelInterpretation {
    fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Speakers),
            1 => Some(Self::Discrete),
            _ => None,
        }
    }
}

/// Channel count, count mode and interpretation of one node input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChannelMixing {
    /// Requested channel count.
    pub channel_count: usize,
    /// Count mode.
    pub channel_count_mode: ChannelCountMode,
    /// Interpretation.
    pub channel_interpretation: ChannelInterpretation,
}

impl Default for ChannelMixing {
    /// Stereo, `Max`, `Speakers`: the default of most Web Audio nodes.
    fn default() -> Self {
        Self::new(2, ChannelCountMode::Max, ChannelInterpretation::Speakers)
    }
}

impl ChannelMixing {
    /// Creates a mixing rule.
    pub const fn new(
        channel_count: usize,
        channel_count_mode: ChannelCountMode,
        channel_interpretation: ChannelInterpretation,
    ) -> Self {
        Self {
            channel_count,
            channel_count_mode,
            channel_interpretation,
        }
    }

    /// Rule for nodes that do their own channel handling: mono, `Max`, `Speakers`.
    pub const fn graph_edge_default() -> Self {
        Self::new(1, ChannelCountMode::Max, ChannelInterpretation::Speakers)
    }

    /// Returns a copy with the channel count clamped to `[1, max_channels]`.
    pub fn clamped(self, max_channels: usize) -> Self {
        Self {
            channel_count: self.channel_count.clamp(1, max_channels.max(1)),
            ..self
        }
    }

    pub(crate) fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_len(self.channel_count)?;
        enc.put_u8(self.channel_count_mode as u8);
        enc.put_u8(self.channel_interpretation as u8);
        Ok(())
    }

    pub(crate) fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            channel_count: dec.index()?,
            channel_count_mode: dec.enum_u8("channel_count_mode", ChannelCountMode::from_wire)?,
            channel_interpretation: dec
                .enum_u8("channel_interpretation", ChannelInterpretation::from_wire)?,
        })
    }
}
