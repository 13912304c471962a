//! Node identity for the rendering graph.
//!
//! A [`NodeId`] names a logical node across every description and every
//! compiled topology derived from it. A [`NodeKind`] is the field-less tag of a
//! [`GraphNodeDescription`](crate::GraphNodeDescription) variant; it doubles as
//! the leading tag byte of an encoded node payload.

use core::fmt;

/// Stable identifier of a node in a [`GraphDescription`](crate::GraphDescription).
///
/// IDs are chosen by the description's author. They are totally ordered and
/// stay the same across recompilations of the same logical node, which is what
/// lets the update classifier match old and new nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(pub u64);

impl NodeId {
    /// Creates an ID from its raw value.
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw numeric identifier.
    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind tag of a node description.
///
/// The discriminant is the wire tag byte written before every node payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    /// Final output of the graph.
    Destination = 0,
    /// Periodic waveform source.
    Oscillator = 1,
    /// Constant-value source.
    ConstantSource = 2,
    /// Gain stage.
    Gain = 3,
    /// Delay line; the only node allowed to break a cycle.
    Delay = 4,
    /// Second-order IIR filter.
    BiquadFilter = 5,
    /// Convolution reverb.
    Convolver = 6,
    /// Equal-power stereo panner.
    StereoPanner = 7,
    /// 3D spatialization panner.
    Panner = 8,
    /// Pass-through analyser exposing time/frequency data.
    Analyser = 9,
    /// Script-defined processor.
    AudioWorklet = 10,
    /// Splits channels into separate outputs.
    ChannelSplitter = 11,
    /// Merges inputs into channels of one output.
    ChannelMerger = 12,
    /// The context's single listener for spatialization.
    AudioListener = 13,
    /// Dynamics compressor.
    DynamicsCompressor = 14,
    /// Sample buffer playback.
    AudioBufferSource = 15,
    /// Curve-based waveshaper.
    WaveShaper = 16,
    /// General IIR filter.
    IirFilter = 17,
}

impl NodeKind {
    /// Every kind, in tag order.
    pub const ALL: [NodeKind; 18] = [
        NodeKind::Destination,
        NodeKind::Oscillator,
        NodeKind::ConstantSource,
        NodeKind::Gain,
        NodeKind::Delay,
        NodeKind::BiquadFilter,
        NodeKind::Convolver,
        NodeKind::StereoPanner,
        NodeKind::Panner,
        NodeKind::Analyser,
        NodeKind::AudioWorklet,
        NodeKind::ChannelSplitter,
        NodeKind::ChannelMerger,
        NodeKind::AudioListener,
        NodeKind::DynamicsCompressor,
        NodeKind::AudioBufferSource,
        NodeKind::WaveShaper,
        NodeKind::IirFilter,
    ];

    /// Returns the wire tag byte.
    #[inline]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Looks up a kind from its wire tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(usize::from(tag)).copied()
    }

    /// Returns a short human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            NodeKind::Destination => "destination",
            NodeKind::Oscillator => "oscillator",
            NodeKind::ConstantSource => "constant_source",
            NodeKind::Gain => "gain",
            NodeKind::Delay => "delay",
            NodeKind::BiquadFilter => "biquad_filter",
            NodeKind::Convolver => "convolver",
            NodeKind::StereoPanner => "stereo_panner",
            NodeKind::Panner => "panner",
            NodeKind::Analyser => "analyser",
            NodeKind::AudioWorklet => "audio_worklet",
            NodeKind::ChannelSplitter => "channel_splitter",
            NodeKind::ChannelMerger => "channel_merger",
            NodeKind::AudioListener => "audio_listener",
            NodeKind::DynamicsCompressor => "dynamics_compressor",
            NodeKind::AudioBufferSource => "audio_buffer_source",
            NodeKind::WaveShaper => "wave_shaper",
            NodeKind::IirFilter => "iir_filter",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
