//! Node descriptions, one type per node kind.
//!
//! [`GraphNodeDescription`] is a closed enum over the variant types in this
//! module. Every variant implements [`NodeDescription`], which bundles the
//! per-kind behaviour the compiler needs:
//!
//! | concern | method |
//! |---|---|
//! | wire coding | [`encode`](NodeDescription::encode) / [`decode`](NodeDescription::decode) |
//! | update classification | [`classify_update`](NodeDescription::classify_update) |
//! | channel mixing | [`channel_mixing`](NodeDescription::channel_mixing) |
//! | parameter layout | [`param_values`](NodeDescription::param_values) |
//! | render-node shape | [`input_count`](NodeDescription::input_count) / [`output_count`](NodeDescription::output_count) |
//!
//! The enum dispatches with `match`, so adding a variant without one of these
//! is a compile error.

mod effect;
mod routing;
mod source;
mod spatial;

pub use effect::{
    BiquadFilter, BiquadFilterType, Convolver, Delay, DynamicsCompressor, Gain, IirFilter,
    OverSampleType, StereoPanner, WaveShaper,
};
pub use routing::{Analyser, AudioWorklet, ChannelMerger, ChannelSplitter, Destination};
pub use source::{AudioBufferSource, ConstantSource, Oscillator, OscillatorType, PeriodicWave};
pub use spatial::{AudioListener, DistanceModel, Panner, PanningModel};

use crate::classify::GraphUpdateKind;
use crate::codec::{WireDecoder, WireEncoder, WireError};
use crate::mixing::ChannelMixing;
use crate::node::NodeKind;

/// Behaviour every node variant provides.
pub trait NodeDescription: Clone + PartialEq + Sized {
    /// Kind tag of this variant.
    const KIND: NodeKind;

    /// Writes the variant's fields (without the tag byte).
    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError>;

    /// Reads the variant's fields (the tag byte is already consumed).
    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError>;

    /// Cheapest update class that moves this node to `new`.
    fn classify_update(&self, new: &Self) -> GraphUpdateKind;

    /// Mixing rule applied to this node's inputs, before clamping.
    fn channel_mixing(&self) -> ChannelMixing {
        ChannelMixing::graph_edge_default()
    }

    /// Intrinsic value of each parameter, in layout order.
    fn param_values(&self) -> Vec<f32> {
        Vec::new()
    }

    /// Number of parameters in the layout.
    fn param_count(&self) -> usize {
        self.param_values().len()
    }

    /// Number of audio inputs.
    fn input_count(&self) -> usize {
        1
    }

    /// Number of audio outputs.
    fn output_count(&self) -> usize {
        1
    }
}

/// Description of one node; one variant per [`NodeKind`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum GraphNodeDescription {
    /// See [`Destination`].
    Destination(Destination),
    /// See [`Oscillator`].
    Oscillator(Oscillator),
    /// See [`ConstantSource`].
    ConstantSource(ConstantSource),
    /// See [`Gain`].
    Gain(Gain),
    /// See [`Delay`].
    Delay(Delay),
    /// See [`BiquadFilter`].
    BiquadFilter(BiquadFilter),
    /// See [`Convolver`].
    Convolver(Convolver),
    /// See [`StereoPanner`].
    StereoPanner(StereoPanner),
    /// See [`Panner`].
    Panner(Panner),
    /// See [`Analyser`].
    Analyser(Analyser),
    /// See [`AudioWorklet`].
    AudioWorklet(AudioWorklet),
    /// See [`ChannelSplitter`].
    ChannelSplitter(ChannelSplitter),
    /// See [`ChannelMerger`].
    ChannelMerger(ChannelMerger),
    /// See [`AudioListener`].
    AudioListener(AudioListener),
    /// See [`DynamicsCompressor`].
    DynamicsCompressor(DynamicsCompressor),
    /// See [`AudioBufferSource`].
    AudioBufferSource(AudioBufferSource),
    /// See [`WaveShaper`].
    WaveShaper(WaveShaper),
    /// See [`IirFilter`].
    IirFilter(IirFilter),
}

/// Applies `$body` to the payload of whichever variant `$value` holds.
macro_rules! with_variant {
    ($value:expr, $node:ident => $body:expr) => {
        match $value {
            GraphNodeDescription::Destination($node) => $body,
            GraphNodeDescription::Oscillator($node) => $body,
            GraphNodeDescription::ConstantSource($node) => $body,
            GraphNodeDescription::Gain($node) => $body,
            GraphNodeDescription::Delay($node) => $body,
            GraphNodeDescription::BiquadFilter($node) => $body,
            GraphNodeDescription::Convolver($node) => $body,
            GraphNodeDescription::StereoPanner($node) => $body,
            GraphNodeDescription::Panner($node) => $body,
            GraphNodeDescription::Analyser($node) => $body,
            GraphNodeDescription::AudioWorklet($node) => $body,
            GraphNodeDescription::ChannelSplitter($node) => $body,
            GraphNodeDescription::ChannelMerger($node) => $body,
            GraphNodeDescription::AudioListener($node) => $body,
            GraphNodeDescription::DynamicsCompressor($node) => $body,
            GraphNodeDescription::AudioBufferSource($node) => $body,
            GraphNodeDescription::WaveShaper($node) => $body,
            GraphNodeDescription::IirFilter($node) => $body,
        }
    };
}

/// Applies `$body` to both payloads when `$old` and `$new` hold the same
/// variant, otherwise evaluates `$mismatch`.
macro_rules! with_variant_pair {
    ($old:expr, $new:expr, ($a:ident, $b:ident) => $body:expr, _ => $mismatch:expr) => {
        match ($old, $new) {
            (GraphNodeDescription::Destination($a), GraphNodeDescription::Destination($b)) => $body,
            (GraphNodeDescription::Oscillator($a), GraphNodeDescription::Oscillator($b)) => $body,
            (GraphNodeDescription::ConstantSource($a), GraphNodeDescription::ConstantSource($b)) => $body,
            (GraphNodeDescription::Gain($a), GraphNodeDescription::Gain($b)) => $body,
            (GraphNodeDescription::Delay($a), GraphNodeDescription::Delay($b)) => $body,
            (GraphNodeDescription::BiquadFilter($a), GraphNodeDescription::BiquadFilter($b)) => $body,
            (GraphNodeDescription::Convolver($a), GraphNodeDescription::Convolver($b)) => $body,
            (GraphNodeDescription::StereoPanner($a), GraphNodeDescription::StereoPanner($b)) => $body,
            (GraphNodeDescription::Panner($a), GraphNodeDescription::Panner($b)) => $body,
            (GraphNodeDescription::Analyser($a), GraphNodeDescription::Analyser($b)) => $body,
            (GraphNodeDescription::AudioWorklet($a), GraphNodeDescription::AudioWorklet($b)) => $body,
            (GraphNodeDescription::ChannelSplitter($a), GraphNodeDescription::ChannelSplitter($b)) => $body,
            (GraphNodeDescription::ChannelMerger($a), GraphNodeDescription::ChannelMerger($b)) => $body,
            (GraphNodeDescription::AudioListener($a), GraphNodeDescription::AudioListener($b)) => $body,
            (GraphNodeDescription::DynamicsCompressor($a), GraphNodeDescription::DynamicsCompressor($b)) => $body,
            (GraphNodeDescription::AudioBufferSource($a), GraphNodeDescription::AudioBufferSource($b)) => $body,
            (GraphNodeDescription::WaveShaper($a), GraphNodeDescription::WaveShaper($b)) => $body,
            (GraphNodeDescription::IirFilter($a), GraphNodeDescription::IirFilter($b)) => $body,
            _ => $mismatch,
        }
    };
}

fn kind_of<T: NodeDescription>(_: &T) -> NodeKind {
    T::KIND
}

impl GraphNodeDescription {
    /// Returns the kind tag.
    pub fn kind(&self) -> NodeKind {
        with_variant!(self, node => kind_of(node))
    }

    /// Writes the tag byte followed by the variant's fields.
    pub fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_u8(self.kind().tag());
        with_variant!(self, node => node.encode(enc))
    }

    /// Reads a tag byte and dispatches to the matching variant.
    pub fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        let tag = dec.u8()?;
        let kind = NodeKind::from_tag(tag).ok_or(WireError::UnknownNodeTag(tag))?;
        Ok(match kind {
            NodeKind::Destination => Self::Destination(Destination::decode(dec)?),
            NodeKind::Oscillator => Self::Oscillator(Oscillator::decode(dec)?),
            NodeKind::ConstantSource => Self::ConstantSource(ConstantSource::decode(dec)?),
            NodeKind::Gain => Self::Gain(Gain::decode(dec)?),
            NodeKind::Delay => Self::Delay(Delay::decode(dec)?),
            NodeKind::BiquadFilter => Self::BiquadFilter(BiquadFilter::decode(dec)?),
            NodeKind::Convolver => Self::Convolver(Convolver::decode(dec)?),
            NodeKind::StereoPanner => Self::StereoPanner(StereoPanner::decode(dec)?),
            NodeKind::Panner => Self::Panner(Panner::decode(dec)?),
            NodeKind::Analyser => Self::Analyser(Analyser::decode(dec)?),
            NodeKind::AudioWorklet => Self::AudioWorklet(AudioWorklet::decode(dec)?),
            NodeKind::ChannelSplitter => Self::ChannelSplitter(ChannelSplitter::decode(dec)?),
            NodeKind::ChannelMerger => Self::ChannelMerger(ChannelMerger::decode(dec)?),
            NodeKind::AudioListener => Self::AudioListener(AudioListener::decode(dec)?),
            NodeKind::DynamicsCompressor => Self::DynamicsCompressor(DynamicsCompressor::decode(dec)?),
            NodeKind::AudioBufferSource => Self::AudioBufferSource(AudioBufferSource::decode(dec)?),
            NodeKind::WaveShaper => Self::WaveShaper(WaveShaper::decode(dec)?),
            NodeKind::IirFilter => Self::IirFilter(IirFilter::decode(dec)?),
        })
    }

    /// Cheapest update class that moves this node to `new`.
    ///
    /// A change of variant always requires a rebuild.
    pub fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        with_variant_pair!(self, new, (old, new) => old.classify_update(new), _ => GraphUpdateKind::RebuildRequired)
    }

    /// Mixing rule applied to this node's inputs, before clamping.
    pub fn channel_mixing(&self) -> ChannelMixing {
        with_variant!(self, node => node.channel_mixing())
    }

    /// Intrinsic value of each parameter, in layout order.
    pub fn param_values(&self) -> Vec<f32> {
        with_variant!(self, node => node.param_values())
    }

    /// Number of parameters in the layout.
    pub fn param_count(&self) -> usize {
        with_variant!(self, node => node.param_count())
    }

    /// Number of audio inputs.
    pub fn input_count(&self) -> usize {
        with_variant!(self, node => node.input_count())
    }

    /// Number of audio outputs.
    pub fn output_count(&self) -> usize {
        with_variant!(self, node => node.output_count())
    }
}
