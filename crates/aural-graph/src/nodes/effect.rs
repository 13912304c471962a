//! Processing nodes: gains, delays, filters, dynamics, shaping, convolution
//! and stereo panning.

use crate::classify::{GraphUpdateKind, UpdateCheck};
use crate::codec::{WireDecoder, WireEncoder, WireError};
use crate::mixing::{ChannelCountMode, ChannelInterpretation, ChannelMixing};
use crate::node::NodeKind;

use super::NodeDescription;

/// Gain stage.
///
/// Parameters: `[gain]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Gain {
    /// Linear gain.
    pub gain: f32,
    /// Input mixing.
    pub mixing: ChannelMixing,
}

impl Default for Gain {
    fn default() -> Self {
        Self {
            gain: 1.0,
            mixing: ChannelMixing::default(),
        }
    }
}

impl NodeDescription for Gain {
    const KIND: NodeKind = NodeKind::Gain;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_f32(self.gain);
        self.mixing.encode(enc)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            gain: dec.f32()?,
            mixing: ChannelMixing::decode(dec)?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .topology_if(self.mixing != new.mixing)
            .parameter_if(self.gain != new.gain)
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        self.mixing
    }

    fn param_values(&self) -> Vec<f32> {
        vec![self.gain]
    }
}

/// Delay line. A delay inside a cycle is split into a writer and a reader.
///
/// Parameters: `[delay_time]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Delay {
    /// Delay in seconds.
    pub delay_time: f32,
    /// Ring buffer length in seconds.
    pub max_delay_time: f32,
    /// Input mixing.
    pub mixing: ChannelMixing,
}

impl Default for Delay {
    fn default() -> Self {
        Self {
            delay_time: 0.0,
            max_delay_time: 1.0,
            mixing: ChannelMixing::default(),
        }
    }
}

impl NodeDescription for Delay {
    const KIND: NodeKind = NodeKind::Delay;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_f32(self.delay_time);
        enc.put_f32(self.max_delay_time);
        self.mixing.encode(enc)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            delay_time: dec.f32()?,
            max_delay_time: dec.f32()?,
            mixing: ChannelMixing::decode(dec)?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .rebuild_if(self.max_delay_time != new.max_delay_time)
            .topology_if(self.mixing != new.mixing)
            .parameter_if(self.delay_time != new.delay_time)
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        self.mixing
    }

    fn param_values(&self) -> Vec<f32> {
        vec![self.delay_time]
    }
}

/// Biquad filter response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BiquadFilterType {
    /// Second-order lowpass.
    #[default]
    Lowpass = 0,
    /// Second-order highpass.
    Highpass = 1,
    /// Constant-skirt bandpass.
    Bandpass = 2,
    /// Low shelf.
    Lowshelf = 3,
    /// High shelf.
    Highshelf = 4,
    /// Peaking EQ.
    Peaking = 5,
    /// Notch.
    Notch = 6,
    /// Allpass.
    Allpass = 7,
}

impl BiquadFilterType {
    fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Lowpass),
            1 => Some(Self::Highpass),
            2 => Some(Self::Bandpass),
            3 => Some(Self::Lowshelf),
            4 => Some(Self::Highshelf),
            5 => Some(Self::Peaking),
            6 => Some(Self::Notch),
            7 => Some(Self::Allpass),
            _ => None,
        }
    }
}

/// Second-order IIR filter.
///
/// Parameters: `[frequency, detune, q, gain]`. The filter type only changes
/// coefficients, so it is a parameter edit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BiquadFilter {
    /// Response type.
    pub filter_type: BiquadFilterType,
    /// Cutoff or center frequency in Hz.
    pub frequency: f32,
    /// Detune in cents.
    pub detune: f32,
    /// Quality factor.
    pub q: f32,
    /// Shelf/peak gain in dB.
    pub gain: f32,
}

impl Default for BiquadFilter {
    fn default() -> Self {
        Self {
            filter_type: BiquadFilterType::Lowpass,
            frequency: 350.0,
            detune: 0.0,
            q: 1.0,
            gain: 0.0,
        }
    }
}

impl NodeDescription for BiquadFilter {
    const KIND: NodeKind = NodeKind::BiquadFilter;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_u8(self.filter_type as u8);
        enc.put_f32(self.frequency);
        enc.put_f32(self.detune);
        enc.put_f32(self.q);
        enc.put_f32(self.gain);
        Ok(())
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            filter_type: dec.enum_u8("filter_type", BiquadFilterType::from_wire)?,
            frequency: dec.f32()?,
            detune: dec.f32()?,
            q: dec.f32()?,
            gain: dec.f32()?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .parameter_if(self.filter_type != new.filter_type)
            .parameter_if(self.frequency != new.frequency || self.detune != new.detune)
            .parameter_if(self.q != new.q || self.gain != new.gain)
            .finish()
    }

    fn param_values(&self) -> Vec<f32> {
        vec![self.frequency, self.detune, self.q, self.gain]
    }
}

/// Convolution with an impulse response buffer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Convolver {
    /// Impulse response resource, resolved by the embedder.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub buffer_id: Option<u64>,
    /// Scale the impulse response by its energy.
    pub normalize: bool,
    /// Input mixing.
    pub mixing: ChannelMixing,
}

impl Default for Convolver {
    fn default() -> Self {
        Self {
            buffer_id: None,
            normalize: true,
            mixing: ChannelMixing::default(),
        }
    }
}

impl NodeDescription for Convolver {
    const KIND: NodeKind = NodeKind::Convolver;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_optional_u64(self.buffer_id);
        enc.put_bool(self.normalize);
        self.mixing.encode(enc)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            buffer_id: dec.optional_u64("buffer_id")?,
            normalize: dec.bool("normalize")?,
            mixing: ChannelMixing::decode(dec)?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .rebuild_if(self.buffer_id != new.buffer_id || self.normalize != new.normalize)
            .topology_if(self.mixing != new.mixing)
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        self.mixing
    }
}

/// Equal-power stereo panner.
///
/// Parameters: `[pan]`.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StereoPanner {
    /// Pan position in `[-1, 1]`.
    pub pan: f32,
    /// Input mixing.
    pub mixing: ChannelMixing,
}

impl NodeDescription for StereoPanner {
    const KIND: NodeKind = NodeKind::StereoPanner;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_f32(self.pan);
        self.mixing.encode(enc)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            pan: dec.f32()?,
            mixing: ChannelMixing::decode(dec)?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .topology_if(self.mixing != new.mixing)
            .parameter_if(self.pan != new.pan)
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        self.mixing
    }

    fn param_values(&self) -> Vec<f32> {
        vec![self.pan]
    }
}

/// Dynamics compressor.
///
/// Parameters: `[threshold, knee, ratio, attack, release]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DynamicsCompressor {
    /// Level above which compression starts, in dB.
    pub threshold: f32,
    /// Width of the soft knee in dB.
    pub knee: f32,
    /// Input/output dB ratio above the knee.
    pub ratio: f32,
    /// Seconds to reduce gain by 10 dB.
    pub attack: f32,
    /// Seconds to recover gain by 10 dB.
    pub release: f32,
    /// Input mixing.
    pub mixing: ChannelMixing,
}

impl Default for DynamicsCompressor {
    fn default() -> Self {
        Self {
            threshold: -24.0,
            knee: 30.0,
            ratio: 12.0,
            attack: 0.003,
            release: 0.25,
            mixing: ChannelMixing::new(2, ChannelCountMode::ClampedMax, ChannelInterpretation::Speakers),
        }
    }
}

impl NodeDescription for DynamicsCompressor {
    const KIND: NodeKind = NodeKind::DynamicsCompressor;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_f32(self.threshold);
        enc.put_f32(self.knee);
        enc.put_f32(self.ratio);
        enc.put_f32(self.attack);
        enc.put_f32(self.release);
        self.mixing.encode(enc)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            threshold: dec.f32()?,
            knee: dec.f32()?,
            ratio: dec.f32()?,
            attack: dec.f32()?,
            release: dec.f32()?,
            mixing: ChannelMixing::decode(dec)?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .topology_if(self.mixing != new.mixing)
            .parameter_if(self.param_values() != new.param_values())
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        self.mixing
    }

    fn param_values(&self) -> Vec<f32> {
        vec![self.threshold, self.knee, self.ratio, self.attack, self.release]
    }
}

/// Wave shaper oversampling factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OverSampleType {
    /// No oversampling.
    #[default]
    None = 0,
    /// 2x oversampling.
    #[cfg_attr(feature = "serde", serde(rename = "2x"))]
    X2 = 1,
    /// 4x oversampling.
    #[cfg_attr(feature = "serde", serde(rename = "4x"))]
    X4 = 2,
}

impl OverSampleType {
    fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::X2),
            2 => Some(Self::X4),
            _ => None,
        }
    }
}

/// Table-driven waveshaping distortion.
///
/// An empty curve passes the input through. The curve is baked into the
/// render node, so editing it needs a rebuild.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WaveShaper {
    /// Transfer curve sampled over `[-1, 1]`.
    pub curve: Vec<f32>,
    /// Oversampling applied around the curve lookup.
    pub oversample: OverSampleType,
    /// Input mixing.
    pub mixing: ChannelMixing,
}

impl NodeDescription for WaveShaper {
    const KIND: NodeKind = NodeKind::WaveShaper;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_u8(self.oversample as u8);
        enc.put_f32_array(&self.curve)?;
        self.mixing.encode(enc)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            oversample: dec.enum_u8("oversample", OverSampleType::from_wire)?,
            curve: dec.f32_array()?,
            mixing: ChannelMixing::decode(dec)?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .rebuild_if(self.curve != new.curve)
            .topology_if(self.mixing != new.mixing)
            .parameter_if(self.oversample != new.oversample)
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        self.mixing
    }
}

/// General IIR filter defined by its transfer-function coefficients.
///
/// Both coefficient lists size the filter state, so any change is a rebuild.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IirFilter {
    /// Numerator coefficients `b[k]`.
    pub feedforward: Vec<f32>,
    /// Denominator coefficients `a[k]`.
    pub feedback: Vec<f32>,
    /// Input mixing.
    pub mixing: ChannelMixing,
}

impl NodeDescription for IirFilter {
    const KIND: NodeKind = NodeKind::IirFilter;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_f32_array(&self.feedforward)?;
        enc.put_f32_array(&self.feedback)?;
        self.mixing.encode(enc)
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            feedforward: dec.f32_array()?,
            feedback: dec.f32_array()?,
            mixing: ChannelMixing::decode(dec)?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .rebuild_if(self.feedforward != new.feedforward || self.feedback != new.feedback)
            .topology_if(self.mixing != new.mixing)
            .finish()
    }

    fn channel_mixing(&self) -> ChannelMixing {
        self.mixing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_mixing_change_is_topology() {
        let old = Gain::default();
        let new = Gain {
            gain: 0.5,
            mixing: ChannelMixing::new(1, ChannelCountMode::Explicit, ChannelInterpretation::Speakers),
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::Topology);
    }

    #[test]
    fn test_delay_max_time_is_rebuild() {
        let old = Delay::default();
        let new = Delay {
            max_delay_time: 4.0,
            ..Delay::default()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::RebuildRequired);
        let new = Delay {
            delay_time: 0.5,
            ..Delay::default()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::Parameter);
    }

    #[test]
    fn test_biquad_type_is_parameter() {
        let old = BiquadFilter::default();
        let new = BiquadFilter {
            filter_type: BiquadFilterType::Notch,
            ..BiquadFilter::default()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::Parameter);
        assert_eq!(old.param_count(), 4);
    }

    #[test]
    fn test_convolver_buffer_is_rebuild() {
        let old = Convolver::default();
        let new = Convolver {
            buffer_id: Some(3),
            ..Convolver::default()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::RebuildRequired);
        assert_eq!(old.param_count(), 0);
    }

    #[test]
    fn test_compressor_params_and_mixing() {
        let old = DynamicsCompressor::default();
        assert_eq!(old.param_values(), vec![-24.0, 30.0, 12.0, 0.003, 0.25]);
        assert_eq!(old.channel_mixing().channel_count, 2);

        let new = DynamicsCompressor {
            ratio: 4.0,
            ..DynamicsCompressor::default()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::Parameter);
        let new = DynamicsCompressor {
            mixing: ChannelMixing::new(1, ChannelCountMode::Explicit, ChannelInterpretation::Speakers),
            ..DynamicsCompressor::default()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::Topology);
    }

    #[test]
    fn test_wave_shaper_curve_is_rebuild() {
        let old = WaveShaper {
            curve: vec![-1.0, 0.0, 1.0],
            ..WaveShaper::default()
        };
        let mut new = old.clone();
        new.curve[2] = 0.5;
        assert_eq!(old.classify_update(&new), GraphUpdateKind::RebuildRequired);

        let new = WaveShaper {
            oversample: OverSampleType::X4,
            ..old.clone()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::Parameter);
        assert_eq!(old.param_count(), 0);
    }

    #[test]
    fn test_iir_coefficients_are_rebuild() {
        let old = IirFilter {
            feedforward: vec![0.5, 0.5],
            feedback: vec![1.0, -0.2],
            ..IirFilter::default()
        };
        let new = IirFilter {
            feedback: vec![1.0, -0.2, 0.01],
            ..old.clone()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::RebuildRequired);
        assert_eq!(old.classify_update(&old.clone()), GraphUpdateKind::None);
    }
}
