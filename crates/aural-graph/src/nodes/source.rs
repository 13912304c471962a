//! Source nodes: oscillator, constant source and buffer playback.

use crate::classify::{GraphUpdateKind, UpdateCheck};
use crate::codec::{WireDecoder, WireEncoder, WireError};
use crate::node::NodeKind;

use super::NodeDescription;

/// Oscillator waveform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OscillatorType {
    /// Sine wave.
    #[default]
    Sine = 0,
    /// Square wave.
    Square = 1,
    /// Sawtooth wave.
    Sawtooth = 2,
    /// Triangle wave.
    Triangle = 3,
    /// Waveform defined by a [`PeriodicWave`].
    Custom = 4,
}

impl OscillatorType {
    fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Sine),
            1 => Some(Self::Square),
            2 => Some(Self::Sawtooth),
            3 => Some(Self::Triangle),
            4 => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Fourier coefficients of a custom oscillator waveform.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PeriodicWave {
    /// Cosine terms.
    pub real: Vec<f32>,
    /// Sine terms.
    pub imag: Vec<f32>,
    /// Skip peak normalization of the generated table.
    pub disable_normalization: bool,
}

impl PeriodicWave {
    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_f32_array(&self.real)?;
        enc.put_f32_array(&self.imag)?;
        enc.put_bool(self.disable_normalization);
        Ok(())
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            real: dec.f32_array()?,
            imag: dec.f32_array()?,
            disable_normalization: dec.bool("disable_normalization")?,
        })
    }
}

/// Periodic waveform source.
///
/// Parameters: `[frequency, detune]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Oscillator {
    /// Waveform kind.
    pub waveform: OscillatorType,
    /// Frequency in Hz.
    pub frequency: f32,
    /// Detune in cents.
    pub detune: f32,
    /// Frame at which playback starts.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub start_frame: Option<u64>,
    /// Frame at which playback stops.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub stop_frame: Option<u64>,
    /// Custom waveform coefficients.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub periodic_wave: Option<PeriodicWave>,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self {
            waveform: OscillatorType::Sine,
            frequency: 440.0,
            detune: 0.0,
            start_frame: None,
            stop_frame: None,
            periodic_wave: None,
        }
    }
}

impl NodeDescription for Oscillator {
    const KIND: NodeKind = NodeKind::Oscillator;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_u8(self.waveform as u8);
        enc.put_f32(self.frequency);
        enc.put_f32(self.detune);
        enc.put_optional_u64(self.start_frame);
        enc.put_optional_u64(self.stop_frame);
        enc.put_bool(self.periodic_wave.is_some());
        if let Some(wave) = &self.periodic_wave {
            wave.encode(enc)?;
        }
        Ok(())
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        let waveform = dec.enum_u8("waveform", OscillatorType::from_wire)?;
        let frequency = dec.f32()?;
        let detune = dec.f32()?;
        let start_frame = dec.optional_u64("start_frame")?;
        let stop_frame = dec.optional_u64("stop_frame")?;
        let periodic_wave = if dec.bool("periodic_wave")? {
            Some(PeriodicWave::decode(dec)?)
        } else {
            None
        };
        Ok(Self {
            waveform,
            frequency,
            detune,
            start_frame,
            stop_frame,
            periodic_wave,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        // The wavetable is baked at construction.
        UpdateCheck::default()
            .rebuild_if(self.waveform != new.waveform)
            .rebuild_if(self.periodic_wave != new.periodic_wave)
            .parameter_if(self.frequency != new.frequency || self.detune != new.detune)
            .parameter_if(self.start_frame != new.start_frame || self.stop_frame != new.stop_frame)
            .finish()
    }

    fn param_values(&self) -> Vec<f32> {
        vec![self.frequency, self.detune]
    }
}

/// Constant-value source.
///
/// Parameters: `[offset]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConstantSource {
    /// Output value.
    pub offset: f32,
    /// Frame at which playback starts.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub start_frame: Option<u64>,
    /// Frame at which playback stops.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub stop_frame: Option<u64>,
}

impl Default for ConstantSource {
    fn default() -> Self {
        Self {
            offset: 1.0,
            start_frame: None,
            stop_frame: None,
        }
    }
}

impl NodeDescription for ConstantSource {
    const KIND: NodeKind = NodeKind::ConstantSource;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_f32(self.offset);
        enc.put_optional_u64(self.start_frame);
        enc.put_optional_u64(self.stop_frame);
        Ok(())
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            offset: dec.f32()?,
            start_frame: dec.optional_u64("start_frame")?,
            stop_frame: dec.optional_u64("stop_frame")?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .parameter_if(self.offset != new.offset)
            .parameter_if(self.start_frame != new.start_frame || self.stop_frame != new.stop_frame)
            .finish()
    }

    fn param_values(&self) -> Vec<f32> {
        vec![self.offset]
    }
}

/// Plays a decoded sample buffer held by the embedder.
///
/// Parameters: `[playback_rate, detune]`. Loop points and the start offset
/// are in buffer frames; start and stop are in context frames.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AudioBufferSource {
    /// Sample buffer resource, resolved by the embedder.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub buffer_id: Option<u64>,
    /// Playback speed factor.
    pub playback_rate: f32,
    /// Detune in cents.
    pub detune: f32,
    /// Loop between `loop_start` and `loop_end`.
    #[cfg_attr(feature = "serde", serde(rename = "loop"))]
    pub loop_enabled: bool,
    /// First frame of the loop.
    pub loop_start: u64,
    /// Frame after the last looped frame; 0 loops the whole buffer.
    pub loop_end: u64,
    /// Buffer frame playback begins at.
    pub offset_frame: u64,
    /// Frame at which playback starts.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub start_frame: Option<u64>,
    /// Frame at which playback stops.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub stop_frame: Option<u64>,
}

impl Default for AudioBufferSource {
    fn default() -> Self {
        Self {
            buffer_id: None,
            playback_rate: 1.0,
            detune: 0.0,
            loop_enabled: false,
            loop_start: 0,
            loop_end: 0,
            offset_frame: 0,
            start_frame: None,
            stop_frame: None,
        }
    }
}

impl NodeDescription for AudioBufferSource {
    const KIND: NodeKind = NodeKind::AudioBufferSource;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_optional_u64(self.buffer_id);
        enc.put_f32(self.playback_rate);
        enc.put_f32(self.detune);
        enc.put_bool(self.loop_enabled);
        enc.put_u64(self.loop_start);
        enc.put_u64(self.loop_end);
        enc.put_u64(self.offset_frame);
        enc.put_optional_u64(self.start_frame);
        enc.put_optional_u64(self.stop_frame);
        Ok(())
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            buffer_id: dec.optional_u64("buffer_id")?,
            playback_rate: dec.f32()?,
            detune: dec.f32()?,
            loop_enabled: dec.bool("loop")?,
            loop_start: dec.u64()?,
            loop_end: dec.u64()?,
            offset_frame: dec.u64()?,
            start_frame: dec.optional_u64("start_frame")?,
            stop_frame: dec.optional_u64("stop_frame")?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .rebuild_if(self.buffer_id != new.buffer_id)
            .parameter_if(self.playback_rate != new.playback_rate || self.detune != new.detune)
            .parameter_if(
                self.loop_enabled != new.loop_enabled
                    || self.loop_start != new.loop_start
                    || self.loop_end != new.loop_end,
            )
            .parameter_if(self.offset_frame != new.offset_frame)
            .parameter_if(self.start_frame != new.start_frame || self.stop_frame != new.stop_frame)
            .finish()
    }

    fn param_values(&self) -> Vec<f32> {
        vec![self.playback_rate, self.detune]
    }
}
