//! Safety limits and render settings shared by the codec and the builder.

/// Default upper bound for a resolved channel-mixing channel count.
pub const DEFAULT_MAX_CHANNEL_COUNT: usize = 32;

/// Default upper bound for any decoded array (elements, not bytes).
pub const DEFAULT_MAX_WIRE_ARRAY_LEN: u32 = 1 << 20;

/// Default render quantum in frames.
pub const DEFAULT_QUANTUM_SIZE: usize = 128;

/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

/// Policy limits applied while decoding and compiling a graph.
///
/// These are safety limits, not algorithmic constants: the channel clamp bounds
/// the size of pre-allocated mix buses, and the array limit bounds how much a
/// malformed payload can make the decoder allocate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompileLimits {
    /// Channel-mixing counts are clamped to `[1, max_channel_count]`.
    pub max_channel_count: usize,
    /// Longest array the wire decoder accepts.
    pub max_wire_array_len: u32,
}

impl Default for CompileLimits {
    fn default() -> Self {
        Self {
            max_channel_count: DEFAULT_MAX_CHANNEL_COUNT,
            max_wire_array_len: DEFAULT_MAX_WIRE_ARRAY_LEN,
        }
    }
}

/// Everything the control half needs to build topologies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    /// Sample rate in Hz; carried in the encoded graph header.
    pub sample_rate: f32,
    /// Frames per render quantum; sizes every mix bus.
    pub quantum_size: usize,
    /// Decode and compile limits.
    pub limits: CompileLimits,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            quantum_size: DEFAULT_QUANTUM_SIZE,
            limits: CompileLimits::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RenderSettings::default();
        assert_eq!(settings.quantum_size, 128);
        assert_eq!(settings.limits.max_channel_count, 32);
        assert_eq!(settings.limits.max_wire_array_len, 1_048_576);
    }
}
