//! Parameter automation timelines.
//!
//! A [`GraphParamAutomation`] targets one parameter of one node and carries
//! its bounds plus an ordered list of [`AutomationSegment`]s already resolved
//! to frame positions. Evaluating the timeline is the render kernel's job; the
//! compiler only stores, compares and ships it.

use crate::codec::{WireDecoder, WireEncoder, WireError};
use crate::node::NodeId;

/// Whether a parameter is evaluated per frame or per quantum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AutomationRate {
    /// One value per frame.
    #[default]
    ARate = 0,
    /// One value per quantum.
    KRate = 1,
}

impl AutomationRate {
    fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::ARate),
            1 => Some(Self::KRate),
            _ => None,
        }
    }
}

/// Shape of one automation segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SegmentKind {
    /// Holds `start_value`.
    #[default]
    Constant = 0,
    /// Linear ramp from `start_value` to `end_value`.
    LinearRamp = 1,
    /// Exponential ramp from `start_value` to `end_value`.
    ExponentialRamp = 2,
    /// Exponential approach to `target` with `time_constant`.
    SetTarget = 3,
    /// Interpolates `curve` over `curve_duration`.
    ValueCurve = 4,
}

impl SegmentKind {
    fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Constant),
            1 => Some(Self::LinearRamp),
            2 => Some(Self::ExponentialRamp),
            3 => Some(Self::SetTarget),
            4 => Some(Self::ValueCurve),
            _ => None,
        }
    }
}

/// One resolved segment of an automation timeline.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AutomationSegment {
    /// Segment shape.
    pub kind: SegmentKind,
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    /// First frame covered.
    pub start_frame: u64,
    /// Frame after the last one covered.
    pub end_frame: u64,
    /// Value at `start_frame`.
    pub start_value: f32,
    /// Value at `end_frame` for ramps.
    pub end_value: f32,
    /// Time constant for `SetTarget`.
    pub time_constant: f32,
    /// Target for `SetTarget`.
    pub target: f32,
    /// Start time of the value curve in seconds.
    pub curve_start_time: f64,
    /// Duration of the value curve in seconds.
    pub curve_duration: f64,
    /// Value-curve samples.
    pub curve: Vec<f32>,
}

impl AutomationSegment {
    /// Returns true if the render-relevant content differs.
    ///
    /// Second-based times are ignored: the render side works from frames, so
    /// two segments resolving to the same frames are the same edit.
    pub fn render_differs(&self, other: &Self) -> bool {
        self.kind != other.kind
            || self.start_frame != other.start_frame
            || self.end_frame != other.end_frame
            || self.start_value != other.start_value
            || self.end_value != other.end_value
            || self.time_constant != other.time_constant
            || self.target != other.target
            || self.curve != other.curve
    }

    pub(crate) fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_u8(self.kind as u8);
        enc.put_f64(self.start_time);
        enc.put_f64(self.end_time);
        enc.put_f64(self.curve_start_time);
        enc.put_f64(self.curve_duration);
        enc.put_u64(self.start_frame);
        enc.put_u64(self.end_frame);
        enc.put_f32(self.start_value);
        enc.put_f32(self.end_value);
        enc.put_f32(self.time_constant);
        enc.put_f32(self.target);
        enc.put_f32_array(&self.curve)
    }

    pub(crate) fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        let kind = dec.enum_u8("segment_kind", SegmentKind::from_wire)?;
        let start_time = dec.f64()?;
        let end_time = dec.f64()?;
        let curve_start_time = dec.f64()?;
        let curve_duration = dec.f64()?;
        Ok(Self {
            kind,
            start_time,
            end_time,
            start_frame: dec.u64()?,
            end_frame: dec.u64()?,
            start_value: dec.f32()?,
            end_value: dec.f32()?,
            time_constant: dec.f32()?,
            target: dec.f32()?,
            curve_start_time,
            curve_duration,
            curve: dec.f32_array()?,
        })
    }
}

/// Encoded size of a segment with an empty curve.
const SEGMENT_MIN_LEN: usize = 1 + 4 * 8 + 2 * 8 + 4 * 4 + 4;

/// Automation timeline for one parameter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphParamAutomation {
    /// Node owning the parameter.
    pub destination: NodeId,
    /// Index into the node's parameter layout.
    pub param_index: usize,
    /// Value before the first segment.
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial_value: f32,
    /// Nominal default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub default_value: f32,
    /// Lower clamp.
    #[cfg_attr(feature = "serde", serde(default = "f32_min"))]
    pub min_value: f32,
    /// Upper clamp.
    #[cfg_attr(feature = "serde", serde(default = "f32_max"))]
    pub max_value: f32,
    /// Evaluation rate.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rate: AutomationRate,
    /// Ordered segments.
    #[cfg_attr(feature = "serde", serde(default))]
    pub segments: Vec<AutomationSegment>,
}

#[cfg(feature = "serde")]
fn f32_min() -> f32 {
    f32::MIN
}

#[cfg(feature = "serde")]
fn f32_max() -> f32 {
    f32::MAX
}

impl GraphParamAutomation {
    /// Creates an automation with unbounded range and no segments.
    pub fn new(destination: NodeId, param_index: usize, initial_value: f32) -> Self {
        Self {
            destination,
            param_index,
            initial_value,
            default_value: initial_value,
            min_value: f32::MIN,
            max_value: f32::MAX,
            rate: AutomationRate::ARate,
            segments: Vec::new(),
        }
    }

    /// Appends a segment.
    pub fn with_segment(mut self, segment: AutomationSegment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Returns true if the render-relevant content differs.
    pub fn render_differs(&self, other: &Self) -> bool {
        self.destination != other.destination
            || self.param_index != other.param_index
            || self.initial_value != other.initial_value
            || self.default_value != other.default_value
            || self.min_value != other.min_value
            || self.max_value != other.max_value
            || self.rate != other.rate
            || self.segments.len() != other.segments.len()
            || self
                .segments
                .iter()
                .zip(&other.segments)
                .any(|(a, b)| a.render_differs(b))
    }

    pub(crate) fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_u64(self.destination.value());
        enc.put_len(self.param_index)?;
        enc.put_f32(self.initial_value);
        enc.put_f32(self.default_value);
        enc.put_f32(self.min_value);
        enc.put_f32(self.max_value);
        enc.put_u8(self.rate as u8);
        enc.put_len(self.segments.len())?;
        for segment in &self.segments {
            segment.encode(enc)?;
        }
        Ok(())
    }

    pub(crate) fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        let destination = NodeId::new(dec.u64()?);
        let param_index = dec.index()?;
        let initial_value = dec.f32()?;
        let default_value = dec.f32()?;
        let min_value = dec.f32()?;
        let max_value = dec.f32()?;
        let rate = dec.enum_u8("automation_rate", AutomationRate::from_wire)?;
        let count = dec.array_len(SEGMENT_MIN_LEN)?;
        let segments = (0..count)
            .map(|_| AutomationSegment::decode(dec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            destination,
            param_index,
            initial_value,
            default_value,
            min_value,
            max_value,
            rate,
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::CompileLimits;

    fn ramp() -> AutomationSegment {
        AutomationSegment {
            kind: SegmentKind::LinearRamp,
            start_time: 0.0,
            end_time: 1.0,
            start_frame: 0,
            end_frame: 48000,
            start_value: 0.0,
            end_value: 1.0,
            ..AutomationSegment::default()
        }
    }

    #[test]
    fn test_segment_min_len_matches_encoding() {
        let mut enc = WireEncoder::new();
        AutomationSegment::default().encode(&mut enc).unwrap();
        assert_eq!(enc.len(), SEGMENT_MIN_LEN);
    }

    #[test]
    fn test_roundtrip_with_curve() {
        let automation = GraphParamAutomation::new(NodeId::new(3), 1, 0.5)
            .with_segment(ramp())
            .with_segment(AutomationSegment {
                kind: SegmentKind::ValueCurve,
                curve_start_time: 1.0,
                curve_duration: 0.5,
                curve: vec![0.0, 0.5, 1.0],
                ..AutomationSegment::default()
            });
        let mut enc = WireEncoder::new();
        automation.encode(&mut enc).unwrap();
        let mut dec = WireDecoder::new(enc.as_bytes(), &CompileLimits::default());
        assert_eq!(GraphParamAutomation::decode(&mut dec).unwrap(), automation);
        assert!(dec.finish().is_ok());
    }

    #[test]
    fn test_render_differs_ignores_seconds() {
        let a = ramp();
        let b = AutomationSegment {
            start_time: 0.25,
            end_time: 1.25,
            ..ramp()
        };
        assert!(!a.render_differs(&b));
        let c = AutomationSegment {
            end_frame: 24000,
            ..ramp()
        };
        assert!(a.render_differs(&c));
    }

    #[test]
    fn test_render_differs_on_curve_content() {
        let a = AutomationSegment {
            curve: vec![0.0, 1.0],
            ..ramp()
        };
        let b = AutomationSegment {
            curve: vec![0.0, 0.5],
            ..ramp()
        };
        assert!(a.render_differs(&b));
    }

    #[test]
    fn test_invalid_rate() {
        let mut enc = WireEncoder::new();
        GraphParamAutomation::new(NodeId::new(1), 0, 0.0).encode(&mut enc).unwrap();
        let mut bytes = enc.into_bytes();
        // destination u64, param u32, four f32 bounds, then the rate byte.
        bytes[8 + 4 + 16] = 5;
        let mut dec = WireDecoder::new(&bytes, &CompileLimits::default());
        assert_eq!(
            GraphParamAutomation::decode(&mut dec).unwrap_err(),
            WireError::InvalidEnum {
                field: "automation_rate",
                value: 5
            }
        );
    }
}
