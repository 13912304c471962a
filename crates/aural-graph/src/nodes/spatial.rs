//! Spatialization: the 3D panner and the context's audio listener.
//!
//! Every panner implicitly depends on the listener, so the builder adds a
//! listener-to-panner edge and orders the listener first.

use crate::classify::{GraphUpdateKind, UpdateCheck};
use crate::codec::{WireDecoder, WireEncoder, WireError};
use crate::node::NodeKind;

use super::NodeDescription;

/// Spatialization algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PanningModel {
    /// Equal-power amplitude panning.
    #[default]
    EqualPower = 0,
    /// Head-related transfer function convolution.
    Hrtf = 1,
}

impl PanningModel {
    fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::EqualPower),
            1 => Some(Self::Hrtf),
            _ => None,
        }
    }
}

/// Distance attenuation curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DistanceModel {
    /// Linear rolloff between reference and max distance.
    Linear = 0,
    /// Inverse-distance rolloff.
    #[default]
    Inverse = 1,
    /// Exponential rolloff.
    Exponential = 2,
}

impl DistanceModel {
    fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Linear),
            1 => Some(Self::Inverse),
            2 => Some(Self::Exponential),
            _ => None,
        }
    }
}

fn put_vec3(enc: &mut WireEncoder, v: [f32; 3]) {
    for c in v {
        enc.put_f32(c);
    }
}

fn vec3(dec: &mut WireDecoder<'_>) -> Result<[f32; 3], WireError> {
    Ok([dec.f32()?, dec.f32()?, dec.f32()?])
}

/// 3D panner.
///
/// Parameters: `[position_x, position_y, position_z, orientation_x,
/// orientation_y, orientation_z]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Panner {
    /// Spatialization algorithm.
    pub panning_model: PanningModel,
    /// Distance attenuation curve.
    pub distance_model: DistanceModel,
    /// Source position.
    pub position: [f32; 3],
    /// Source orientation.
    pub orientation: [f32; 3],
    /// Distance at which attenuation starts.
    pub ref_distance: f32,
    /// Distance beyond which attenuation stops.
    pub max_distance: f32,
    /// Attenuation speed.
    pub rolloff_factor: f32,
    /// Inner cone angle in degrees.
    pub cone_inner_angle: f32,
    /// Outer cone angle in degrees.
    pub cone_outer_angle: f32,
    /// Gain outside the outer cone.
    pub cone_outer_gain: f32,
}

impl Default for Panner {
    fn default() -> Self {
        Self {
            panning_model: PanningModel::EqualPower,
            distance_model: DistanceModel::Inverse,
            position: [0.0; 3],
            orientation: [1.0, 0.0, 0.0],
            ref_distance: 1.0,
            max_distance: 10000.0,
            rolloff_factor: 1.0,
            cone_inner_angle: 360.0,
            cone_outer_angle: 360.0,
            cone_outer_gain: 0.0,
        }
    }
}

impl NodeDescription for Panner {
    const KIND: NodeKind = NodeKind::Panner;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_u8(self.panning_model as u8);
        enc.put_u8(self.distance_model as u8);
        put_vec3(enc, self.position);
        put_vec3(enc, self.orientation);
        enc.put_f32(self.ref_distance);
        enc.put_f32(self.max_distance);
        enc.put_f32(self.rolloff_factor);
        enc.put_f32(self.cone_inner_angle);
        enc.put_f32(self.cone_outer_angle);
        enc.put_f32(self.cone_outer_gain);
        Ok(())
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            panning_model: dec.enum_u8("panning_model", PanningModel::from_wire)?,
            distance_model: dec.enum_u8("distance_model", DistanceModel::from_wire)?,
            position: vec3(dec)?,
            orientation: vec3(dec)?,
            ref_distance: dec.f32()?,
            max_distance: dec.f32()?,
            rolloff_factor: dec.f32()?,
            cone_inner_angle: dec.f32()?,
            cone_outer_angle: dec.f32()?,
            cone_outer_gain: dec.f32()?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        // HRTF needs its own kernel state.
        UpdateCheck::default()
            .rebuild_if(self.panning_model != new.panning_model)
            .parameter_if(self.distance_model != new.distance_model)
            .parameter_if(self.position != new.position || self.orientation != new.orientation)
            .parameter_if(
                self.ref_distance != new.ref_distance
                    || self.max_distance != new.max_distance
                    || self.rolloff_factor != new.rolloff_factor,
            )
            .parameter_if(
                self.cone_inner_angle != new.cone_inner_angle
                    || self.cone_outer_angle != new.cone_outer_angle
                    || self.cone_outer_gain != new.cone_outer_gain,
            )
            .finish()
    }

    fn param_values(&self) -> Vec<f32> {
        let mut values = Vec::with_capacity(6);
        values.extend_from_slice(&self.position);
        values.extend_from_slice(&self.orientation);
        values
    }
}

/// The listener all panners spatialize against.
///
/// Parameters: `[position xyz, forward xyz, up xyz]`. Has no audio ports.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AudioListener {
    /// Listener position.
    pub position: [f32; 3],
    /// Facing direction.
    pub forward: [f32; 3],
    /// Up direction.
    pub up: [f32; 3],
}

impl Default for AudioListener {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            forward: [0.0, 0.0, -1.0],
            up: [0.0, 1.0, 0.0],
        }
    }
}

impl NodeDescription for AudioListener {
    const KIND: NodeKind = NodeKind::AudioListener;

    fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        put_vec3(enc, self.position);
        put_vec3(enc, self.forward);
        put_vec3(enc, self.up);
        Ok(())
    }

    fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        Ok(Self {
            position: vec3(dec)?,
            forward: vec3(dec)?,
            up: vec3(dec)?,
        })
    }

    fn classify_update(&self, new: &Self) -> GraphUpdateKind {
        UpdateCheck::default()
            .parameter_if(self.position != new.position)
            .parameter_if(self.forward != new.forward || self.up != new.up)
            .finish()
    }

    fn param_values(&self) -> Vec<f32> {
        let mut values = Vec::with_capacity(9);
        values.extend_from_slice(&self.position);
        values.extend_from_slice(&self.forward);
        values.extend_from_slice(&self.up);
        values
    }

    fn input_count(&self) -> usize {
        0
    }

    fn output_count(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panning_model_is_rebuild() {
        let old = Panner::default();
        let new = Panner {
            panning_model: PanningModel::Hrtf,
            ..Panner::default()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::RebuildRequired);
    }

    #[test]
    fn test_position_and_cone_are_parameter() {
        let old = Panner::default();
        let new = Panner {
            position: [1.0, 0.0, 0.0],
            cone_outer_gain: 0.5,
            ..Panner::default()
        };
        assert_eq!(old.classify_update(&new), GraphUpdateKind::Parameter);
    }

    #[test]
    fn test_param_layouts() {
        assert_eq!(Panner::default().param_count(), 6);
        let listener = AudioListener::default();
        assert_eq!(listener.param_count(), 9);
        assert_eq!(listener.param_values()[3..6], [0.0, 0.0, -1.0]);
        assert_eq!(listener.output_count(), 0);
    }
}
