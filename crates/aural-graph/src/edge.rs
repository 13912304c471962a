//! Connection types.
//!
//! Descriptions name connection endpoints by [`NodeId`]; compiled topologies
//! re-express them as [`IndexedConnection`]s into the topology's node list.
//! Endpoints that name no node are not an error: the builder drops them.

use crate::codec::{WireDecoder, WireEncoder, WireError};
use crate::node::NodeId;

/// Audio connection from a node output to a node input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphConnection {
    /// Source node.
    pub source: NodeId,
    /// Output port on the source.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_output: usize,
    /// Destination node.
    pub destination: NodeId,
    /// Input port on the destination.
    #[cfg_attr(feature = "serde", serde(default))]
    pub destination_input: usize,
}

impl GraphConnection {
    /// Connects output 0 of `source` to input 0 of `destination`.
    pub const fn new(source: NodeId, destination: NodeId) -> Self {
        Self::ports(source, 0, destination, 0)
    }

    /// Connects explicit ports.
    pub const fn ports(
        source: NodeId,
        source_output: usize,
        destination: NodeId,
        destination_input: usize,
    ) -> Self {
        Self {
            source,
            source_output,
            destination,
            destination_input,
        }
    }

    pub(crate) fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_u64(self.source.value());
        enc.put_u64(self.destination.value());
        enc.put_len(self.source_output)?;
        enc.put_len(self.destination_input)
    }

    pub(crate) fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        let source = NodeId::new(dec.u64()?);
        let destination = NodeId::new(dec.u64()?);
        Ok(Self {
            source,
            source_output: dec.index()?,
            destination,
            destination_input: dec.index()?,
        })
    }
}

/// Connection from a node output into one parameter of another node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphParamConnection {
    /// Source node.
    pub source: NodeId,
    /// Output port on the source.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_output: usize,
    /// Node owning the parameter.
    pub destination: NodeId,
    /// Index into the destination's parameter layout.
    pub destination_param: usize,
}

impl GraphParamConnection {
    /// Connects output 0 of `source` to parameter `destination_param`.
    pub const fn new(source: NodeId, destination: NodeId, destination_param: usize) -> Self {
        Self {
            source,
            source_output: 0,
            destination,
            destination_param,
        }
    }

    pub(crate) fn encode(&self, enc: &mut WireEncoder) -> Result<(), WireError> {
        enc.put_u64(self.source.value());
        enc.put_u64(self.destination.value());
        enc.put_len(self.source_output)?;
        enc.put_len(self.destination_param)
    }

    pub(crate) fn decode(dec: &mut WireDecoder<'_>) -> Result<Self, WireError> {
        let source = NodeId::new(dec.u64()?);
        let destination = NodeId::new(dec.u64()?);
        Ok(Self {
            source,
            source_output: dec.index()?,
            destination,
            destination_param: dec.index()?,
        })
    }
}

/// A connection re-expressed against compiled node indices.
///
/// Stored per destination input (or parameter), so only the source side is kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexedConnection {
    /// Index of the source in the topology's node list.
    pub source: usize,
    /// Output port on the source.
    pub source_output: usize,
}
