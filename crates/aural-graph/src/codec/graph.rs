//! Whole-graph framing.
//!
//! ```text
//! header:  flags:u32  sample_rate:f32  destination:u64
//! section: tag:u32    size:u32         payload[size]
//! ```
//!
//! Sections follow the header until the input ends. Each known section is a
//! `u32` entry count followed by its entries and must be consumed exactly.
//! Sections with an unknown tag are skipped, so newer encoders can add tables
//! older decoders ignore.

use crate::automation::GraphParamAutomation;
use crate::description::GraphDescription;
use crate::edge::{GraphConnection, GraphParamConnection};
use crate::limits::CompileLimits;
use crate::node::NodeId;
use crate::nodes::GraphNodeDescription;

use super::{WireDecoder, WireEncoder, WireError};

/// Size of the fixed graph header in bytes.
pub const GRAPH_HEADER_LEN: usize = 16;

/// Header flag: some node refers to a resource outside the payload.
pub const FLAG_EXTERNAL_RESOURCES: u32 = 1 << 0;

// Smallest encoded size of one entry per section.
const NODE_ENTRY_MIN_LEN: usize = 8 + 4 + 1;
const CONNECTION_LEN: usize = 8 + 8 + 4 + 4;
const AUTOMATION_MIN_LEN: usize = 8 + 4 + 4 * 4 + 1 + 4;

/// Tag of a graph section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum GraphSection {
    /// Node entries: `id:u64 len:u32 payload[len]`.
    NodeTable = 1,
    /// Audio connections.
    ConnectionTable = 2,
    /// Parameter connections.
    ParamConnectionTable = 3,
    /// Automation timelines.
    ParamAutomationTable = 4,
}

impl GraphSection {
    /// Maps a wire tag to a section; `None` for tags this decoder skips.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            1 => Some(Self::NodeTable),
            2 => Some(Self::ConnectionTable),
            3 => Some(Self::ParamConnectionTable),
            4 => Some(Self::ParamAutomationTable),
            _ => None,
        }
    }
}

fn begin_section(enc: &mut WireEncoder, section: GraphSection) -> usize {
    enc.put_u32(section as u32);
    enc.reserve_len()
}

/// Buffer sources always read embedder-held samples, even before a buffer is
/// attached; a convolver only once it has one.
fn references_external_resources(node: &GraphNodeDescription) -> bool {
    match node {
        GraphNodeDescription::AudioBufferSource(_) => true,
        GraphNodeDescription::Convolver(convolver) => convolver.buffer_id.is_some(),
        _ => false,
    }
}

/// Encodes a whole description.
///
/// Nodes are written in ascending ID order; connections and automations in
/// author order.
pub fn encode_graph(graph: &GraphDescription, sample_rate: f32) -> Result<Vec<u8>, WireError> {
    let mut enc = WireEncoder::new();
    let flags_at = enc.len();
    enc.put_u32(0);
    enc.put_f32(sample_rate);
    enc.put_u64(graph.destination.value());

    let mut flags = 0;
    let section = begin_section(&mut enc, GraphSection::NodeTable);
    enc.put_len(graph.nodes.len())?;
    for (id, node) in &graph.nodes {
        if references_external_resources(node) {
            flags |= FLAG_EXTERNAL_RESOURCES;
        }
        enc.put_u64(id.value());
        let payload = enc.reserve_len();
        node.encode(&mut enc)?;
        enc.patch_len(payload)?;
    }
    enc.patch_len(section)?;

    let section = begin_section(&mut enc, GraphSection::ConnectionTable);
    enc.put_len(graph.connections.len())?;
    for connection in &graph.connections {
        connection.encode(&mut enc)?;
    }
    enc.patch_len(section)?;

    let section = begin_section(&mut enc, GraphSection::ParamConnectionTable);
    enc.put_len(graph.param_connections.len())?;
    for connection in &graph.param_connections {
        connection.encode(&mut enc)?;
    }
    enc.patch_len(section)?;

    let section = begin_section(&mut enc, GraphSection::ParamAutomationTable);
    enc.put_len(graph.param_automations.len())?;
    for automation in &graph.param_automations {
        automation.encode(&mut enc)?;
    }
    enc.patch_len(section)?;

    let mut bytes = enc.into_bytes();
    bytes[flags_at..flags_at + 4].copy_from_slice(&flags.to_le_bytes());
    Ok(bytes)
}

/// Decodes a whole description, discarding the header's sample rate.
pub fn decode_graph(bytes: &[u8], limits: &CompileLimits) -> Result<GraphDescription, WireError> {
    decode_graph_with_rate(bytes, limits).map(|(graph, _)| graph)
}

/// Decodes a whole description and the sample rate it was encoded with.
///
/// A node ID appearing twice keeps the later entry.
pub fn decode_graph_with_rate(
    bytes: &[u8],
    limits: &CompileLimits,
) -> Result<(GraphDescription, f32), WireError> {
    let mut dec = WireDecoder::new(bytes, limits);
    let _flags = dec.u32()?;
    let sample_rate = dec.f32()?;
    let mut graph = GraphDescription::new(NodeId::new(dec.u64()?));

    while !dec.is_empty() {
        let tag = dec.u32()?;
        let size = dec.index()?;
        let payload = dec.bytes(size)?;
        let Some(section) = GraphSection::from_tag(tag) else {
            #[cfg(feature = "tracing")]
            tracing::debug!("graph_decode: skipping unknown section {tag} ({size} bytes)");
            continue;
        };
        let mut body = WireDecoder::with_max_array_len(payload, dec.max_array_len());
        decode_section(section, &mut body, &mut graph)?;
        body.finish()?;
    }

    Ok((graph, sample_rate))
}

fn decode_section(
    section: GraphSection,
    dec: &mut WireDecoder<'_>,
    graph: &mut GraphDescription,
) -> Result<(), WireError> {
    match section {
        GraphSection::NodeTable => {
            let count = dec.array_len(NODE_ENTRY_MIN_LEN)?;
            for _ in 0..count {
                let id = NodeId::new(dec.u64()?);
                let len = dec.index()?;
                let mut payload = WireDecoder::with_max_array_len(dec.bytes(len)?, dec.max_array_len());
                let node = GraphNodeDescription::decode(&mut payload)?;
                payload.finish()?;
                graph.nodes.insert(id, node);
            }
        }
        GraphSection::ConnectionTable => {
            let count = dec.array_len(CONNECTION_LEN)?;
            graph.connections.reserve(count);
            for _ in 0..count {
                graph.connections.push(GraphConnection::decode(dec)?);
            }
        }
        GraphSection::ParamConnectionTable => {
            let count = dec.array_len(CONNECTION_LEN)?;
            graph.param_connections.reserve(count);
            for _ in 0..count {
                graph.param_connections.push(GraphParamConnection::decode(dec)?);
            }
        }
        GraphSection::ParamAutomationTable => {
            let count = dec.array_len(AUTOMATION_MIN_LEN)?;
            graph.param_automations.reserve(count);
            for _ in 0..count {
                graph.param_automations.push(GraphParamAutomation::decode(dec)?);
            }
        }
    }
    Ok(())
}
