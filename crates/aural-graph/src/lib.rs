//! Aural Graph - compiler for real-time audio rendering graphs
//!
//! This crate turns a declarative description of an audio processing graph
//! (nodes, audio connections, parameter connections and per-parameter
//! automation) into a compiled, allocation-free [`Topology`] that a real-time
//! render thread walks quantum by quantum.
//!
//! # Core Abstractions
//!
//! ## Description Model
//!
//! - [`GraphDescription`] - Immutable snapshot of the desired graph
//! - [`GraphNodeDescription`] - Closed enum with one variant per node kind
//! - [`GraphConnection`] / [`GraphParamConnection`] - Audio and parameter edges
//! - [`GraphParamAutomation`] - Automation timeline targeting one parameter
//!
//! ## Compilation
//!
//! - [`nodes_in_cycles`] - Tarjan strongly-connected-component analysis
//! - [`classify_update`] - Picks the cheapest safe way to apply an edit
//! - [`TopologyBuilder`] - Delay splitting, cycle muting, ordering and scratch sizing
//!
//! ## Runtime
//!
//! - [`NodeTable`] - Constructed render nodes and their parameter stores
//! - [`OutputCache`] - Per-quantum memoization of node outputs
//! - [`GraphController`] / [`GraphExecutor`] - Control and render halves sharing
//!   a lock-free [`Handoff`]
//!
//! ## Wire Format
//!
//! - [`WireEncoder`] / [`WireDecoder`] - Little-endian primitives
//! - [`encode_graph`] / [`decode_graph`] - Whole-graph framing with tagged sections
//!
//! # Features
//!
//! - `serde` - Serialize/deserialize descriptions (JSON/TOML graph files)
//! - `tracing` - Emit diagnostic events from the control half
//!
//! # Example
//!
//! ```rust
//! use aural_graph::{
//!     GraphController, GraphDescription, GraphNodeDescription, NodeId, RenderSettings,
//!     nodes::{Destination, Gain, Oscillator},
//! };
//!
//! let osc = NodeId::new(1);
//! let gain = NodeId::new(2);
//! let out = NodeId::new(3);
//!
//! let graph = GraphDescription::new(out)
//!     .with_node(osc, GraphNodeDescription::Oscillator(Oscillator::default()))
//!     .with_node(gain, GraphNodeDescription::Gain(Gain::default()))
//!     .with_node(out, GraphNodeDescription::Destination(Destination::default()))
//!     .connect(osc, gain)
//!     .connect(gain, out);
//!
//! let (_controller, executor) = GraphController::with_inert_nodes(graph, RenderSettings::default());
//! let order: Vec<NodeId> = executor
//!     .topology()
//!     .processing_order()
//!     .iter()
//!     .map(|&i| executor.topology().node(i).node_id)
//!     .collect();
//! assert_eq!(order, vec![osc, gain, out]);
//! ```

pub mod automation;
pub mod bus;
pub mod cache;
pub mod classify;
pub mod codec;
pub mod cycles;
pub mod description;
pub mod edge;
pub mod executor;
pub mod factory;
pub mod limits;
pub mod mixing;
pub mod node;
pub mod nodes;
pub mod params;
pub mod topology;

#[cfg(feature = "serde")]
mod serde_nodes;

pub use automation::{AutomationRate, AutomationSegment, GraphParamAutomation, SegmentKind};
pub use bus::AudioBus;
pub use cache::{CachedOutput, OutputCache};
pub use classify::{GraphUpdateKind, classify_node_update, classify_update};
pub use codec::{
    WireDecoder, WireEncoder, WireError, decode_graph, decode_graph_with_rate, decode_node, encode_graph,
    encode_node,
};
pub use cycles::nodes_in_cycles;
pub use description::GraphDescription;
pub use edge::{GraphConnection, GraphParamConnection, IndexedConnection};
pub use executor::{GraphController, GraphExecutor, Handoff};
pub use factory::{InertNodeFactory, InertRenderNode, NodeSlot, NodeTable, RenderNode, RenderNodeFactory};
pub use limits::{CompileLimits, RenderSettings};
pub use mixing::{ChannelCountMode, ChannelInterpretation, ChannelMixing};
pub use node::{NodeId, NodeKind};
pub use nodes::GraphNodeDescription;
pub use params::ParamStore;
pub use topology::{
    MutedNode, ProcessingNode, ProcessingNodeKind, RenderScratch, RenderState, Topology,
    TopologyBuilder,
};
