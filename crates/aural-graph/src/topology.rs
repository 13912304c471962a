//! Compiled render plans.
//!
//! [`TopologyBuilder`] turns a [`GraphDescription`] plus its [`NodeTable`]
//! into a [`Topology`]: an ordered list of processing nodes, their input and
//! parameter wiring, and every scratch buffer the render consumer will need.
//!
//! The plan itself is immutable once built and shared behind an `Arc`. The
//! per-quantum mutable half, a [`RenderState`], is allocated alongside it and
//! moved out by the executor that commits the plan.
//!
//! # Cycles
//!
//! Audio graphs may contain feedback loops as long as a delay sits on the
//! loop. The builder runs cycle analysis over the real graph, splits every
//! delay found on a cycle into a writer half (which takes the delay's audio
//! inputs) and a reader half (which produces its output and takes its
//! parameter inputs), then analyses the resulting virtual graph again. Nodes
//! still on a cycle are muted: they are left out of the plan entirely. The
//! audio listener is never muted.
//!
//! # Ordering
//!
//! The processing order is a depth-first post-order over inputs, so every
//! node appears after the nodes it reads from. Panners additionally depend on
//! the listener.

use std::sync::{Arc, Mutex};

use crate::bus::AudioBus;
use crate::cache::OutputCache;
use crate::cycles::nodes_in_cycles;
use crate::description::GraphDescription;
use crate::edge::IndexedConnection;
use crate::factory::NodeTable;
use crate::limits::CompileLimits;
use crate::mixing::ChannelMixing;
use crate::node::{NodeId, NodeKind};

/// Role of a processing node relative to its described node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessingNodeKind {
    /// The described node itself.
    Real,
    /// Input half of a delay split to break a cycle.
    DelayWriter,
    /// Output half of a delay split to break a cycle.
    DelayReader,
}

/// One entry of a compiled plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessingNode {
    /// Role of this entry.
    pub kind: ProcessingNodeKind,
    /// Index of the described node in the node table.
    pub real_index: usize,
    /// ID of the described node.
    pub node_id: NodeId,
    /// Kind of the described node.
    pub node_kind: NodeKind,
    /// Resolved input mixing rules.
    pub mixing: ChannelMixing,
    /// Output ports, as sized in the output cache.
    pub output_count: usize,
}

/// A virtual node left out of the plan because it sits on an unbreakable cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MutedNode {
    /// ID of the described node.
    pub node_id: NodeId,
    /// Which half of the node was muted.
    pub kind: ProcessingNodeKind,
    /// Kind of the described node.
    pub node_kind: NodeKind,
}

/// Buffers sized at build time so the render consumer never allocates.
#[derive(Clone, Debug, Default)]
pub struct RenderScratch {
    /// Per node, per input: one bus handle per connection plus one spare.
    pub input_gather: Vec<Vec<Vec<Option<usize>>>>,
    /// Per node, per parameter: one bus handle per connection plus one spare.
    pub param_gather: Vec<Vec<Vec<Option<usize>>>>,
    /// Per node, per input: the bus connections are mixed down into.
    pub input_mix: Vec<Vec<AudioBus>>,
}

/// Mutable per-quantum state of one plan, owned by whichever executor runs it.
#[derive(Clone, Debug)]
pub struct RenderState {
    /// Pre-sized gather lists and mix buses.
    pub scratch: RenderScratch,
    /// Output memoization laid out for the plan's nodes.
    pub output_cache: OutputCache,
}

/// Render-ready plan compiled from one description.
///
/// Written only by [`TopologyBuilder`]; read by the render consumer.
#[derive(Debug)]
pub struct Topology {
    nodes: Vec<ProcessingNode>,
    processing_order: Vec<usize>,
    inputs_by_input: Vec<Vec<Vec<IndexedConnection>>>,
    params_by_param: Vec<Vec<Vec<IndexedConnection>>>,
    dependents: Vec<Vec<usize>>,
    destination_index: usize,
    listener_index: Option<usize>,
    muted_nodes: Vec<MutedNode>,
    node_table: Arc<NodeTable>,
    /// Compiled index producing each node table entry's output.
    output_index: Vec<Option<usize>>,
    /// Compiled index of each node table entry's writer half, when split.
    writer_index: Vec<Option<usize>>,
    // Only the committing executor touches this after the plan is published.
    render_state: Mutex<Option<RenderState>>,
}

impl Topology {
    /// Compiled nodes, indexed by compiled index.
    pub fn nodes(&self) -> &[ProcessingNode] {
        &self.nodes
    }

    /// Number of compiled nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing is compiled.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the compiled node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. Use [`nodes`](Self::nodes) for a checked lookup.
    pub fn node(&self, index: usize) -> &ProcessingNode {
        &self.nodes[index]
    }

    /// Compiled indices in processing order.
    pub fn processing_order(&self) -> &[usize] {
        &self.processing_order
    }

    /// Per node, per input port: the connections feeding it.
    pub fn inputs_by_input(&self) -> &[Vec<Vec<IndexedConnection>>] {
        &self.inputs_by_input
    }

    /// Per node, per parameter: the connections feeding it.
    pub fn params_by_param(&self) -> &[Vec<Vec<IndexedConnection>>] {
        &self.params_by_param
    }

    /// Per node: the nodes reading from it, one entry per edge.
    pub fn dependents(&self) -> &[Vec<usize>] {
        &self.dependents
    }

    /// Compiled index the render consumer reads the final mix from.
    pub fn destination_index(&self) -> usize {
        self.destination_index
    }

    /// Compiled index of the audio listener, if one survived.
    pub fn listener_index(&self) -> Option<usize> {
        self.listener_index
    }

    /// Virtual nodes excluded from the plan.
    pub fn muted_nodes(&self) -> &[MutedNode] {
        &self.muted_nodes
    }

    /// Constructed nodes this plan refers to.
    pub fn node_table(&self) -> &Arc<NodeTable> {
        &self.node_table
    }

    /// Compiled index producing the output of `id`: the node itself, or the
    /// reader half of a split delay.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let real = self.node_table.index_of(id)?;
        self.output_index.get(real).copied().flatten()
    }

    /// Compiled index of the writer half of `id`, if it was split.
    pub fn writer_index_of(&self, id: NodeId) -> Option<usize> {
        let real = self.node_table.index_of(id)?;
        self.writer_index.get(real).copied().flatten()
    }

    /// Moves the pre-sized render state out. `None` once taken.
    pub(crate) fn take_render_state(&self) -> Option<RenderState> {
        self.render_state.try_lock().ok()?.take()
    }

    /// Parks `state` back in this plan so it is freed along with it.
    ///
    /// Hands `state` back if the slot is unavailable.
    pub(crate) fn park_render_state(&self, state: RenderState) -> Result<(), RenderState> {
        match self.render_state.try_lock() {
            Ok(mut slot) => {
                *slot = Some(state);
                Ok(())
            }
            Err(_) => Err(state),
        }
    }

    /// Number of parameters wired for the node at `index`.
    pub fn param_count(&self, index: usize) -> usize {
        self.params_by_param.get(index).map_or(0, Vec::len)
    }
}

/// Virtual node before muting.
#[derive(Clone, Copy, Debug)]
struct VirtualNode {
    kind: ProcessingNodeKind,
    real_index: usize,
    node_kind: NodeKind,
}

/// Edge between virtual nodes carrying its port.
#[derive(Clone, Copy, Debug)]
struct VirtualEdge {
    source: usize,
    source_output: usize,
    destination: usize,
    port: usize,
}

/// Virtual graph after delay splitting.
struct VirtualGraph {
    nodes: Vec<VirtualNode>,
    /// Virtual index of the 1:1 node, or of the reader half when split.
    output_side: Vec<usize>,
    /// Virtual index receiving audio inputs: the writer half when split.
    input_side: Vec<usize>,
    audio: Vec<VirtualEdge>,
    params: Vec<VirtualEdge>,
    adjacency: Vec<Vec<usize>>,
}

/// Compiles descriptions into [`Topology`] values. Control thread only.
pub struct TopologyBuilder;

impl TopologyBuilder {
    /// Builds the plan for `description` over the nodes in `table`, with its
    /// render state parked inside it.
    ///
    /// Never fails: dangling connections are dropped, residual cycles are
    /// muted and an unresolvable destination compiles to index 0.
    pub fn build(
        table: &Arc<NodeTable>,
        description: &GraphDescription,
        limits: &CompileLimits,
        quantum_size: usize,
    ) -> Topology {
        let (mut topology, state) = Self::build_parts(table, description, limits, quantum_size);
        topology.render_state = Mutex::new(Some(state));
        topology
    }

    /// Like [`build`](Self::build), but returns the render state separately.
    pub fn build_parts(
        table: &Arc<NodeTable>,
        description: &GraphDescription,
        limits: &CompileLimits,
        quantum_size: usize,
    ) -> (Topology, RenderState) {
        let graph = Self::split_delays(table, description);

        let in_cycle = nodes_in_cycles(graph.nodes.len(), &graph.adjacency);
        let removed: Vec<bool> = graph
            .nodes
            .iter()
            .zip(&in_cycle)
            .map(|(node, &cyclic)| cyclic && node.node_kind != NodeKind::AudioListener)
            .collect();

        let mut to_compiled = vec![None; graph.nodes.len()];
        let mut nodes = Vec::with_capacity(graph.nodes.len());
        let mut muted_nodes = Vec::new();
        for (virtual_index, virtual_node) in graph.nodes.iter().enumerate() {
            let node_id = table.node_id(virtual_node.real_index).unwrap_or_default();
            if removed[virtual_index] {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "graph_build: muting {:?} half of {} {node_id}, still on a cycle",
                    virtual_node.kind,
                    virtual_node.node_kind
                );
                muted_nodes.push(MutedNode {
                    node_id,
                    kind: virtual_node.kind,
                    node_kind: virtual_node.node_kind,
                });
                continue;
            }
            to_compiled[virtual_index] = Some(nodes.len());
            nodes.push(Self::processing_node(table, description, limits, virtual_node, node_id));
        }

        let node_count = nodes.len();
        let mut inputs_by_input: Vec<Vec<Vec<IndexedConnection>>> = vec![Vec::new(); node_count];
        let mut params_by_param: Vec<Vec<Vec<IndexedConnection>>> = nodes
            .iter()
            .map(|node| vec![Vec::new(); Self::param_count(table, description, node)])
            .collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); node_count];

        for edge in &graph.audio {
            let (Some(source), Some(destination)) = (to_compiled[edge.source], to_compiled[edge.destination]) else {
                continue;
            };
            let inputs = &mut inputs_by_input[destination];
            if inputs.len() <= edge.port {
                inputs.resize(edge.port + 1, Vec::new());
            }
            inputs[edge.port].push(IndexedConnection {
                source,
                source_output: edge.source_output,
            });
            dependents[source].push(destination);
        }

        for edge in &graph.params {
            let (Some(source), Some(destination)) = (to_compiled[edge.source], to_compiled[edge.destination]) else {
                continue;
            };
            let Some(param) = params_by_param[destination].get_mut(edge.port) else {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "graph_build: dropping connection into param {} of {}, out of range",
                    edge.port,
                    nodes[destination].node_id
                );
                continue;
            };
            param.push(IndexedConnection {
                source,
                source_output: edge.source_output,
            });
            dependents[source].push(destination);
        }

        // Worklets expose every declared input, connected or not.
        for (index, node) in nodes.iter().enumerate() {
            if let Some(crate::GraphNodeDescription::AudioWorklet(worklet)) = description.node(node.node_id) {
                let inputs = &mut inputs_by_input[index];
                if inputs.len() < worklet.number_of_inputs {
                    inputs.resize(worklet.number_of_inputs, Vec::new());
                }
            }
        }

        let scratch = RenderScratch {
            input_gather: inputs_by_input.iter().map(|inputs| gather_slots(inputs)).collect(),
            param_gather: params_by_param.iter().map(|params| gather_slots(params)).collect(),
            input_mix: inputs_by_input
                .iter()
                .map(|inputs| {
                    (0..inputs.len())
                        .map(|_| AudioBus::new(1, quantum_size, limits.max_channel_count))
                        .collect()
                })
                .collect(),
        };

        let output_index: Vec<Option<usize>> = graph
            .output_side
            .iter()
            .map(|&side| to_compiled[side])
            .collect();
        let writer_index: Vec<Option<usize>> = graph
            .input_side
            .iter()
            .zip(&graph.output_side)
            .map(|(&input, &output)| if input == output { None } else { to_compiled[input] })
            .collect();

        let destination_index = table
            .index_of(description.destination)
            .and_then(|real| output_index[real])
            .unwrap_or(0);
        let listener_index = nodes
            .iter()
            .position(|node| node.node_kind == NodeKind::AudioListener);

        let processing_order = processing_order(&nodes, &inputs_by_input, &params_by_param, listener_index);
        let output_cache = OutputCache::new(nodes.iter().map(|node| node.output_count));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_build: {} processing nodes from {} described, {} muted, destination {}",
            node_count,
            table.len(),
            muted_nodes.len(),
            destination_index
        );

        let topology = Topology {
            nodes,
            processing_order,
            inputs_by_input,
            params_by_param,
            dependents,
            destination_index,
            listener_index,
            muted_nodes,
            node_table: Arc::clone(table),
            output_index,
            writer_index,
            render_state: Mutex::new(None),
        };
        (topology, RenderState { scratch, output_cache })
    }

    fn split_delays(table: &NodeTable, description: &GraphDescription) -> VirtualGraph {
        let real_count = table.len();
        let resolve = |source: NodeId, destination: NodeId| Some((table.index_of(source)?, table.index_of(destination)?));

        let mut real_edges = vec![Vec::new(); real_count];
        for connection in &description.connections {
            match resolve(connection.source, connection.destination) {
                Some((source, destination)) => real_edges[source].push(destination),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        "graph_build: dropping dangling connection {} -> {}",
                        connection.source,
                        connection.destination
                    );
                }
            }
        }
        for connection in &description.param_connections {
            match resolve(connection.source, connection.destination) {
                Some((source, destination)) => real_edges[source].push(destination),
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        "graph_build: dropping dangling param connection {} -> {}",
                        connection.source,
                        connection.destination
                    );
                }
            }
        }
        let real_in_cycle = nodes_in_cycles(real_count, &real_edges);

        let mut nodes = Vec::with_capacity(real_count);
        let mut output_side = Vec::with_capacity(real_count);
        let mut input_side = Vec::with_capacity(real_count);
        for (real_index, slot) in table.slots().iter().enumerate() {
            if slot.kind == NodeKind::Delay && real_in_cycle[real_index] {
                #[cfg(feature = "tracing")]
                tracing::debug!("graph_build: splitting delay {} to break a cycle", slot.id);
                input_side.push(nodes.len());
                nodes.push(VirtualNode {
                    kind: ProcessingNodeKind::DelayWriter,
                    real_index,
                    node_kind: slot.kind,
                });
                output_side.push(nodes.len());
                nodes.push(VirtualNode {
                    kind: ProcessingNodeKind::DelayReader,
                    real_index,
                    node_kind: slot.kind,
                });
            } else {
                input_side.push(nodes.len());
                output_side.push(nodes.len());
                nodes.push(VirtualNode {
                    kind: ProcessingNodeKind::Real,
                    real_index,
                    node_kind: slot.kind,
                });
            }
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        let mut audio = Vec::with_capacity(description.connections.len());
        for connection in &description.connections {
            let Some((source, destination)) = resolve(connection.source, connection.destination) else {
                continue;
            };
            let edge = VirtualEdge {
                source: output_side[source],
                source_output: connection.source_output,
                destination: input_side[destination],
                port: connection.destination_input,
            };
            adjacency[edge.source].push(edge.destination);
            audio.push(edge);
        }

        // Parameter inputs of a split delay belong to its reader.
        let mut params = Vec::with_capacity(description.param_connections.len());
        for connection in &description.param_connections {
            let Some((source, destination)) = resolve(connection.source, connection.destination) else {
                continue;
            };
            let edge = VirtualEdge {
                source: output_side[source],
                source_output: connection.source_output,
                destination: output_side[destination],
                port: connection.destination_param,
            };
            adjacency[edge.source].push(edge.destination);
            params.push(edge);
        }

        if let Some(listener) = nodes.iter().position(|node| node.node_kind == NodeKind::AudioListener) {
            for (index, node) in nodes.iter().enumerate() {
                if node.node_kind == NodeKind::Panner {
                    adjacency[listener].push(index);
                }
            }
        }

        VirtualGraph {
            nodes,
            output_side,
            input_side,
            audio,
            params,
            adjacency,
        }
    }

    fn processing_node(
        table: &NodeTable,
        description: &GraphDescription,
        limits: &CompileLimits,
        virtual_node: &VirtualNode,
        node_id: NodeId,
    ) -> ProcessingNode {
        let mixing = description
            .node(node_id)
            .map_or_else(ChannelMixing::default, |node| node.channel_mixing())
            .clamped(limits.max_channel_count);
        let output_count = match virtual_node.kind {
            ProcessingNodeKind::DelayWriter => 0,
            _ => table
                .slot(virtual_node.real_index)
                .map_or(0, |slot| slot.render.output_count()),
        };
        ProcessingNode {
            kind: virtual_node.kind,
            real_index: virtual_node.real_index,
            node_id,
            node_kind: virtual_node.node_kind,
            mixing,
            output_count,
        }
    }

    fn param_count(table: &NodeTable, description: &GraphDescription, node: &ProcessingNode) -> usize {
        if node.kind == ProcessingNodeKind::DelayWriter {
            return 0;
        }
        match description.node(node.node_id) {
            Some(described) => described.param_count(),
            None => table
                .slot(node.real_index)
                .map_or(0, |slot| slot.render.param_count()),
        }
    }
}

fn gather_slots(ports: &[Vec<IndexedConnection>]) -> Vec<Vec<Option<usize>>> {
    ports
        .iter()
        .map(|connections| vec![None; connections.len() + 1])
        .collect()
}

/// Depth-first post-order over inputs, listener and parameter inputs.
fn processing_order(
    nodes: &[ProcessingNode],
    inputs_by_input: &[Vec<Vec<IndexedConnection>>],
    params_by_param: &[Vec<Vec<IndexedConnection>>],
    listener_index: Option<usize>,
) -> Vec<usize> {
    let predecessors: Vec<Vec<usize>> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let mut sources = Vec::new();
            if node.node_kind != NodeKind::AudioListener {
                sources.extend(inputs_by_input[index].iter().flatten().map(|c| c.source));
            }
            if node.node_kind == NodeKind::Panner {
                sources.extend(listener_index);
            }
            sources.extend(params_by_param[index].iter().flatten().map(|c| c.source));
            sources
        })
        .collect();

    let mut marked = vec![false; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for root in 0..nodes.len() {
        if marked[root] {
            continue;
        }
        marked[root] = true;
        stack.push((root, 0));
        while let Some((node, next)) = stack.last_mut() {
            let node = *node;
            match predecessors[node].get(*next) {
                Some(&source) => {
                    *next += 1;
                    if !marked[source] {
                        marked[source] = true;
                        stack.push((source, 0));
                    }
                }
                None => {
                    stack.pop();
                    order.push(node);
                }
            }
        }
    }
    order
}
