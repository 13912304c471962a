//! Render-node construction and the node table.
//!
//! Signal-processing kernels live outside this crate. An embedder supplies a
//! [`RenderNodeFactory`] that turns a [`GraphNodeDescription`] into a boxed
//! [`RenderNode`]; the compiler only needs each node's shape. The
//! [`InertNodeFactory`] builds shape-only nodes for tests and tooling.
//!
//! A [`NodeTable`] holds one [`NodeSlot`] per described node, in ascending
//! [`NodeId`] order. It is built on the control thread and shared with the
//! render thread behind an `Arc`; a topology-only edit reuses it as is.

use crate::automation::GraphParamAutomation;
use crate::description::GraphDescription;
use crate::node::{NodeId, NodeKind};
use crate::nodes::GraphNodeDescription;
use crate::params::ParamStore;

/// A constructed processing node as seen by the compiler.
pub trait RenderNode: Send + Sync {
    /// ID of the described node this was built from.
    fn node_id(&self) -> NodeId;

    /// Kind of the described node.
    fn kind(&self) -> NodeKind;

    /// Number of output ports; sizes the output cache.
    fn output_count(&self) -> usize;

    /// Number of parameters; sizes per-parameter wiring.
    fn param_count(&self) -> usize;
}

/// Builds render nodes from descriptions. Called on the control thread only.
pub trait RenderNodeFactory: Send + Sync {
    /// Constructs the render node for `node`.
    fn make_render_node(
        &self,
        id: NodeId,
        node: &GraphNodeDescription,
        quantum_size: usize,
    ) -> Box<dyn RenderNode>;
}

/// Render node that only knows its shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InertRenderNode {
    id: NodeId,
    kind: NodeKind,
    outputs: usize,
    params: usize,
}

impl InertRenderNode {
    /// Creates a shape-only node for `node`.
    pub fn new(id: NodeId, node: &GraphNodeDescription) -> Self {
        Self {
            id,
            kind: node.kind(),
            outputs: node.output_count(),
            params: node.param_count(),
        }
    }
}

impl RenderNode for InertRenderNode {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn output_count(&self) -> usize {
        self.outputs
    }

    fn param_count(&self) -> usize {
        self.params
    }
}

/// Factory producing [`InertRenderNode`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct InertNodeFactory;

impl RenderNodeFactory for InertNodeFactory {
    fn make_render_node(
        &self,
        id: NodeId,
        node: &GraphNodeDescription,
        _quantum_size: usize,
    ) -> Box<dyn RenderNode> {
        Box::new(InertRenderNode::new(id, node))
    }
}

/// One constructed node with its parameter state.
pub struct NodeSlot {
    /// Described node ID.
    pub id: NodeId,
    /// Described node kind.
    pub kind: NodeKind,
    /// Constructed render node.
    pub render: Box<dyn RenderNode>,
    /// Live parameter values and automation.
    pub params: ParamStore,
}

/// Constructed nodes of one description, indexed densely by ascending ID.
pub struct NodeTable {
    ids: Vec<NodeId>,
    slots: Vec<NodeSlot>,
    analyser_indices: Vec<usize>,
    listener_index: Option<usize>,
    quantum_size: usize,
}

impl NodeTable {
    /// Constructs every node of `description` through `factory`.
    pub fn build(
        description: &GraphDescription,
        factory: &dyn RenderNodeFactory,
        quantum_size: usize,
    ) -> Self {
        let mut ids = Vec::with_capacity(description.nodes.len());
        let mut slots = Vec::with_capacity(description.nodes.len());
        let mut analyser_indices = Vec::new();
        let mut listener_index = None;

        // BTreeMap iteration is already in ascending NodeId order.
        for (&id, node) in &description.nodes {
            let index = slots.len();
            let kind = node.kind();
            match kind {
                NodeKind::Analyser => analyser_indices.push(index),
                NodeKind::AudioListener if listener_index.is_none() => listener_index = Some(index),
                _ => {}
            }
            ids.push(id);
            slots.push(NodeSlot {
                id,
                kind,
                render: factory.make_render_node(id, node, quantum_size),
                params: ParamStore::new(node, description.automations_for(id)),
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "node_table: built {} nodes, {} analysers, listener {:?}",
            slots.len(),
            analyser_indices.len(),
            listener_index
        );

        Self {
            ids,
            slots,
            analyser_indices,
            listener_index,
            quantum_size,
        }
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the table has no nodes.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the quantum size nodes were built for.
    pub fn quantum_size(&self) -> usize {
        self.quantum_size
    }

    /// Returns the slot at `index`.
    pub fn slot(&self, index: usize) -> Option<&NodeSlot> {
        self.slots.get(index)
    }

    /// Returns every slot in index order.
    pub fn slots(&self) -> &[NodeSlot] {
        &self.slots
    }

    /// Looks up the index of `id`.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    /// Returns the ID at `index`.
    pub fn node_id(&self, index: usize) -> Option<NodeId> {
        self.ids.get(index).copied()
    }

    /// Returns the kind at `index`.
    pub fn kind(&self, index: usize) -> Option<NodeKind> {
        self.slots.get(index).map(|slot| slot.kind)
    }

    /// Indices of every analyser node.
    pub fn analyser_indices(&self) -> &[usize] {
        &self.analyser_indices
    }

    /// Index of the audio listener, if the description has one.
    pub fn listener_index(&self) -> Option<usize> {
        self.listener_index
    }

    /// Publishes parameter edits from `old` to `new` into the parameter stores.
    ///
    /// Only nodes whose description or automation changed are written. Returns
    /// the number of nodes written. Nodes missing from `new` are skipped.
    pub fn apply_parameters(&self, old: &GraphDescription, new: &GraphDescription) -> usize {
        let mut written = 0;
        for slot in &self.slots {
            let Some(new_node) = new.node(slot.id) else {
                continue;
            };
            let node_changed = old.node(slot.id) != Some(new_node);
            if node_changed || automations_changed(old, new, slot.id) {
                slot.params.apply(new_node, new.automations_for(slot.id));
                written += 1;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("node_table: parameter edit touched {written} nodes");

        written
    }
}

fn automations_changed(old: &GraphDescription, new: &GraphDescription, id: NodeId) -> bool {
    let old_list: Vec<&GraphParamAutomation> = old.automations_for(id).collect();
    let new_list: Vec<&GraphParamAutomation> = new.automations_for(id).collect();
    old_list.len() != new_list.len()
        || old_list
            .iter()
            .zip(&new_list)
            .any(|(a, b)| a.render_differs(b))
}

impl core::fmt::Debug for NodeTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeTable")
            .field("ids", &self.ids)
            .field("analyser_indices", &self.analyser_indices)
            .field("listener_index", &self.listener_index)
            .field("quantum_size", &self.quantum_size)
            .finish_non_exhaustive()
    }
}
