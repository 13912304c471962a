//! Control and render halves of a running graph.
//!
//! [`GraphController`] lives on the control thread. It owns the applied
//! description and the node factory, classifies every edit, and builds new
//! topologies off to the side. [`GraphExecutor`] lives on the render thread
//! and only ever reads its current [`Topology`]. The one thing it mutates,
//! the plan's [`RenderState`], it owns outright: the state is moved out of a
//! plan when the plan is committed and moved back in when the plan retires,
//! so other handles to a plan never get in the way of a quantum.
//!
//! The two halves share a [`Handoff`]: one pending slot the controller
//! publishes into, and a few retired slots the executor parks replaced
//! topologies in so they are freed on the control thread. The render side
//! never locks and never frees a topology.
//!
//! ```text
//! control                           render
//! ───────                           ──────
//! apply(new) ─ build ─► pending ──► begin_quantum() ─ swap in
//! collect_retired() ◄── retired ◄──────────────────── old topology
//! ```

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::classify::{GraphUpdateKind, classify_update};
use crate::codec::{WireError, decode_graph};
use crate::description::GraphDescription;
use crate::factory::{InertNodeFactory, NodeTable, RenderNodeFactory};
use crate::limits::RenderSettings;
use crate::params::ParamStore;
use crate::cache::OutputCache;
use crate::topology::{RenderScratch, RenderState, Topology, TopologyBuilder};

/// Number of replaced topologies the render side can park before the
/// control side collects them.
pub const RETIRED_SLOTS: usize = 4;

/// Lock-free exchange of topologies between the two halves.
pub struct Handoff {
    pending: ArcSwapOption<Topology>,
    retired: [ArcSwapOption<Topology>; RETIRED_SLOTS],
}

impl Handoff {
    fn new() -> Self {
        Self {
            pending: ArcSwapOption::empty(),
            retired: std::array::from_fn(|_| ArcSwapOption::empty()),
        }
    }

    /// Publishes `topology`, replacing any topology not yet committed.
    ///
    /// Returns the replaced one so it is dropped by the caller.
    pub fn publish(&self, topology: Arc<Topology>) -> Option<Arc<Topology>> {
        self.pending.swap(Some(topology))
    }

    /// Returns true if a published topology is waiting to be committed.
    pub fn has_pending(&self) -> bool {
        self.pending.load().is_some()
    }

    /// Takes every retired topology out of the handoff. Control thread only.
    pub fn collect_retired(&self) -> usize {
        self.retired
            .iter()
            .filter(|slot| slot.swap(None).is_some())
            .count()
    }

    /// Returns the number of retired topologies waiting to be collected.
    pub fn retired_count(&self) -> usize {
        self.retired.iter().filter(|slot| slot.load().is_some()).count()
    }

    fn take_pending(&self) -> Option<Arc<Topology>> {
        self.pending.swap(None)
    }

    // Only the render side fills retired slots, so a free slot stays free
    // until it does.
    fn free_retired_slot(&self) -> Option<&ArcSwapOption<Topology>> {
        self.retired.iter().find(|slot| slot.load().is_none())
    }
}

impl core::fmt::Debug for Handoff {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handoff")
            .field("pending", &self.has_pending())
            .field("retired", &self.retired_count())
            .finish()
    }
}

/// Control half: owns the applied description and publishes new plans.
pub struct GraphController {
    description: GraphDescription,
    node_table: Arc<NodeTable>,
    factory: Box<dyn RenderNodeFactory>,
    settings: RenderSettings,
    handoff: Arc<Handoff>,
}

impl GraphController {
    /// Compiles `description` and returns both halves.
    ///
    /// The executor starts with the compiled topology already in place.
    pub fn new(
        description: GraphDescription,
        settings: RenderSettings,
        factory: Box<dyn RenderNodeFactory>,
    ) -> (Self, GraphExecutor) {
        let node_table = Arc::new(NodeTable::build(
            &description,
            factory.as_ref(),
            settings.quantum_size,
        ));
        let (topology, state) = TopologyBuilder::build_parts(
            &node_table,
            &description,
            &settings.limits,
            settings.quantum_size,
        );
        let handoff = Arc::new(Handoff::new());

        let executor = GraphExecutor {
            handoff: Arc::clone(&handoff),
            topology: Arc::new(topology),
            state,
            current_frame: 0,
        };
        let controller = Self {
            description,
            node_table,
            factory,
            settings,
            handoff,
        };
        (controller, executor)
    }

    /// Like [`new`](Self::new), with shape-only render nodes.
    pub fn with_inert_nodes(
        description: GraphDescription,
        settings: RenderSettings,
    ) -> (Self, GraphExecutor) {
        Self::new(description, settings, Box::new(InertNodeFactory))
    }

    /// Classifies `new` against the applied description without applying it.
    pub fn classify(&self, new: &GraphDescription) -> GraphUpdateKind {
        classify_update(&self.description, new)
    }

    /// Applies a new description using the cheapest safe update.
    ///
    /// - `None`: nothing happens.
    /// - `Parameter`: parameter stores are written; no topology is published.
    /// - `Topology`: a new topology over the existing node table is published.
    /// - `RebuildRequired`: a new node table and topology are published.
    pub fn apply(&mut self, new: GraphDescription) -> GraphUpdateKind {
        let kind = self.classify(&new);

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_apply: {kind} edit");

        match kind {
            GraphUpdateKind::None => {}
            GraphUpdateKind::Parameter => {
                self.node_table.apply_parameters(&self.description, &new);
            }
            GraphUpdateKind::Topology => {
                // Channel-mixing edits classify as Topology but still carry
                // parameter changes.
                self.node_table.apply_parameters(&self.description, &new);
                self.publish(&new);
            }
            GraphUpdateKind::RebuildRequired => {
                self.node_table = Arc::new(NodeTable::build(
                    &new,
                    self.factory.as_ref(),
                    self.settings.quantum_size,
                ));
                self.publish(&new);
            }
        }
        self.description = new;
        kind
    }

    /// Decodes a wire-encoded description and applies it.
    ///
    /// A decode error rejects the edit and leaves the running graph untouched.
    pub fn apply_encoded(&mut self, bytes: &[u8]) -> Result<GraphUpdateKind, WireError> {
        let description = decode_graph(bytes, &self.settings.limits)?;
        Ok(self.apply(description))
    }

    /// Frees topologies the render side has retired. Returns how many.
    pub fn collect_retired(&self) -> usize {
        self.handoff.collect_retired()
    }

    /// The applied description.
    pub fn description(&self) -> &GraphDescription {
        &self.description
    }

    /// The current node table.
    pub fn node_table(&self) -> &Arc<NodeTable> {
        &self.node_table
    }

    /// Settings every build uses.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// The shared handoff.
    pub fn handoff(&self) -> &Arc<Handoff> {
        &self.handoff
    }

    fn publish(&self, description: &GraphDescription) {
        let topology = TopologyBuilder::build(
            &self.node_table,
            description,
            &self.settings.limits,
            self.settings.quantum_size,
        );
        let replaced = self.handoff.publish(Arc::new(topology));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_publish: topology published, replaced uncommitted: {}",
            replaced.is_some()
        );

        drop(replaced);
    }
}

impl core::fmt::Debug for GraphController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GraphController")
            .field("description", &self.description)
            .field("node_table", &self.node_table)
            .field("settings", &self.settings)
            .field("handoff", &self.handoff)
            .finish_non_exhaustive()
    }
}

/// Render half: owns the current topology and its render state.
///
/// Nothing here allocates, frees a topology, blocks, or logs.
pub struct GraphExecutor {
    handoff: Arc<Handoff>,
    topology: Arc<Topology>,
    state: RenderState,
    current_frame: u64,
}

impl GraphExecutor {
    /// Starts a render quantum at `frame`.
    ///
    /// Commits a pending topology if there is one, then invalidates the
    /// output cache. Returns true if a new topology was committed.
    pub fn begin_quantum(&mut self, frame: u64) -> bool {
        self.current_frame = frame;
        let committed = self.commit_pending();
        self.state.output_cache.begin_quantum();
        committed
    }

    /// Swaps in the pending topology, parking the current one and its render
    /// state for the control side.
    ///
    /// With every retired slot still occupied the commit is deferred to a
    /// later quantum. A pending plan whose state was already taken is retired
    /// unused.
    pub fn commit_pending(&mut self) -> bool {
        let Some(slot) = self.handoff.free_retired_slot() else {
            return false;
        };
        let Some(next) = self.handoff.take_pending() else {
            return false;
        };
        let Some(mut state) = next.take_render_state() else {
            slot.store(Some(next));
            return false;
        };
        state
            .output_cache
            .resume_from(self.state.output_cache.generation());

        let previous_state = std::mem::replace(&mut self.state, state);
        let previous = std::mem::replace(&mut self.topology, next);
        // Only the executor holding a plan locks its slot, so this parks.
        let _ = previous.park_render_state(previous_state);
        slot.store(Some(previous));
        true
    }

    /// The current topology.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Pre-sized scratch of the current topology.
    pub fn scratch_mut(&mut self) -> &mut RenderScratch {
        &mut self.state.scratch
    }

    /// Output memoization of the current topology.
    pub fn output_cache(&self) -> &OutputCache {
        &self.state.output_cache
    }

    /// Output memoization of the current topology, mutably.
    pub fn output_cache_mut(&mut self) -> &mut OutputCache {
        &mut self.state.output_cache
    }

    /// Frame passed to the last [`begin_quantum`](Self::begin_quantum).
    pub fn current_frame(&self) -> u64 {
        self.current_frame
    }

    /// Node-table indices of every analyser.
    pub fn analyser_indices(&self) -> &[usize] {
        self.topology.node_table().analyser_indices()
    }

    /// Parameter store of the node at node-table index `real_index`.
    pub fn param_store(&self, real_index: usize) -> Option<&ParamStore> {
        self.topology
            .node_table()
            .slot(real_index)
            .map(|slot| &slot.params)
    }
}

impl core::fmt::Debug for GraphExecutor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GraphExecutor")
            .field("nodes", &self.topology.len())
            .field("current_frame", &self.current_frame)
            .field("handoff", &self.handoff)
            .finish_non_exhaustive()
    }
}
