//! Render-safe parameter state.
//!
//! A [`ParamStore`] is written by the control thread and read by the render
//! thread without locks. Intrinsic values are `f32` bits in atomics;
//! automation timelines and the node's full description are published as
//! `arc-swap` snapshots. A parameter edit therefore never touches the compiled
//! topology.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use arc_swap::{ArcSwap, ArcSwapOption};

use crate::automation::GraphParamAutomation;
use crate::nodes::GraphNodeDescription;

/// Parameter values and automation of one node.
pub struct ParamStore {
    values: Box<[AtomicU32]>,
    automations: Box<[ArcSwapOption<GraphParamAutomation>]>,
    description: ArcSwap<GraphNodeDescription>,
}

impl ParamStore {
    /// Creates a store sized to `node`'s parameter layout.
    pub fn new<'a>(
        node: &GraphNodeDescription,
        automations: impl IntoIterator<Item = &'a GraphParamAutomation>,
    ) -> Self {
        let values: Box<[AtomicU32]> = node
            .param_values()
            .into_iter()
            .map(|value| AtomicU32::new(value.to_bits()))
            .collect();
        let automation_slots = (0..values.len()).map(|_| ArcSwapOption::empty()).collect();
        let store = Self {
            values,
            automations: automation_slots,
            description: ArcSwap::from_pointee(node.clone()),
        };
        store.store_automations(automations);
        store
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the node has no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the intrinsic value of parameter `index`.
    #[inline]
    pub fn value(&self, index: usize) -> Option<f32> {
        self.values
            .get(index)
            .map(|bits| f32::from_bits(bits.load(Ordering::Acquire)))
    }

    /// Overwrites the intrinsic value of parameter `index`.
    pub fn set_value(&self, index: usize, value: f32) -> bool {
        match self.values.get(index) {
            Some(bits) => {
                bits.store(value.to_bits(), Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Returns the automation of parameter `index`, if any.
    ///
    /// Only bumps a reference count; no allocation.
    pub fn automation(&self, index: usize) -> Option<Arc<GraphParamAutomation>> {
        self.automations.get(index)?.load_full()
    }

    /// Returns the node description last written by the control thread.
    pub fn description(&self) -> Arc<GraphNodeDescription> {
        self.description.load_full()
    }

    /// Publishes a parameter edit: new description, intrinsic values and automations.
    ///
    /// The layout is fixed at construction; extra values or automations
    /// targeting an out-of-range index are ignored.
    pub fn apply<'a>(
        &self,
        node: &GraphNodeDescription,
        automations: impl IntoIterator<Item = &'a GraphParamAutomation>,
    ) {
        self.description.store(Arc::new(node.clone()));
        for (index, value) in node.param_values().into_iter().enumerate() {
            self.set_value(index, value);
        }
        self.store_automations(automations);
    }

    fn store_automations<'a>(&self, automations: impl IntoIterator<Item = &'a GraphParamAutomation>) {
        let mut latest: Vec<Option<&GraphParamAutomation>> = vec![None; self.automations.len()];
        for automation in automations {
            if let Some(slot) = latest.get_mut(automation.param_index) {
                *slot = Some(automation);
            }
        }
        for (slot, automation) in self.automations.iter().zip(latest) {
            let unchanged = match (&*slot.load(), automation) {
                (Some(current), Some(new)) => !current.render_differs(new),
                (None, None) => true,
                _ => false,
            };
            if !unchanged {
                slot.store(automation.map(|a| Arc::new(a.clone())));
            }
        }
    }
}

impl core::fmt::Debug for ParamStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let values: Vec<f32> = (0..self.len()).filter_map(|i| self.value(i)).collect();
        f.debug_struct("ParamStore")
            .field("values", &values)
            .field("kind", &self.description.load().kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;
    use crate::nodes::{BiquadFilter, Gain};

    fn gain(value: f32) -> GraphNodeDescription {
        GraphNodeDescription::Gain(Gain {
            gain: value,
            ..Gain::default()
        })
    }

    #[test]
    fn test_layout_from_description() {
        let store = ParamStore::new(&GraphNodeDescription::BiquadFilter(BiquadFilter::default()), []);
        assert_eq!(store.len(), 4);
        assert_eq!(store.value(0), Some(350.0));
        assert_eq!(store.value(4), None);
    }

    #[test]
    fn test_apply_updates_values_and_description() {
        let store = ParamStore::new(&gain(1.0), []);
        store.apply(&gain(0.25), []);
        assert_eq!(store.value(0), Some(0.25));
        assert_eq!(*store.description(), gain(0.25));
    }

    #[test]
    fn test_automation_slots() {
        let id = NodeId::new(1);
        let automation = GraphParamAutomation::new(id, 0, 0.5);
        let out_of_range = GraphParamAutomation::new(id, 3, 0.5);
        let store = ParamStore::new(&gain(1.0), [&automation, &out_of_range]);
        assert_eq!(store.automation(0).as_deref(), Some(&automation));
        assert!(store.automation(3).is_none());

        store.apply(&gain(1.0), []);
        assert!(store.automation(0).is_none());
    }

    #[test]
    fn test_unchanged_automation_keeps_snapshot() {
        let id = NodeId::new(1);
        let automation = GraphParamAutomation::new(id, 0, 0.5);
        let store = ParamStore::new(&gain(1.0), [&automation]);
        let before = store.automation(0).unwrap();
        store.apply(&gain(1.0), [&automation]);
        let after = store.automation(0).unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }
}
