//! Per-quantum memoization of node outputs.
//!
//! Each compiled node has one [`CachedOutput`] slot per output port. A slot is
//! valid only while its generation equals the cache's current generation, so
//! starting a new quantum invalidates everything with a single increment.
//! The slot layout is fixed at build time; nothing here allocates afterwards.

/// One memoized output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CachedOutput {
    /// Generation the slot was written in; `0` means never.
    pub generation: u64,
    /// Handle of the bus holding the output, owned by the render consumer.
    pub bus: Option<usize>,
}

/// Output memoization table for one topology.
#[derive(Clone, Debug)]
pub struct OutputCache {
    slots: Vec<Vec<CachedOutput>>,
    generation: u64,
}

impl OutputCache {
    /// Creates a cache with `output_counts[i]` slots for node `i`.
    pub fn new(output_counts: impl IntoIterator<Item = usize>) -> Self {
        Self {
            slots: output_counts
                .into_iter()
                .map(|count| vec![CachedOutput::default(); count])
                .collect(),
            generation: 1,
        }
    }

    /// Returns the current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the number of nodes covered.
    pub fn node_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of output slots of `node`.
    pub fn output_count(&self, node: usize) -> usize {
        self.slots.get(node).map_or(0, Vec::len)
    }

    /// Continues numbering after a cache this one replaces, so generations
    /// keep increasing across a topology swap.
    pub fn resume_from(&mut self, generation: u64) {
        self.generation = self.generation.max(generation);
    }

    /// Invalidates every slot by advancing the generation.
    #[inline]
    pub fn begin_quantum(&mut self) {
        self.generation += 1;
    }

    /// Returns the bus stored for `(node, output)` this quantum, if any.
    #[inline]
    pub fn lookup(&self, node: usize, output: usize) -> Option<usize> {
        let slot = self.slots.get(node)?.get(output)?;
        if slot.generation == self.generation {
            slot.bus
        } else {
            None
        }
    }

    /// Records the bus for `(node, output)`; returns false if there is no such slot.
    #[inline]
    pub fn store(&mut self, node: usize, output: usize, bus: usize) -> bool {
        let generation = self.generation;
        match self.slots.get_mut(node).and_then(|outputs| outputs.get_mut(output)) {
            Some(slot) => {
                *slot = CachedOutput {
                    generation,
                    bus: Some(bus),
                };
                true
            }
            None => false,
        }
    }

    /// Clears every slot of `node`.
    pub fn invalidate(&mut self, node: usize) {
        if let Some(outputs) = self.slots.get_mut(node) {
            outputs.fill(CachedOutput::default());
        }
    }
}
