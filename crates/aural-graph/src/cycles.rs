//! Cycle detection via Tarjan's strongly-connected-components algorithm.
//!
//! The graph is given as adjacency lists over dense indices, so the same
//! routine serves both the real node graph and the virtual graph produced by
//! delay splitting.

struct CycleSearch<'a> {
    edges: &'a [Vec<usize>],
    next_index: usize,
    index: Vec<Option<usize>>,
    low_link: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    in_cycle: Vec<bool>,
}

impl CycleSearch<'_> {
    fn strong_connect(&mut self, node: usize) {
        self.index[node] = Some(self.next_index);
        self.low_link[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;

        let edges = self.edges;
        let neighbours = edges.get(node).map_or(&[][..], Vec::as_slice);
        for &next in neighbours {
            if next >= self.index.len() {
                continue;
            }
            match self.index[next] {
                None => {
                    self.strong_connect(next);
                    self.low_link[node] = self.low_link[node].min(self.low_link[next]);
                }
                Some(next_index) if self.on_stack[next] => {
                    self.low_link[node] = self.low_link[node].min(next_index);
                }
                Some(_) => {}
            }
        }

        if Some(self.low_link[node]) != self.index[node] {
            return;
        }

        // `node` is the root of a component: pop it off the stack.
        let mut members = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack[member] = false;
            members.push(member);
            if member == node {
                break;
            }
        }

        let is_cycle = match members.as_slice() {
            [single] => neighbours.contains(single),
            _ => true,
        };
        if is_cycle {
            for member in members {
                self.in_cycle[member] = true;
            }
        }
    }
}

/// Marks every node that lies on a directed cycle.
///
/// Returns one flag per node in `0..node_count`. Nodes in a strongly connected
/// component of two or more members are marked; a lone node is marked only if
/// it has an edge to itself. Neighbour indices `>= node_count` are ignored.
///
/// # Example
///
/// ```rust
/// use aural_graph::nodes_in_cycles;
///
/// // 0 -> 1 -> 2 -> 1, 3 -> 3
/// let edges = vec![vec![1], vec![2], vec![1], vec![3]];
/// assert_eq!(nodes_in_cycles(4, &edges), vec![false, true, true, true]);
/// ```
pub fn nodes_in_cycles(node_count: usize, edges: &[Vec<usize>]) -> Vec<bool> {
    let mut search = CycleSearch {
        edges,
        next_index: 0,
        index: vec![None; node_count],
        low_link: vec![0; node_count],
        on_stack: vec![false; node_count],
        stack: Vec::with_capacity(node_count),
        in_cycle: vec![false; node_count],
    };
    for node in 0..node_count {
        if search.index[node].is_none() {
            search.strong_connect(node);
        }
    }
    search.in_cycle
}
