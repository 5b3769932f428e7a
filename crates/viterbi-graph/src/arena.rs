// crates/viterbi-graph/src/arena.rs

//! Arena-backed survivor graph: append, compress, reclaim, and find the
//! convergence root. Grounded step-for-step on `onlineViterbi.py`'s
//! `compress` / `free_dummy_nodes` / `find_new_root`.

/// Stable handle into the survivor-graph arena.
pub type NodeId = usize;

#[derive(Clone, Copy, Debug)]
struct NodeData {
    state: usize,
    time: usize,
    parent: Option<NodeId>,
    num_children: i64,
    order_prev: Option<NodeId>,
    order_next: Option<NodeId>,
}

#[derive(Clone, Copy, Debug)]
enum Slot {
    Occupied(NodeData),
    Free(Option<NodeId>),
}

/// Read-only snapshot of a survivor node's fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeView {
    /// Hidden state this node represents.
    pub state: usize,
    /// Time index this node was appended at.
    pub time: usize,
    /// Parent handle, or `None` iff `time == 0`.
    pub parent: Option<NodeId>,
    /// Live-descendant count (may be decremented below zero transiently
    /// by `compress`'s dead-leaf bookkeeping; see `spec.md` §9).
    pub num_children: i64,
}

/// Result of a successful convergence advance: the new root and how far
/// it advanced relative to the frontier's current time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootAdvance {
    /// The newly discovered root node.
    pub new_root: NodeId,
    /// `current_tail.time - new_root.time`.
    pub delta_t: usize,
}

/// Time-ordered arena of survivor nodes, one forest per `K` hidden
/// states, supporting append, path compression, dead-leaf reclamation,
/// and root (convergence point) discovery.
#[derive(Clone, Debug)]
pub struct SurvivorGraph {
    k: usize,
    slots: Vec<Slot>,
    free_head: Option<NodeId>,
    order_head: Option<NodeId>,
    order_tail: Option<NodeId>,
    live_count: usize,
}

impl SurvivorGraph {
    /// Construct an empty graph for `k` hidden states.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            slots: Vec::new(),
            free_head: None,
            order_head: None,
            order_tail: None,
            live_count: 0,
        }
    }

    /// Number of hidden states this graph was built for.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of currently-live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Whether the graph holds no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// The most recently appended live node, if any.
    #[must_use]
    pub fn last(&self) -> Option<NodeId> {
        self.order_tail
    }

    /// Read-only snapshot of a live node's fields.
    ///
    /// # Panics
    /// Panics if `id` does not refer to a currently-live node; all
    /// `NodeId`s returned by this module refer to live nodes until
    /// explicitly reclaimed, so callers should not hold on to one across
    /// a `free_dummy_nodes` call.
    #[must_use]
    pub fn get(&self, id: NodeId) -> NodeView {
        match &self.slots[id] {
            Slot::Occupied(data) => NodeView {
                state: data.state,
                time: data.time,
                parent: data.parent,
                num_children: data.num_children,
            },
            Slot::Free(_) => panic!("viterbi-graph: NodeId {id} refers to a reclaimed node"),
        }
    }

    /// Walk `steps` hops backward in insertion order from `start`.
    ///
    /// Used by the decoder to locate a time-`t-1` node by its state,
    /// per `spec.md` §4.3: the `K` nodes of the previous step were
    /// appended in ascending state order, so the node for state `i*` is
    /// `K - i* - 1` hops behind the pre-step tail.
    #[must_use]
    pub fn node_backward_from(&self, start: NodeId, steps: usize) -> Option<NodeId> {
        let mut current = start;
        for _ in 0..steps {
            current = self.order_prev(current)?;
        }
        Some(current)
    }

    /// Append one new node at time `time` for hidden state `state`, with
    /// parent `parent` (must be `None` iff `time == 0`). Increments the
    /// parent's child count.
    pub fn append(&mut self, state: usize, time: usize, parent: Option<NodeId>) -> NodeId {
        if let Some(p) = parent {
            self.data_mut(p).num_children += 1;
        }
        let id = self.alloc(NodeData {
            state,
            time,
            parent,
            num_children: 0,
            order_prev: self.order_tail,
            order_next: None,
        });
        if let Some(tail) = self.order_tail {
            self.data_mut(tail).order_next = Some(id);
        } else {
            self.order_head = Some(id);
        }
        self.order_tail = Some(id);
        id
    }

    /// Single backward pass over the node list: shortcut parent pointers
    /// across unique-descendant chains, and decrement the parent count
    /// of dead leaves from earlier time steps.
    ///
    /// Mirrors `onlineViterbi.py`'s `compress`: the shortcut does not
    /// itself decrement any `num_children`; bypassed intermediates are
    /// picked up as dead leaves on a later pass (see `spec.md` §9).
    pub fn compress(&mut self, current_time: usize) {
        let mut cur = self.order_tail;
        while let Some(id) = cur {
            let data = self.data(id);
            let (time, num_children, prev_order) = (data.time, data.num_children, data.order_prev);

            if num_children == 0 && time != current_time {
                if let Some(p) = self.data(id).parent {
                    self.data_mut(p).num_children -= 1;
                }
            } else {
                loop {
                    let parent = self.data(id).parent;
                    let Some(p) = parent else { break };
                    if self.data(p).num_children != 1 {
                        break;
                    }
                    let grandparent = self.data(p).parent;
                    self.data_mut(id).parent = grandparent;
                }
            }

            cur = prev_order;
        }
    }

    /// Single backward pass: remove every node with `num_children <= 0`
    /// at a time other than `current_time`, returning its slot to the
    /// free list.
    pub fn free_dummy_nodes(&mut self, current_time: usize) {
        let mut cur = self.order_tail;
        while let Some(id) = cur {
            let data = self.data(id);
            let (time, num_children, prev_order) = (data.time, data.num_children, data.order_prev);

            if num_children <= 0 && time != current_time {
                self.unlink_and_free(id);
            }

            cur = prev_order;
        }
    }

    /// Attempt to advance the convergence root.
    ///
    /// `root` is the decoder's current root, if any. Returns `Some` with
    /// the new root and its `delta_t` (distance from the frontier's
    /// current time) when the root has advanced by at least one step;
    /// `None` otherwise (including when the forest has not yet merged).
    #[must_use]
    pub fn find_new_root(&self, root: Option<NodeId>) -> Option<RootAdvance> {
        if root.is_none() && !self.frontier_has_converged() {
            return None;
        }

        let tail = self.order_tail?;
        let tail_time = self.data(tail).time;

        let mut aux: Option<NodeId> = None;
        let mut current = Some(tail);
        while let Some(id) = current {
            if self.data(id).num_children >= 2 {
                aux = Some(id);
            }
            current = self.data(id).parent;
        }
        let aux = aux?;

        match root {
            None => {
                let delta_t = tail_time - self.data(aux).time;
                if delta_t == 0 {
                    None
                } else {
                    Some(RootAdvance {
                        new_root: aux,
                        delta_t,
                    })
                }
            }
            Some(r) if aux != r => {
                let delta_t = tail_time - self.data(aux).time;
                if delta_t == 0 {
                    None
                } else {
                    Some(RootAdvance {
                        new_root: aux,
                        delta_t,
                    })
                }
            }
            _ => None,
        }
    }

    /// Reset the graph to empty, for re-`initialization`.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.order_head = None;
        self.order_tail = None;
        self.live_count = 0;
    }

    /* ------------------------------ internals ------------------------------ */

    /// Phase 1 of `find_new_root`: walk each of the `K` frontier leaves'
    /// parent chains to their null-parent ancestor; the forest has
    /// merged iff all `K` resolve to the same ancestor.
    ///
    /// Grounded directly on `onlineViterbi.py`'s `find_new_root` (traced
    /// by hand, see `DESIGN.md`): despite `spec.md`'s Open Question
    /// suggesting the walk stops one hop short, stepping through the
    /// source shows `traced_root[i]` ends up holding the true
    /// null-parent ancestor, which is what this implements.
    fn frontier_has_converged(&self) -> bool {
        let Some(tail) = self.order_tail else {
            return false;
        };
        let mut leaf = Some(tail);
        let mut traced: Option<NodeId> = None;
        let mut first = true;

        for _ in 0..self.k {
            let Some(leaf_id) = leaf else {
                return false;
            };
            let ancestor = self.null_parent_ancestor(leaf_id);
            if first {
                traced = ancestor;
                first = false;
            } else if ancestor != traced {
                return false;
            }
            leaf = self.order_prev(leaf_id);
        }
        true
    }

    fn null_parent_ancestor(&self, start: NodeId) -> Option<NodeId> {
        let mut current = Some(start);
        let mut last_seen = None;
        while let Some(id) = current {
            last_seen = Some(id);
            current = self.data(id).parent;
        }
        last_seen
    }

    fn order_prev(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).order_prev
    }

    fn data(&self, id: NodeId) -> &NodeData {
        match &self.slots[id] {
            Slot::Occupied(data) => data,
            Slot::Free(_) => panic!("viterbi-graph: NodeId {id} refers to a reclaimed node"),
        }
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        match &mut self.slots[id] {
            Slot::Occupied(data) => data,
            Slot::Free(_) => panic!("viterbi-graph: NodeId {id} refers to a reclaimed node"),
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.live_count += 1;
        if let Some(id) = self.free_head {
            let next_free = match self.slots[id] {
                Slot::Free(next) => next,
                Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
            };
            self.free_head = next_free;
            self.slots[id] = Slot::Occupied(data);
            id
        } else {
            self.slots.push(Slot::Occupied(data));
            self.slots.len() - 1
        }
    }

    fn unlink_and_free(&mut self, id: NodeId) {
        let (prev, next) = {
            let data = self.data(id);
            (data.order_prev, data.order_next)
        };
        match prev {
            Some(p) => self.data_mut(p).order_next = next,
            None => self.order_head = next,
        }
        match next {
            Some(n) => self.data_mut(n).order_prev = prev,
            None => self.order_tail = prev,
        }
        self.slots[id] = Slot::Free(self.free_head);
        self.free_head = Some(id);
        self.live_count -= 1;
    }
}
