// crates/viterbi-decode/src/online.rs

//! The streaming decoder: bounded-latency Viterbi decoding via the
//! survivor-path graph's convergence detector, directly grounded on
//! `onlineViterbi.py`'s `OnlineViterbi` class.

use viterbi_core::{blog, blog_sum, check_initial_distribution, validate_step, Error, Result, B};
use viterbi_columns::ColumnStore;
use viterbi_graph::{NodeId, RootAdvance, SurvivorGraph};

/// Online Viterbi decoder: consumes one observation per `update` call and
/// emits decoded states in bounded-latency bursts whenever the survivor
/// forest converges on a new root, plus a final flush via
/// `traceback_last_part` once the window ends.
#[derive(Debug)]
pub struct OnlineViterbi {
    k: usize,
    t_window: usize,
    columns: ColumnStore,
    graph: SurvivorGraph,
    root: Option<NodeId>,
    prev_root: Option<NodeId>,
    delta_t: usize,
    decoded_stream: Vec<usize>,
    next_t: usize,
    initialized: bool,
}

impl OnlineViterbi {
    /// Construct a decoder for `k` hidden states over a window of nominal
    /// length `t_window`. [`Self::initialization`] must be called before
    /// the first [`Self::update`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidDimension`] if `k < 1` or `t_window < 1`.
    pub fn new(k: usize, t_window: usize) -> Result<Self> {
        if k < 1 {
            return Err(Error::InvalidDimension {
                detail: "K must be >= 1".into(),
            });
        }
        if t_window < 1 {
            return Err(Error::InvalidDimension {
                detail: "T must be >= 1".into(),
            });
        }
        Ok(Self {
            k,
            t_window,
            columns: ColumnStore::new(),
            graph: SurvivorGraph::new(k),
            root: None,
            prev_root: None,
            delta_t: 0,
            decoded_stream: Vec::new(),
            next_t: 0,
            initialized: false,
        })
    }

    /// Number of hidden states.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Nominal window length this decoder was constructed for.
    #[must_use]
    pub fn t_window(&self) -> usize {
        self.t_window
    }

    /// States decoded so far, oldest first.
    #[must_use]
    pub fn decoded_stream(&self) -> &[usize] {
        &self.decoded_stream
    }

    /// Number of live nodes currently held by the survivor graph. Exposed
    /// for the bounded-memory property checks in `spec.md` §8.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.len()
    }

    /// Reset the decoder for a new window starting at `t = 0`, fixing the
    /// hidden state at `t = -1` (conceptually) to `starting_state` with
    /// log-prior `initial`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDimension`] if `initial.len() != k`, and
    /// [`Error::InvalidProbability`] if any entry of `initial` is negative.
    pub fn initialization(&mut self, starting_state: usize, initial: &[f64]) -> Result<()> {
        check_initial_distribution(initial, self.k)?;

        self.columns.clear();
        self.graph.clear();
        self.root = None;
        self.prev_root = None;
        self.delta_t = 0;
        self.decoded_stream.clear();
        self.next_t = 0;
        self.initialized = true;

        let prob: Vec<f64> = initial.iter().map(|&p| blog(p)).collect();
        let state = vec![starting_state; self.k];
        self.columns.append_column(prob, state);
        Ok(())
    }

    /// Feed one observation at time `t`, advancing the decoder by one
    /// column and, if the survivor forest converges, emitting a burst of
    /// newly-decided states via [`Self::decoded_stream`].
    ///
    /// # Errors
    /// Returns [`Error::OutOfOrder`] if `t` does not follow the previous
    /// call (or `0`, if [`Self::initialization`] has not yet run),
    /// [`Error::InvalidDimension`] if `a`/`e` are not shaped `K x K` /
    /// `K x M`, and [`Error::InvalidObservation`] if `observation >= M`.
    pub fn update(
        &mut self,
        t: usize,
        observation: usize,
        a: &[Vec<f64>],
        e: &[Vec<f64>],
    ) -> Result<()> {
        if !self.initialized || t != self.next_t {
            return Err(Error::OutOfOrder {
                expected: if self.initialized { self.next_t } else { 0 },
                got: t,
            });
        }
        let m = validate_step(self.k, a, e)?;
        if observation >= m {
            return Err(Error::InvalidObservation { observation, m });
        }

        let last_prob = self
            .columns
            .last()
            .expect("initialization appends a column before the first update")
            .prob
            .clone();

        let mut p_col = vec![B; self.k];
        let mut s_col = vec![0usize; self.k];
        for j in 0..self.k {
            let mut best_val = B;
            let mut best_i = 0usize;
            for i in 0..self.k {
                let aux = blog_sum(last_prob[i], blog(a[i][j]), &[blog(e[j][observation])]);
                if aux > best_val {
                    best_val = aux;
                    best_i = i;
                }
            }
            p_col[j] = best_val;
            s_col[j] = best_i;
        }

        let pre_step_tail = self.graph.last();
        for j in 0..self.k {
            let parent = if t == 0 {
                None
            } else {
                let base = pre_step_tail.expect("graph has a tail once t > 0");
                let steps_back = self.k - s_col[j] - 1;
                self.graph.node_backward_from(base, steps_back)
            };
            self.graph.append(j, t, parent);
        }

        self.columns.append_column(p_col, s_col);
        self.graph.compress(t);
        self.graph.free_dummy_nodes(t);

        if let Some(advance) = self.graph.find_new_root(self.root) {
            self.apply_root_advance(advance);
        }

        self.next_t = t + 1;
        Ok(())
    }

    /// Flush the remaining undecided suffix at the end of a window,
    /// without removing columns (the store is about to be reset by the
    /// next [`Self::initialization`] anyway).
    ///
    /// # Panics
    /// Panics if called before [`Self::initialization`] has ever run for
    /// this decoder; that is a caller bug, not a data error, so it is not
    /// one of `viterbi_core::Error`'s kinds.
    pub fn traceback_last_part(&mut self) {
        let last = self
            .columns
            .last()
            .expect("traceback_last_part requires initialization to have been called first");

        let mut output = 0usize;
        let mut best = f64::NEG_INFINITY;
        for (j, &v) in last.prob.iter().enumerate() {
            if v > best {
                best = v;
                output = j;
            }
        }
        let mut interim = vec![output];

        let depth = match self.root {
            None => self.t_window.saturating_sub(1),
            Some(r) => {
                let root_time = self.graph.get(r).time;
                self.t_window - 1 - root_time - 1
            }
        };

        for offset in 0..depth {
            let col = self
                .columns
                .get_from_tail(offset)
                .expect("column must exist at offset within the current window");
            output = col.state[output];
            interim.push(output);
        }

        interim.reverse();
        let emitted = interim.len();
        self.decoded_stream.extend(interim);
        tracing::debug!(emitted, "window flushed");
    }

    fn apply_root_advance(&mut self, advance: RootAdvance) {
        let old_root = self.root;
        self.prev_root = old_root;
        self.root = Some(advance.new_root);
        self.delta_t = advance.delta_t;
        self.traceback(advance.delta_t);
        tracing::debug!(
            delta_t = advance.delta_t,
            node_count = self.graph.len(),
            "root advanced"
        );
    }

    /// Read off the newly-decided run from `root` back to `prev_root`
    /// (exclusive), then drop the now-unneeded head of the column store.
    fn traceback(&mut self, delta_t: usize) {
        let root_id = self.root.expect("apply_root_advance always sets root first");
        let root_view = self.graph.get(root_id);
        let mut output = root_view.state;
        let mut interim = vec![output];

        let depth = match self.prev_root {
            None => root_view.time,
            Some(pr) => root_view.time - self.graph.get(pr).time - 1,
        };

        for offset in delta_t..delta_t + depth {
            let col = self
                .columns
                .get_from_tail(offset)
                .expect("column must exist between prev_root and root");
            output = col.state[output];
            interim.push(output);
        }

        let to_drop = self.columns.len().saturating_sub(delta_t);
        self.columns.drop_head_n(to_drop);

        interim.reverse();
        self.decoded_stream.extend(interim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A 2-state HMM that locks onto state 0 after the first observation
    // regardless of what follows: A strongly favours staying in state 0,
    // E favours the observed symbol only in state 0.
    fn sticky_params() -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let a = vec![vec![0.99, 0.01], vec![0.01, 0.99]];
        let e = vec![vec![0.9, 0.1], vec![0.1, 0.9]];
        (a, e)
    }

    #[test]
    fn decoded_stream_length_matches_observation_count_after_flush() {
        let (a, e) = sticky_params();
        let mut dec = OnlineViterbi::new(2, 5).unwrap();
        dec.initialization(0, &[0.5, 0.5]).unwrap();
        for t in 0..5 {
            dec.update(t, 0, &a, &e).unwrap();
        }
        dec.traceback_last_part();
        assert_eq!(dec.decoded_stream().len(), 5);
    }

    #[test]
    fn k_one_decodes_trivially_via_terminal_flush() {
        let a = vec![vec![1.0]];
        let e = vec![vec![1.0, 1.0]];
        let mut dec = OnlineViterbi::new(1, 4).unwrap();
        dec.initialization(0, &[1.0]).unwrap();
        for t in 0..4 {
            dec.update(t, t % 2, &a, &e).unwrap();
        }
        assert_eq!(dec.node_count(), 4); // root never found for K=1
        dec.traceback_last_part();
        assert_eq!(dec.decoded_stream(), &[0, 0, 0, 0]);
    }

    #[test]
    fn out_of_order_update_is_rejected() {
        let (a, e) = sticky_params();
        let mut dec = OnlineViterbi::new(2, 5).unwrap();
        dec.initialization(0, &[0.5, 0.5]).unwrap();
        dec.update(0, 0, &a, &e).unwrap();
        let err = dec.update(2, 0, &a, &e).unwrap_err();
        assert!(matches!(err, Error::OutOfOrder { expected: 1, got: 2 }));
    }

    #[test]
    fn update_before_initialization_is_out_of_order() {
        let (a, e) = sticky_params();
        let mut dec = OnlineViterbi::new(2, 5).unwrap();
        let err = dec.update(0, 0, &a, &e).unwrap_err();
        assert!(matches!(err, Error::OutOfOrder { expected: 0, got: 0 }));
    }

    #[test]
    fn out_of_range_observation_is_rejected() {
        let (a, e) = sticky_params();
        let mut dec = OnlineViterbi::new(2, 5).unwrap();
        dec.initialization(0, &[0.5, 0.5]).unwrap();
        let err = dec.update(0, 7, &a, &e).unwrap_err();
        assert!(matches!(err, Error::InvalidObservation { observation: 7, m: 2 }));
    }

    #[test]
    fn reinitialization_resets_decoded_stream_and_node_count() {
        let (a, e) = sticky_params();
        let mut dec = OnlineViterbi::new(2, 3).unwrap();
        dec.initialization(0, &[0.5, 0.5]).unwrap();
        for t in 0..3 {
            dec.update(t, 0, &a, &e).unwrap();
        }
        dec.traceback_last_part();
        assert_eq!(dec.decoded_stream().len(), 3);

        dec.initialization(1, &[0.5, 0.5]).unwrap();
        assert!(dec.decoded_stream().is_empty());
        assert_eq!(dec.node_count(), 0);
    }

    #[test]
    fn converging_forest_emits_a_root_advance_before_the_window_ends() {
        let (a, e) = sticky_params();
        let mut dec = OnlineViterbi::new(2, 50).unwrap();
        dec.initialization(0, &[0.5, 0.5]).unwrap();
        for t in 0..40 {
            dec.update(t, 0, &a, &e).unwrap();
        }
        // With strongly sticky transitions the forest should have merged
        // and emitted a prefix well before t=40, keeping the graph small.
        assert!(!dec.decoded_stream().is_empty());
        assert!(dec.node_count() < 50);
    }
}
