// crates/viterbi-graph/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! The survivor-path graph: a dynamically pruned, compressed back-pointer
//! forest over time, plus the convergence (root) detector.
//!
//! Grounded on `sezkp-scheduler`'s arena-of-handles style (small `Copy`
//! indices standing in for `Interval`/tree-node identity, rather than
//! `Rc<RefCell<..>>` back-pointers). Nodes live in a `Vec`-backed arena
//! with a free list so reclaimed slots are reused and the live set stays
//! bounded by the current survivor-graph size, not by total history.

pub mod arena;

pub use arena::{NodeId, NodeView, RootAdvance, SurvivorGraph};
