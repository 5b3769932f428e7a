// crates/viterbi-columns/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Double-ended column store: a time-indexed sequence of paired
//! (probability, back-state) columns with O(1) amortized append and O(n)
//! bulk removal from either end.
//!
//! Grounded on `sezkp-trace`'s envelope/I/O style, generalized from a
//! file-backed trace into the in-memory sequence the online decoder
//! appends to on every step and drains during traceback. `spec.md` §9
//! notes that a deque suffices here, since the decoder only ever removes
//! a contiguous run anchored at one end per call; see `viterbi-decode`
//! for why that holds.

pub mod store;

pub use store::{Column, ColumnStore};
