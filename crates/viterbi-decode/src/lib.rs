// crates/viterbi-decode/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! The two decoders this workspace exists to compare: [`OnlineViterbi`],
//! the bounded-latency streaming decoder built on `viterbi-columns` and
//! `viterbi-graph`, and [`StandardViterbi`], the full-table offline oracle
//! used to check it against.
//!
//! Grounded on `sezkp-fold`'s versioned streaming driver for the online
//! side's step-by-step API shape, and on `onlineViterbi.py` /
//! `standardViterbi.py` for both decoders' exact arithmetic.

pub mod online;
pub mod reference;

pub use online::OnlineViterbi;
pub use reference::StandardViterbi;
