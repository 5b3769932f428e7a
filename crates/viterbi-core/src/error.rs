// crates/viterbi-core/src/error.rs

//! Typed failure kinds for the online-Viterbi workspace.
//!
//! The teacher crate (`sezkp-core`) leans on `anyhow::Result` end to end,
//! but this spec's external contract names four distinct, matchable
//! failure kinds (see `spec.md` §7), so this crate exposes a small
//! `thiserror` enum instead: a library boundary, unlike `sezkp-cli`'s
//! binary boundary, benefits from callers being able to match on
//! `Error::OutOfOrder { .. }` rather than grepping a formatted string.

use thiserror::Error as ThisError;

/// Failure kinds surfaced by `viterbi-core`, `viterbi-columns`,
/// `viterbi-graph`, and `viterbi-decode`.
#[derive(Debug, ThisError, Clone, PartialEq)]
pub enum Error {
    /// `K < 1`, `T < 1`, or a matrix/vector dimension mismatch.
    #[error("invalid dimension: {detail}")]
    InvalidDimension {
        /// Human-readable detail (which dimension, expected vs. got).
        detail: String,
    },

    /// Observation index outside `[0, M)`.
    #[error("observation {observation} out of range for alphabet size {m}")]
    InvalidObservation {
        /// The offending observation index.
        observation: usize,
        /// Alphabet size `M`.
        m: usize,
    },

    /// Negative entry in `A`, `E`, or `π`.
    #[error("invalid probability: {detail}")]
    InvalidProbability {
        /// Human-readable detail (which matrix/entry).
        detail: String,
    },

    /// `update` called with `t` that does not follow `(previous_t + 1) mod T`.
    #[error("observations delivered out of order: expected t={expected}, got t={got}")]
    OutOfOrder {
        /// The time index that was expected next.
        expected: usize,
        /// The time index actually supplied.
        got: usize,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
