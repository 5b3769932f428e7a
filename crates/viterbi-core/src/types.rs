// crates/viterbi-core/src/types.rs

//! Canonical HMM parameter types, broadly re-exported at the crate root so
//! other crates in the workspace import via `viterbi_core::HmmParams`, etc.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Hidden-state index in `[0, K)`.
pub type State = usize;

/// Observation-alphabet index in `[0, M)`.
pub type Observation = usize;

/// Immutable HMM parameters for a single run: transition matrix `A`,
/// emission matrix `E`, initial distribution `π`, and their declared
/// dimensions `K` (hidden states) and `M` (alphabet size).
///
/// Rows of `A` need not sum to 1 for correctness; zero entries are common
/// and expected (they simply route to the log floor [`crate::B`]).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HmmParams {
    /// Number of hidden states.
    pub k: usize,
    /// Number of observation symbols.
    pub m: usize,
    /// Transition matrix, `K x K`.
    pub a: Vec<Vec<f64>>,
    /// Emission matrix, `K x M`.
    pub e: Vec<Vec<f64>>,
}

impl HmmParams {
    /// Construct and validate an `HmmParams` instance.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDimension`] if `k < 1`, `m < 1`, or `a`/`e`
    /// do not have the declared shapes, and [`Error::InvalidProbability`]
    /// if any entry of `a` or `e` is negative.
    pub fn new(k: usize, m: usize, a: Vec<Vec<f64>>, e: Vec<Vec<f64>>) -> Result<Self> {
        if k < 1 {
            return Err(Error::InvalidDimension {
                detail: "K must be >= 1".into(),
            });
        }
        if m < 1 {
            return Err(Error::InvalidDimension {
                detail: "M must be >= 1".into(),
            });
        }
        if a.len() != k || a.iter().any(|row| row.len() != k) {
            return Err(Error::InvalidDimension {
                detail: format!("A must be {k}x{k}"),
            });
        }
        if e.len() != k || e.iter().any(|row| row.len() != m) {
            return Err(Error::InvalidDimension {
                detail: format!("E must be {k}x{m}"),
            });
        }
        check_nonnegative(a.iter().flatten(), "A")?;
        check_nonnegative(e.iter().flatten(), "E")?;
        Ok(Self { k, m, a, e })
    }

    /// Validate an observation index against `self.m`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidObservation`] if `observation >= self.m`.
    pub fn check_observation(&self, observation: Observation) -> Result<()> {
        if observation >= self.m {
            return Err(Error::InvalidObservation {
                observation,
                m: self.m,
            });
        }
        Ok(())
    }
}

/// Validate an initial distribution `π` against a declared `K`.
///
/// # Errors
/// Returns [`Error::InvalidDimension`] if `initial.len() != k`, and
/// [`Error::InvalidProbability`] if any entry is negative.
pub fn check_initial_distribution(initial: &[f64], k: usize) -> Result<()> {
    if initial.len() != k {
        return Err(Error::InvalidDimension {
            detail: format!("initial distribution must have length {k}"),
        });
    }
    check_nonnegative(initial.iter(), "initial distribution")
}

/// Validate a transition matrix `a` (`K x K`) and emission matrix `e`
/// (`K x M`, `M` inferred from `e`'s row length) supplied for a single
/// decoder step, returning the inferred `M`.
///
/// The online decoder takes `A`/`E` per call rather than storing a fixed
/// `HmmParams`, since the source process this models may vary its model
/// from step to step; this is the per-call equivalent of
/// [`HmmParams::new`]'s shape/sign checks.
///
/// # Errors
/// Returns [`Error::InvalidDimension`] if `a` is not `K x K` or `e`'s rows
/// are not all the same length, and [`Error::InvalidProbability`] if any
/// entry of `a` or `e` is negative.
pub fn validate_step(k: usize, a: &[Vec<f64>], e: &[Vec<f64>]) -> Result<usize> {
    if a.len() != k || a.iter().any(|row| row.len() != k) {
        return Err(Error::InvalidDimension {
            detail: format!("A must be {k}x{k}"),
        });
    }
    if e.len() != k {
        return Err(Error::InvalidDimension {
            detail: format!("E must have {k} rows"),
        });
    }
    let m = e.first().map_or(0, Vec::len);
    if e.iter().any(|row| row.len() != m) {
        return Err(Error::InvalidDimension {
            detail: "E rows must all have the same length".into(),
        });
    }
    check_nonnegative(a.iter().flatten(), "A")?;
    check_nonnegative(e.iter().flatten(), "E")?;
    Ok(m)
}

fn check_nonnegative<'a>(values: impl Iterator<Item = &'a f64>, which: &str) -> Result<()> {
    for &v in values {
        if v < 0.0 {
            return Err(Error::InvalidProbability {
                detail: format!("{which} contains a negative entry ({v})"),
            });
        }
    }
    Ok(())
}
