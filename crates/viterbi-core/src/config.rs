// crates/viterbi-core/src/config.rs

//! JSON configuration loading for HMM instances.
//!
//! Grounded on `sezkp-core`'s `io.rs`: a thin, explicit read path with
//! `with_context`-style error wrapping, kept here as plain `std::io`
//! rather than pulling in `ciborium`/CBOR, since model files are small
//! and human-edited rather than streamed.

use crate::types::HmmParams;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// On-disk representation of a full HMM instance: dimensions, matrices,
/// and the initial distribution, as loaded by `viterbi-cli --model`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModelFile {
    /// Number of hidden states.
    pub k: usize,
    /// Number of observation symbols.
    pub m: usize,
    /// Nominal window length for the terminal flush / oracle horizon.
    pub t: usize,
    /// Initial distribution, length `k`.
    pub pi: Vec<f64>,
    /// Transition matrix, `k x k`.
    pub a: Vec<Vec<f64>>,
    /// Emission matrix, `k x m`.
    pub e: Vec<Vec<f64>>,
}

/// Read a [`ModelFile`] from a JSON path.
///
/// # Errors
/// Returns an error if the file cannot be opened or does not parse as a
/// well-formed `ModelFile`. Dimension/probability checks are left to
/// [`HmmParams::new`] so callers see the same typed errors regardless of
/// where the parameters came from.
pub fn load_model_json<P: AsRef<Path>>(path: P) -> anyhow::Result<ModelFile> {
    use anyhow::Context;
    let path_ref = path.as_ref();
    let f = File::open(path_ref)
        .with_context(|| format!("open model file {}", path_ref.display()))?;
    let rdr = BufReader::new(f);
    let model: ModelFile =
        serde_json::from_reader(rdr).with_context(|| "deserialize JSON model file")?;
    Ok(model)
}

impl ModelFile {
    /// Validate and convert into [`HmmParams`] (dropping `t`/`pi`, which
    /// the decoder consumes separately via `initialization`).
    ///
    /// # Errors
    /// Propagates [`crate::Error`] from [`HmmParams::new`].
    pub fn into_hmm_params(self) -> crate::Result<HmmParams> {
        HmmParams::new(self.k, self.m, self.a, self.e)
    }
}
