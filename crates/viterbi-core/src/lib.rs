// crates/viterbi-core/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Canonical types, log-space arithmetic, and the error surface shared
//! across the online-Viterbi workspace.

pub mod config;
pub mod error;
pub mod log;
pub mod types;

pub use error::Error;
pub use log::{blog, blog_sum, B};
pub use types::{check_initial_distribution, validate_step, HmmParams, Observation, State};
