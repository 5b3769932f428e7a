// crates/viterbi-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::info;
use viterbi_core::config::load_model_json;
use viterbi_decode::{OnlineViterbi, StandardViterbi};

#[derive(Parser, Debug)]
#[command(
    name = "viterbi-cli",
    about = "Online Viterbi decoder reference CLI",
    long_about = "Online Viterbi decoder reference CLI.\n\nRun the bounded-latency streaming decoder against a model, check it against the full-table oracle, and benchmark it over synthetic sequences.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    /// Emit debug-level tracing (root advances, window flushes).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Decode a synthetic observation sequence with both decoders and
    /// report whether the streaming decoder's output matches the oracle.
    Run {
        /// Path to a JSON model file (see `viterbi_core::config::ModelFile`).
        #[arg(long)]
        model: PathBuf,

        /// Hidden state fixed at the window's virtual t=-1 boundary.
        #[arg(long, default_value_t = 0)]
        starting_state: usize,

        /// Optional path to a newline-separated list of observation
        /// indices (length must equal the model's `t`). Without this, a
        /// deterministic synthetic sequence is generated.
        #[arg(long)]
        observations: Option<PathBuf>,
    },

    /// Run the streaming decoder over synthetic sequences repeatedly,
    /// appending per-stage timings to a CSV report.
    Bench {
        /// Path to a JSON model file.
        #[arg(long)]
        model: PathBuf,

        /// Number of repetitions.
        #[arg(long, default_value_t = 5)]
        repeats: u32,

        /// Directory to write the CSV report into.
        #[arg(long, default_value = "reports")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Cmd::Run {
            model,
            starting_state,
            observations,
        } => run(&model, starting_state, observations.as_deref()),
        Cmd::Bench {
            model,
            repeats,
            out_dir,
        } => bench(&model, repeats, &out_dir),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating directory {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Deterministic synthetic observation sequence, in lieu of an
/// `--observations` file: avoids pulling in system randomness for a demo
/// path, matching `caseViterbi.py`'s use of a fixed pattern.
fn synthetic_observations(t: usize, m: usize, starting_state: usize) -> Vec<usize> {
    (0..t)
        .map(|i| (i * 7 + starting_state + 3) % m.max(1))
        .collect()
}

fn read_observations(path: &Path, t: usize, m: usize) -> Result<Vec<usize>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading observations from {}", path.display()))?;
    let obs: Vec<usize> = text
        .split_whitespace()
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .context("parsing observation indices")?;
    if obs.len() != t {
        anyhow::bail!(
            "observation file has {} entries, model declares t={t}",
            obs.len()
        );
    }
    for &o in &obs {
        if o >= m {
            anyhow::bail!("observation {o} out of range for alphabet size {m}");
        }
    }
    Ok(obs)
}

fn run(model_path: &Path, starting_state: usize, observations: Option<&Path>) -> Result<()> {
    let model = load_model_json(model_path)
        .with_context(|| format!("loading model {}", model_path.display()))?;
    info!(k = model.k, m = model.m, t = model.t, "loaded model");

    let observations = match observations {
        Some(path) => read_observations(path, model.t, model.m)?,
        None => synthetic_observations(model.t, model.m, starting_state),
    };

    let mut online = OnlineViterbi::new(model.k, model.t)?;
    online.initialization(starting_state, &model.pi)?;
    for (t, &obs) in observations.iter().enumerate() {
        online.update(t, obs, &model.a, &model.e)?;
    }
    online.traceback_last_part();

    let mut oracle = StandardViterbi::new(model.k, model.t)?;
    oracle.viterbi(&observations, &model.pi, &model.a, &model.e)?;

    let online_path = online.decoded_stream();
    let oracle_path = oracle.optimal_path();

    if online_path == oracle_path {
        println!(
            "OK: streaming decoder matches the oracle over {} steps ({} survivor-graph nodes retained)",
            model.t,
            online.node_count()
        );
    } else {
        let divergence = online_path
            .iter()
            .zip(oracle_path)
            .position(|(a, b)| a != b)
            .unwrap_or(online_path.len().min(oracle_path.len()));
        println!(
            "MISMATCH: streaming and oracle decoders first disagree at t={divergence} (online={:?}, oracle={:?})",
            online_path.get(divergence),
            oracle_path.get(divergence)
        );
    }

    Ok(())
}

fn bench(model_path: &Path, repeats: u32, out_dir: &Path) -> Result<()> {
    let model = load_model_json(model_path)
        .with_context(|| format!("loading model {}", model_path.display()))?;

    fs::create_dir_all(out_dir).ok();
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before UNIX_EPOCH")?
        .as_secs();
    let csv_path = out_dir.join(format!("bench-{ts}.csv"));
    ensure_parent_dir(&csv_path)?;
    let mut csv = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&csv_path)?;
    writeln!(csv, "timestamp,k,t,m,repeat,stage,ms,nodes")?;

    for rep in 0..repeats {
        let observations = synthetic_observations(model.t, model.m, rep as usize % model.k.max(1));

        let t0 = Instant::now();
        let mut online = OnlineViterbi::new(model.k, model.t)?;
        online.initialization(0, &model.pi)?;
        for (t, &obs) in observations.iter().enumerate() {
            online.update(t, obs, &model.a, &model.e)?;
        }
        online.traceback_last_part();
        let online_ms = t0.elapsed().as_millis();
        let nodes = online.node_count();

        writeln!(
            csv,
            "{ts},{},{},{},{rep},online,{online_ms},{nodes}",
            model.k, model.t, model.m
        )?;

        let t0 = Instant::now();
        let mut oracle = StandardViterbi::new(model.k, model.t)?;
        oracle.viterbi(&observations, &model.pi, &model.a, &model.e)?;
        let oracle_ms = t0.elapsed().as_millis();

        writeln!(
            csv,
            "{ts},{},{},{},{rep},oracle,{oracle_ms},",
            model.k, model.t, model.m
        )?;
    }

    println!("Wrote report -> {}", csv_path.display());
    Ok(())
}
