use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dyngeo::api::{populate, AlgoId, Construction, RandomCfg, ReplayToken};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod script;
mod state;

use provenance::{write_sidecar, Sidecar};
use script::Script;
use state::{dump, sweep, write_table, Sweep};

#[derive(Parser)]
#[command(name = "dyngeo")]
#[command(about = "Replay, sweep and inspect dynamic geometry constructions")]
struct Cmd {
    /// Log every recomputation step
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Replay a script and print the state of every object as JSON
    Run {
        script: PathBuf,
        /// Write the JSON here (plus a provenance sidecar) instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Drive a free number through a range and tabulate every point
    Sweep {
        script: PathBuf,
        #[arg(long)]
        param: String,
        #[arg(long)]
        from: f64,
        #[arg(long)]
        to: f64,
        #[arg(long, default_value_t = 50)]
        steps: usize,
        /// `.csv` or `.parquet`
        #[arg(long)]
        out: PathBuf,
    },
    /// Build a reproducible random construction and print its state
    Random {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        index: u64,
        #[arg(long, default_value_t = 6)]
        points: usize,
        #[arg(long, default_value_t = 20)]
        steps: usize,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the polynomial encoding of every algorithm in a script
    Prove { script: PathBuf },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::TRACE } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Run { script, out } => run(&script, out.as_deref()),
        Action::Sweep {
            script,
            param,
            from,
            to,
            steps,
            out,
        } => run_sweep(
            &script,
            Sweep {
                param,
                from,
                to,
                steps,
            },
            &out,
        ),
        Action::Random {
            seed,
            index,
            points,
            steps,
            out,
        } => random(
            ReplayToken::new(seed, index),
            RandomCfg {
                free_points: points,
                steps,
                ..RandomCfg::default()
            },
            out.as_deref(),
        ),
        Action::Prove { script } => prove(&script),
        Action::Report => report(),
    }
}

fn emit(cons: &Construction, out: Option<&Path>, sidecar: Sidecar) -> Result<()> {
    let body = serde_json::to_string_pretty(&dump(cons))?;
    match out {
        None => println!("{body}"),
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
            write_sidecar(path, &sidecar)?;
            tracing::info!(out = %path.display(), "states written");
        }
    }
    Ok(())
}

fn run(path: &Path, out: Option<&Path>) -> Result<()> {
    let script = Script::load(path)?;
    let cons = script.build()?;
    tracing::info!(
        script = %path.display(),
        objects = cons.store().objects().count(),
        algorithms = cons.store().algorithms().count(),
        "replayed"
    );
    let sidecar = Sidecar::new("run", json!({}), &cons).with_script(path, &script);
    emit(&cons, out, sidecar)
}

fn run_sweep(path: &Path, s: Sweep, out: &Path) -> Result<()> {
    let script = Script::load(path)?;
    let mut cons = script.build()?;
    let mut df = sweep(&mut cons, &s)?;
    write_table(&mut df, out)?;
    let params = json!({
        "param": s.param,
        "from": s.from,
        "to": s.to,
        "steps": s.steps,
    });
    write_sidecar(out, &Sidecar::new("sweep", params, &cons).with_script(path, &script))?;
    tracing::info!(out = %out.display(), rows = df.height(), "sweep written");
    Ok(())
}

fn random(tok: ReplayToken, cfg: RandomCfg, out: Option<&Path>) -> Result<()> {
    let mut cons = Construction::new();
    let algos = populate(&mut cons, cfg, tok)?;
    tracing::info!(seed = tok.seed, index = tok.index, algorithms = algos.len(), "random construction");
    let params = json!({
        "seed": tok.seed,
        "index": tok.index,
        "points": cfg.free_points,
        "steps": cfg.steps,
    });
    let sidecar = Sidecar::new("random", params, &cons);
    emit(&cons, out, sidecar)
}

fn prove(script: &Path) -> Result<()> {
    let mut cons = Script::load(script)?.build()?;
    let ids: Vec<AlgoId> = cons.store().algorithms().map(|n| n.id).collect();
    let mut report = Vec::with_capacity(ids.len());
    for id in ids {
        let kind = cons.algorithm(id).map(|n| n.kind.name()).unwrap_or("?");
        let entry = match cons.encode_for_proof(id) {
            Ok(polys) => json!({
                "algorithm": id.to_string(),
                "kind": kind,
                "polynomials": polys.iter().map(ToString::to_string).collect::<Vec<_>>(),
            }),
            Err(e) => json!({
                "algorithm": id.to_string(),
                "kind": kind,
                "unsupported": e.to_string(),
                "permanent": e.is_permanent(),
            }),
        };
        report.push(entry);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn report() -> Result<()> {
    let doc = json!({
        "dyngeo": dyngeo::VERSION,
        "code_rev": provenance::code_rev(),
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
