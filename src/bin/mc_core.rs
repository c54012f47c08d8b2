//! `mc-core`: a thin CLI driver for the symbolic core. Loads a JSON
//! [`apalache_symbolic_core::ir::Module`], extracts its transitions
//! (§4.7) and prints the assignment order found for each one.

use apalache_symbolic_core::arena::Arena;
use apalache_symbolic_core::config::{CoreConfig, SolverBackend};
use apalache_symbolic_core::ir::Module;
use apalache_symbolic_core::smt::{SmtGateway, TextGateway};
use apalache_symbolic_core::transitions::extract_transitions;
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    Z3,
    Text,
}

#[derive(Parser)]
#[clap(author, version, about = "Driver for the bounded model checker's symbolic core.")]
struct Args {
    /// Path to a JSON-encoded module: `{ "variables": [...], "formula": ... }`.
    module_path: PathBuf,

    /// Which SMT backend to solve with.
    #[clap(long, value_enum, default_value_t = Backend::Z3)]
    backend: Backend,

    /// Milliseconds before the solver gives up (z3 backend only).
    #[clap(long, default_value_t = CoreConfig::default().smt_timeout_ms)]
    timeout_ms: u32,

    /// Also write the accumulated SMT-LIB2 script to this path (§6's file
    /// output form). Only meaningful with `--backend text`.
    #[clap(long)]
    emit_smt2: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let raw = fs::read_to_string(&args.module_path)?;
    let module: Module = serde_json::from_str(&raw)?;

    let config = CoreConfig {
        smt_timeout_ms: args.timeout_ms,
        backend: match args.backend {
            Backend::Z3 => SolverBackend::Z3,
            Backend::Text => SolverBackend::TextOnly,
        },
        ..CoreConfig::default()
    };

    match config.backend {
        SolverBackend::Z3 => run_with_z3(&module, &config, args.emit_smt2.as_deref()),
        SolverBackend::TextOnly => run_with_text(&module, args.emit_smt2.as_deref()),
    }
}

#[cfg(feature = "z3-backend")]
fn run_with_z3(
    module: &Module,
    config: &CoreConfig,
    emit_smt2: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    use apalache_symbolic_core::smt::Z3Gateway;
    use z3::Context;

    let cfg = Z3Gateway::config_with_timeout_ms(config.smt_timeout_ms);
    let ctx = Context::new(&cfg);
    let mut gateway = Z3Gateway::new(&ctx);
    drive(&mut gateway, module)?;
    if let Some(path) = emit_smt2 {
        log::warn!("--emit-smt2 has no effect with the z3 backend; ignoring {}", path.display());
    }
    Ok(())
}

#[cfg(not(feature = "z3-backend"))]
fn run_with_z3(
    _module: &Module,
    _config: &CoreConfig,
    _emit_smt2: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    Err("this binary was built without the z3-backend feature".into())
}

fn run_with_text(module: &Module, emit_smt2: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut gateway = TextGateway::new();
    drive(&mut gateway, module)?;
    if let Some(path) = emit_smt2 {
        fs::write(path, gateway.render_file("QF_LIA"))?;
    }
    Ok(())
}

fn drive(gateway: &mut dyn SmtGateway, module: &Module) -> Result<(), Box<dyn std::error::Error>> {
    let mut arena = Arena::new();
    let transitions = extract_transitions(gateway, &mut arena, &module.formula, &module.variables, "Next")?;
    println!("{} transition(s) found", transitions.len());
    for t in &transitions {
        let order: Vec<String> = t.strategy.order.iter().map(|id| id.to_string()).collect();
        println!("  {} (formula node {}): assignment order [{}]", t.key, t.formula.id, order.join(", "));
    }
    Ok(())
}
