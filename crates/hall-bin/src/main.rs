//! Hallplan entrypoint: compile a drawing into the canonical configuration,
//! or solve a configuration against a booth table and emit the placement
//! table plus the layout diagram.
//!
//! Stdout carries only the human-readable artifacts (the solver status
//! token, written-file notices); diagnostics go to `hallplan.log` via the
//! non-blocking appender.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use core_compile::{ColorTable, CompileOptions};
use core_scene::SolverSettings;
use core_solve::SolveStatus;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "hallplan", version, about = "Exhibition booth layout optimizer")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile an annotated SVG drawing into a configuration file.
    Compile {
        /// Drawing to compile; auto-discovered in the working directory
        /// when omitted (`hall.svg`, then `*hall*.svg`, then newest).
        svg: Option<PathBuf>,
        /// Output configuration path.
        #[arg(long, default_value = "config.json")]
        out: PathBuf,
        /// Color→class table; `color_map.json` is picked up automatically
        /// when present.
        #[arg(long = "color-map")]
        color_map: Option<PathBuf>,
        /// Wall-band width in mm (near-wall classification).
        #[arg(long = "wall-band", default_value_t = 500)]
        wall_band: i64,
        /// Minimum aisle between booths in mm.
        #[arg(long, default_value_t = 1000)]
        aisle: i64,
    },
    /// Solve a configuration against a booth table.
    Solve {
        #[arg(long, default_value = "config.json")]
        config: PathBuf,
        #[arg(long, default_value = "booths.csv")]
        booths: PathBuf,
        /// Placement table output; a previous table is kept as `.prev`.
        #[arg(long, default_value = "placement.csv")]
        out: PathBuf,
        /// Layout diagram output.
        #[arg(long, default_value = "layout.svg")]
        diagram: PathBuf,
        /// Override the configured solver wall-clock budget in seconds.
        #[arg(long = "time-limit")]
        time_limit: Option<f64>,
        /// Override the configured solver worker count.
        #[arg(long)]
        workers: Option<usize>,
    },
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join("hallplan.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "hallplan.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        // A subscriber is already installed (tests); drop the guard so the
        // writer shuts down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            tracing::error!(target: "runtime.panic", ?panic_info, "panic");
            default_panic(panic_info);
        }));
    });
}

/// Solver settings: configuration block with CLI overrides on top.
fn effective_settings(
    configured: &SolverSettings,
    time_limit: Option<f64>,
    workers: Option<usize>,
) -> SolverSettings {
    SolverSettings {
        max_time_in_seconds: time_limit.unwrap_or(configured.max_time_in_seconds),
        num_workers: workers.unwrap_or(configured.num_workers),
    }
}

/// Exit code for a terminal solver status: zero exactly when outputs were
/// produced.
fn exit_code_for(status: SolveStatus) -> u8 {
    if status.is_success() {
        0
    } else {
        1
    }
}

fn run_compile(
    svg: Option<PathBuf>,
    out: PathBuf,
    color_map: Option<PathBuf>,
    wall_band: i64,
    aisle: i64,
) -> Result<u8> {
    let colors = match color_map {
        Some(path) => core_compile::load_color_table(&path)?,
        None => {
            let local = Path::new("color_map.json");
            if local.exists() {
                info!(target: "runtime.compile", "using_local_color_map");
                core_compile::load_color_table(local)?
            } else {
                ColorTable::builtin()
            }
        }
    };

    let svg_path = match svg {
        Some(path) => path,
        None => {
            let discovered = core_compile::discover_svg(Path::new("."))?;
            info!(target: "runtime.compile", svg = %discovered.display(), "svg_discovered");
            discovered
        }
    };

    let options = CompileOptions {
        wall_band_mm: wall_band,
        aisle_mm: aisle,
        colors,
    };
    let scene = core_compile::compile_file(&svg_path, &options)
        .with_context(|| format!("compiling {}", svg_path.display()))?;
    core_scene::config::save(&scene, &out)?;
    println!("Wrote {}", out.display());
    Ok(0)
}

fn run_solve(
    config: PathBuf,
    booths: PathBuf,
    out: PathBuf,
    diagram: PathBuf,
    time_limit: Option<f64>,
    workers: Option<usize>,
) -> Result<u8> {
    let scene = core_scene::config::load(&config)
        .with_context(|| format!("loading {}", config.display()))?;
    let requests = core_scene::booths::load_booths(&booths)
        .with_context(|| format!("loading {}", booths.display()))?;
    let settings = effective_settings(&scene.solver, time_limit, workers);

    let outcome = core_solve::optimize(&scene, &requests, &settings)?;
    println!("{}", outcome.status);

    match (outcome.status.is_success(), outcome.placement) {
        (true, Some(placement)) => {
            core_emit::write_placement(&placement, &out)?;
            core_emit::write_diagram(&scene, &placement, &diagram)?;
            info!(
                target: "runtime.solve",
                status = outcome.status.as_str(),
                objective = outcome.objective,
                placement = %out.display(),
                diagram = %diagram.display(),
                "outputs_written"
            );
            Ok(0)
        }
        (success, _) => {
            info!(
                target: "runtime.solve",
                status = outcome.status.as_str(),
                success,
                "no_outputs"
            );
            Ok(exit_code_for(outcome.status))
        }
    }
}

fn run(args: Args) -> Result<u8> {
    match args.command {
        Command::Compile {
            svg,
            out,
            color_map,
            wall_band,
            aisle,
        } => run_compile(svg, out, color_map, wall_band, aisle),
        Command::Solve {
            config,
            booths,
            out,
            diagram,
            time_limit,
            workers,
        } => run_solve(config, booths, out, diagram, time_limit, workers),
    }
}

fn main() -> ExitCode {
    let _log_guard = configure_logging();
    install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    match run(args) {
        Ok(code) => ExitCode::from(code),
        Err(error) => {
            error!(target: "runtime", ?error, "fatal");
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
