use cf_app::{
    AppError, AppResult, RunOptions, RunProgressEvent, RunResponse, RunStage, Series, Ventricle,
    project_service, query, run_service,
};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "CardioFlow CLI - closed-loop cardiovascular circuit simulation", long_about = None)]
struct Cli {
    /// Log filter (e.g. info, debug, cf_sim=trace). Falls back to RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// Path to the project YAML or JSON file
    project_path: PathBuf,
    /// Override the end time in seconds
    #[arg(long)]
    t_end: Option<f64>,
    /// Override sampling with a uniform grid of this many points
    #[arg(long)]
    samples: Option<usize>,
    /// Override the aortic reflux fraction
    #[arg(long)]
    reflux: Option<f64>,
    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and values
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Print or write the reference project
    Defaults {
        /// Output file (.yaml or .json); defaults to YAML on stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a simulation and print a summary
    Run {
        #[command(flatten)]
        run: RunArgs,
        /// Write the full trajectory as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only export samples inside the graph window
        #[arg(long)]
        window: bool,
    },
    /// Export one variable, or the `pressures` / `flows` groups, as CSV
    ExportSeries {
        #[command(flatten)]
        run: RunArgs,
        /// Variable key (e.g. aortic_pressure), `pressures` or `flows`
        variable: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only export samples inside the graph window
        #[arg(long)]
        window: bool,
    },
    /// Export a ventricular pressure-volume loop as CSV
    PvLoop {
        #[command(flatten)]
        run: RunArgs,
        /// left or right
        #[arg(long, default_value = "left")]
        ventricle: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only use samples inside the graph window
        #[arg(long)]
        window: bool,
    },
    /// Per-beat volumes, ejection fraction and pressures
    Beats {
        #[command(flatten)]
        run: RunArgs,
        /// left or right
        #[arg(long, default_value = "left")]
        ventricle: String,
        /// Write the table as CSV instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Defaults { output } => cmd_defaults(output.as_deref()),
        Commands::Run {
            run,
            output,
            window,
        } => cmd_run(&run, output.as_deref(), window),
        Commands::ExportSeries {
            run,
            variable,
            output,
            window,
        } => cmd_export_series(&run, &variable, output.as_deref(), window),
        Commands::PvLoop {
            run,
            ventricle,
            output,
            window,
        } => cmd_pv_loop(&run, &ventricle, output.as_deref(), window),
        Commands::Beats {
            run,
            ventricle,
            output,
        } => cmd_beats(&run, &ventricle, output.as_deref()),
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;

    let summary = project_service::project_summary(&project);
    println!("✓ Project is valid");
    println!("  Name: {}", summary.name);
    println!(
        "  Span: {:.3} - {:.3} s ({})",
        summary.time_span.0, summary.time_span.1, summary.sampling
    );
    println!("  Heart rate: {:.1} bpm", summary.heart_rate_bpm);
    if summary.reflux > 0.0 {
        println!("  Aortic reflux: {}", summary.reflux);
    }
    Ok(())
}

fn cmd_defaults(output: Option<&Path>) -> AppResult<()> {
    let project = cf_project::default_project();
    match output {
        Some(path) => {
            project_service::save_project(path, &project)?;
            println!("✓ Wrote reference project to {}", path.display());
        }
        None => print!("{}", cf_project::to_yaml_string(&project)?),
    }
    Ok(())
}

fn run_with_progress(args: &RunArgs) -> AppResult<RunResponse> {
    let project = project_service::load_project(&args.project_path)?;
    let options = RunOptions {
        t_end_s: args.t_end,
        samples: args.samples,
        reflux: args.reflux,
        keep_dense: false,
    };

    if args.quiet {
        return run_service::run_project(&project, &options);
    }

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let response = run_service::run_project_with_progress(
        &project,
        &options,
        Some(&mut |event: RunProgressEvent| {
            let fraction = event
                .integration
                .as_ref()
                .map(|p| p.fraction_complete)
                .unwrap_or(-1.0);
            let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                if fraction >= 0.0 {
                    last_fraction = fraction;
                }
                last_emit = Instant::now();
            }
        }),
    );
    clear_progress_line();
    response
}

fn cmd_run(args: &RunArgs, output: Option<&Path>, window: bool) -> AppResult<()> {
    println!("Running project: {}", args.project_path.display());
    let response = run_with_progress(args)?;

    println!("✓ Simulation completed");
    print_run_summary(&response)?;

    if let Some(path) = output {
        let traj = if window {
            response.graph_trajectory()
        } else {
            response.trajectory().clone()
        };
        cf_app::export_to_path(path, |w| cf_app::write_trajectory_csv(w, &traj))?;
        tracing::debug!(path = %path.display(), samples = traj.len(), "trajectory exported");
        println!("✓ Exported {} samples to {}", traj.len(), path.display());
    }
    Ok(())
}

fn select_series(response: &RunResponse, variable: &str, window: bool) -> AppResult<Vec<Series>> {
    let traj = if window {
        response.graph_trajectory()
    } else {
        response.trajectory().clone()
    };
    match variable {
        "pressures" => Ok(query::pressure_series(&traj)),
        "flows" => Ok(query::flow_series(&traj)),
        name => Ok(vec![query::extract_series_by_name(&traj, name)?]),
    }
}

fn cmd_export_series(
    args: &RunArgs,
    variable: &str,
    output: Option<&Path>,
    window: bool,
) -> AppResult<()> {
    // Fail on a bad name before spending time integrating.
    if variable != "pressures" && variable != "flows" {
        query::resolve_variable(variable)?;
    }
    let response = run_with_progress(args)?;
    let series = select_series(&response, variable, window)?;
    let points = series.first().map(|s| s.len()).unwrap_or(0);

    if let Some(path) = output {
        cf_app::export_to_path(path, |w| cf_app::write_series_csv(w, &series))?;
        println!("✓ Exported {} data points to {}", points, path.display());
    } else {
        cf_app::write_series_csv(io::stdout().lock(), &series)?;
    }
    Ok(())
}

fn cmd_pv_loop(
    args: &RunArgs,
    ventricle: &str,
    output: Option<&Path>,
    window: bool,
) -> AppResult<()> {
    let ventricle = Ventricle::parse(ventricle)?;
    let response = run_with_progress(args)?;
    let traj = if window {
        response.graph_trajectory()
    } else {
        response.trajectory().clone()
    };
    let pv = cf_app::compute_pv_loop(&response.model, &traj, ventricle);

    if let Some(path) = output {
        cf_app::export_to_path(path, |w| cf_app::write_pv_loop_csv(w, &pv))?;
        println!(
            "✓ Exported {} {} ventricle points to {} (enclosed area {:.1} mmHg·cm³)",
            pv.points.len(),
            ventricle.name(),
            path.display(),
            pv.enclosed_area()
        );
    } else {
        cf_app::write_pv_loop_csv(io::stdout().lock(), &pv)?;
    }
    Ok(())
}

fn cmd_beats(args: &RunArgs, ventricle: &str, output: Option<&Path>) -> AppResult<()> {
    let ventricle = Ventricle::parse(ventricle)?;
    let response = run_with_progress(args)?;
    let beats = cf_app::compute_beat_metrics(&response.model, response.trajectory(), ventricle);
    if beats.is_empty() {
        return Err(AppError::InvalidInput(
            "run does not cover a complete beat".to_string(),
        ));
    }

    if let Some(path) = output {
        cf_app::export_to_path(path, |w| cf_app::write_beat_metrics_csv(w, &beats))?;
        println!("✓ Exported {} beats to {}", beats.len(), path.display());
        return Ok(());
    }

    println!("\n{} ventricle beats:", ventricle.name());
    println!(
        "  {:>5}  {:>9}  {:>9}  {:>8}  {:>6}  {:>9}  {:>11}",
        "beat", "EDV cm³", "ESV cm³", "SV cm³", "EF %", "Pmax mmHg", "CO L/min"
    );
    for b in &beats {
        println!(
            "  {:>5}  {:>9.2}  {:>9.2}  {:>8.2}  {:>6.1}  {:>9.1}  {:>11.2}",
            b.beat,
            b.end_diastolic_volume,
            b.end_systolic_volume,
            b.stroke_volume,
            b.ejection_fraction * 100.0,
            b.peak_chamber_pressure,
            b.cardiac_output_l_per_min()
        );
    }
    if let Some(drift) = cf_app::periodic_drift(&beats) {
        println!("\n  EDV change over last beat: {:.3e}", drift);
    }
    Ok(())
}

fn print_run_summary(response: &RunResponse) -> AppResult<()> {
    let summary = query::get_run_summary(response)?;
    let timing = &response.timing;

    println!("\nTiming summary:");
    println!("  Build:   {:.3}s", timing.build_time_s);
    println!("  Solve:   {:.3}s", timing.solve_time_s);
    println!("  Total:   {:.3}s", timing.total_time_s);

    println!("\nSolver:");
    println!("  Accepted steps: {}", summary.stats.accepted_steps);
    println!("  Rejected steps: {}", summary.stats.rejected_steps);
    println!("  RHS evaluations: {}", summary.stats.rhs_evals);

    println!("\nRun:");
    println!("  Samples: {}", summary.sample_count);
    println!(
        "  Time range: {:.3} - {:.3} s",
        summary.time_range.0, summary.time_range.1
    );
    println!(
        "  Blood volume: {:.6} -> {:.6} cm³",
        summary.volume_range.0, summary.volume_range.1
    );

    println!("\nFinal state:");
    let last = response
        .trajectory()
        .last()
        .map(|(_, x)| *x)
        .ok_or_else(|| AppError::InvalidInput("empty trajectory".to_string()))?;
    for var in cf_model::StateVar::ALL {
        println!(
            "  {:<28} {:>12.4} {}",
            var.title(),
            last[var.index()],
            var.unit_label()
        );
    }
    Ok(())
}

// Progress goes to stderr so CSV on stdout stays clean.
fn clear_progress_line() {
    eprint!("\r{}\r", " ".repeat(120));
    let _ = io::stderr().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.integration) {
        (RunStage::Integrating, Some(p)) => {
            let width = 28usize;
            let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            eprint!(
                "\r[{}] {:>6.2}%  t={:.3}/{:.3}s  steps={}  rejected={}  elapsed={:.1}s",
                bar,
                p.fraction_complete * 100.0,
                p.sim_time_s,
                p.t_end_s,
                p.accepted_steps,
                p.rejected_steps,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            eprint!("{}", line);
        }
    }
    let _ = io::stderr().flush();
}
