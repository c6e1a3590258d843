//! Run execution service.

use std::time::Instant;

use cf_model::{CirculationModel, STATE_DIM};
use cf_project::{Project, Sampling};
use cf_sim::{SimOptions, SimProgress, SimRecord, Stats, Trajectory, run_sim_with_progress};

use crate::error::{AppError, AppResult};
use crate::progress::{IntegrationProgress, RunProgressEvent, RunStage};

/// Per-run overrides on top of the project settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub t_end_s: Option<f64>,
    /// Replaces the project sampling with a uniform grid.
    pub samples: Option<usize>,
    pub reflux: Option<f64>,
    /// Keep the dense interpolant on the response.
    pub keep_dense: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            t_end_s: None,
            samples: None,
            reflux: None,
            keep_dense: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub build_time_s: f64,
    pub solve_time_s: f64,
    pub total_time_s: f64,
}

/// Result of one run.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub model: CirculationModel,
    pub record: SimRecord<STATE_DIM>,
    pub graph_window: (f64, f64),
    pub timing: RunTimingSummary,
}

impl RunResponse {
    pub fn trajectory(&self) -> &Trajectory<STATE_DIM> {
        &self.record.trajectory
    }

    pub fn stats(&self) -> Stats {
        self.record.stats
    }

    /// Samples inside the project's graph window.
    pub fn graph_trajectory(&self) -> Trajectory<STATE_DIM> {
        let (t0, t1) = self.graph_window;
        self.record.trajectory.window(t0, t1)
    }
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

pub fn build_model(project: &Project, options: &RunOptions) -> AppResult<CirculationModel> {
    let mut params = project.parameters;
    if let Some(reflux) = options.reflux {
        params.reflux = reflux;
    }
    Ok(CirculationModel::new(params)?)
}

/// Integrator options from project settings and overrides.
pub fn sim_options(project: &Project, options: &RunOptions) -> AppResult<SimOptions> {
    let sim = &project.simulation;
    let solver = &project.solver;
    let t_end = options.t_end_s.unwrap_or(sim.t_end);
    if !(t_end > sim.t_start) {
        return Err(AppError::InvalidInput(format!(
            "end time {t_end} must be after start time {}",
            sim.t_start
        )));
    }

    let sampling = match options.samples {
        Some(n) if n < 2 => {
            return Err(AppError::InvalidInput(format!(
                "sample count {n} must be at least 2 to cover the span"
            )));
        }
        Some(n) => Sampling::Uniform(n),
        None => sim.sampling(),
    };
    let t_eval = match sampling {
        Sampling::Steps => None,
        Sampling::Uniform(n) => Some(cf_sim::uniform_grid(sim.t_start, t_end, n)?),
        Sampling::Explicit(times) => {
            let kept: Vec<f64> = times.into_iter().filter(|&t| t <= t_end).collect();
            if kept.is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "no evaluation time falls within the span ending at {t_end}"
                )));
            }
            Some(kept)
        }
    };

    Ok(SimOptions {
        t_start: sim.t_start,
        t_end,
        tol: solver.tolerances(),
        h0: solver.h0,
        h_min: solver.h_min,
        h_max: solver.h_max.unwrap_or(f64::INFINITY),
        max_steps: solver.max_steps,
        t_eval,
        dense_output: options.keep_dense,
        ..SimOptions::default()
    })
}

pub fn run_project(project: &Project, options: &RunOptions) -> AppResult<RunResponse> {
    run_project_with_progress(project, options, None)
}

/// Run a project and stream progress events.
pub fn run_project_with_progress(
    project: &Project,
    options: &RunOptions,
    progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let mut progress_cb = progress_cb;
    let started = Instant::now();
    emit_progress(&mut progress_cb, RunStage::BuildingModel, started, None);

    cf_project::validate_project(project)?;
    let model = build_model(project, options)?;
    let opts = sim_options(project, options)?;
    let y0 = project.initial_state.to_vector();
    let build_time_s = started.elapsed().as_secs_f64();

    tracing::info!(
        project = %project.name,
        t_start = opts.t_start,
        t_end = opts.t_end,
        reflux = model.params().reflux,
        "starting run"
    );

    let solve_started = Instant::now();
    let record = {
        let forward: &mut dyn FnMut(SimProgress) = &mut |p: SimProgress| {
            if let Some(cb) = progress_cb.as_deref_mut() {
                cb(RunProgressEvent {
                    stage: RunStage::Integrating,
                    elapsed_wall_s: started.elapsed().as_secs_f64(),
                    message: None,
                    integration: Some(IntegrationProgress {
                        sim_time_s: p.t,
                        t_end_s: p.t_end,
                        fraction_complete: p.fraction_complete,
                        accepted_steps: p.stats.accepted_steps,
                        rejected_steps: p.stats.rejected_steps,
                    }),
                });
            }
        };
        run_sim_with_progress(&model, &y0, &opts, Some(forward)).inspect_err(|e| {
            tracing::error!(error = %e, "integration failed");
        })?
    };
    let solve_time_s = solve_started.elapsed().as_secs_f64();

    tracing::info!(
        accepted = record.stats.accepted_steps,
        rejected = record.stats.rejected_steps,
        rhs_evals = record.stats.rhs_evals,
        samples = record.trajectory.len(),
        solve_time_s,
        "run finished"
    );

    let total_time_s = started.elapsed().as_secs_f64();
    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some(format!("{} samples", record.trajectory.len())),
    );

    let (w0, w1) = project.simulation.graph_window();
    Ok(RunResponse {
        model,
        record,
        graph_window: (w0, w1.min(opts.t_end)),
        timing: RunTimingSummary {
            build_time_s,
            solve_time_s,
            total_time_s,
        },
    })
}
