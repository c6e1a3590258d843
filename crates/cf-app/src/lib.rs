//! Shared application service layer for cardioflow.
//!
//! Centralizes project handling, running the model, and post-processing
//! (series queries, pressure-volume loops, beat metrics, CSV export) so the
//! CLI stays thin.

pub mod error;
pub mod export;
pub mod metrics;
pub mod progress;
pub mod project_service;
pub mod pv_loop;
pub mod query;
pub mod run_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use export::{
    export_to_path, write_beat_metrics_csv, write_pv_loop_csv, write_series_csv,
    write_trajectory_csv,
};
pub use metrics::{BeatMetrics, compute_beat_metrics, periodic_drift};
pub use progress::{IntegrationProgress, RunProgressEvent, RunStage};
pub use project_service::{
    ProjectSummary, load_project, project_summary, save_project, validate_project,
};
pub use pv_loop::{
    PvLoop, PvPoint, Ventricle, compute_pv_loop, elastance_series, source_pressure_series,
};
pub use query::{
    RunSummary, Series, extract_series, extract_series_by_name, flow_series, get_run_summary,
    list_variables, pressure_series, resample, resolve_variable,
};
pub use run_service::{
    RunOptions, RunResponse, RunTimingSummary, build_model, run_project,
    run_project_with_progress, sim_options,
};
