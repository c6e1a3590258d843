//! Project loading, saving, validation, and introspection.

use std::path::Path;

use cf_project::{Project, Sampling};

use crate::error::AppResult;

/// Short description of a project for listing.
#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub name: String,
    pub version: u32,
    pub time_span: (f64, f64),
    pub sampling: String,
    pub heart_rate_bpm: f64,
    pub reflux: f64,
    pub graph_window: (f64, f64),
}

/// Load a YAML or JSON project, chosen by extension.
pub fn load_project(path: &Path) -> AppResult<Project> {
    let project = cf_project::load(path)?;
    tracing::info!(path = %path.display(), name = %project.name, "loaded project");
    Ok(project)
}

pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    cf_project::save(path, project)?;
    Ok(())
}

pub fn validate_project(project: &Project) -> AppResult<()> {
    cf_project::validate_project(project)?;
    Ok(())
}

pub fn project_summary(project: &Project) -> ProjectSummary {
    let sim = &project.simulation;
    let sampling = match sim.sampling() {
        Sampling::Steps => "every accepted step".to_string(),
        Sampling::Uniform(n) => format!("{n} uniform samples"),
        Sampling::Explicit(times) => format!("{} explicit times", times.len()),
    };
    ProjectSummary {
        name: project.name.clone(),
        version: project.version,
        time_span: (sim.t_start, sim.t_end),
        sampling,
        heart_rate_bpm: 60.0 / project.parameters.tc,
        reflux: project.parameters.reflux,
        graph_window: sim.graph_window(),
    }
}
