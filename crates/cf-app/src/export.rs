//! CSV export of trajectories, series, loops and beat metrics.

use std::io::Write;
use std::path::Path;

use cf_model::{STATE_DIM, StateVar};
use cf_sim::Trajectory;

use crate::error::{AppError, AppResult};
use crate::metrics::BeatMetrics;
use crate::pv_loop::PvLoop;
use crate::query::Series;

/// Full state, one row per sample.
pub fn write_trajectory_csv<W: Write>(w: W, traj: &Trajectory<STATE_DIM>) -> AppResult<()> {
    let mut writer = csv::Writer::from_writer(w);

    let mut header = vec!["t_s".to_string()];
    header.extend(StateVar::ALL.iter().map(|v| v.key().to_string()));
    writer.write_record(&header)?;

    for (t, x) in traj.iter() {
        let mut row = Vec::with_capacity(STATE_DIM + 1);
        row.push(t.to_string());
        row.extend(x.iter().map(|v| v.to_string()));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Several series sampled on the same times, one column each.
pub fn write_series_csv<W: Write>(w: W, series: &[Series]) -> AppResult<()> {
    let Some(first) = series.first() else {
        return Err(AppError::InvalidInput("no series to export".to_string()));
    };
    if series.iter().any(|s| s.len() != first.len()) {
        return Err(AppError::InvalidInput(
            "series have different lengths".to_string(),
        ));
    }

    let mut writer = csv::Writer::from_writer(w);
    let mut header = vec!["t_s".to_string()];
    header.extend(series.iter().map(|s| format!("{} [{}]", s.key, s.unit)));
    writer.write_record(&header)?;

    for (i, &(t, _)) in first.points.iter().enumerate() {
        let mut row = Vec::with_capacity(series.len() + 1);
        row.push(t.to_string());
        row.extend(series.iter().map(|s| s.points[i].1.to_string()));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_pv_loop_csv<W: Write>(w: W, pv: &PvLoop) -> AppResult<()> {
    let mut writer = csv::Writer::from_writer(w);
    writer.write_record([
        "t_s",
        "volume_cm3",
        "source_pressure_mmhg",
        "chamber_pressure_mmhg",
    ])?;
    for p in &pv.points {
        writer.write_record([
            p.t.to_string(),
            p.volume.to_string(),
            p.source_pressure.to_string(),
            p.chamber_pressure.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_beat_metrics_csv<W: Write>(w: W, beats: &[BeatMetrics]) -> AppResult<()> {
    let mut writer = csv::Writer::from_writer(w);
    for b in beats {
        writer.serialize(b)?;
    }
    writer.flush()?;
    Ok(())
}

/// Create `path` and hand a buffered writer to `write`.
pub fn export_to_path<F>(path: &Path, write: F) -> AppResult<()>
where
    F: FnOnce(std::io::BufWriter<std::fs::File>) -> AppResult<()>,
{
    let file = std::fs::File::create(path).map_err(|e| AppError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    write(std::io::BufWriter::new(file))?;
    tracing::info!(path = %path.display(), "exported csv");
    Ok(())
}
