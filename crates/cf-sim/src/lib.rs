//! Adaptive time integration for cardioflow.
//!
//! Provides:
//! - `OdeSystem` trait for fixed-size right-hand sides
//! - Dormand-Prince 5(4) embedded stepper with I-controller step adaptation
//! - Dense output (continuous 4th-order extension) over accepted steps
//! - `run_sim` driver with optional output grid and progress reporting

pub mod dense;
pub mod error;
pub mod integrator;
pub mod model;
pub mod sim;
pub mod tableau;

// Re-exports for public API
pub use dense::{DenseSegment, DenseSolution};
pub use error::{SimError, SimResult};
pub use integrator::{DormandPrince, Stats, StepController, StepOutcome};
pub use model::OdeSystem;
pub use sim::{
    SimOptions, SimProgress, SimRecord, Trajectory, run_sim, run_sim_with_progress, uniform_grid,
    validate_eval_times,
};
