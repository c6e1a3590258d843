//! Lumped-parameter closed-loop cardiovascular model.
//!
//! Provides:
//! - Parameter set and reference values (`CirculationParams`)
//! - Named state layout (`StateVar`, `idx`, `InitialState`)
//! - Cardiac activation (`CardiacCycle`)
//! - Valve gating (`Valve`, `ValveState`)
//! - The twelve-state right-hand side (`CirculationModel`)

pub mod activation;
pub mod error;
pub mod model;
pub mod params;
pub mod state;
pub mod valve;

pub use activation::CardiacCycle;
pub use error::{ModelError, ModelResult};
pub use model::CirculationModel;
pub use params::CirculationParams;
pub use state::{FLOWS, InitialState, PRESSURES, Quantity, STATE_DIM, StateVar, StateVector, idx};
pub use valve::{Valve, ValveSet, ValveState, gate};
