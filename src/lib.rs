// Heliosim - Newtonian solar system simulator
// Derives heliocentric initial states from Keplerian orbital elements,
// advances the Sun-plus-nine-planets system with an RK4 N-body integrator
// and keeps a Julian-date simulation calendar in lock-step. Rendering,
// input handling, persistence and remote ephemeris retrieval are external
// collaborators that exchange seed records and snapshots with this crate.

pub mod angles;
pub mod body;
pub mod clock;
pub mod constants;
pub mod error;
pub mod integrator;
pub mod kepler;
pub mod seed;
pub mod session;
pub mod simulation;
pub mod vector;

pub use body::{Body, BodySet};
pub use clock::SimulationClock;
pub use constants::{Planet, PlanetSpec, SystemConfig};
pub use error::{Result, SimError};
pub use integrator::{total_angular_momentum, total_energy, Rk4Integrator};
pub use kepler::OrbitalElements;
pub use seed::{BodyRecord, InitialStateBuilder, SystemSnapshot};
pub use session::SimulationSession;
pub use simulation::Simulation;
pub use vector::Vector3;
