// Simulation - bodies, clock and integrator advancing in lock-step
// Owns the only two pieces of mutable state (the body set and the clock);
// one `step()` is one RK4 advance plus the matching clock increment and a
// trace-sampling pass.

use crate::body::BodySet;
use crate::clock::SimulationClock;
use crate::constants::SystemConfig;
use crate::error::Result;
use crate::integrator::{total_energy, Rk4Integrator};
use crate::seed::{BodyRecord, InitialStateBuilder, SystemSnapshot};

pub struct Simulation {
    pub bodies: BodySet,
    pub clock: SimulationClock,
    /// Integration step in hours; the clock gains `dt_hours/24` days per
    /// step
    pub dt_hours: f64,
    integrator: Rk4Integrator,
    initial_energy: f64,
}

impl Simulation {
    pub const DEFAULT_DT_HOURS: f64 = 24.0;

    /// Build the system analytically from the element tables at
    /// `start_date`
    pub fn from_start_date(config: &SystemConfig, start_date: &str) -> Result<Self> {
        let records = InitialStateBuilder::new(config).build(start_date)?;
        let clock = SimulationClock::from_date_string(start_date)?;
        Self::from_parts(config, &records, clock)
    }

    /// Build from externally supplied seed records (e.g. a retrieved
    /// ephemeris snapshot); interchangeable with the analytic builder
    pub fn from_snapshot(config: &SystemConfig, snapshot: &SystemSnapshot) -> Result<Self> {
        let clock = SimulationClock::from_date_string(&snapshot.date)?;
        Self::from_parts(config, &snapshot.planets, clock)
    }

    fn from_parts(
        config: &SystemConfig,
        records: &[BodyRecord],
        clock: SimulationClock,
    ) -> Result<Self> {
        let bodies = BodySet::from_records(config, records)?;
        let initial_energy = total_energy(&bodies, config.grav_constant);
        Ok(Self {
            bodies,
            clock,
            dt_hours: Self::DEFAULT_DT_HOURS,
            integrator: Rk4Integrator::new(config.grav_constant),
            initial_energy,
        })
    }

    /// Advance one step: integrate, move the clock, sample traces
    pub fn step(&mut self) -> Result<()> {
        let dt_days = self.dt_hours / 24.0;
        self.integrator.step(&mut self.bodies, dt_days)?;
        self.clock.advance(self.dt_hours);
        self.bodies.record_traces(self.clock.jed());
        Ok(())
    }

    /// Advance `steps` steps, stopping at the first error
    pub fn run(&mut self, steps: usize) -> Result<()> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Current civil date, `Y-MM-DD`
    pub fn date_string(&self) -> String {
        self.clock.date_string()
    }

    /// Relative mechanical-energy drift since construction
    pub fn energy_drift(&self) -> f64 {
        if self.initial_energy.abs() < 1e-30 {
            return 0.0;
        }
        let current = total_energy(&self.bodies, self.integrator.grav_constant);
        (current - self.initial_energy).abs() / self.initial_energy.abs()
    }

    /// Export the current state in the collaborator record shape
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            date: self.clock.date_string(),
            planets: self
                .bodies
                .planets
                .iter()
                .map(|b| BodyRecord {
                    name: b.name.clone(),
                    position: b.position.to_array(),
                    velocity: b.velocity.to_array(),
                })
                .collect(),
        }
    }
}
