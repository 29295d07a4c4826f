// Shared Session - thread-safe handle for rendering collaborators
// A renderer thread reads snapshots while a driver thread ticks the
// simulation; stepping itself stays single-threaded behind the write
// lock. No state lives outside the wrapped simulation and the small
// control block.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::Result;
use crate::seed::SystemSnapshot;
use crate::simulation::Simulation;

const MAX_STEPS_PER_TICK: usize = 100;

struct Control {
    paused: bool,
    steps_per_tick: usize,
}

struct Inner {
    simulation: RwLock<Simulation>,
    control: RwLock<Control>,
}

/// Cheaply cloneable shared handle around a [`Simulation`]
#[derive(Clone)]
pub struct SimulationSession {
    inner: Arc<Inner>,
}

impl SimulationSession {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            inner: Arc::new(Inner {
                simulation: RwLock::new(simulation),
                control: RwLock::new(Control {
                    paused: true,
                    steps_per_tick: 1,
                }),
            }),
        }
    }

    pub fn set_paused(&self, paused: bool) {
        self.inner.control.write().paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.inner.control.read().paused
    }

    /// Steps executed per `tick`, clamped to a sane range
    pub fn set_steps_per_tick(&self, steps: usize) {
        self.inner.control.write().steps_per_tick = steps.clamp(1, MAX_STEPS_PER_TICK);
    }

    /// Advance the simulation by the configured number of steps; returns
    /// how many ran (zero while paused)
    pub fn tick(&self) -> Result<usize> {
        let steps = {
            let control = self.inner.control.read();
            if control.paused {
                return Ok(0);
            }
            control.steps_per_tick
        };

        self.inner.simulation.write().run(steps)?;
        Ok(steps)
    }

    /// Read-locked snapshot export for the persistence collaborator
    pub fn snapshot(&self) -> SystemSnapshot {
        self.inner.simulation.read().snapshot()
    }

    pub fn date_string(&self) -> String {
        self.inner.simulation.read().date_string()
    }

    /// Read access to the full simulation state (positions, traces, clock)
    pub fn with_simulation<R>(&self, f: impl FnOnce(&Simulation) -> R) -> R {
        f(&self.inner.simulation.read())
    }
}
