// RK4 N-Body Integrator
// Classical 4th-order Runge-Kutta over pairwise Newtonian gravity. Every
// planet's four stages evaluate against the same frozen pre-step snapshot
// of all source bodies; deltas are applied only after all stages complete,
// so no planet ever sees a neighbour that has already moved this step.

use crate::body::BodySet;
use crate::error::{Result, SimError};
use crate::vector::Vector3;

/// Frozen (mass, position) view of one force source for the current step
#[derive(Debug, Clone)]
struct Source {
    name: String,
    mass: f64,
    position: Vector3,
}

/// Stage derivative: position rate (velocity) and velocity rate
/// (acceleration). Intermediate stage state never aliases an owned `Body`.
#[derive(Debug, Clone, Copy)]
struct Derivative {
    dx: Vector3,
    dvx: Vector3,
}

pub struct Rk4Integrator {
    /// AU³/(kg·day²)
    pub grav_constant: f64,
}

impl Rk4Integrator {
    pub fn new(grav_constant: f64) -> Self {
        Self { grav_constant }
    }

    /// Advance every planet by `dt_days` in place. The Sun is a fixed
    /// force source and is not integrated.
    pub fn step(&self, set: &mut BodySet, dt_days: f64) -> Result<()> {
        let sources = snapshot_sources(set);

        let mut deltas = Vec::with_capacity(set.planets.len());
        for (index, planet) in set.planets.iter().enumerate() {
            deltas.push(self.rk4_delta(
                index,
                &planet.name,
                planet.position,
                planet.velocity,
                &sources,
                dt_days,
            )?);
        }

        for (planet, (dx, dvx)) in set.planets.iter_mut().zip(deltas) {
            planet.position = planet.position.add(&dx.scale(dt_days));
            planet.velocity = planet.velocity.add(&dvx.scale(dt_days));
        }

        Ok(())
    }

    /// Net per-day position/velocity rates for one planet from the four
    /// weighted stages
    fn rk4_delta(
        &self,
        own_index: usize,
        name: &str,
        position: Vector3,
        velocity: Vector3,
        sources: &[Source],
        dt: f64,
    ) -> Result<(Vector3, Vector3)> {
        let k1 = Derivative {
            dx: velocity,
            dvx: self.acceleration(own_index, name, position, sources)?,
        };
        let k2 = self.stage(own_index, name, position, velocity, &k1, dt * 0.5, sources)?;
        let k3 = self.stage(own_index, name, position, velocity, &k2, dt * 0.5, sources)?;
        let k4 = self.stage(own_index, name, position, velocity, &k3, dt, sources)?;

        let dx = k1
            .dx
            .add(&k2.dx.scale(2.0))
            .add(&k3.dx.scale(2.0))
            .add(&k4.dx)
            .scale(1.0 / 6.0);
        let dvx = k1
            .dvx
            .add(&k2.dvx.scale(2.0))
            .add(&k3.dvx.scale(2.0))
            .add(&k4.dvx)
            .scale(1.0 / 6.0);

        Ok((dx, dvx))
    }

    /// Evaluate the next stage at a probe state displaced along the
    /// previous derivative
    #[allow(clippy::too_many_arguments)]
    fn stage(
        &self,
        own_index: usize,
        name: &str,
        position: Vector3,
        velocity: Vector3,
        previous: &Derivative,
        dt: f64,
        sources: &[Source],
    ) -> Result<Derivative> {
        let probe_position = position.add(&previous.dx.scale(dt));
        let probe_velocity = velocity.add(&previous.dvx.scale(dt));
        Ok(Derivative {
            dx: probe_velocity,
            dvx: self.acceleration(own_index, name, probe_position, sources)?,
        })
    }

    /// Newtonian acceleration at `probe` from all sources except the
    /// body's own snapshot entry. Zero separation is a fatal error rather
    /// than a silent NaN.
    fn acceleration(
        &self,
        own_index: usize,
        name: &str,
        probe: Vector3,
        sources: &[Source],
    ) -> Result<Vector3> {
        let mut accel = Vector3::zero();
        for (index, source) in sources.iter().enumerate() {
            if index == own_index || source.mass == 0.0 {
                continue;
            }

            let dx = source.position.sub(&probe);
            let dsq = dx.magnitude_squared();
            if dsq == 0.0 {
                return Err(SimError::DegenerateGeometry {
                    body_a: name.to_string(),
                    body_b: source.name.clone(),
                });
            }

            let dr = dsq.sqrt();
            accel = accel.add(&dx.scale(self.grav_constant * source.mass / (dsq * dr)));
        }
        Ok(accel)
    }
}

/// Planets first (snapshot index = planet index), Sun appended last so it
/// is never skipped as a self-source
fn snapshot_sources(set: &BodySet) -> Vec<Source> {
    let mut sources: Vec<Source> = set
        .planets
        .iter()
        .map(|b| Source {
            name: b.name.clone(),
            mass: b.mass,
            position: b.position,
        })
        .collect();
    sources.push(Source {
        name: set.sun.name.clone(),
        mass: set.sun.mass,
        position: set.sun.position,
    });
    sources
}

// =============================================================================
// CONSERVED-QUANTITY MONITORS
// =============================================================================

/// Total mechanical energy (kinetic + pairwise potential) of Sun and
/// planets, in kg·AU²/day²; used as a drift monitor
pub fn total_energy(set: &BodySet, grav_constant: f64) -> f64 {
    let bodies: Vec<&crate::body::Body> =
        std::iter::once(&set.sun).chain(set.planets.iter()).collect();

    let mut kinetic = 0.0;
    for body in &bodies {
        kinetic += 0.5 * body.mass * body.velocity.magnitude_squared();
    }

    let mut potential = 0.0;
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let r = bodies[i].position.sub(&bodies[j].position).magnitude();
            if r > 0.0 {
                potential -= grav_constant * bodies[i].mass * bodies[j].mass / r;
            }
        }
    }

    kinetic + potential
}

/// Total angular momentum about the origin, kg·AU²/day
pub fn total_angular_momentum(set: &BodySet) -> Vector3 {
    set.planets.iter().fold(Vector3::zero(), |acc, body| {
        acc.add(&body.position.cross(&body.velocity).scale(body.mass))
    })
}
