// Kepler Solver - orbital elements to heliocentric state
// Propagates a tabulated element set to a target epoch, solves Kepler's
// equation by Newton iteration (in degrees, matching the element tables)
// and rotates the orbital-plane state into the heliocentric ecliptic frame.

use crate::angles::{cos_deg, sin_deg, DEG_FROM_RAD};
use crate::constants::{
    element_row, ElementsTable, PerturbationTerms, Planet, DAYS_PER_CENTURY, J2000_JED,
};
use crate::error::{Result, SimError};
use crate::vector::Vector3;

/// Convergence tolerance on the eccentric-anomaly correction (degrees)
const KEPLER_TOLERANCE_DEG: f64 = 1e-9;

/// Iteration cap; hitting it means the orbit would be garbage
const KEPLER_MAX_ITERATIONS: u32 = 100;

/// Julian centuries elapsed since J2000.0 for a given ephemeris day
pub fn centuries_since_j2000(jed: f64) -> f64 {
    (jed - J2000_JED) / DAYS_PER_CENTURY
}

// =============================================================================
// ORBITAL ELEMENTS
// =============================================================================

/// Six Keplerian elements already propagated to the target epoch.
///
/// Angles are in degrees, the semi-major axis in AU, matching the fit
/// tables in [`crate::constants`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrbitalElements {
    /// Longitude of the ascending node (deg)
    pub n: f64,
    /// Inclination to the ecliptic (deg)
    pub i: f64,
    /// Longitude of perihelion (deg)
    pub w1: f64,
    /// Semi-major axis (AU)
    pub a: f64,
    /// Eccentricity
    pub e: f64,
    /// Mean longitude (deg)
    pub l: f64,
}

impl OrbitalElements {
    /// Propagate a planet's tabulated elements to `t` Julian centuries
    /// from J2000.0
    pub fn for_planet(planet: Planet, table: ElementsTable, t: f64) -> Self {
        let row = element_row(planet, table);
        Self {
            n: row.n[0] + t * row.n[1],
            i: row.i[0] + t * row.i[1],
            w1: row.w1[0] + t * row.w1[1],
            a: row.a[0] + t * row.a[1],
            e: row.e[0] + t * row.e[1],
            l: row.l[0] + t * row.l[1],
        }
    }

    /// Placeholder element sets (all zero) bypass the general solver;
    /// callers substitute a dedicated closed-form state instead
    pub fn is_placeholder(&self) -> bool {
        self.n == 0.0
            && self.i == 0.0
            && self.w1 == 0.0
            && self.a == 0.0
            && self.e == 0.0
            && self.l == 0.0
    }
}

// =============================================================================
// KEPLER'S EQUATION
// =============================================================================

/// Solve `M = E - e*·sin(E)` (degrees) for the eccentric anomaly E.
///
/// Newton iteration seeded at `E₀ = M + e*·sin(M)` with `e* = e·180/π`.
/// Converges for all elliptical orbits; the iteration cap turns a
/// non-elliptical or NaN input into an error instead of an endless loop.
pub fn solve_eccentric_anomaly(mean_anomaly: f64, eccentricity: f64, body: &str) -> Result<f64> {
    let e1 = eccentricity * DEG_FROM_RAD;
    let mut ecc_anomaly = mean_anomaly + e1 * sin_deg(mean_anomaly);

    for _ in 0..KEPLER_MAX_ITERATIONS {
        let residual = mean_anomaly - (ecc_anomaly - e1 * sin_deg(ecc_anomaly));
        let correction = residual / (1.0 - eccentricity * cos_deg(ecc_anomaly));
        ecc_anomaly += correction;

        if correction.abs() < KEPLER_TOLERANCE_DEG {
            return Ok(ecc_anomaly);
        }
    }

    Err(SimError::KeplerNonConvergence {
        body: body.to_string(),
        iterations: KEPLER_MAX_ITERATIONS,
        eccentricity,
    })
}

// =============================================================================
// HELIOCENTRIC STATE
// =============================================================================

/// Heliocentric position (AU) and velocity (AU/day) for one body.
///
/// `t` is the epoch offset in Julian centuries since J2000.0;
/// `periodic` carries the outer-planet mean-anomaly correction, if any;
/// `mu` is G·(M_sun + M_body) in AU³/day².
pub fn heliocentric_state(
    body: &str,
    elements: &OrbitalElements,
    periodic: Option<&PerturbationTerms>,
    t: f64,
    mu: f64,
) -> Result<(Vector3, Vector3)> {
    if elements.is_placeholder() {
        return Ok((Vector3::zero(), Vector3::zero()));
    }

    let w = elements.w1 - elements.n;
    let mut m = elements.l - elements.w1;
    if let Some(p) = periodic {
        m += p.b * t * t + p.c * (p.f * t).cos() + p.s * (p.f * t).sin();
    }
    let m = m.rem_euclid(360.0);

    let e = elements.e;
    let ecc_anomaly = solve_eccentric_anomaly(m, e, body)?;

    // Orbital-plane coordinates and radius
    let a = elements.a;
    let c1 = a * (cos_deg(ecc_anomaly) - e);
    let c2 = a * (1.0 - e * e).sqrt() * sin_deg(ecc_anomaly);
    let r = (c1 * c1 + c2 * c2).sqrt();

    let cos_w = cos_deg(w);
    let sin_w = sin_deg(w);
    let cos_n = cos_deg(elements.n);
    let sin_n = sin_deg(elements.n);
    let cos_i = cos_deg(elements.i);
    let sin_i = sin_deg(elements.i);

    let position = Vector3::new(
        c1 * (cos_w * cos_n - sin_w * sin_n * cos_i) + c2 * (-sin_w * cos_n - cos_w * sin_n * cos_i),
        c1 * (cos_w * sin_n + sin_w * cos_n * cos_i) + c2 * (-sin_w * sin_n + cos_w * cos_n * cos_i),
        c1 * sin_w * sin_i + c2 * cos_w * sin_i,
    );

    // Orbital-plane velocity from the vis-viva relation, rotated through
    // the same three angles
    let v1 = -sin_deg(ecc_anomaly) * (mu * a).sqrt() / r;
    let v2 = (1.0 - e * e).sqrt() * cos_deg(ecc_anomaly) * (mu * a).sqrt() / r;

    let velocity = Vector3::new(
        v1 * (cos_w * cos_n - sin_w * sin_n * cos_i) - v2 * (sin_w * cos_n + cos_w * sin_n * cos_i),
        v1 * (cos_w * sin_n + sin_w * cos_n * cos_i) + v2 * (cos_w * cos_n * cos_i - sin_w * sin_n),
        v1 * sin_w * sin_i + v2 * cos_w * sin_i,
    );

    Ok((position, velocity))
}
