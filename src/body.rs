// Celestial Bodies - physical state plus bounded position history
// A `BodySet` owns the Sun and the ordered planet collection exclusively;
// the integrator mutates it in place and collaborators only read from it.

use std::collections::VecDeque;

use crate::constants::SystemConfig;
use crate::error::{Result, SimError};
use crate::seed::BodyRecord;
use crate::vector::Vector3;

// =============================================================================
// BODY
// =============================================================================

#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    /// kg; zero-mass bodies exert no force
    pub mass: f64,
    /// AU, heliocentric ecliptic frame
    pub position: Vector3,
    /// AU/day
    pub velocity: Vector3,
    /// Past positions, oldest first, bounded by `max_trace_len`
    trace: VecDeque<Vector3>,
    max_trace_len: usize,
    /// Minimum simulated days between trace samples; 0 samples every step
    trace_interval_days: f64,
    last_trace_jed: Option<f64>,
}

impl Body {
    pub fn new(
        name: impl Into<String>,
        mass: f64,
        position: Vector3,
        velocity: Vector3,
        max_trace_len: usize,
        trace_interval_days: f64,
    ) -> Self {
        // Two initialization snapshots so collaborators always have a
        // drawable segment
        let trace = VecDeque::from([position, position]);
        Self {
            name: name.into(),
            mass,
            position,
            velocity,
            trace,
            max_trace_len,
            trace_interval_days,
            last_trace_jed: None,
        }
    }

    /// The fixed central body at the frame origin
    pub fn sun(mass: f64) -> Self {
        Self::new("Sun", mass, Vector3::zero(), Vector3::zero(), 0, 0.0)
    }

    /// Past positions, oldest first
    pub fn trace(&self) -> &VecDeque<Vector3> {
        &self.trace
    }

    pub fn max_trace_len(&self) -> usize {
        self.max_trace_len
    }

    /// Push the current position onto the trace if the sampling cadence
    /// allows it at simulated time `jed`; evicts the oldest entry once the
    /// budget is exceeded.
    pub fn record_trace(&mut self, jed: f64) {
        if self.trace_interval_days > 0.0 {
            if let Some(last) = self.last_trace_jed {
                if jed - last < self.trace_interval_days {
                    return;
                }
            }
        }
        self.last_trace_jed = Some(jed);

        self.trace.push_back(self.position);
        if self.trace.len() > self.max_trace_len {
            self.trace.pop_front();
        }
    }
}

// =============================================================================
// BODY SET
// =============================================================================

/// The Sun plus the ordered, fixed-cardinality planet collection.
#[derive(Debug, Clone)]
pub struct BodySet {
    pub sun: Body,
    pub planets: Vec<Body>,
}

impl BodySet {
    /// Build from seed records, resolving each body's mass and trace
    /// budget through the typed configuration. A record naming an unknown
    /// body is malformed.
    pub fn from_records(config: &SystemConfig, records: &[BodyRecord]) -> Result<Self> {
        let sun = Body::sun(config.sun_mass_kg);

        let mut planets = Vec::with_capacity(records.len());
        for record in records {
            let spec = config.spec_by_name(&record.name).ok_or_else(|| {
                SimError::MalformedSeedRecord(format!("unknown body {:?}", record.name))
            })?;
            planets.push(Body::new(
                record.name.clone(),
                spec.mass_kg,
                Vector3::from_array(record.position),
                Vector3::from_array(record.velocity),
                spec.max_trace_len,
                spec.trace_interval_days,
            ));
        }

        Ok(Self { sun, planets })
    }

    pub fn get(&self, name: &str) -> Option<&Body> {
        if self.sun.name == name {
            return Some(&self.sun);
        }
        self.planets.iter().find(|b| b.name == name)
    }

    /// Record a trace sample for every planet at simulated time `jed`
    pub fn record_traces(&mut self, jed: f64) {
        for planet in &mut self.planets {
            planet.record_trace(jed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Planet;

    fn moving_body(max_trace_len: usize, interval: f64) -> Body {
        Body::new(
            "probe",
            1.0e20,
            Vector3::zero(),
            Vector3::new(1.0, 0.0, 0.0),
            max_trace_len,
            interval,
        )
    }

    #[test]
    fn test_trace_starts_with_two_snapshots() {
        let body = moving_body(10, 0.0);
        assert_eq!(body.trace().len(), 2);
        assert_eq!(body.trace()[0], body.trace()[1]);
    }

    #[test]
    fn test_trace_bounded_and_ordered() {
        let mut body = moving_body(3, 0.0);
        for step in 0..20 {
            body.position = Vector3::new(f64::from(step), 0.0, 0.0);
            body.record_trace(f64::from(step));
            assert!(body.trace().len() <= 3);
        }
        // Oldest to newest after saturation
        let xs: Vec<f64> = body.trace().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![17.0, 18.0, 19.0]);
    }

    #[test]
    fn test_zero_budget_keeps_initialization_snapshots() {
        let mut body = moving_body(0, 0.0);
        for step in 0..5 {
            body.position = Vector3::new(f64::from(step), 0.0, 0.0);
            body.record_trace(f64::from(step));
        }
        assert_eq!(body.trace().len(), 2);
    }

    #[test]
    fn test_sampling_cadence_follows_simulated_time() {
        let mut body = moving_body(100, 2.0);
        for step in 0..6 {
            body.position = Vector3::new(f64::from(step), 0.0, 0.0);
            body.record_trace(f64::from(step));
        }
        // Initial two snapshots plus samples at jed 0, 2, 4
        let xs: Vec<f64> = body.trace().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 0.0, 0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_from_records_resolves_config_by_name() {
        let config = SystemConfig::default();
        let records: Vec<BodyRecord> = Planet::ALL
            .iter()
            .map(|p| BodyRecord {
                name: p.name().to_string(),
                position: [1.0, 0.0, 0.0],
                velocity: [0.0, 0.017, 0.0],
            })
            .collect();

        let set = BodySet::from_records(&config, &records).unwrap();
        assert_eq!(set.planets.len(), 9);
        assert_eq!(set.sun.mass, config.sun_mass_kg);
        let jupiter = set.get("Jupiter").unwrap();
        assert_eq!(jupiter.mass, 1898.0e24);
        assert_eq!(jupiter.max_trace_len(), 780);
    }

    #[test]
    fn test_from_records_rejects_unknown_body() {
        let config = SystemConfig::default();
        let records = vec![BodyRecord {
            name: "Nibiru".to_string(),
            position: [1.0, 0.0, 0.0],
            velocity: [0.0, 0.0, 0.0],
        }];
        let err = BodySet::from_records(&config, &records).unwrap_err();
        assert!(matches!(err, SimError::MalformedSeedRecord(_)));
    }
}
