// Seed States - per-body initial-state records and the Keplerian builder
// A seed record is the interchange shape shared with the external
// ephemeris retriever: name plus heliocentric position/velocity triples.
// `InitialStateBuilder` produces the same records analytically from the
// element tables, so the simulation treats both sources alike.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::SimulationClock;
use crate::constants::{perturbation_terms, table_for_jed, ElementsTable, SystemConfig};
use crate::error::{Result, SimError};
use crate::kepler::{centuries_since_j2000, heliocentric_state, OrbitalElements};

// =============================================================================
// SEED RECORDS
// =============================================================================

/// One body's seed state: heliocentric position (AU) and velocity (AU/day)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub name: String,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

/// Exported system snapshot: `{date, planets: [...]}`.
///
/// This is the exact record shape the persistence collaborator stores and
/// the ephemeris retriever delivers; the crate parses and renders it as a
/// string and never touches the filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub date: String,
    pub planets: Vec<BodyRecord>,
}

// Lenient wire-side mirror so missing fields and wrong arities surface as
// seed-record errors rather than serde messages
#[derive(Deserialize)]
struct RawBodyRecord {
    name: Option<String>,
    position: Option<Vec<f64>>,
    velocity: Option<Vec<f64>>,
}

#[derive(Deserialize)]
struct RawSnapshot {
    date: Option<String>,
    planets: Option<Vec<RawBodyRecord>>,
}

fn require_triple(body: &str, field: &str, values: Option<Vec<f64>>) -> Result<[f64; 3]> {
    let values = values.ok_or_else(|| {
        SimError::MalformedSeedRecord(format!("record for {body:?} is missing {field:?}"))
    })?;
    if values.len() != 3 {
        return Err(SimError::MalformedSeedRecord(format!(
            "record for {body:?} has {field:?} of arity {}, expected 3",
            values.len()
        )));
    }
    Ok([values[0], values[1], values[2]])
}

impl SystemSnapshot {
    /// Parse a snapshot from its JSON string form
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(text)
            .map_err(|e| SimError::MalformedSeedRecord(e.to_string()))?;

        let date = raw
            .date
            .ok_or_else(|| SimError::MalformedSeedRecord("snapshot is missing \"date\"".into()))?;
        let raw_planets = raw.planets.ok_or_else(|| {
            SimError::MalformedSeedRecord("snapshot is missing \"planets\"".into())
        })?;

        let mut planets = Vec::with_capacity(raw_planets.len());
        for raw_record in raw_planets {
            let name = raw_record.name.ok_or_else(|| {
                SimError::MalformedSeedRecord("record is missing \"name\"".into())
            })?;
            let position = require_triple(&name, "position", raw_record.position)?;
            let velocity = require_triple(&name, "velocity", raw_record.velocity)?;
            planets.push(BodyRecord {
                name,
                position,
                velocity,
            });
        }

        Ok(Self { date, planets })
    }

    /// Render to the JSON string form the collaborator persists
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// =============================================================================
// INITIAL STATE BUILDER
// =============================================================================

/// Derives the seed state of every configured planet for a start date by
/// propagating the tabulated Keplerian elements.
pub struct InitialStateBuilder<'a> {
    config: &'a SystemConfig,
}

impl<'a> InitialStateBuilder<'a> {
    pub fn new(config: &'a SystemConfig) -> Self {
        Self { config }
    }

    /// Build seed records for all planets at `start_date` (`[-]Y-MM-DD`)
    pub fn build(&self, start_date: &str) -> Result<Vec<BodyRecord>> {
        let jed = SimulationClock::from_date_string(start_date)?.jed();
        let table = table_for_jed(jed as i64);
        match table {
            ElementsTable::Precise1800To2050 => {
                info!(start_date, "using Keplerian elements for 1800 AD - 2050 AD");
            }
            ElementsTable::Wide3000BcTo3000Ad => {
                info!(
                    start_date,
                    "start date outside the 1800-2050 fit; using the 3000 BC - 3000 AD table"
                );
            }
        }

        let t = centuries_since_j2000(jed);
        let mut records = Vec::with_capacity(self.config.planets.len());
        for spec in &self.config.planets {
            let name = spec.planet.name();
            let elements = OrbitalElements::for_planet(spec.planet, table, t);
            let mu = self.config.grav_constant * (self.config.sun_mass_kg + spec.mass_kg);
            let (position, velocity) =
                heliocentric_state(name, &elements, perturbation_terms(spec.planet), t, mu)?;

            records.push(BodyRecord {
                name: name.to_string(),
                position: position.to_array(),
                velocity: velocity.to_array(),
            });
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector3;
    use approx::assert_relative_eq;

    #[test]
    fn test_builder_produces_nine_planets() {
        let config = SystemConfig::default();
        let records = InitialStateBuilder::new(&config).build("2017-04-21").unwrap();
        assert_eq!(records.len(), 9);
        assert_eq!(records[0].name, "Mercury");
        assert_eq!(records[8].name, "Pluto");

        for record in &records {
            let position = Vector3::from_array(record.position);
            let velocity = Vector3::from_array(record.velocity);
            assert!(!position.is_degenerate());
            assert!(!velocity.is_degenerate());
            assert!(position.magnitude() > 0.2, "{} too close", record.name);
            assert!(position.magnitude() < 50.0, "{} too far", record.name);
        }
    }

    #[test]
    fn test_builder_earth_near_one_au() {
        let config = SystemConfig::default();
        let records = InitialStateBuilder::new(&config).build("2017-04-21").unwrap();
        let earth = records.iter().find(|r| r.name == "Earth").unwrap();
        assert_relative_eq!(
            Vector3::from_array(earth.position).magnitude(),
            1.0,
            epsilon = 0.02
        );
    }

    #[test]
    fn test_builder_falls_back_to_wide_table() {
        // 1600 AD is outside the precise window but well inside the wide fit
        let config = SystemConfig::default();
        let records = InitialStateBuilder::new(&config).build("1600-01-01").unwrap();
        assert_eq!(records.len(), 9);
        let earth = records.iter().find(|r| r.name == "Earth").unwrap();
        assert_relative_eq!(
            Vector3::from_array(earth.position).magnitude(),
            1.0,
            epsilon = 0.02
        );
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let snapshot = SystemSnapshot {
            date: "2017-04-21".to_string(),
            planets: vec![BodyRecord {
                name: "Mercury".to_string(),
                position: [0.1, -0.3, 0.02],
                velocity: [0.01, 0.005, -0.001],
            }],
        };
        let text = snapshot.to_json().unwrap();
        let parsed = SystemSnapshot::from_json(&text).unwrap();
        assert_eq!(parsed.date, "2017-04-21");
        assert_eq!(parsed.planets, snapshot.planets);
    }

    #[test]
    fn test_snapshot_rejects_missing_field() {
        let text = r#"{"date": "2017-04-21", "planets": [{"name": "Mercury", "position": [1, 2, 3]}]}"#;
        let err = SystemSnapshot::from_json(text).unwrap_err();
        assert!(matches!(err, SimError::MalformedSeedRecord(_)));
        assert!(err.to_string().contains("velocity"));
    }

    #[test]
    fn test_snapshot_rejects_wrong_arity() {
        let text = r#"{
            "date": "2017-04-21",
            "planets": [
                {"name": "Mercury", "position": [1, 2], "velocity": [0, 0, 0]}
            ]
        }"#;
        let err = SystemSnapshot::from_json(text).unwrap_err();
        assert!(err.to_string().contains("arity 2"));
    }

    #[test]
    fn test_snapshot_rejects_missing_planets() {
        let err = SystemSnapshot::from_json(r#"{"date": "2017-04-21"}"#).unwrap_err();
        assert!(matches!(err, SimError::MalformedSeedRecord(_)));
    }
}
