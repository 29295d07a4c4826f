// Simulation Calendar - Julian Ephemeris Day clock
// The master clock is a single fractional day count (JED). Civil dates use
// the historical hybrid calendar: Julian before the 1582-10-15 Gregorian
// cutover, Gregorian from it onward, with no year zero (civil -1 precedes
// civil 1 directly).

use crate::error::{Result, SimError};

/// First Julian day number of the Gregorian calendar (1582-10-15)
pub const GREGORIAN_CUTOVER_JDN: i64 = 2_299_161;

/// Monotonic simulation clock counting fractional Julian Ephemeris Days.
///
/// Advances in lock-step with the integrator; never decreases and is never
/// reset after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    jed: f64,
}

impl SimulationClock {
    pub fn from_jed(jed: f64) -> Self {
        Self { jed }
    }

    /// Parse a `[-]Y-MM-DD` civil date into a noon-referenced clock
    pub fn from_date_string(date: &str) -> Result<Self> {
        let (year, month, day) = parse_civil_date(date)?;
        Ok(Self {
            jed: civil_to_jed(year, month, day),
        })
    }

    pub fn jed(&self) -> f64 {
        self.jed
    }

    /// Advance simulated time by `dt_hours` (adds dt/24 days)
    pub fn advance(&mut self, dt_hours: f64) {
        self.jed += dt_hours / 24.0;
    }

    /// Current civil calendar date `(year, month, day)`
    pub fn to_calendar_date(&self) -> (i64, i64, i64) {
        let (year, month, day, _) = decompose(self.jed);
        (year, month, day)
    }

    /// Current date as `Y-MM-DD` (year unpadded so negative years stay
    /// parseable)
    pub fn date_string(&self) -> String {
        let (year, month, day) = self.to_calendar_date();
        format!("{}-{:02}-{:02}", year, month, day)
    }

    /// Current date plus the hour of day, `Y-MM-DD HH:00`
    pub fn date_hour_string(&self) -> String {
        let (year, month, day, fraction) = decompose(self.jed);
        let hour = (fraction * 24.0).floor() as i64;
        format!("{}-{:02}-{:02} {:02}:00", year, month, day, hour)
    }
}

// =============================================================================
// CIVIL DATE <-> JULIAN DAY
// =============================================================================

fn parse_civil_date(date: &str) -> Result<(i64, i64, i64)> {
    let invalid = |reason: &str| SimError::InvalidDate {
        input: date.to_string(),
        reason: reason.to_string(),
    };

    let (negative, rest) = match date.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, date),
    };

    let parts: Vec<&str> = rest.split('-').collect();
    if parts.len() != 3 {
        return Err(invalid("expected three dash-separated fields"));
    }

    let mut numbers = [0i64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .parse::<i64>()
            .map_err(|_| invalid("non-numeric field"))?;
    }

    let year = if negative { -numbers[0] } else { numbers[0] };
    let (month, day) = (numbers[1], numbers[2]);

    if year == 0 {
        return Err(invalid("there is no civil year zero"));
    }
    if !(1..=12).contains(&month) {
        return Err(invalid("month out of range"));
    }
    if !(1..=31).contains(&day) {
        return Err(invalid("day out of range"));
    }

    Ok((year, month, day))
}

/// Noon-referenced Julian day for a civil date, dispatching on the
/// 1582-10-15 cutover
fn civil_to_jed(year: i64, month: i64, day: i64) -> f64 {
    // Civil years skip zero; the day-number formulas use astronomical
    // numbering where 1 BC is year 0
    let y = if year < 0 { year + 1 } else { year };

    let jdn = if (year, month, day) >= (1582, 10, 15) {
        gregorian_day_number(y, month, day)
    } else {
        julian_day_number(y, month, day)
    };
    jdn as f64
}

fn fdiv(a: i64, b: i64) -> i64 {
    a.div_euclid(b)
}

/// Gregorian-calendar day number (noon-referenced), floor division
/// throughout
fn gregorian_day_number(y: i64, m: i64, d: i64) -> i64 {
    367 * y - fdiv(7 * (y + fdiv(m + 9, 12)), 4) - fdiv(3 * (fdiv(y + fdiv(m - 9, 7), 100) + 1), 4)
        + fdiv(275 * m, 9)
        + d
        + 1_721_029
}

/// Julian-calendar day number (noon-referenced) for dates before the
/// cutover; the month-offset term truncates toward zero
fn julian_day_number(y: i64, m: i64, d: i64) -> i64 {
    367 * y - 7 * (y + 5001 + (m - 9) / 7) / 4 + 275 * m / 9 + d + 1_729_777
}

/// Split a fractional JED into civil date and day fraction.
///
/// The +0.5 offset aligns the decomposition to midnight boundaries; the
/// Gregorian correction applies only from the cutover day onward.
fn decompose(jed: f64) -> (i64, i64, i64, f64) {
    let mut z = jed.floor() as i64;
    let mut f = jed - z as f64;

    f += 0.5;
    if f >= 1.0 {
        f -= 1.0;
        z += 1;
    }

    let a = if z >= GREGORIAN_CUTOVER_JDN {
        let alpha = ((z as f64 - 1_867_216.25) / 36_524.25).floor() as i64;
        z + 1 + alpha - fdiv(alpha, 4)
    } else {
        z
    };

    let b = a + 1524;
    let c = ((b as f64 - 122.1) / 365.25).floor() as i64;
    let d = (365.25 * c as f64).floor() as i64;
    let e = ((b - d) as f64 / 30.6001).floor() as i64;

    let day = b - d - (30.6001 * e as f64).floor() as i64;
    let month = if e < 14 { e - 1 } else { e - 13 };
    let year = if month > 2 { c - 4716 } else { c - 4715 };

    // No year zero in civil reckoning
    let civil_year = if year <= 0 { year - 1 } else { year };

    (civil_year, month, day, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Datelike;

    fn round_trip(date: &str) -> String {
        SimulationClock::from_date_string(date).unwrap().date_string()
    }

    #[test]
    fn test_j2000_anchor() {
        let clock = SimulationClock::from_date_string("2000-01-01").unwrap();
        assert_relative_eq!(clock.jed(), 2_451_545.0);
        assert_eq!(SimulationClock::from_jed(2_451_545.0).date_string(), "2000-01-01");
    }

    #[test]
    fn test_round_trip_modern_dates() {
        for date in ["2000-01-01", "1969-07-20", "1900-01-01", "2017-04-21", "2050-12-31"] {
            assert_eq!(round_trip(date), date);
        }
    }

    #[test]
    fn test_round_trip_around_cutover() {
        // Last Julian day, first Gregorian day and the day after
        assert_eq!(round_trip("1582-10-04"), "1582-10-04");
        assert_eq!(round_trip("1582-10-15"), "1582-10-15");
        assert_eq!(round_trip("1582-10-16"), "1582-10-16");

        // The ten dropped civil days map onto the Gregorian side
        let dropped = SimulationClock::from_date_string("1582-10-04").unwrap();
        let first = SimulationClock::from_date_string("1582-10-15").unwrap();
        assert_relative_eq!(first.jed() - dropped.jed(), 1.0);
    }

    #[test]
    fn test_round_trip_ancient_dates() {
        for date in ["1-01-01", "-1-12-31", "100-06-15", "-1000-03-01"] {
            assert_eq!(round_trip(date), date);
        }
    }

    #[test]
    fn test_year_zero_boundary_is_adjacent() {
        let before = SimulationClock::from_date_string("-1-12-31").unwrap();
        let after = SimulationClock::from_date_string("1-01-01").unwrap();
        assert_relative_eq!(after.jed() - before.jed(), 1.0);
    }

    #[test]
    fn test_rejects_malformed_dates() {
        for bad in ["2000-01", "2000-13-01", "2000-01-32", "0-01-01", "abcd-01-01", ""] {
            assert!(
                SimulationClock::from_date_string(bad).is_err(),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_advance_and_day_rollover() {
        let mut clock = SimulationClock::from_date_string("2000-01-01").unwrap();
        assert_eq!(clock.date_hour_string(), "2000-01-01 12:00");

        // Noon plus twelve hours crosses the midnight boundary
        clock.advance(12.0);
        assert_eq!(clock.date_hour_string(), "2000-01-02 00:00");

        clock.advance(6.0);
        assert_eq!(clock.date_hour_string(), "2000-01-02 06:00");
    }

    #[test]
    fn test_five_hundred_days_from_2017() {
        let mut clock = SimulationClock::from_date_string("2017-04-21").unwrap();
        for _ in 0..500 {
            clock.advance(24.0);
        }
        assert_eq!(clock.date_string(), "2018-09-03");
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut clock = SimulationClock::from_date_string("2017-04-21").unwrap();
        let mut previous = clock.jed();
        for _ in 0..100 {
            clock.advance(6.0);
            assert!(clock.jed() > previous);
            previous = clock.jed();
        }
    }

    #[test]
    fn test_agrees_with_chrono_for_gregorian_range() {
        // chrono's proleptic Gregorian day count: CE day 1 is 0001-01-01,
        // whose noon Julian day number is 1721426
        for (y, m, d) in [(1583, 1, 1), (1600, 2, 29), (1969, 7, 20), (2000, 1, 1), (2049, 12, 31)]
        {
            let date = chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap();
            let expected = i64::from(date.num_days_from_ce()) + 1_721_425;
            let clock =
                SimulationClock::from_date_string(&format!("{}-{:02}-{:02}", y, m, d)).unwrap();
            assert_relative_eq!(clock.jed(), expected as f64);
        }
    }
}
