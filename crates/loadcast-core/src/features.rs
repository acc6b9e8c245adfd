//! Cyclical time features.
//!
//! Each timestamp becomes six values on the unit circle:
//!
//! ```text
//! hour    (period 24) → sin, cos
//! minute  (period 60) → sin, cos
//! weekday (period 7)  → sin, cos   (Monday = 0)
//! ```
//!
//! Adjacent periods (23:59 and 00:00, Sunday and Monday) land next to
//! each other.

use std::f64::consts::TAU;

use crate::timestamp::{ParseError, Timestamp};

/// Number of features produced per timestamp.
pub const FEATURE_COUNT: usize = 6;

const HOURS_PER_DAY: f64 = 24.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const DAYS_PER_WEEK: f64 = 7.0;

/// `[hour_sin, hour_cos, minute_sin, minute_cos, day_sin, day_cos]`.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Stateless timestamp → feature encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeFeatureEncoder;

impl TimeFeatureEncoder {
    /// Encode every raw timestamp, failing on the first malformed one.
    pub fn encode<S: AsRef<str>>(&self, timestamps: &[S]) -> Result<Vec<FeatureVector>, ParseError> {
        timestamps
            .iter()
            .map(|raw| Timestamp::parse(raw.as_ref()).map(|ts| self.encode_one(&ts)))
            .collect()
    }

    /// Encode a single already-parsed timestamp.
    pub fn encode_one(&self, ts: &Timestamp) -> FeatureVector {
        let (hour_sin, hour_cos) = cyclical(ts.hour(), HOURS_PER_DAY);
        let (minute_sin, minute_cos) = cyclical(ts.minute(), MINUTES_PER_HOUR);
        let (day_sin, day_cos) = cyclical(ts.weekday(), DAYS_PER_WEEK);
        [hour_sin, hour_cos, minute_sin, minute_cos, day_sin, day_cos]
    }
}

fn cyclical(value: u32, period: f64) -> (f64, f64) {
    let angle = TAU * f64::from(value) / period;
    (angle.sin(), angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn midnight_monday_is_on_the_axis() {
        let rows = TimeFeatureEncoder.encode(&["2024-01-01T00:00:00Z"]).unwrap();
        let expected = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        for (got, want) in rows[0].iter().zip(expected) {
            assert!((got - want).abs() < EPS, "{got} != {want}");
        }
    }

    #[test]
    fn six_am_is_a_quarter_turn() {
        let rows = TimeFeatureEncoder.encode(&["2024-01-01T06:00:00Z"]).unwrap();
        assert!((rows[0][0] - 1.0).abs() < EPS);
        assert!(rows[0][1].abs() < EPS);
    }

    #[test]
    fn late_night_is_close_to_midnight() {
        let rows = TimeFeatureEncoder
            .encode(&["2024-01-01T23:00:00Z", "2024-01-02T00:00:00Z", "2024-01-01T12:00:00Z"])
            .unwrap();
        let dist = |a: &FeatureVector, b: &FeatureVector| {
            ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
        };
        assert!(dist(&rows[0], &rows[1]) < dist(&rows[0], &rows[2]));
    }

    #[test]
    fn all_values_within_unit_range() {
        let mut stamps = Vec::new();
        for day in 1..=7 {
            for hour in 0..24 {
                for minute in (0..60).step_by(7) {
                    stamps.push(format!("2024-01-{day:02}T{hour:02}:{minute:02}:00Z"));
                }
            }
        }
        let rows = TimeFeatureEncoder.encode(&stamps).unwrap();
        assert_eq!(rows.len(), stamps.len());
        assert!(rows.iter().flatten().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn encoding_is_deterministic() {
        let stamps = ["2024-05-17T09:41:00Z", "2024-05-18T17:03:00+02:00"];
        let a = TimeFeatureEncoder.encode(&stamps).unwrap();
        let b = TimeFeatureEncoder.encode(&stamps).unwrap();
        for (x, y) in a.iter().flatten().zip(b.iter().flatten()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn malformed_timestamp_fails_with_value() {
        let err = TimeFeatureEncoder
            .encode(&["2024-01-01T00:00:00Z", "not-a-time"])
            .unwrap_err();
        assert!(err.to_string().contains("not-a-time"));
    }

    #[test]
    fn empty_input_gives_empty_matrix() {
        let rows = TimeFeatureEncoder.encode::<&str>(&[]).unwrap();
        assert!(rows.is_empty());
    }
}
