//! Applied loads
//!
//! Positions are span-local, in meters from the span's left node. Downward
//! forces are positive, matching the sagging-positive moment convention.

use serde::{Deserialize, Serialize};

/// A load applied to one span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Load {
    /// Uniform line load over a segment of the span
    Distributed {
        /// Intensity (kN/m), downward positive
        w: f64,
        /// Segment start (m from left node)
        start: f64,
        /// Segment end (m from left node)
        end: f64,
    },
    /// Concentrated force
    Point {
        /// Magnitude (kN), downward positive
        p: f64,
        /// Position (m from left node)
        position: f64,
    },
    /// Concentrated moment
    Moment {
        /// Magnitude (kN·m), positive in the rotation DOF direction
        m: f64,
        /// Position (m from left node)
        position: f64,
    },
}

impl Load {
    /// Uniform load over [start, end]
    pub fn distributed(w: f64, start: f64, end: f64) -> Self {
        Load::Distributed { w, start, end }
    }

    /// Concentrated force at `position`
    pub fn point(p: f64, position: f64) -> Self {
        Load::Point { p, position }
    }

    /// Concentrated moment at `position`
    pub fn moment(m: f64, position: f64) -> Self {
        Load::Moment { m, position }
    }

    /// Total downward force (kN); moments contribute none
    pub fn total_force(&self) -> f64 {
        match *self {
            Load::Distributed { w, start, end } => w * (end - start),
            Load::Point { p, .. } => p,
            Load::Moment { .. } => 0.0,
        }
    }

    /// Span-local positions where the internal-force diagram may kink or jump
    pub fn breakpoints(&self) -> Vec<f64> {
        match *self {
            Load::Distributed { start, end, .. } => vec![start, end],
            Load::Point { position, .. } => vec![position],
            Load::Moment { position, .. } => vec![position],
        }
    }

    /// Check magnitudes are finite and positions lie inside the span
    pub fn validate(&self, span_length: f64) -> Result<(), String> {
        let in_span = |x: f64| (0.0..=span_length).contains(&x);
        match *self {
            Load::Distributed { w, start, end } => {
                if !w.is_finite() {
                    return Err("distributed load intensity must be finite".to_string());
                }
                if !in_span(start) || !in_span(end) || end <= start {
                    return Err(format!(
                        "distributed segment [{start}, {end}] must lie inside [0, {span_length}]"
                    ));
                }
            }
            Load::Point { p, position } => {
                if !p.is_finite() {
                    return Err("point load magnitude must be finite".to_string());
                }
                if !in_span(position) {
                    return Err(format!(
                        "point load position {position} outside span of length {span_length}"
                    ));
                }
            }
            Load::Moment { m, position } => {
                if !m.is_finite() {
                    return Err("applied moment magnitude must be finite".to_string());
                }
                if !in_span(position) {
                    return Err(format!(
                        "moment position {position} outside span of length {span_length}"
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_force() {
        assert_eq!(Load::distributed(10.0, 0.0, 4.0).total_force(), 40.0);
        assert_eq!(Load::point(25.0, 2.0).total_force(), 25.0);
        assert_eq!(Load::moment(15.0, 2.0).total_force(), 0.0);
    }

    #[test]
    fn test_validation_positions() {
        assert!(Load::point(10.0, 6.0).validate(5.0).is_err());
        assert!(Load::distributed(5.0, 3.0, 2.0).validate(5.0).is_err());
        assert!(Load::distributed(5.0, 0.0, 5.0).validate(5.0).is_ok());
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(Load::point(f64::NAN, 1.0).validate(5.0).is_err());
        assert!(Load::distributed(f64::INFINITY, 0.0, 1.0).validate(5.0).is_err());
    }
}
