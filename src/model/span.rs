//! A single span between two consecutive nodes

use serde::{Deserialize, Serialize};

use crate::model::load::Load;
use crate::model::material::{Concrete, Steel};
use crate::model::section::CrossSection;

/// One span of the continuous beam
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    /// Clear length (m)
    pub length: f64,
    /// Cross-section, constant over the span
    pub section: CrossSection,
    /// Concrete grade
    pub concrete: Concrete,
    /// Longitudinal / stirrup steel grade
    pub steel: Steel,
    /// Applied loads, span-local coordinates
    pub loads: Vec<Load>,
}

impl Span {
    pub fn new(length: f64, section: CrossSection, concrete: Concrete, steel: Steel) -> Self {
        Self {
            length,
            section,
            concrete,
            steel,
            loads: Vec::new(),
        }
    }

    /// Flexural rigidity EI (kN·m²) on gross properties
    pub fn ei_kn_m2(&self) -> f64 {
        self.concrete.ecs_kn_m2() * self.section.gross_inertia_m4()
    }

    /// Applied loads plus the derived self-weight line load.
    ///
    /// Self-weight is never stored on the model; it is recomputed here from
    /// the current section so optimizer candidates stay consistent.
    pub fn effective_loads(&self, unit_weight: f64) -> Vec<Load> {
        let mut loads = self.loads.clone();
        let sw = self.section.self_weight_kn_m(unit_weight);
        if sw > 0.0 {
            loads.push(Load::distributed(sw, 0.0, self.length));
        }
        loads
    }

    /// Total applied vertical force including self-weight (kN)
    pub fn total_vertical_load(&self, unit_weight: f64) -> f64 {
        self.effective_loads(unit_weight)
            .iter()
            .map(Load::total_force)
            .sum()
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.length.is_finite() || self.length <= 0.0 {
            return Err(format!("span length must be positive, got {}", self.length));
        }
        self.section.validate()?;
        self.concrete.validate()?;
        self.steel.validate()?;
        for load in &self.loads {
            load.validate(self.length)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_span() -> Span {
        Span::new(
            5.0,
            CrossSection::rectangular(15.0, 40.0),
            Concrete::c25(),
            Steel::ca50(),
        )
    }

    #[test]
    fn test_self_weight_injection() {
        let span = test_span();
        let loads = span.effective_loads(25.0);
        assert_eq!(loads.len(), 1);
        assert_relative_eq!(loads[0].total_force(), 1.5 * 5.0);
    }

    #[test]
    fn test_zero_unit_weight_adds_nothing() {
        let span = test_span();
        assert!(span.effective_loads(0.0).is_empty());
    }

    #[test]
    fn test_ei() {
        let span = test_span();
        // Ecs = 23800 MPa, Ig = 80000 cm4
        assert_relative_eq!(span.ei_kn_m2(), 23_800e3 * 8e-4, max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_bad_material() {
        let mut span = test_span();
        span.concrete = Concrete::c25().with_modulus(-23_800.0);
        assert!(span.validate().is_err());

        let mut span = test_span();
        span.steel.fyk = f64::NAN;
        assert!(span.validate().is_err());
    }
}
