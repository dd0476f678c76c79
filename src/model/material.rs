//! Concrete and reinforcing steel properties

use serde::{Deserialize, Serialize};

/// Structural concrete, characterized by its class strength
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Concrete {
    /// Characteristic compressive strength fck (MPa)
    pub fck: f64,
    /// Secant modulus of elasticity Ecs (MPa)
    pub ecs: f64,
}

impl Concrete {
    /// Create concrete of a given class, estimating Ecs = 0.85 * 5600 * sqrt(fck)
    pub fn new(fck: f64) -> Self {
        Self {
            fck,
            ecs: 0.85 * 5600.0 * fck.sqrt(),
        }
    }

    /// Override the secant modulus (MPa)
    pub fn with_modulus(mut self, ecs: f64) -> Self {
        self.ecs = ecs;
        self
    }

    /// C25 concrete (fck = 25 MPa, Ecs = 23800 MPa)
    pub fn c25() -> Self {
        Self::new(25.0)
    }

    /// C30 concrete (fck = 30 MPa)
    pub fn c30() -> Self {
        Self::new(30.0)
    }

    /// Design compressive strength (kN/cm²)
    pub fn fcd_kn_cm2(&self, gamma_c: f64) -> f64 {
        (self.fck / gamma_c) / 10.0
    }

    /// Mean tensile strength fctm = 0.3 * fck^(2/3) (MPa)
    pub fn fctm_mpa(&self) -> f64 {
        0.3 * self.fck.powf(2.0 / 3.0)
    }

    /// Mean tensile strength (kN/cm²)
    pub fn fctm_kn_cm2(&self) -> f64 {
        self.fctm_mpa() / 10.0
    }

    /// Design tensile strength fctd = 0.7 * fctm / gamma_c (kN/cm²)
    pub fn fctd_kn_cm2(&self, gamma_c: f64) -> f64 {
        0.7 * self.fctm_mpa() / gamma_c / 10.0
    }

    /// Secant modulus in kN/m², for EI products in the solver
    pub fn ecs_kn_m2(&self) -> f64 {
        self.ecs * 1000.0
    }

    /// Secant modulus in kN/cm², for transformed-section work
    pub fn ecs_kn_cm2(&self) -> f64 {
        self.ecs / 10.0
    }

    /// Strength and modulus must be finite and positive; NaN fails both
    /// comparisons, so finiteness is checked first
    pub fn validate(&self) -> Result<(), String> {
        if !self.fck.is_finite() || self.fck <= 0.0 {
            return Err(format!("concrete fck must be positive, got {}", self.fck));
        }
        if !self.ecs.is_finite() || self.ecs <= 0.0 {
            return Err(format!("concrete Ecs must be positive, got {}", self.ecs));
        }
        Ok(())
    }
}

impl Default for Concrete {
    fn default() -> Self {
        Self::c25()
    }
}

/// Reinforcing steel grade
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Steel {
    /// Characteristic yield strength fyk (MPa)
    pub fyk: f64,
    /// Modulus of elasticity Es (MPa)
    pub es: f64,
}

impl Steel {
    /// Create a steel grade with Es = 210 GPa
    pub fn new(fyk: f64) -> Self {
        Self { fyk, es: 210_000.0 }
    }

    /// CA-50 (fyk = 500 MPa), the usual longitudinal grade
    pub fn ca50() -> Self {
        Self::new(500.0)
    }

    /// CA-60 (fyk = 600 MPa), the usual thin-wire grade
    pub fn ca60() -> Self {
        Self::new(600.0)
    }

    /// Design yield strength (kN/cm²)
    pub fn fyd_kn_cm2(&self, gamma_s: f64) -> f64 {
        (self.fyk / gamma_s) / 10.0
    }

    /// Modulus in kN/cm²
    pub fn es_kn_cm2(&self) -> f64 {
        self.es / 10.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.fyk.is_finite() || self.fyk <= 0.0 {
            return Err(format!("steel fyk must be positive, got {}", self.fyk));
        }
        if !self.es.is_finite() || self.es <= 0.0 {
            return Err(format!("steel Es must be positive, got {}", self.es));
        }
        Ok(())
    }
}

impl Default for Steel {
    fn default() -> Self {
        Self::ca50()
    }
}
