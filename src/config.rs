//! Design configuration: safety factors, catalogs, limits and cost rates.
//!
//! Every code-dependent constant the engine uses lives here so that a caller
//! can swap factors or catalogs without touching engine internals. The
//! `Default` implementation carries the NBR 6118 values for ordinary
//! buildings.

use serde::{Deserialize, Serialize};

/// Environmental aggressiveness class (NBR 6118 table 6.1 / 13.4).
///
/// Governs the characteristic crack width limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExposureClass {
    /// Rural / submerged environments
    Caa1,
    /// Urban environments
    Caa2,
    /// Marine / industrial environments
    Caa3,
    /// Industrial with splash / high aggressiveness
    Caa4,
}

impl ExposureClass {
    /// Characteristic crack opening limit wk (mm)
    pub fn crack_limit_mm(&self) -> f64 {
        match self {
            ExposureClass::Caa1 => 0.4,
            ExposureClass::Caa2 => 0.3,
            ExposureClass::Caa3 | ExposureClass::Caa4 => 0.2,
        }
    }
}

/// Unit cost rates for the optimizer's objective function
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRates {
    /// Concrete, per m³ (currency units)
    pub concrete_per_m3: f64,
    /// Reinforcing steel, per kg
    pub steel_per_kg: f64,
    /// Formwork, per m² of contact surface
    pub formwork_per_m2: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            concrete_per_m3: 450.0,
            steel_per_kg: 12.0,
            formwork_per_m2: 80.0,
        }
    }
}

/// Complete configuration for analysis, design and verification.
///
/// Threaded explicitly through `analyze`/`optimize`; the engine reads no
/// global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignConfig {
    /// Partial safety factor for concrete strength
    pub gamma_c: f64,
    /// Partial safety factor for steel strength
    pub gamma_s: f64,
    /// Load factor taking characteristic actions to design actions
    pub gamma_f: f64,
    /// Unit weight of reinforced concrete (kN/m³); zero disables self-weight
    pub concrete_unit_weight: f64,
    /// Density of reinforcing steel (kg/m³), for quantity takeoff
    pub steel_density: f64,
    /// Minimum geometric reinforcement ratio (As_min = rho_min * b * h)
    pub rho_min: f64,
    /// Longitudinal bar diameters available to the detailer (mm), ascending
    pub bar_catalog: Vec<f64>,
    /// Stirrup diameters available to the detailer (mm), ascending
    pub stirrup_catalog: Vec<f64>,
    /// Relative area window inside which fewer, larger bars win the
    /// bar-selection tie-break
    pub bar_area_tolerance: f64,
    /// Minimum clear horizontal spacing between longitudinal bars (cm)
    pub min_clear_spacing: f64,
    /// Environmental class; sets the crack width limit
    pub exposure: ExposureClass,
    /// Deflection limit divisor: limit = span / deflection_divisor
    pub deflection_divisor: f64,
    /// Age at which quasi-permanent load is applied (months), for creep
    pub load_age_months: f64,
    /// Age at which deflections are checked (months); 70+ is long-term
    pub check_age_months: f64,
    /// Cap on bounded iterative refinements (effective-depth loop)
    pub max_iterations: usize,
    /// Internal-force stations sampled per span for diagrams
    pub diagram_stations: usize,
    /// DOF count above which global assembly uses the sparse path
    pub sparse_threshold: usize,
    /// Optimizer objective rates
    pub cost: CostRates,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            gamma_c: 1.4,
            gamma_s: 1.15,
            gamma_f: 1.4,
            concrete_unit_weight: 25.0,
            steel_density: 7850.0,
            rho_min: 0.0015,
            bar_catalog: vec![8.0, 10.0, 12.5, 16.0, 20.0, 25.0],
            stirrup_catalog: vec![5.0, 6.3, 8.0, 10.0],
            bar_area_tolerance: 0.02,
            min_clear_spacing: 2.0,
            exposure: ExposureClass::Caa2,
            deflection_divisor: 250.0,
            load_age_months: 0.0,
            check_age_months: 70.0,
            max_iterations: 20,
            diagram_stations: 200,
            sparse_threshold: 64,
            cost: CostRates::default(),
        }
    }
}

impl DesignConfig {
    /// Crack width limit (mm) for the configured exposure class
    pub fn crack_limit_mm(&self) -> f64 {
        self.exposure.crack_limit_mm()
    }

    /// Smallest stirrup diameter (cm) the detailer may assume before shear
    /// design has run
    pub fn stirrup_allowance_cm(&self) -> f64 {
        self.stirrup_catalog.first().copied().unwrap_or(5.0) / 10.0
    }

    /// Basic sanity checks on user-supplied configuration
    pub fn validate(&self) -> crate::error::EngineResult<()> {
        use crate::error::EngineError;
        if self.gamma_c < 1.0 || self.gamma_s < 1.0 || self.gamma_f < 1.0 {
            return Err(EngineError::InvalidInput(
                "partial safety factors must be >= 1.0".to_string(),
            ));
        }
        if self.bar_catalog.is_empty() || self.stirrup_catalog.is_empty() {
            return Err(EngineError::InvalidInput(
                "bar and stirrup catalogs must not be empty".to_string(),
            ));
        }
        if !self.bar_catalog.windows(2).all(|w| w[0] < w[1]) {
            return Err(EngineError::InvalidInput(
                "bar catalog must be strictly ascending".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(EngineError::InvalidInput(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.diagram_stations < 2 {
            return Err(EngineError::InvalidInput(
                "diagram_stations must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
