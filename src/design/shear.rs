//! Ultimate limit state shear design, Model I
//!
//! Fixed 45° struts: concrete portion Vc from the design tensile strength,
//! strut crushing ceiling VRd2, and vertical two-leg stirrups for the rest.

use serde::{Deserialize, Serialize};

use crate::config::DesignConfig;
use crate::model::{Concrete, CrossSection, Steel};
use crate::results::CheckStatus;

use super::detailing::{self, StirrupSelection};

/// Stirrup stress ceiling (kN/cm²), even for grades above CA-50
const FYWD_CAP: f64 = 43.5;

/// Shear design of one span's governing section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShearDesign {
    /// Factored shear demand (kN)
    pub vd_kn: f64,
    /// Concrete contribution Vc (kN)
    pub vc_kn: f64,
    /// Strut crushing resistance VRd2 (kN)
    pub vrd2_kn: f64,
    /// Diagonal compression check, Vd against VRd2
    pub strut: CheckStatus,
    /// Required Asw/s including the minimum ratio (cm²/cm)
    pub required_cm2_per_cm: f64,
    /// True when the minimum ratio governs
    pub minimum_governed: bool,
    /// Adopted stirrups; `None` when the strut fails or no catalog spacing
    /// stays buildable
    pub stirrups: Option<StirrupSelection>,
}

impl ShearDesign {
    pub fn is_satisfied(&self) -> bool {
        self.strut.passed && self.stirrups.is_some()
    }
}

/// Size stirrups for a factored shear `vd_kn` acting on the effective depth
/// carried over from the flexural design.
pub fn design_shear(
    vd_kn: f64,
    d_cm: f64,
    section: &CrossSection,
    concrete: &Concrete,
    steel: &Steel,
    config: &DesignConfig,
) -> ShearDesign {
    let vd = vd_kn.abs();
    let bw = section.web_width();

    let vc = 0.6 * concrete.fctd_kn_cm2(config.gamma_c) * bw * d_cm;
    let alpha_v2 = 1.0 - concrete.fck / 250.0;
    let vrd2 = 0.27 * alpha_v2 * concrete.fcd_kn_cm2(config.gamma_c) * bw * d_cm;
    let strut = CheckStatus::evaluate(vd, vrd2);

    let fywd = steel.fyd_kn_cm2(config.gamma_s).min(FYWD_CAP);
    let computed = (vd - vc).max(0.0) / (0.9 * d_cm * fywd);
    let minimum = 0.2 * (concrete.fctm_mpa() / steel.fyk) * bw;
    let minimum_governed = computed < minimum;
    let required = computed.max(minimum);

    let stirrups = strut
        .passed
        .then(|| detailing::select_stirrups(required, d_cm, vd, vrd2, config))
        .flatten();

    ShearDesign {
        vd_kn: vd,
        vc_kn: vc,
        vrd2_kn: vrd2,
        strut,
        required_cm2_per_cm: required,
        minimum_governed,
        stirrups,
    }
}
