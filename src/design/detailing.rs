//! Reinforcement detailing: commercial bar selection, anchorage and stirrups
//!
//! Converts theoretical steel areas into buildable arrangements from the
//! configured catalogs. Selection is deterministic: the smallest feasible
//! provided area wins, except that an option with fewer, larger bars takes
//! precedence when its area lands inside the configured tolerance window.

use serde::{Deserialize, Serialize};

use crate::config::DesignConfig;
use crate::model::{Concrete, CrossSection, Steel};

/// Cross-sectional area of one bar (cm²) from its diameter in mm
pub fn bar_area_cm2(diameter_mm: f64) -> f64 {
    let r_cm = diameter_mm / 10.0 / 2.0;
    std::f64::consts::PI * r_cm * r_cm
}

/// A selected longitudinal bar group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSelection {
    /// Number of bars, single layer
    pub count: usize,
    /// Bar diameter (mm)
    pub diameter: f64,
    /// Area provided (cm²)
    pub provided_cm2: f64,
    /// Straight anchorage length (cm)
    pub anchorage_cm: f64,
}

/// Selected stirrup arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StirrupSelection {
    /// Stirrup diameter (mm)
    pub diameter: f64,
    /// Spacing (cm), floored to whole centimeters
    pub spacing_cm: f64,
    /// Vertical legs crossing the shear plane
    pub legs: usize,
    /// Asw/s provided (cm²/cm)
    pub provided_cm2_per_cm: f64,
}

/// Side-face (skin) reinforcement for deep beams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinReinforcement {
    /// Bars on each side face
    pub bars_per_face: usize,
    /// Bar diameter (mm)
    pub diameter: f64,
    /// Area per face (cm²)
    pub area_per_face_cm2: f64,
}

/// Basic straight anchorage length (cm) for a ribbed bar.
///
/// Top bars cast above 30 cm of fresh concrete sit in the poor bond zone.
pub fn anchorage_length_cm(
    diameter_mm: f64,
    concrete: &Concrete,
    steel: &Steel,
    config: &DesignConfig,
    top_bar: bool,
) -> f64 {
    let eta1 = 2.25;
    let eta2 = if top_bar { 0.7 } else { 1.0 };
    let eta3 = if diameter_mm < 32.0 {
        1.0
    } else {
        (132.0 - diameter_mm) / 100.0
    };

    let fctd_mpa = concrete.fctd_kn_cm2(config.gamma_c) * 10.0;
    let fbd = eta1 * eta2 * eta3 * fctd_mpa;
    let fyd_mpa = steel.fyd_kn_cm2(config.gamma_s) * 10.0;

    let lb_mm = (diameter_mm / 4.0) * (fyd_mpa / fbd);
    let lb_min_mm = (0.3 * lb_mm).max(10.0 * diameter_mm).max(100.0);
    lb_mm.max(lb_min_mm) / 10.0
}

/// Largest bar count of diameter `phi` that fits one layer of the web
fn max_bars_in_layer(phi_mm: f64, section: &CrossSection, config: &DesignConfig) -> usize {
    let available = section.web_width() - 2.0 * (section.cover + config.stirrup_allowance_cm());
    let phi_cm = phi_mm / 10.0;
    let clear = config.min_clear_spacing.max(phi_cm);
    if available < phi_cm {
        return 0;
    }
    // n*phi + (n-1)*clear <= available
    (((available + clear) / (phi_cm + clear)).floor() as usize).max(0)
}

/// Largest area (cm²) any single-layer arrangement can provide, used to
/// quantify how far an impossible requirement is from fitting
pub fn max_layer_area_cm2(section: &CrossSection, config: &DesignConfig) -> f64 {
    config
        .bar_catalog
        .iter()
        .map(|&phi| max_bars_in_layer(phi, section, config) as f64 * bar_area_cm2(phi))
        .fold(0.0, f64::max)
}

/// Pick a bar group for a required area (cm²); `None` when no single-layer
/// arrangement from the catalog fits the web width.
pub fn select_bars(
    required_cm2: f64,
    section: &CrossSection,
    concrete: &Concrete,
    steel: &Steel,
    config: &DesignConfig,
    top_bar: bool,
) -> Option<BarSelection> {
    #[derive(Clone, Copy)]
    struct Candidate {
        phi: f64,
        count: usize,
        provided: f64,
    }

    let mut feasible: Vec<Candidate> = Vec::new();
    for &phi in &config.bar_catalog {
        let area = bar_area_cm2(phi);
        let count = ((required_cm2 / area).ceil() as usize).max(2);
        if count <= max_bars_in_layer(phi, section, config) {
            feasible.push(Candidate {
                phi,
                count,
                provided: count as f64 * area,
            });
        }
    }

    let min_provided = feasible
        .iter()
        .map(|o| o.provided)
        .fold(f64::INFINITY, f64::min);
    if !min_provided.is_finite() {
        return None;
    }

    // Options inside the tolerance window compete on bar count, so 2 of a
    // larger diameter beat 8 of a smaller one at equal steel
    let window = min_provided * (1.0 + config.bar_area_tolerance);
    let winner = feasible
        .iter()
        .filter(|o| o.provided <= window)
        .min_by(|a, b| {
            a.count
                .cmp(&b.count)
                .then(a.provided.total_cmp(&b.provided))
                .then(b.phi.total_cmp(&a.phi))
        })?;

    Some(BarSelection {
        count: winner.count,
        diameter: winner.phi,
        provided_cm2: winner.provided,
        anchorage_cm: anchorage_length_cm(winner.phi, concrete, steel, config, top_bar),
    })
}

/// Depth from the top face to the centroid of a single-layer bottom group,
/// i.e. the effective depth for sagging design (cm)
pub fn effective_depth_cm(section: &CrossSection, config: &DesignConfig, phi_mm: f64) -> f64 {
    section.height() - section.cover - config.stirrup_allowance_cm() - phi_mm / 10.0 / 2.0
}

/// Pick a stirrup diameter and spacing for a required Asw/s (cm²/cm).
///
/// The spacing cap loosens or tightens with the strut utilization: past 67%
/// of VRd2 the code halves the allowed spacing.
pub fn select_stirrups(
    asw_s_required: f64,
    d_cm: f64,
    vd: f64,
    vrd2: f64,
    config: &DesignConfig,
) -> Option<StirrupSelection> {
    let demand = asw_s_required.max(1e-4);
    let s_max = if vd <= 0.67 * vrd2 {
        (0.6 * d_cm).min(30.0)
    } else {
        (0.3 * d_cm).min(20.0)
    };

    for &phi in &config.stirrup_catalog {
        let asw = 2.0 * bar_area_cm2(phi);
        let s = (asw / demand).min(s_max).floor();
        if s >= 5.0 {
            return Some(StirrupSelection {
                diameter: phi,
                spacing_cm: s,
                legs: 2,
                provided_cm2_per_cm: asw / s,
            });
        }
    }
    None
}

/// Side-face reinforcement, required for sections 60 cm deep or more:
/// 0.10% of the web section per face in 8 mm bars
pub fn skin_reinforcement(section: &CrossSection) -> Option<SkinReinforcement> {
    let h = section.height();
    if h < 60.0 {
        return None;
    }
    let phi = 8.0;
    let per_face = 0.0010 * section.web_width() * h / 2.0;
    let bars = ((per_face / bar_area_cm2(phi)).ceil() as usize).max(2);
    Some(SkinReinforcement {
        bars_per_face: bars,
        diameter: phi,
        area_per_face_cm2: bars as f64 * bar_area_cm2(phi),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn setup() -> (CrossSection, Concrete, Steel, DesignConfig) {
        (
            CrossSection::rectangular(15.0, 40.0),
            Concrete::c25(),
            Steel::ca50(),
            DesignConfig::default(),
        )
    }

    #[test]
    fn test_bar_area() {
        assert_relative_eq!(bar_area_cm2(10.0), 0.7853981633974483, epsilon = 1e-12);
        assert_relative_eq!(bar_area_cm2(20.0), 3.141592653589793, epsilon = 1e-12);
    }

    #[test]
    fn test_layer_capacity_narrow_web() {
        let (section, _, _, config) = setup();
        // 9 cm of usable width: three 10 mm bars fit, four 8 mm do not
        assert_eq!(max_bars_in_layer(10.0, &section, &config), 3);
        assert_eq!(max_bars_in_layer(8.0, &section, &config), 3);
        assert_eq!(max_bars_in_layer(25.0, &section, &config), 2);
    }

    #[test]
    fn test_select_prefers_least_steel() {
        let (section, concrete, steel, config) = setup();
        let sel = select_bars(1.914, &section, &concrete, &steel, &config, false).unwrap();
        assert_eq!(sel.count, 3);
        assert_eq!(sel.diameter, 10.0);
        assert_relative_eq!(sel.provided_cm2, 3.0 * bar_area_cm2(10.0), epsilon = 1e-12);
        assert!(sel.provided_cm2 >= 1.914);
    }

    #[test]
    fn test_tie_break_takes_fewer_larger_bars() {
        let (_, concrete, steel, _) = setup();
        // Wide section so every arrangement fits; 10 and 20 mm only, with a
        // requirement that makes 8x10 and 2x20 provide identical areas
        let section = CrossSection::rectangular(60.0, 60.0);
        let config = DesignConfig {
            bar_catalog: vec![10.0, 20.0],
            ..Default::default()
        };
        let required = 6.0;
        let sel = select_bars(required, &section, &concrete, &steel, &config, false).unwrap();
        assert_eq!(sel.count, 2);
        assert_eq!(sel.diameter, 20.0);
        assert_relative_eq!(sel.provided_cm2, 2.0 * bar_area_cm2(20.0), epsilon = 1e-12);
    }

    #[test]
    fn test_unfit_requirement_returns_none() {
        let (_, concrete, steel, config) = setup();
        let narrow = CrossSection::rectangular(12.0, 30.0);
        // Way beyond anything a single layer of a 12 cm web can hold
        assert!(select_bars(40.0, &narrow, &concrete, &steel, &config, false).is_none());
        assert!(max_layer_area_cm2(&narrow, &config) < 40.0);
    }

    #[test]
    fn test_anchorage_good_vs_poor_bond() {
        let (_, concrete, steel, config) = setup();
        let good = anchorage_length_cm(10.0, &concrete, &steel, &config, false);
        let poor = anchorage_length_cm(10.0, &concrete, &steel, &config, true);
        // fbd for C25: 2.25 * 1.2825 = 2.886 MPa; lb = (10/4)(434.8/2.886)
        assert_relative_eq!(good, 37.67, epsilon = 0.05);
        assert_relative_eq!(poor, good / 0.7, epsilon = 0.1);
        // Short bars stop at the minimum
        let tiny = anchorage_length_cm(8.0, &concrete, &steel, &config, false);
        assert!(tiny >= 10.0 * 8.0 / 10.0 / 10.0 * 10.0);
    }

    #[test]
    fn test_stirrup_spacing_capped_and_floored() {
        let config = DesignConfig::default();
        // Minimum demand on a 36.5 cm effective depth: phi 5 at s_max
        let sel = select_stirrups(0.01539, 36.5, 22.75, 237.6, &config).unwrap();
        assert_eq!(sel.diameter, 5.0);
        assert_eq!(sel.spacing_cm, 21.0);
        assert_eq!(sel.legs, 2);
        assert!(sel.provided_cm2_per_cm >= 0.01539);
    }

    #[test]
    fn test_stirrup_high_shear_tightens_spacing() {
        let config = DesignConfig::default();
        // Above 0.67 VRd2 the cap drops to 0.3 d
        let relaxed = select_stirrups(0.02, 40.0, 50.0, 200.0, &config).unwrap();
        let tight = select_stirrups(0.02, 40.0, 180.0, 200.0, &config).unwrap();
        assert!(tight.spacing_cm <= 12.0);
        assert!(relaxed.spacing_cm > tight.spacing_cm);
    }

    #[test]
    fn test_impossible_stirrup_demand() {
        let config = DesignConfig::default();
        // Even phi 10 two-leg stirrups would need under 5 cm spacing
        assert!(select_stirrups(0.4, 40.0, 50.0, 200.0, &config).is_none());
    }

    #[test]
    fn test_skin_reinforcement_threshold() {
        assert!(skin_reinforcement(&CrossSection::rectangular(15.0, 55.0)).is_none());
        let skin = skin_reinforcement(&CrossSection::rectangular(15.0, 60.0)).unwrap();
        assert_eq!(skin.diameter, 8.0);
        // 0.10% * 15 * 60 / 2 = 0.45 cm² per face, but at least 2 bars
        assert_eq!(skin.bars_per_face, 2);
    }
}
