//! Ultimate limit state flexural design
//!
//! Dimensionless rectangular stress block design (NBR 6118 kmd/beta_x form)
//! with a fixed-point iteration on the effective depth: the depth assumed for
//! sizing must match the depth implied by the bar diameter actually adopted.
//! T sections whose compression block leaves the flange are split into a
//! flange couple and a web block designed on the web width.

use serde::{Deserialize, Serialize};

use crate::config::DesignConfig;
use crate::error::{EngineError, EngineResult};
use crate::model::{Concrete, CrossSection, SectionShape, Steel};
use crate::results::CheckStatus;

use super::detailing::{self, BarSelection};

/// Neutral axis depth cap x/d for ductile sections, fck up to 50 MPa
pub const BETA_X_LIMIT: f64 = 0.45;

/// Dimensionless moment at the neutral axis cap
pub fn kmd_limit() -> f64 {
    0.68 * BETA_X_LIMIT - 0.272 * BETA_X_LIMIT * BETA_X_LIMIT
}

/// Neutral axis ratio x/d for a dimensionless moment below the cap
fn beta_x(kmd: f64) -> f64 {
    (0.68 - (0.4624 - 1.088 * kmd).sqrt()) / 0.544
}

/// Flexural design of one reinforcement group (midspan bottom steel or the
/// top steel over one support)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlexureGroup {
    /// Factored moment magnitude the group was sized for (kN·m)
    pub md_knm: f64,
    /// Effective depth adopted after iteration (cm)
    pub effective_depth_cm: f64,
    /// Theoretical steel area including any minimum floor (cm²)
    pub required_cm2: f64,
    /// True when the minimum ratio governed over the computed area
    pub minimum_governed: bool,
    /// Neutral axis ductility check, kmd against the cap
    pub ductility: CheckStatus,
    /// Adopted bars; `None` when the group is waived, the section is too
    /// shallow for ductile behavior, or no catalog arrangement fits the web
    pub bars: Option<BarSelection>,
}

impl FlexureGroup {
    fn waived(effective_depth_cm: f64) -> Self {
        FlexureGroup {
            md_knm: 0.0,
            effective_depth_cm,
            required_cm2: 0.0,
            minimum_governed: false,
            ductility: CheckStatus::evaluate(0.0, kmd_limit()),
            bars: None,
        }
    }

    /// No steel is needed at all for this group
    pub fn is_waived(&self) -> bool {
        self.required_cm2 == 0.0 && self.bars.is_none()
    }

    /// Section works and a buildable arrangement was found (or none is needed)
    pub fn is_satisfied(&self) -> bool {
        self.ductility.passed && (self.is_waived() || self.bars.is_some())
    }
}

/// Steel area (cm²) for a moment resisted on a rectangular block of width `b`.
/// Returns `None` past the ductility cap.
fn rectangular_block(md_kncm: f64, b: f64, d: f64, fcd: f64, fyd: f64) -> Option<(f64, f64)> {
    let kmd = md_kncm / (b * d * d * fcd);
    if kmd > kmd_limit() {
        return None;
    }
    let bx = beta_x(kmd);
    let z = d * (1.0 - 0.4 * bx);
    Some((md_kncm / (z * fyd), kmd))
}

/// Size one flexure group. `top` selects hogging design: tension at the top
/// face, compression on the web, poor bond anchorage. `enforce_minimum`
/// applies the minimum ratio floor; support groups without hogging moment are
/// waived instead.
pub fn design_flexure(
    md_knm: f64,
    section: &CrossSection,
    concrete: &Concrete,
    steel: &Steel,
    config: &DesignConfig,
    top: bool,
    enforce_minimum: bool,
) -> EngineResult<FlexureGroup> {
    let fcd = concrete.fcd_kn_cm2(config.gamma_c);
    let fyd = steel.fyd_kn_cm2(config.gamma_s);
    let md_kncm = md_knm.abs() * 100.0;
    let h = section.height();
    let as_min = config.rho_min * section.web_width() * h;

    let mut d = h - section.cover - config.stirrup_allowance_cm() - 1.0;

    if md_kncm < 1e-9 && !enforce_minimum {
        return Ok(FlexureGroup::waived(d));
    }

    let b = if top {
        section.web_width()
    } else {
        section.compression_width()
    };
    let flange = match section.shape {
        SectionShape::TShape {
            web_width,
            flange_width,
            flange_thickness,
            ..
        } if !top => Some((web_width, flange_width, flange_thickness)),
        _ => None,
    };

    for _ in 0..config.max_iterations {
        let mut minimum_governed = false;

        let outcome = if md_kncm < 1e-9 {
            Some((0.0, 0.0))
        } else if let Some((bw, bf, hf)) = flange {
            t_section_block(md_kncm, bw, bf, hf, d, fcd, fyd)
        } else {
            rectangular_block(md_kncm, b, d, fcd, fyd)
        };

        let Some((mut as_req, kmd)) = outcome else {
            // Over the cap: report the area a limit-depth block would need.
            // T sections fail in the web block, so report kmd on the web.
            let b_fail = if flange.is_some() { section.web_width() } else { b };
            let z_lim = d * (1.0 - 0.4 * BETA_X_LIMIT);
            let kmd = md_kncm / (b_fail * d * d * fcd);
            return Ok(FlexureGroup {
                md_knm: md_knm.abs(),
                effective_depth_cm: d,
                required_cm2: md_kncm / (z_lim * fyd),
                minimum_governed: false,
                ductility: CheckStatus::evaluate(kmd, kmd_limit()),
                bars: None,
            });
        };

        if enforce_minimum && as_req < as_min {
            as_req = as_min;
            minimum_governed = true;
        }

        let bars = detailing::select_bars(as_req, section, concrete, steel, config, top);
        let group = |bars, d| FlexureGroup {
            md_knm: md_knm.abs(),
            effective_depth_cm: d,
            required_cm2: as_req,
            minimum_governed,
            ductility: CheckStatus::evaluate(kmd, kmd_limit()),
            bars,
        };

        let Some(selection) = bars else {
            return Ok(group(None, d));
        };

        let d_next = detailing::effective_depth_cm(section, config, selection.diameter);
        if (d_next - d).abs() < 0.01 {
            return Ok(group(Some(selection), d));
        }
        d = d_next;
    }

    Err(EngineError::ConvergenceFailed(
        "effective depth iteration".into(),
        config.max_iterations,
    ))
}

/// T-section design: rectangular while the block stays in the flange, else a
/// flange couple plus a web block. Returns `None` past the web ductility cap.
fn t_section_block(
    md_kncm: f64,
    bw: f64,
    bf: f64,
    hf: f64,
    d: f64,
    fcd: f64,
    fyd: f64,
) -> Option<(f64, f64)> {
    let (as_flanged, kmd_f) = rectangular_block(md_kncm, bf, d, fcd, fyd)?;
    let x = beta_x(kmd_f) * d;
    if 0.8 * x <= hf {
        return Some((as_flanged, kmd_f));
    }

    // Overhang couple at the block intensity 0.85 fcd, the same factor the
    // kmd form carries inside 0.68 = 0.85 * 0.8
    let mf = 0.85 * fcd * (bf - bw) * hf * (d - hf / 2.0);
    let mw = md_kncm - mf;
    if mw <= 0.0 {
        return Some((as_flanged, kmd_f));
    }
    let as_flange = mf / ((d - hf / 2.0) * fyd);
    let (as_web, kmd_w) = rectangular_block(mw, bw, d, fcd, fyd)?;
    Some((as_flange + as_web, kmd_w))
}
