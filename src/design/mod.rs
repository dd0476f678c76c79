//! Ultimate limit state design of every span
//!
//! Takes the service-level force envelope from the solver, factors it, and
//! runs flexural design at midspan and over each support, shear design at the
//! governing section, and skin reinforcement where the depth calls for it.
//! Code-limit failures (ductility, strut crushing, bars that do not fit) are
//! recorded as violations on the result, not errors.

pub mod detailing;
pub mod flexure;
pub mod shear;

use serde::{Deserialize, Serialize};

use crate::config::DesignConfig;
use crate::error::{EngineError, EngineResult};
use crate::model::{BeamModel, Span};
use crate::results::Violation;
use crate::solver::diagram::ForceDiagram;

pub use detailing::{BarSelection, SkinReinforcement, StirrupSelection};
pub use flexure::FlexureGroup;
pub use shear::ShearDesign;

/// Complete reinforcement design for one span
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanDesign {
    /// Span index in the model
    pub span: usize,
    /// Bottom steel at the largest sagging moment
    pub positive: FlexureGroup,
    /// Top steel over the left support, including interior hogging nearer
    /// that end
    pub negative_left: FlexureGroup,
    /// Top steel over the right support, including interior hogging nearer
    /// that end
    pub negative_right: FlexureGroup,
    /// Stirrups at the largest shear
    pub shear: ShearDesign,
    /// Side-face bars for deep webs
    pub skin: Option<SkinReinforcement>,
    /// Code checks this span fails, with demand-to-capacity ratios
    pub violations: Vec<Violation>,
}

impl SpanDesign {
    pub fn is_satisfied(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Design results for the whole beam
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignResult {
    pub spans: Vec<SpanDesign>,
}

impl DesignResult {
    /// True when every span passes every ULS check
    pub fn is_satisfied(&self) -> bool {
        self.spans.iter().all(SpanDesign::is_satisfied)
    }

    /// All violations across spans
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.spans.iter().flat_map(|s| s.violations.iter())
    }
}

/// Run ULS design on every span from the service-level diagrams.
pub fn design(
    model: &BeamModel,
    diagram: &ForceDiagram,
    config: &DesignConfig,
) -> EngineResult<DesignResult> {
    let mut spans = Vec::with_capacity(model.spans.len());
    for (index, span) in model.spans.iter().enumerate() {
        spans.push(design_span(index, span, diagram, config)?);
    }
    Ok(DesignResult { spans })
}

fn design_span(
    index: usize,
    span: &Span,
    diagram: &ForceDiagram,
    config: &DesignConfig,
) -> EngineResult<SpanDesign> {
    let sd = diagram.span(index).ok_or(EngineError::SpanNotFound(index))?;
    let gf = config.gamma_f;

    // Hogging at a shared support designs both adjacent spans' top steel,
    // each on its own web width. Hogging can also peak between supports
    // (applied moments, uplift); that minimum folds into the nearer group.
    let md_pos = gf * sd.max_sagging().1.max(0.0);
    let (x_hog, m_hog) = sd.min_moment();
    let md_int = gf * m_hog.min(0.0).abs();
    let (int_left, int_right) = if 2.0 * x_hog < sd.length {
        (md_int, 0.0)
    } else {
        (0.0, md_int)
    };
    let md_left = (gf * diagram.support_moment(index).min(0.0).abs()).max(int_left);
    let md_right = (gf * diagram.support_moment(index + 1).min(0.0).abs()).max(int_right);
    let vd = gf * sd.max_abs_shear().1.abs();

    let flex = |md: f64, top: bool, minimum: bool| {
        flexure::design_flexure(md, &span.section, &span.concrete, &span.steel, config, top, minimum)
    };
    let positive = flex(md_pos, false, true)?;
    let negative_left = flex(md_left, true, false)?;
    let negative_right = flex(md_right, true, false)?;

    let shear = shear::design_shear(
        vd,
        positive.effective_depth_cm,
        &span.section,
        &span.concrete,
        &span.steel,
        config,
    );
    let skin = detailing::skin_reinforcement(&span.section);

    let mut violations = Vec::new();
    let groups = [
        ("midspan steel", &positive),
        ("left support steel", &negative_left),
        ("right support steel", &negative_right),
    ];
    for (name, group) in groups {
        if !group.ductility.passed {
            violations.push(Violation {
                check: format!("span {index} {name} ductility"),
                ratio: group.ductility.ratio(),
            });
        } else if !group.is_satisfied() {
            let capacity = detailing::max_layer_area_cm2(&span.section, config).max(1e-9);
            violations.push(Violation {
                check: format!("span {index} {name} bar fit"),
                ratio: group.required_cm2 / capacity,
            });
        }
    }
    if !shear.strut.passed {
        violations.push(Violation {
            check: format!("span {index} strut crushing"),
            ratio: shear.strut.ratio(),
        });
    } else if shear.stirrups.is_none() {
        let phi_max = span_stirrup_capacity(config);
        violations.push(Violation {
            check: format!("span {index} stirrup fit"),
            ratio: shear.required_cm2_per_cm / phi_max,
        });
    }

    Ok(SpanDesign {
        span: index,
        positive,
        negative_left,
        negative_right,
        shear,
        skin,
        violations,
    })
}

/// Largest Asw/s any catalog stirrup provides at the 5 cm buildability floor
fn span_stirrup_capacity(config: &DesignConfig) -> f64 {
    config
        .stirrup_catalog
        .iter()
        .map(|&phi| 2.0 * detailing::bar_area_cm2(phi) / 5.0)
        .fold(1e-9, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Concrete, CrossSection, Steel};
    use crate::solver;
    use approx::assert_relative_eq;

    fn no_self_weight() -> DesignConfig {
        DesignConfig {
            concrete_unit_weight: 0.0,
            ..Default::default()
        }
    }

    fn simply_supported(w: f64) -> BeamModel {
        let mut model = BeamModel::new("design");
        model
            .add_span(
                5.0,
                CrossSection::rectangular(15.0, 40.0),
                Concrete::c25(),
                Steel::ca50(),
            )
            .unwrap();
        model
            .set_support(0, crate::model::Support::Pinned)
            .unwrap();
        model
            .set_support(1, crate::model::Support::Pinned)
            .unwrap();
        model.add_uniform_load(0, w).unwrap();
        model
    }

    #[test]
    fn test_single_span_design_chain() {
        let config = no_self_weight();
        let model = simply_supported(6.5);
        let solution = solver::solve(&model, &config).unwrap();
        let result = design(&model, &solution.diagram, &config).unwrap();

        assert!(result.is_satisfied());
        let span = &result.spans[0];

        // Md = 1.4 * 6.5 * 25 / 8, designed at the adopted depth
        assert_relative_eq!(span.positive.md_knm, 28.4375, epsilon = 1e-9);
        assert_relative_eq!(span.positive.effective_depth_cm, 36.5, epsilon = 1e-9);
        let bars = span.positive.bars.as_ref().unwrap();
        assert_eq!((bars.count, bars.diameter), (3, 10.0));

        // No hogging anywhere on a simply supported span
        assert!(span.negative_left.is_waived());
        assert!(span.negative_right.is_waived());

        assert_relative_eq!(span.shear.vd_kn, 22.75, epsilon = 1e-9);
        let stirrups = span.shear.stirrups.as_ref().unwrap();
        assert_eq!((stirrups.diameter, stirrups.spacing_cm), (5.0, 21.0));
        assert!(span.skin.is_none());
    }

    #[test]
    fn test_two_span_hogging_design() {
        let config = no_self_weight();
        let mut model = BeamModel::new("two-span");
        for _ in 0..2 {
            model
                .add_span(
                    5.0,
                    CrossSection::rectangular(15.0, 40.0),
                    Concrete::c25(),
                    Steel::ca50(),
                )
                .unwrap();
        }
        for node in 0..3 {
            model
                .set_support(node, crate::model::Support::Pinned)
                .unwrap();
        }
        model.add_uniform_load(0, 10.0).unwrap();
        model.add_uniform_load(1, 10.0).unwrap();

        let solution = solver::solve(&model, &config).unwrap();
        let result = design(&model, &solution.diagram, &config).unwrap();

        // Middle support hogging wL²/8 feeds the right group of span 0 and
        // the left group of span 1 alike
        let right = &result.spans[0].negative_right;
        let left = &result.spans[1].negative_left;
        assert_relative_eq!(right.md_knm, 1.4 * 10.0 * 25.0 / 8.0, epsilon = 1e-6);
        assert_relative_eq!(right.md_knm, left.md_knm, epsilon = 1e-9);
        assert!(right.bars.is_some());

        // Outer supports carry no hogging
        assert!(result.spans[0].negative_left.is_waived());
        assert!(result.spans[1].negative_right.is_waived());

        // Governing shear sits on the middle support side: 5wL/8
        assert_relative_eq!(
            result.spans[0].shear.vd_kn,
            1.4 * 5.0 * 10.0 * 5.0 / 8.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_moment_load_interior_hogging_designs_top_steel() {
        let config = no_self_weight();
        let mut model = BeamModel::new("mid-moment");
        model
            .add_span(
                6.0,
                CrossSection::rectangular(15.0, 40.0),
                Concrete::c25(),
                Steel::ca50(),
            )
            .unwrap();
        model
            .set_support(0, crate::model::Support::Pinned)
            .unwrap();
        model
            .set_support(1, crate::model::Support::Pinned)
            .unwrap();
        model.add_moment_load(0, 50.0, 3.0).unwrap();

        let solution = solver::solve(&model, &config).unwrap();
        let result = design(&model, &solution.diagram, &config).unwrap();
        let span = &result.spans[0];

        // The couple reactions ramp the moment to -M/2 just left of the load
        // even though both support moments are zero; that hogging lands in
        // the right group
        assert!(span.negative_left.is_waived());
        assert!(!span.negative_right.is_waived());
        assert_relative_eq!(span.negative_right.md_knm, 1.4 * 25.0, epsilon = 1e-6);
        assert!(span.negative_right.bars.is_some());

        // The sagging face right of the load gets the mirror-image demand
        assert_relative_eq!(span.positive.md_knm, 1.4 * 25.0, epsilon = 1e-6);
        assert!(result.is_satisfied());
    }

    #[test]
    fn test_overloaded_span_collects_violations() {
        let config = no_self_weight();
        let model = simply_supported(150.0);
        let solution = solver::solve(&model, &config).unwrap();
        let result = design(&model, &solution.diagram, &config).unwrap();

        assert!(!result.is_satisfied());
        let names: Vec<&str> = result
            .violations()
            .map(|v| v.check.as_str())
            .collect();
        assert!(names.iter().any(|n| n.contains("ductility")));
        assert!(result.violations().all(|v| v.ratio > 1.0));
    }

    #[test]
    fn test_deep_section_gets_skin_bars() {
        let config = no_self_weight();
        let mut model = BeamModel::new("deep");
        model
            .add_span(
                8.0,
                CrossSection::rectangular(20.0, 70.0),
                Concrete::c25(),
                Steel::ca50(),
            )
            .unwrap();
        model
            .set_support(0, crate::model::Support::Pinned)
            .unwrap();
        model
            .set_support(1, crate::model::Support::Pinned)
            .unwrap();
        model.add_uniform_load(0, 20.0).unwrap();

        let solution = solver::solve(&model, &config).unwrap();
        let result = design(&model, &solution.diagram, &config).unwrap();
        let skin = result.spans[0].skin.as_ref().unwrap();
        assert_eq!(skin.diameter, 8.0);
        assert!(skin.bars_per_face >= 2);
    }
}
