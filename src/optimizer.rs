//! Section height optimization
//!
//! Full scan over candidate heights: every candidate clones the model at a
//! trial height and runs the complete chain of solve, ULS design and SLS
//! checks. Candidates are independent, so the scan runs in parallel; the
//! reduction stays deterministic because trials keep their input order and
//! cost ties resolve toward the lower height. When nothing passes, the error
//! names the candidate that came closest.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::DesignConfig;
use crate::design::detailing;
use crate::error::{EngineError, EngineResult};
use crate::model::BeamModel;
use crate::results::{AnalysisOutcome, Violation};

/// Inclusive range of candidate section heights (cm)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeightRange {
    pub min_cm: f64,
    pub max_cm: f64,
    pub step_cm: f64,
}

impl HeightRange {
    pub fn new(min_cm: f64, max_cm: f64, step_cm: f64) -> Self {
        Self {
            min_cm,
            max_cm,
            step_cm,
        }
    }

    /// Candidate heights, ascending, both ends included
    pub fn heights(&self) -> Vec<f64> {
        if self.step_cm <= 0.0 || self.max_cm < self.min_cm {
            return Vec::new();
        }
        let count = ((self.max_cm - self.min_cm) / self.step_cm + 1e-9).floor() as usize + 1;
        (0..count)
            .map(|i| self.min_cm + i as f64 * self.step_cm)
            .collect()
    }
}

impl Default for HeightRange {
    /// The usual building-beam sweep: 30 cm to 100 cm in 5 cm steps
    fn default() -> Self {
        Self::new(30.0, 100.0, 5.0)
    }
}

/// Material take-off of one design, priced at the configured rates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Concrete volume (m³)
    pub concrete_m3: f64,
    /// Longitudinal, skin and stirrup steel mass (kg)
    pub steel_kg: f64,
    /// Side and soffit formwork area (m²)
    pub formwork_m2: f64,
    /// Priced total
    pub total: f64,
}

/// One evaluated candidate height
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTrial {
    /// Trial section height (cm)
    pub height_cm: f64,
    /// True when every ULS and SLS check passed
    pub feasible: bool,
    /// Priced total for feasible candidates
    pub cost: Option<f64>,
    /// Worst failed check for infeasible candidates
    pub worst_violation: Option<Violation>,
}

/// Result of a height scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    /// Winning height (cm)
    pub best_height_cm: f64,
    /// Take-off of the winning design
    pub cost: CostBreakdown,
    /// Full analysis of the winner
    pub best: AnalysisOutcome,
    /// Every candidate in scan order
    pub trials: Vec<CandidateTrial>,
}

/// Price a completed design: concrete by gross volume, steel by bar mass
/// (negatives detailed over a quarter span each side, stirrups counted out
/// along the span), formwork by soffit plus both faces.
pub fn quantify(
    model: &BeamModel,
    outcome: &AnalysisOutcome,
    config: &DesignConfig,
) -> CostBreakdown {
    // kg per cm² of bar section and meter of length
    let kg = config.steel_density / 1.0e4;

    let mut concrete_m3 = 0.0;
    let mut steel_kg = 0.0;
    let mut formwork_m2 = 0.0;

    for (span, design) in model.spans.iter().zip(&outcome.design.spans) {
        let l = span.length;
        let h = span.section.height();
        let bw = span.section.web_width();
        let cover = span.section.cover;

        concrete_m3 += span.section.area() / 1.0e4 * l;
        formwork_m2 += (bw + 2.0 * h) / 100.0 * l;

        if let Some(bars) = &design.positive.bars {
            steel_kg += bars.provided_cm2 * l * kg;
        }
        for group in [&design.negative_left, &design.negative_right] {
            if let Some(bars) = &group.bars {
                steel_kg += bars.provided_cm2 * (l / 4.0) * kg;
            }
        }
        if let Some(skin) = &design.skin {
            steel_kg += 2.0 * skin.area_per_face_cm2 * l * kg;
        }
        if let Some(st) = &design.shear.stirrups {
            let count = (l * 100.0 / st.spacing_cm).floor() + 1.0;
            let length_m = (2.0 * ((h - 2.0 * cover) + (bw - 2.0 * cover)) + 15.0) / 100.0;
            steel_kg += count * length_m * detailing::bar_area_cm2(st.diameter) * kg;
        }
    }

    let rates = &config.cost;
    CostBreakdown {
        concrete_m3,
        steel_kg,
        formwork_m2,
        total: concrete_m3 * rates.concrete_per_m3
            + steel_kg * rates.steel_per_kg
            + formwork_m2 * rates.formwork_per_m2,
    }
}

type Evaluated = (CandidateTrial, Option<(AnalysisOutcome, CostBreakdown)>);

fn evaluate_candidate(model: &BeamModel, height_cm: f64, config: &DesignConfig) -> Evaluated {
    let candidate = model.with_uniform_height(height_cm);
    match crate::analyze(&candidate, config) {
        Ok(outcome) if outcome.is_satisfied() => {
            let cost = quantify(&candidate, &outcome, config);
            let trial = CandidateTrial {
                height_cm,
                feasible: true,
                cost: Some(cost.total),
                worst_violation: None,
            };
            (trial, Some((outcome, cost)))
        }
        Ok(outcome) => {
            let trial = CandidateTrial {
                height_cm,
                feasible: false,
                cost: None,
                worst_violation: outcome.worst_violation(),
            };
            (trial, None)
        }
        Err(e) => {
            let trial = CandidateTrial {
                height_cm,
                feasible: false,
                cost: None,
                worst_violation: Some(Violation {
                    check: format!("analysis failed: {e}"),
                    ratio: f64::INFINITY,
                }),
            };
            (trial, None)
        }
    }
}

/// Scan a height range for the cheapest feasible section.
pub fn optimize(
    model: &BeamModel,
    range: &HeightRange,
    config: &DesignConfig,
) -> EngineResult<OptimizationOutcome> {
    let heights = range.heights();
    if heights.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "height range {} to {} cm step {} yields no candidates",
            range.min_cm, range.max_cm, range.step_cm
        )));
    }
    optimize_heights(model, &heights, config)
}

/// Scan an explicit candidate list for the cheapest feasible section.
pub fn optimize_heights(
    model: &BeamModel,
    heights: &[f64],
    config: &DesignConfig,
) -> EngineResult<OptimizationOutcome> {
    config.validate()?;
    model.validate()?;
    if heights.is_empty() {
        return Err(EngineError::InvalidInput(
            "no candidate heights to evaluate".to_string(),
        ));
    }
    let mut heights = heights.to_vec();
    heights.sort_by(f64::total_cmp);
    heights.dedup();

    let evaluated: Vec<Evaluated> = heights
        .par_iter()
        .map(|&h| evaluate_candidate(model, h, config))
        .collect();

    let mut trials = Vec::with_capacity(evaluated.len());
    let mut best: Option<(f64, f64, AnalysisOutcome, CostBreakdown)> = None;
    for (trial, success) in evaluated {
        if let Some((outcome, cost)) = success {
            // Ascending heights with strict improvement: cost ties keep the
            // shallower section
            let improves = best.as_ref().map_or(true, |(c, ..)| cost.total < *c);
            if improves {
                best = Some((cost.total, trial.height_cm, outcome, cost));
            }
        }
        trials.push(trial);
    }

    match best {
        Some((_, best_height_cm, outcome, cost)) => Ok(OptimizationOutcome {
            best_height_cm,
            cost,
            best: outcome,
            trials,
        }),
        None => {
            let nearest = trials
                .iter()
                .filter_map(|t| t.worst_violation.as_ref().map(|v| (t.height_cm, v)))
                .min_by(|a, b| a.1.ratio.total_cmp(&b.1.ratio));
            let (nearest_height, violation) = nearest.ok_or_else(|| {
                EngineError::InvalidInput("no candidate produced a result".to_string())
            })?;
            Err(EngineError::NoFeasibleSection {
                candidates: trials.len(),
                nearest_height,
                check: violation.check.clone(),
                ratio: violation.ratio,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Concrete, CrossSection, Steel, Support};
    use approx::assert_relative_eq;

    fn residential_span() -> BeamModel {
        let mut model = BeamModel::new("optimize");
        model
            .add_span(
                5.0,
                CrossSection::rectangular(15.0, 40.0),
                Concrete::c25(),
                Steel::ca50(),
            )
            .unwrap();
        model.set_support(0, Support::Pinned).unwrap();
        model.set_support(1, Support::Pinned).unwrap();
        model.add_uniform_load(0, 5.0).unwrap();
        model
    }

    #[test]
    fn test_height_range_is_inclusive() {
        let range = HeightRange::new(30.0, 50.0, 5.0);
        assert_eq!(range.heights(), vec![30.0, 35.0, 40.0, 45.0, 50.0]);
        assert!(HeightRange::new(50.0, 30.0, 5.0).heights().is_empty());
        assert!(HeightRange::new(30.0, 50.0, 0.0).heights().is_empty());
    }

    #[test]
    fn test_scan_picks_cheapest_feasible_height() {
        let config = DesignConfig::default();
        let model = residential_span();
        let result =
            optimize(&model, &HeightRange::new(30.0, 50.0, 5.0), &config).unwrap();

        // 30 and 35 cm fail the deflection limit; 40 cm is the cheapest of
        // the feasible rest
        assert_relative_eq!(result.best_height_cm, 40.0, epsilon = 1e-12);
        assert!(result.best.is_satisfied());
        assert_eq!(result.trials.len(), 5);
        assert!(!result.trials[0].feasible);
        assert!(!result.trials[1].feasible);
        assert!(result.trials[2].feasible);
        let worst = result.trials[0].worst_violation.as_ref().unwrap();
        assert!(worst.check.contains("deflection"));

        let feasible_costs: Vec<f64> =
            result.trials.iter().filter_map(|t| t.cost).collect();
        assert!(feasible_costs
            .iter()
            .all(|&c| c >= result.cost.total - 1e-9));
    }

    #[test]
    fn test_infeasible_scan_names_nearest_miss() {
        let config = DesignConfig::default();
        let model = residential_span();
        let err =
            optimize(&model, &HeightRange::new(25.0, 30.0, 5.0), &config).unwrap_err();

        match err {
            EngineError::NoFeasibleSection {
                candidates,
                nearest_height,
                check,
                ratio,
            } => {
                assert_eq!(candidates, 2);
                assert_relative_eq!(nearest_height, 30.0, epsilon = 1e-12);
                assert!(check.contains("deflection"));
                assert!(ratio > 1.0 && ratio < 3.0);
            }
            other => panic!("expected NoFeasibleSection, got {other:?}"),
        }
    }

    #[test]
    fn test_candidate_analysis_error_is_not_fatal() {
        let config = DesignConfig::default();
        let model = residential_span();
        // 4 cm is shallower than twice the cover and fails validation, but
        // the scan still finds the 40 cm winner
        let result = optimize_heights(&model, &[4.0, 40.0], &config).unwrap();
        assert_relative_eq!(result.best_height_cm, 40.0, epsilon = 1e-12);
        assert!(!result.trials[0].feasible);
        let worst = result.trials[0].worst_violation.as_ref().unwrap();
        assert!(worst.check.contains("analysis failed"));
        assert!(worst.ratio.is_infinite());
    }

    #[test]
    fn test_takeoff_prices_winning_design() {
        let config = DesignConfig::default();
        let model = residential_span();
        let outcome = crate::analyze(&model, &config).unwrap();
        let cost = quantify(&model, &outcome, &config);

        // 15x40 over 5 m: 0.3 m³ of concrete, 4.75 m² of formwork,
        // 3 ϕ10 bottom bars plus 24 ϕ5 stirrups at 21 cm
        assert_relative_eq!(cost.concrete_m3, 0.3, epsilon = 1e-12);
        assert_relative_eq!(cost.formwork_m2, 4.75, epsilon = 1e-12);
        assert_relative_eq!(cost.steel_kg, 13.13, epsilon = 0.02);
        assert_relative_eq!(
            cost.total,
            0.3 * 450.0 + cost.steel_kg * 12.0 + 4.75 * 80.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_empty_candidate_list_rejected() {
        let config = DesignConfig::default();
        let model = residential_span();
        assert!(matches!(
            optimize_heights(&model, &[], &config),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            optimize(&model, &HeightRange::new(30.0, 20.0, 5.0), &config),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
