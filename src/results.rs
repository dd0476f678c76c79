//! Result types for analysis, design and verification

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::design::DesignResult;
use crate::serviceability::VerificationResult;
use crate::solver::Solution;

/// Outcome of a single code check, demand against capacity
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CheckStatus {
    /// Acting value, in the check's own unit
    pub value: f64,
    /// Allowed limit, same unit
    pub limit: f64,
    /// Remaining fraction of the limit, 1 - value/limit
    pub margin: f64,
    /// True when the value stays within the limit
    pub passed: bool,
}

impl CheckStatus {
    /// Evaluate a value against its limit
    pub fn evaluate(value: f64, limit: f64) -> Self {
        let ratio = if limit > 0.0 {
            value / limit
        } else if value > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
        Self {
            value,
            limit,
            margin: 1.0 - ratio,
            passed: value <= limit,
        }
    }

    /// Demand-to-capacity ratio; above one means the check fails
    pub fn ratio(&self) -> f64 {
        if self.limit > 0.0 {
            self.value / self.limit
        } else if self.value > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

/// One failed code check, named and quantified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Which check failed and where
    pub check: String,
    /// Demand-to-capacity ratio, above one
    pub ratio: f64,
}

/// Everything `analyze` produces for one beam: solved forces, reinforcement
/// and the service checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Identifier of the analyzed beam
    pub beam: String,
    /// Displacements, reactions and internal force diagrams
    pub solution: Solution,
    /// Ultimate limit state design per span
    pub design: DesignResult,
    /// Service limit state checks per span
    pub verification: VerificationResult,
}

impl AnalysisOutcome {
    /// True when every ULS and SLS check passes on every span
    pub fn is_satisfied(&self) -> bool {
        self.design.is_satisfied() && self.verification.is_satisfied()
    }

    /// All failed checks, design first
    pub fn violations(&self) -> Vec<Violation> {
        self.design
            .violations()
            .cloned()
            .chain(self.verification.violations().cloned())
            .collect()
    }

    /// The failed check with the largest demand-to-capacity ratio
    pub fn worst_violation(&self) -> Option<Violation> {
        self.violations()
            .into_iter()
            .max_by(|a, b| a.ratio.total_cmp(&b.ratio))
    }

    /// Plain-text report of reactions, steel and checks
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "beam '{}'", self.beam);

        let _ = writeln!(out, "reactions:");
        for r in &self.solution.reactions {
            match r.moment {
                Some(m) => {
                    let _ = writeln!(
                        out,
                        "  node {} at {:.2} m: {:.2} kN, {:.2} kN·m",
                        r.node, r.position, r.force, m
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "  node {} at {:.2} m: {:.2} kN",
                        r.node, r.position, r.force
                    );
                }
            }
        }

        for span in &self.design.spans {
            let _ = writeln!(out, "span {}:", span.span);
            let _ = write_group(&mut out, "  bottom", &span.positive);
            let _ = write_group(&mut out, "  top left", &span.negative_left);
            let _ = write_group(&mut out, "  top right", &span.negative_right);
            if let Some(st) = &span.shear.stirrups {
                let _ = writeln!(
                    out,
                    "  stirrups: ϕ{} c/{:.0} cm (Vd {:.1} kN)",
                    st.diameter, st.spacing_cm, span.shear.vd_kn
                );
            }
            if let Some(skin) = &span.skin {
                let _ = writeln!(
                    out,
                    "  skin: {} ϕ{} per face",
                    skin.bars_per_face, skin.diameter
                );
            }
        }

        for v in &self.verification.spans {
            let _ = writeln!(
                out,
                "span {}: deflection {:.2}/{:.2} mm, crack {:.3}/{:.2} mm",
                v.span,
                v.deflection.status.value,
                v.deflection.status.limit,
                v.crack.status.value,
                v.crack.status.limit
            );
        }

        let violations = self.violations();
        if violations.is_empty() {
            let _ = writeln!(out, "all checks pass");
        } else {
            for v in &violations {
                let _ = writeln!(out, "FAIL {} (ratio {:.2})", v.check, v.ratio);
            }
        }
        out
    }
}

fn write_group(
    out: &mut String,
    label: &str,
    group: &crate::design::FlexureGroup,
) -> std::fmt::Result {
    match &group.bars {
        Some(bars) => writeln!(
            out,
            "{label}: {} ϕ{} ({:.2} cm² for {:.2} cm² required)",
            bars.count, bars.diameter, bars.provided_cm2, group.required_cm2
        ),
        None if group.is_waived() => writeln!(out, "{label}: not required"),
        None => writeln!(out, "{label}: no feasible arrangement"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_check_status_margin() {
        let ok = CheckStatus::evaluate(15.0, 20.0);
        assert!(ok.passed);
        assert_relative_eq!(ok.margin, 0.25);
        assert_relative_eq!(ok.ratio(), 0.75);

        let bad = CheckStatus::evaluate(25.0, 20.0);
        assert!(!bad.passed);
        assert!(bad.margin < 0.0);
        assert!(bad.ratio() > 1.0);
    }

    #[test]
    fn test_check_status_degenerate_limit() {
        let z = CheckStatus::evaluate(0.0, 0.0);
        assert!(z.passed);
        assert_relative_eq!(z.ratio(), 0.0);
        assert!(CheckStatus::evaluate(1.0, 0.0).ratio().is_infinite());
    }
}
