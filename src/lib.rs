//! rcbeam - A native Rust analysis and design engine for reinforced concrete beams
//!
//! Continuous beams following NBR 6118, covering:
//! - Direct stiffness solution (Euler-Bernoulli, elastic spring supports)
//! - Internal force diagrams and elastic deflections
//! - ULS design: flexure, shear on the Model I truss, commercial bar detailing
//! - SLS checks: deflection with creep over the Branson effective inertia,
//!   crack width by the dual-expression envelope
//! - Section height optimization against concrete, steel and formwork cost
//!
//! ## Example
//! ```rust
//! use rcbeam::prelude::*;
//!
//! let mut model = BeamModel::new("V1");
//! model
//!     .add_span(5.0, CrossSection::rectangular(15.0, 40.0), Concrete::c25(), Steel::ca50())
//!     .unwrap();
//! model.set_support(0, Support::Pinned).unwrap();
//! model.set_support(1, Support::Pinned).unwrap();
//! model.add_uniform_load(0, 5.0).unwrap();
//!
//! let config = DesignConfig::default();
//! let outcome = rcbeam::analyze(&model, &config).unwrap();
//! assert!(outcome.is_satisfied());
//!
//! let bars = outcome.design.spans[0].positive.bars.as_ref().unwrap();
//! println!("bottom steel: {} bars of {} mm", bars.count, bars.diameter);
//! ```

pub mod config;
pub mod design;
pub mod error;
pub mod math;
pub mod model;
pub mod optimizer;
pub mod results;
pub mod serviceability;
pub mod solver;

use config::DesignConfig;
use error::EngineResult;
use model::BeamModel;
use optimizer::{HeightRange, OptimizationOutcome};
use results::AnalysisOutcome;

/// Run the full chain on one beam: solve the structure at service level,
/// design every span for ULS and check the service limits.
pub fn analyze(model: &BeamModel, config: &DesignConfig) -> EngineResult<AnalysisOutcome> {
    config.validate()?;
    let solution = solver::solve(model, config)?;
    let design = design::design(model, &solution.diagram, config)?;
    let verification = serviceability::verify(model, &solution, &design, config);
    Ok(AnalysisOutcome {
        beam: model.id.clone(),
        solution,
        design,
        verification,
    })
}

/// Scan candidate section heights for the cheapest one that passes every
/// check. Candidates are evaluated in parallel.
pub fn optimize(
    model: &BeamModel,
    range: &HeightRange,
    config: &DesignConfig,
) -> EngineResult<OptimizationOutcome> {
    optimizer::optimize(model, range, config)
}

// Re-export common types
pub mod prelude {
    pub use crate::config::{CostRates, DesignConfig, ExposureClass};
    pub use crate::design::{
        BarSelection, DesignResult, FlexureGroup, ShearDesign, SkinReinforcement, SpanDesign,
        StirrupSelection,
    };
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::model::{
        BeamModel, Concrete, CrossSection, Load, SectionShape, Span, Steel, Support,
    };
    pub use crate::optimizer::{CandidateTrial, CostBreakdown, HeightRange, OptimizationOutcome};
    pub use crate::results::{AnalysisOutcome, CheckStatus, Violation};
    pub use crate::serviceability::{CrackCheck, DeflectionCheck, VerificationResult};
    pub use crate::solver::diagram::{ForceDiagram, SpanDiagram};
    pub use crate::solver::{NodeDisplacement, Solution, SupportReaction};
}
