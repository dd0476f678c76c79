//! Internal force diagrams recovered by statics
//!
//! Each span's moment and shear are evaluated analytically from the solved
//! left-end forces and the loads on the span, so diagram values are exact at
//! any station. Station grids (uniform sampling plus every load breakpoint)
//! are used for extrema scans and for the elastic deflection profile.
//!
//! Conventions: sagging moments positive, downward deflection positive.
//! Shear is the sum of upward forces left of the cut, so a downward point
//! load drops the shear as the cut passes it.

use serde::{Deserialize, Serialize};

use crate::model::Load;

const POSITION_TOL: f64 = 1e-9;

/// Piecewise internal forces and elastic deflection for one span
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanDiagram {
    /// Span index in the model
    pub span: usize,
    /// Global x of the left node (m)
    pub x_start: f64,
    /// Span length (m)
    pub length: f64,
    /// Gross-section flexural rigidity (kN·m²)
    pub ei: f64,
    end_forces: [f64; 4],
    loads: Vec<Load>,
    v0: f64,
    th0: f64,
    stations: Vec<f64>,
}

impl SpanDiagram {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn build(
        span: usize,
        x_start: f64,
        length: f64,
        ei: f64,
        end_forces: [f64; 4],
        loads: Vec<Load>,
        v0: f64,
        th0: f64,
        n_stations: usize,
    ) -> Self {
        let mut stations: Vec<f64> = (0..=n_stations)
            .map(|k| length * k as f64 / n_stations as f64)
            .collect();
        for load in &loads {
            for bp in load.breakpoints() {
                if bp > 0.0 && bp < length {
                    stations.push(bp);
                }
            }
        }
        stations.sort_by(f64::total_cmp);
        stations.dedup_by(|a, b| (*a - *b).abs() < POSITION_TOL);

        Self {
            span,
            x_start,
            length,
            ei,
            end_forces,
            loads,
            v0,
            th0,
            stations,
        }
    }

    /// Shear just right of x (kN)
    pub fn shear_at(&self, x: f64) -> f64 {
        self.shear(x, true)
    }

    /// Bending moment just right of x (kN·m), sagging positive
    pub fn moment_at(&self, x: f64) -> f64 {
        self.moment(x, true)
    }

    fn shear(&self, x: f64, inclusive: bool) -> f64 {
        let mut v = -self.end_forces[0];
        for load in &self.loads {
            match *load {
                Load::Distributed { w, start, end } => {
                    let covered = (x.min(end) - start).clamp(0.0, end - start);
                    v -= w * covered;
                }
                Load::Point { p, position } => {
                    let passed = if inclusive {
                        position <= x + POSITION_TOL
                    } else {
                        position < x - POSITION_TOL
                    };
                    if passed {
                        v -= p;
                    }
                }
                Load::Moment { .. } => {}
            }
        }
        v
    }

    fn moment(&self, x: f64, inclusive: bool) -> f64 {
        let mut m = self.end_forces[1] - self.end_forces[0] * x;
        for load in &self.loads {
            match *load {
                Load::Distributed { w, start, end } => {
                    let covered = (x.min(end) - start).clamp(0.0, end - start);
                    if covered > 0.0 {
                        let centroid = start + covered / 2.0;
                        m -= w * covered * (x - centroid);
                    }
                }
                Load::Point { p, position } => {
                    if position < x - POSITION_TOL {
                        m -= p * (x - position);
                    }
                }
                Load::Moment { m: m0, position } => {
                    let passed = if inclusive {
                        position <= x + POSITION_TOL
                    } else {
                        position < x - POSITION_TOL
                    };
                    if passed {
                        m += m0;
                    }
                }
            }
        }
        m
    }

    /// Moment at the left and right element ends
    pub fn end_moments(&self) -> (f64, f64) {
        (self.moment(0.0, true), self.moment(self.length, false))
    }

    /// Largest sagging moment and its local position (x, M)
    pub fn max_sagging(&self) -> (f64, f64) {
        self.scan_moment(|best, cand| cand > best)
    }

    /// Most negative (hogging) moment and its local position (x, M)
    pub fn min_moment(&self) -> (f64, f64) {
        self.scan_moment(|best, cand| cand < best)
    }

    /// Largest absolute moment and its local position (x, M)
    pub fn max_abs_moment(&self) -> (f64, f64) {
        let (xs, ms) = self.max_sagging();
        let (xh, mh) = self.min_moment();
        if ms.abs() >= mh.abs() {
            (xs, ms)
        } else {
            (xh, mh)
        }
    }

    /// Largest absolute shear and its local position (x, V)
    pub fn max_abs_shear(&self) -> (f64, f64) {
        let mut best = (0.0, self.shear(0.0, true));
        for &x in &self.stations {
            for v in [self.shear(x, false), self.shear(x, true)] {
                if v.abs() > best.1.abs() {
                    best = (x, v);
                }
            }
        }
        best
    }

    fn scan_moment(&self, better: impl Fn(f64, f64) -> bool) -> (f64, f64) {
        let mut best = (0.0, self.moment(0.0, true));
        let mut consider = |x: f64, m: f64| {
            if better(best.1, m) {
                best = (x, m);
            }
        };
        for &x in &self.stations {
            consider(x, self.moment(x, false));
            consider(x, self.moment(x, true));
        }
        // Interior extremum where the shear crosses zero: between adjacent
        // stations the load is a single uniform segment, so V is linear
        for pair in self.stations.windows(2) {
            let (x1, x2) = (pair[0], pair[1]);
            let v1 = self.shear(x1, true);
            let v2 = self.shear(x2, false);
            if v1 * v2 < 0.0 {
                let x = x1 + v1 / (v1 - v2) * (x2 - x1);
                consider(x, self.moment(x, true));
            }
        }
        best
    }

    /// Elastic deflection profile on gross EI: (x_local, v) pairs, v in
    /// meters downward.
    ///
    /// Double integration of curvature -M/EI seeded from the solved left-node
    /// deflection and rotation. Simpson on the curvature and an end-slope
    /// correction on the second integral make the profile exact wherever the
    /// moment is piecewise quadratic, which covers every supported load type.
    /// Segment endpoints take one-sided moment values, so jumps from applied
    /// moments do not leak into the integral.
    pub fn deflections(&self) -> Vec<(f64, f64)> {
        let mut out = Vec::with_capacity(self.stations.len());
        let mut th = self.th0;
        let mut v = self.v0;
        out.push((self.stations[0], v));
        for pair in self.stations.windows(2) {
            let (x1, x2) = (pair[0], pair[1]);
            let h = x2 - x1;
            let k1 = -self.moment(x1, true) / self.ei;
            let km = -self.moment(0.5 * (x1 + x2), true) / self.ei;
            let k2 = -self.moment(x2, false) / self.ei;
            let th_next = th + h / 6.0 * (k1 + 4.0 * km + k2);
            v += 0.5 * h * (th + th_next) - h * h / 12.0 * (k2 - k1);
            th = th_next;
            out.push((x2, v));
        }
        out
    }

    /// Peak downward elastic deflection (x_local, v in meters)
    pub fn max_deflection(&self) -> (f64, f64) {
        self.deflections()
            .into_iter()
            .fold((0.0, f64::MIN), |best, (x, v)| {
                if v > best.1 {
                    (x, v)
                } else {
                    best
                }
            })
    }
}

/// Diagrams for the whole beam
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceDiagram {
    spans: Vec<SpanDiagram>,
}

impl ForceDiagram {
    pub(crate) fn new(spans: Vec<SpanDiagram>) -> Self {
        Self { spans }
    }

    pub fn spans(&self) -> &[SpanDiagram] {
        &self.spans
    }

    pub fn span(&self, index: usize) -> Option<&SpanDiagram> {
        self.spans.get(index)
    }

    /// Moment at a global position (kN·m); boundary positions read from the
    /// right span
    pub fn moment_at(&self, x: f64) -> f64 {
        match self.locate(x) {
            Some((span, local)) => span.moment_at(local),
            None => 0.0,
        }
    }

    /// Shear at a global position (kN)
    pub fn shear_at(&self, x: f64) -> f64 {
        match self.locate(x) {
            Some((span, local)) => span.shear_at(local),
            None => 0.0,
        }
    }

    /// Hogging (most negative) moment reading at a node, from both adjacent
    /// span ends; zero when the node moment is sagging
    pub fn support_moment(&self, node: usize) -> f64 {
        let mut worst: f64 = 0.0;
        if node > 0 {
            if let Some(left) = self.spans.get(node - 1) {
                worst = worst.min(left.end_moments().1);
            }
        }
        if let Some(right) = self.spans.get(node) {
            worst = worst.min(right.end_moments().0);
        }
        worst
    }

    fn locate(&self, x: f64) -> Option<(&SpanDiagram, f64)> {
        for span in &self.spans {
            let local = x - span.x_start;
            if local >= -POSITION_TOL && local <= span.length + POSITION_TOL {
                let next_start = span.x_start + span.length;
                // Boundary stations belong to the right span, except at the
                // very end of the beam
                if x < next_start - POSITION_TOL || span.span == self.spans.len() - 1 {
                    return Some((span, local.clamp(0.0, span.length)));
                }
            }
        }
        None
    }
}
