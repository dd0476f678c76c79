//! Direct stiffness solver
//!
//! Assembles the 2-DOF-per-node global system from 4x4 beam elements,
//! eliminates restrained DOFs, solves, then recovers nodal displacements,
//! support reactions and per-span end forces. Forces here are at
//! characteristic (service) level; design factors are applied downstream.

pub mod diagram;

use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::config::DesignConfig;
use crate::error::{EngineError, EngineResult};
use crate::math::{self, sparse::SparseMatrixBuilder, Vec4};
use crate::model::{BeamModel, Load};
use crate::solver::diagram::{ForceDiagram, SpanDiagram};

/// Solved state of one node
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Vertical deflection (m), downward positive
    pub deflection: f64,
    /// Rotation (rad), in the applied-moment sign convention
    pub rotation: f64,
}

/// Reaction at a supported node, for export to foundation design
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportReaction {
    pub node: usize,
    /// Global position along the beam (m)
    pub position: f64,
    /// Vertical reaction (kN), upward positive
    pub force: f64,
    /// Restraint moment (kN·m) at fixed supports, applied-moment convention
    pub moment: Option<f64>,
}

/// Everything the design and serviceability stages need from the solve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub displacements: Vec<NodeDisplacement>,
    pub reactions: Vec<SupportReaction>,
    pub diagram: ForceDiagram,
}

impl Solution {
    /// Sum of vertical reactions (kN, upward positive)
    pub fn total_reaction(&self) -> f64 {
        self.reactions.iter().map(|r| r.force).sum()
    }
}

/// Solve the beam for service-level internal forces and displacements
pub fn solve(model: &BeamModel, config: &DesignConfig) -> EngineResult<Solution> {
    model.validate()?;
    check_stability(model)?;

    let n_nodes = model.node_count();
    let n_dofs = 2 * n_nodes;

    // Free-DOF map: None marks an eliminated (restrained) DOF
    let mut dof_map: Vec<Option<usize>> = Vec::with_capacity(n_dofs);
    let mut next = 0usize;
    for node in 0..n_nodes {
        let support = model.support(node);
        for restrained in [support.restrains_translation(), support.restrains_rotation()] {
            if restrained {
                dof_map.push(None);
            } else {
                dof_map.push(Some(next));
                next += 1;
            }
        }
    }
    let n_free = next;

    // Per-span element matrices and consistent load vectors
    let spans = &model.spans;
    let mut k_locals: Vec<math::Mat4> = Vec::with_capacity(spans.len());
    let mut f_eqs: Vec<Vec4> = Vec::with_capacity(spans.len());
    for span in spans {
        let l = span.length;
        k_locals.push(math::beam_local_stiffness(
            span.concrete.ecs_kn_m2(),
            span.section.gross_inertia_m4(),
            l,
        ));
        let mut f_eq = Vec4::zeros();
        for load in span.effective_loads(config.concrete_unit_weight) {
            f_eq += match load {
                Load::Distributed { w, start, end } => {
                    math::consistent_uniform_load(w, start, end, l)
                }
                Load::Point { p, position } => math::consistent_point_load(p, position, l),
                Load::Moment { m, position } => math::consistent_moment_load(m, position, l),
            };
        }
        f_eqs.push(f_eq);
    }

    // Reduced load vector
    let mut f_free = DVector::zeros(n_free);
    for (i, f_eq) in f_eqs.iter().enumerate() {
        let dofs = element_dofs(i, &dof_map);
        for (local, dof) in dofs.iter().enumerate() {
            if let Some(d) = dof {
                f_free[*d] += f_eq[local];
            }
        }
    }

    // Reduced stiffness, dense or sparse by free-DOF count. A fully clamped
    // chain (every DOF fixed) has nothing to solve; displacements stay zero
    // and the end forces reduce to the fixed-end values.
    let u_free = if n_free == 0 {
        DVector::zeros(0)
    } else if n_free <= config.sparse_threshold {
        let mut k = DMatrix::zeros(n_free, n_free);
        for (i, k_local) in k_locals.iter().enumerate() {
            let dofs = element_dofs(i, &dof_map);
            for (li, di) in dofs.iter().enumerate() {
                let Some(row) = di else { continue };
                for (lj, dj) in dofs.iter().enumerate() {
                    if let Some(col) = dj {
                        k[(*row, *col)] += k_local[(li, lj)];
                    }
                }
            }
        }
        add_springs_dense(&mut k, model, &dof_map);
        debug!("solving dense system, {} free DOFs", n_free);
        // The reduced matrix is SPD whenever the beam is stable; LU catches
        // ill-conditioned spring/EI mixes that Cholesky rejects.
        math::solve_cholesky(&k, &f_free)
            .or_else(|| math::solve_dense(&k, &f_free))
            .ok_or_else(|| {
                EngineError::Unstable(
                    "stiffness matrix is singular; supports do not restrain the beam".to_string(),
                )
            })?
    } else {
        let mut builder = SparseMatrixBuilder::new(n_free);
        for (i, k_local) in k_locals.iter().enumerate() {
            builder.add_element_matrix(&element_dofs(i, &dof_map), k_local);
        }
        add_springs_sparse(&mut builder, model, &dof_map);
        let csr = builder.to_csr();
        debug!(
            "solving sparse system, {} free DOFs, {} entries",
            n_free,
            builder.nnz()
        );
        let max_iter = 20 * n_free;
        math::sparse::solve_pcg(&csr, &f_free, 1e-10, max_iter).ok_or(
            EngineError::ConvergenceFailed("sparse linear solve".to_string(), max_iter),
        )?
    };

    // Expand to full DOF vector (restrained entries are zero)
    let mut u_full = vec![0.0; n_dofs];
    for (dof, mapped) in dof_map.iter().enumerate() {
        if let Some(idx) = mapped {
            u_full[dof] = u_free[*idx];
        }
    }

    let displacements: Vec<NodeDisplacement> = (0..n_nodes)
        .map(|n| NodeDisplacement {
            deflection: u_full[2 * n],
            rotation: u_full[2 * n + 1],
        })
        .collect();

    // End forces S = k * u - f_eq, element DOF directions
    let end_forces: Vec<Vec4> = (0..spans.len())
        .map(|i| {
            let u_e = Vec4::new(
                u_full[2 * i],
                u_full[2 * i + 1],
                u_full[2 * i + 2],
                u_full[2 * i + 3],
            );
            k_locals[i] * u_e - f_eqs[i]
        })
        .collect();

    let reactions = recover_reactions(model, &end_forces, &displacements);

    let positions = model.node_positions();
    let span_diagrams: Vec<SpanDiagram> = spans
        .iter()
        .enumerate()
        .map(|(i, span)| {
            SpanDiagram::build(
                i,
                positions[i],
                span.length,
                span.ei_kn_m2(),
                [
                    end_forces[i][0],
                    end_forces[i][1],
                    end_forces[i][2],
                    end_forces[i][3],
                ],
                span.effective_loads(config.concrete_unit_weight),
                displacements[i].deflection,
                displacements[i].rotation,
                config.diagram_stations,
            )
        })
        .collect();

    Ok(Solution {
        displacements,
        reactions,
        diagram: ForceDiagram::new(span_diagrams),
    })
}

/// Global DOF indices of span `i`, mapped through the free-DOF table
fn element_dofs(i: usize, dof_map: &[Option<usize>]) -> [Option<usize>; 4] {
    [
        dof_map[2 * i],
        dof_map[2 * i + 1],
        dof_map[2 * i + 2],
        dof_map[2 * i + 3],
    ]
}

fn add_springs_dense(k: &mut DMatrix<f64>, model: &BeamModel, dof_map: &[Option<usize>]) {
    for node in 0..model.node_count() {
        if let Some(stiffness) = model.support(node).spring_stiffness() {
            if let Some(dof) = dof_map[2 * node] {
                k[(dof, dof)] += stiffness;
            }
        }
    }
}

fn add_springs_sparse(builder: &mut SparseMatrixBuilder, model: &BeamModel, dof_map: &[Option<usize>]) {
    for node in 0..model.node_count() {
        if let Some(stiffness) = model.support(node).spring_stiffness() {
            if let Some(dof) = dof_map[2 * node] {
                builder.add(dof, dof, stiffness);
            }
        }
    }
}

/// Rigid-body restraint check, run before assembly so mechanisms report as
/// instability rather than a numeric solve failure
fn check_stability(model: &BeamModel) -> EngineResult<()> {
    let vertical = (0..model.node_count())
        .filter(|&n| model.support(n).resists_vertical())
        .count();
    let rotational = (0..model.node_count())
        .filter(|&n| model.support(n).restrains_rotation())
        .count();

    if vertical == 0 {
        return Err(EngineError::Unstable(
            "no support resists vertical load".to_string(),
        ));
    }
    if vertical < 2 && rotational == 0 {
        return Err(EngineError::Unstable(
            "a single translational support leaves a rigid-body rotation; \
             add a second support or fix the existing one"
                .to_string(),
        ));
    }
    Ok(())
}

/// Support reactions from element end forces, upward positive
fn recover_reactions(
    model: &BeamModel,
    end_forces: &[Vec4],
    displacements: &[NodeDisplacement],
) -> Vec<SupportReaction> {
    let positions = model.node_positions();
    let mut reactions = Vec::new();

    for node in 0..model.node_count() {
        let support = model.support(node);
        if !support.is_supported() {
            continue;
        }

        let (force, moment) = if let Some(stiffness) = support.spring_stiffness() {
            // Spring pushes back proportionally to the settlement
            (stiffness * displacements[node].deflection, None)
        } else {
            // Sum of end forces at this node equals K*u - F at the
            // restrained DOF, which is the support's applied force
            let mut fv = 0.0;
            let mut fm = 0.0;
            if node > 0 {
                fv += end_forces[node - 1][2];
                fm += end_forces[node - 1][3];
            }
            if node < model.spans.len() {
                fv += end_forces[node][0];
                fm += end_forces[node][1];
            }
            let moment = support.restrains_rotation().then_some(fm);
            (-fv, moment)
        };

        reactions.push(SupportReaction {
            node,
            position: positions[node],
            force,
            moment,
        });
    }

    reactions
}
