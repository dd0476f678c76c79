//! Support conditions at beam nodes

use serde::{Deserialize, Serialize};

/// Support condition for a node, acting on its two DOFs
/// (vertical translation, rotation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Support {
    /// No restraint (interior hinge-free node or cantilever tip)
    Free,
    /// Vertical translation restrained, rotation free
    Pinned,
    /// Both translation and rotation restrained
    Fixed,
    /// Linear spring on the vertical DOF
    Elastic {
        /// Spring constant (kN/m)
        stiffness: f64,
    },
}

impl Support {
    /// Elastic support shorthand
    pub fn spring(stiffness: f64) -> Self {
        Support::Elastic { stiffness }
    }

    /// Whether the vertical DOF is eliminated from the free set
    pub fn restrains_translation(&self) -> bool {
        matches!(self, Support::Pinned | Support::Fixed)
    }

    /// Whether the rotational DOF is eliminated from the free set
    pub fn restrains_rotation(&self) -> bool {
        matches!(self, Support::Fixed)
    }

    /// Spring constant added to the translation diagonal, if any (kN/m)
    pub fn spring_stiffness(&self) -> Option<f64> {
        match self {
            Support::Elastic { stiffness } => Some(*stiffness),
            _ => None,
        }
    }

    /// True for anything other than `Free`
    pub fn is_supported(&self) -> bool {
        !matches!(self, Support::Free)
    }

    /// True when the support can take vertical load (rigidly or elastically)
    pub fn resists_vertical(&self) -> bool {
        self.restrains_translation() || self.spring_stiffness().is_some()
    }
}

impl Default for Support {
    fn default() -> Self {
        Support::Free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_restrains_both() {
        let s = Support::Fixed;
        assert!(s.restrains_translation());
        assert!(s.restrains_rotation());
        assert!(s.is_supported());
    }

    #[test]
    fn test_pinned_leaves_rotation_free() {
        let s = Support::Pinned;
        assert!(s.restrains_translation());
        assert!(!s.restrains_rotation());
    }

    #[test]
    fn test_spring_keeps_dof() {
        let s = Support::spring(50_000.0);
        assert!(!s.restrains_translation());
        assert_eq!(s.spring_stiffness(), Some(50_000.0));
        assert!(s.resists_vertical());
        assert!(s.is_supported());
    }
}
