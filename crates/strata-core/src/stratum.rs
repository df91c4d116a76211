//! The interface an enclosing stratum presents to embedded level graphs.

use crate::errors::StrataError;
use crate::ids::StratumPoint;
use crate::residue::{matrix_from_res_conditions, ResidueMatrix};
use crate::sig::KSignature;

/// A (generalised) stratum of k-differentials: one signature per connected
/// component plus a list of residue conditions across components.
///
/// Level graphs are embedded into a stratum through this trait; the engine
/// only ever needs the signatures, the pole bookkeeping and the condition
/// matrix, so strata produced by other machinery plug in here.
pub trait Stratum {
    /// The signature of each connected component.
    fn signatures(&self) -> &[KSignature];

    /// Residue conditions: each entry is a set of poles whose residues are
    /// required to sum to zero.
    fn residue_conditions(&self) -> &[Vec<StratumPoint>];

    /// The number of connected components.
    fn components(&self) -> usize {
        self.signatures().len()
    }

    /// All poles of the stratum, ordered by component and point index.
    fn pole_list(&self) -> Vec<StratumPoint> {
        let mut poles = Vec::new();
        for (component, sig) in self.signatures().iter().enumerate() {
            for index in sig.pole_indices() {
                poles.push(StratumPoint::new(component, index));
            }
        }
        poles
    }

    /// The order of the differential at a stratum point, if the point exists.
    fn point_order(&self, point: StratumPoint) -> Option<i64> {
        self.signatures()
            .get(point.component)?
            .orders()
            .get(point.index)
            .copied()
    }

    /// The simple poles of the stratum, i.e. points of order exactly `-1`.
    fn simple_poles(&self) -> Vec<StratumPoint> {
        self.pole_list()
            .into_iter()
            .filter(|&point| self.point_order(point) == Some(-1))
            .collect()
    }

    /// The matrix of the stratum's own residue conditions over its pole
    /// list.
    fn residue_matrix(&self) -> Result<ResidueMatrix, StrataError> {
        matrix_from_res_conditions(self.residue_conditions(), &self.pole_list())
    }
}
