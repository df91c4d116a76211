//! Residue condition matrices and their rank.
//!
//! Conditions on the residues of simple poles are encoded as 0/1 rows over
//! the pole list of a stratum. Emptiness and forced-zero questions reduce to
//! rank comparisons on these matrices.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::errors::{residue_error, StrataError};
use crate::ids::StratumPoint;

const RANK_EPS: f64 = 1e-9;

/// A 0/1 matrix whose columns are indexed by the poles of a stratum and
/// whose rows are linear conditions on their residues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidueMatrix {
    rows: Vec<Vec<u8>>,
    cols: usize,
}

impl ResidueMatrix {
    /// Creates an empty matrix with the given number of columns.
    pub fn empty(cols: usize) -> Self {
        Self { rows: Vec::new(), cols }
    }

    /// Creates a matrix from explicit rows; all rows must share one width.
    pub fn from_rows(rows: Vec<Vec<u8>>, cols: usize) -> Result<Self, StrataError> {
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(residue_error(
                    "residue-row-width",
                    "residue condition row does not match the pole count",
                )
                .with_context("row", idx)
                .with_context("width", row.len())
                .with_context("expected", cols));
            }
        }
        Ok(Self { rows, cols })
    }

    /// Appends a condition row.
    pub fn push_row(&mut self, row: Vec<u8>) -> Result<(), StrataError> {
        if row.len() != self.cols {
            return Err(residue_error(
                "residue-row-width",
                "residue condition row does not match the pole count",
            )
            .with_context("width", row.len())
            .with_context("expected", self.cols));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Stacks another matrix with the same column set below this one.
    pub fn stack(&self, other: &ResidueMatrix) -> Result<ResidueMatrix, StrataError> {
        if other.cols != self.cols {
            return Err(residue_error(
                "residue-column-mismatch",
                "cannot stack residue matrices over different pole lists",
            )
            .with_context("left", self.cols)
            .with_context("right", other.cols));
        }
        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().cloned());
        Ok(ResidueMatrix { rows, cols: self.cols })
    }

    /// Returns a copy with a unit row in the given column appended, i.e. the
    /// condition that that single residue vanishes.
    pub fn append_unit_row(&self, column: usize) -> Result<ResidueMatrix, StrataError> {
        if column >= self.cols {
            return Err(residue_error(
                "residue-column-out-of-range",
                "unit row column exceeds the pole count",
            )
            .with_context("column", column)
            .with_context("cols", self.cols));
        }
        let mut unit = vec![0u8; self.cols];
        unit[column] = 1;
        let mut rows = self.rows.clone();
        rows.push(unit);
        Ok(ResidueMatrix { rows, cols: self.cols })
    }

    /// The number of condition rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The number of columns, i.e. the number of poles.
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// The rows of the matrix.
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// The rank of the matrix over the rationals.
    pub fn rank(&self) -> usize {
        if self.rows.is_empty() || self.cols == 0 {
            return 0;
        }
        let flat: Vec<f64> = self
            .rows
            .iter()
            .flat_map(|row| row.iter().map(|&entry| f64::from(entry)))
            .collect();
        let matrix = DMatrix::from_row_slice(self.rows.len(), self.cols, &flat);
        matrix.rank(RANK_EPS)
    }
}

/// Builds the condition matrix of a list of residue conditions, each given
/// as the set of stratum points whose residues must sum to zero, over the
/// ordered pole list.
pub fn matrix_from_res_conditions(
    conditions: &[Vec<StratumPoint>],
    pole_list: &[StratumPoint],
) -> Result<ResidueMatrix, StrataError> {
    let mut matrix = ResidueMatrix::empty(pole_list.len());
    for condition in conditions {
        let mut row = vec![0u8; pole_list.len()];
        for point in condition {
            let column = pole_list.iter().position(|p| p == point).ok_or_else(|| {
                residue_error(
                    "residue-unknown-pole",
                    "residue condition references a point outside the pole list",
                )
                .with_context("point", *point)
            })?;
            row[column] = 1;
        }
        matrix.push_row(row)?;
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_of_independent_rows() {
        let m = ResidueMatrix::from_rows(vec![vec![1, 0, 0], vec![0, 1, 1]], 3).unwrap();
        assert_eq!(m.rank(), 2);
    }

    #[test]
    fn rank_ignores_duplicate_rows() {
        let m = ResidueMatrix::from_rows(vec![vec![1, 1], vec![1, 1]], 2).unwrap();
        assert_eq!(m.rank(), 1);
    }

    #[test]
    fn unit_row_raises_rank_only_when_new() {
        let m = ResidueMatrix::from_rows(vec![vec![1, 0]], 2).unwrap();
        assert_eq!(m.append_unit_row(0).unwrap().rank(), 1);
        assert_eq!(m.append_unit_row(1).unwrap().rank(), 2);
    }

    #[test]
    fn conditions_to_matrix() {
        let poles = vec![StratumPoint::new(0, 1), StratumPoint::new(1, 0)];
        let conds = vec![vec![StratumPoint::new(0, 1), StratumPoint::new(1, 0)]];
        let m = matrix_from_res_conditions(&conds, &poles).unwrap();
        assert_eq!(m.rows(), [vec![1u8, 1]]);
    }

    #[test]
    fn unknown_pole_is_an_error() {
        let poles = vec![StratumPoint::new(0, 0)];
        let conds = vec![vec![StratumPoint::new(2, 2)]];
        assert!(matrix_from_res_conditions(&conds, &poles).is_err());
    }
}
