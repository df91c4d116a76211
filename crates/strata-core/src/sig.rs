//! Signatures of strata of k-differentials.

use serde::{Deserialize, Serialize};

use crate::errors::{signature_error, StrataError};

/// The signature of a stratum of k-differentials: the multiset of zero and
/// pole orders together with the differential order `k`.
///
/// For an abelian differential `k == 1`; orders below `-k` are poles of
/// higher order, orders in `-k..0` are poles the differential can carry
/// without residue conditions only when `k > 1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KSignature {
    orders: Vec<i64>,
    k: u32,
}

impl KSignature {
    /// Creates a signature from the point orders and the differential order.
    ///
    /// Fails if `k == 0`; the order sum is not validated here, so signatures
    /// of non-existent strata can be represented and checked separately via
    /// [`KSignature::genus`].
    pub fn new(orders: Vec<i64>, k: u32) -> Result<Self, StrataError> {
        if k == 0 {
            return Err(signature_error(
                "signature-zero-k",
                "the differential order k must be positive",
            ));
        }
        Ok(Self { orders, k })
    }

    /// The zero and pole orders, in point order.
    pub fn orders(&self) -> &[i64] {
        &self.orders
    }

    /// The differential order `k`.
    pub fn k(&self) -> u32 {
        self.k
    }

    /// The number of marked points.
    pub fn n(&self) -> usize {
        self.orders.len()
    }

    /// The genus implied by the order sum, via `sum = k(2g - 2)`.
    ///
    /// Returns `None` when the order sum does not correspond to any genus,
    /// i.e. when `sum + 2k` is not a non-negative multiple of `2k`.
    pub fn genus(&self) -> Option<i64> {
        let sum: i64 = self.orders.iter().sum();
        let two_k = 2 * i64::from(self.k);
        let numerator = sum + two_k;
        if numerator < 0 || numerator % two_k != 0 {
            return None;
        }
        Some(numerator / two_k)
    }

    /// Indices of the poles, i.e. points of negative order.
    pub fn pole_indices(&self) -> Vec<usize> {
        self.orders
            .iter()
            .enumerate()
            .filter(|(_, &order)| order < 0)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Whether the signature carries at least one pole.
    pub fn is_meromorphic(&self) -> bool {
        self.orders.iter().any(|&order| order < 0)
    }
}
