//! A lazy n-ary Cartesian product.

/// Iterator over the Cartesian product of a list of factors, yielding one
/// `Vec` per combination (rightmost factor varies fastest).
///
/// With zero factors it yields exactly one empty combination; with any
/// empty factor it yields nothing. Combinations are produced on demand, so
/// a caller taking only the first element never pays for the rest.
#[derive(Debug, Clone)]
pub struct LazyProduct<T> {
    factors: Vec<Vec<T>>,
    indices: Vec<usize>,
    done: bool,
}

impl<T: Clone> LazyProduct<T> {
    /// Creates the product of the given factors.
    pub fn new(factors: Vec<Vec<T>>) -> Self {
        let done = factors.iter().any(Vec::is_empty);
        let indices = vec![0; factors.len()];
        Self { factors, indices, done }
    }
}

impl<T: Clone> Iterator for LazyProduct<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let combination: Vec<T> = self
            .indices
            .iter()
            .zip(&self.factors)
            .map(|(&idx, factor)| factor[idx].clone())
            .collect();
        // advance the odometer
        self.done = true;
        for pos in (0..self.indices.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < self.factors[pos].len() {
                self.done = false;
                break;
            }
            self.indices[pos] = 0;
        }
        Some(combination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_by_two() {
        let combos: Vec<Vec<u8>> =
            LazyProduct::new(vec![vec![1, 2], vec![3, 4]]).collect();
        assert_eq!(combos, vec![vec![1, 3], vec![1, 4], vec![2, 3], vec![2, 4]]);
    }

    #[test]
    fn no_factors_yields_one_empty_combination() {
        let combos: Vec<Vec<u8>> = LazyProduct::new(vec![]).collect();
        assert_eq!(combos, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn an_empty_factor_yields_nothing() {
        let combos: Vec<Vec<u8>> =
            LazyProduct::new(vec![vec![1], vec![], vec![2]]).collect();
        assert!(combos.is_empty());
    }

    #[test]
    fn is_lazy() {
        let mut product = LazyProduct::new(vec![vec![0u64; 3]; 10]);
        assert!(product.next().is_some());
    }
}
