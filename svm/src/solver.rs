//Copyright 2024 Felix Engl
//
//Licensed under the Apache License, Version 2.0 (the "License");
//you may not use this file except in compliance with the License.
//You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
//Unless required by applicable law or agreed to in writing, software
//distributed under the License is distributed on an "AS IS" BASIS,
//WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//See the License for the specific language governing permissions and
//limitations under the License.

//! A binary C-SVC with a linear kernel, solved in the dual with SMO.
//!
//! The working set selection uses second order information (Fan, Chen and Lin, 2005),
//! the same way libsvm does. Kernel values are computed on demand from the sparse
//! documents, no kernel matrix is kept. Besides the documents the solver holds a few
//! values per document and two dense vectors of the vocabulary size.

use text_processing::vectorizer::{TfIdfVectorEntry, VectorizedDocument};
use crate::error::TrainingError;

/// Replaces non positive curvatures.
const TAU: f64 = 1e-12;

/// The lower limit for the number of iterations.
const MIN_ITERATIONS: usize = 10_000_000;

/// The parameters of [solve].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearSvcParameters {
    /// The cost C of the positive class, already weighted.
    pub positive_cost: f64,
    /// The cost C of the negative class, already weighted.
    pub negative_cost: f64,
    /// The tolerance of the stopping criterion
    pub eps: f64,
}

impl LinearSvcParameters {
    fn validate(&self) -> Result<(), TrainingError> {
        for cost in [self.positive_cost, self.negative_cost] {
            if !(cost.is_finite() && cost > 0.0) {
                return Err(TrainingError::InvalidCost(cost));
            }
        }
        if !(self.eps.is_finite() && self.eps > 0.0) {
            return Err(TrainingError::InvalidTolerance(self.eps));
        }
        Ok(())
    }
}

/// The separating hyperplane `w·x - rho`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSvc {
    pub weights: Vec<f64>,
    pub rho: f64,
    pub support_vectors: usize,
    pub iterations: usize,
}

struct SolverState<'a> {
    documents: &'a [VectorizedDocument],
    /// +1 or -1
    targets: Vec<f64>,
    bounds: Vec<f64>,
    alpha: Vec<f64>,
    /// The gradient of `½αᵀQα - eᵀα`
    gradient: Vec<f64>,
    /// The kernel values `K(xᵢ, xᵢ)`
    diagonal: Vec<f64>,
    /// The kernel column of the last selected `i`
    column: Vec<f64>,
    /// `w = Σ αᵢ·yᵢ·xᵢ`
    weights: Vec<f64>,
    /// Dense scratch space, all zero between the steps
    scratch: Vec<f64>,
    eps: f64,
}

impl<'a> SolverState<'a> {
    fn new(documents: &'a [VectorizedDocument], labels: &[bool], dimension: usize, parameters: &LinearSvcParameters) -> Self {
        let targets: Vec<f64> = labels.iter().map(|label| if *label { 1.0 } else { -1.0 }).collect();
        let bounds = labels
            .iter()
            .map(|label| if *label { parameters.positive_cost } else { parameters.negative_cost })
            .collect();
        let diagonal = documents.iter().map(|document| document.norm().powi(2)).collect();
        Self {
            documents,
            bounds,
            alpha: vec![0.0; targets.len()],
            gradient: vec![-1.0; targets.len()],
            diagonal,
            column: vec![0.0; targets.len()],
            weights: vec![0.0; dimension],
            scratch: vec![0.0; dimension],
            targets,
            eps: parameters.eps,
        }
    }

    fn is_upper_bound(&self, idx: usize) -> bool {
        self.alpha[idx] >= self.bounds[idx]
    }

    fn is_lower_bound(&self, idx: usize) -> bool {
        self.alpha[idx] <= 0.0
    }

    /// Can `yᵢαᵢ` grow?
    fn in_up_set(&self, idx: usize) -> bool {
        if self.targets[idx] > 0.0 { !self.is_upper_bound(idx) } else { !self.is_lower_bound(idx) }
    }

    /// Can `yᵢαᵢ` shrink?
    fn in_low_set(&self, idx: usize) -> bool {
        if self.targets[idx] > 0.0 { !self.is_lower_bound(idx) } else { !self.is_upper_bound(idx) }
    }

    fn clear_scratch(&mut self, idx: usize) {
        for TfIdfVectorEntry(term, _) in self.documents[idx].iter() {
            if let Some(value) = self.scratch.get_mut(*term) {
                *value = 0.0;
            }
        }
    }

    /// Writes `K(xᵢ, xₖ)` for every k into the column.
    fn compute_column(&mut self, idx: usize) {
        let document = &self.documents[idx];
        document.write_dense(&mut self.scratch);
        for (value, other) in self.column.iter_mut().zip(self.documents) {
            *value = other.dot(&self.scratch);
        }
        self.clear_scratch(idx);
    }

    /// Returns the maximal violating pair, or None if the solution is optimal within eps.
    fn select_working_set(&mut self) -> Option<(usize, usize)> {
        let mut gmax = f64::NEG_INFINITY;
        let mut gmax_idx = None;
        for t in 0..self.targets.len() {
            if self.in_up_set(t) {
                let value = -self.targets[t] * self.gradient[t];
                if value >= gmax {
                    gmax = value;
                    gmax_idx = Some(t);
                }
            }
        }
        let i = gmax_idx?;
        self.compute_column(i);

        let mut gmax2 = f64::NEG_INFINITY;
        let mut min_objective = f64::INFINITY;
        let mut min_idx = None;
        for t in 0..self.targets.len() {
            if !self.in_low_set(t) {
                continue;
            }
            let value = self.targets[t] * self.gradient[t];
            if value >= gmax2 {
                gmax2 = value;
            }
            let grad_diff = gmax + value;
            if grad_diff > 0.0 {
                let quad_coef = self.diagonal[i] + self.diagonal[t] - 2.0 * self.column[t];
                let quad_coef = if quad_coef > 0.0 { quad_coef } else { TAU };
                let objective = -(grad_diff * grad_diff) / quad_coef;
                if objective <= min_objective {
                    min_objective = objective;
                    min_idx = Some(t);
                }
            }
        }

        if gmax + gmax2 < self.eps {
            return None;
        }
        min_idx.map(|j| (i, j))
    }

    /// Optimizes the pair analytically, the column of [i] has to be computed.
    fn update(&mut self, i: usize, j: usize) {
        let (c_i, c_j) = (self.bounds[i], self.bounds[j]);
        let (old_alpha_i, old_alpha_j) = (self.alpha[i], self.alpha[j]);
        let quad_coef = self.diagonal[i] + self.diagonal[j] - 2.0 * self.column[j];
        let quad_coef = if quad_coef > 0.0 { quad_coef } else { TAU };

        if self.targets[i] != self.targets[j] {
            let delta = (-self.gradient[i] - self.gradient[j]) / quad_coef;
            let diff = old_alpha_i - old_alpha_j;
            let (mut alpha_i, mut alpha_j) = (old_alpha_i + delta, old_alpha_j + delta);
            if diff > 0.0 {
                if alpha_j < 0.0 {
                    alpha_j = 0.0;
                    alpha_i = diff;
                }
            } else if alpha_i < 0.0 {
                alpha_i = 0.0;
                alpha_j = -diff;
            }
            if diff > c_i - c_j {
                if alpha_i > c_i {
                    alpha_i = c_i;
                    alpha_j = c_i - diff;
                }
            } else if alpha_j > c_j {
                alpha_j = c_j;
                alpha_i = c_j + diff;
            }
            self.alpha[i] = alpha_i;
            self.alpha[j] = alpha_j;
        } else {
            let delta = (self.gradient[i] - self.gradient[j]) / quad_coef;
            let sum = old_alpha_i + old_alpha_j;
            let (mut alpha_i, mut alpha_j) = (old_alpha_i - delta, old_alpha_j + delta);
            if sum > c_i {
                if alpha_i > c_i {
                    alpha_i = c_i;
                    alpha_j = sum - c_i;
                }
            } else if alpha_j < 0.0 {
                alpha_j = 0.0;
                alpha_i = sum;
            }
            if sum > c_j {
                if alpha_j > c_j {
                    alpha_j = c_j;
                    alpha_i = sum - c_j;
                }
            } else if alpha_i < 0.0 {
                alpha_i = 0.0;
                alpha_j = sum;
            }
            self.alpha[i] = alpha_i;
            self.alpha[j] = alpha_j;
        }

        // Δw = Δαᵢ·yᵢ·xᵢ + Δαⱼ·yⱼ·xⱼ, then Gₖ += yₖ·(Δw·xₖ)
        let scale_i = (self.alpha[i] - old_alpha_i) * self.targets[i];
        let scale_j = (self.alpha[j] - old_alpha_j) * self.targets[j];
        for (idx, scale) in [(i, scale_i), (j, scale_j)] {
            for TfIdfVectorEntry(term, value) in self.documents[idx].iter() {
                if let Some(target) = self.scratch.get_mut(*term) {
                    *target += scale * value;
                }
            }
        }
        for ((gradient, target), document) in self.gradient.iter_mut().zip(&self.targets).zip(self.documents) {
            *gradient += target * document.dot(&self.scratch);
        }
        for (weight, delta) in self.weights.iter_mut().zip(&self.scratch) {
            *weight += delta;
        }
        self.clear_scratch(i);
        self.clear_scratch(j);
    }

    fn calculate_rho(&self) -> f64 {
        let mut free = 0usize;
        let mut sum_free = 0.0;
        let mut upper = f64::INFINITY;
        let mut lower = f64::NEG_INFINITY;
        for idx in 0..self.targets.len() {
            let value = self.targets[idx] * self.gradient[idx];
            let positive = self.targets[idx] > 0.0;
            if self.is_upper_bound(idx) {
                if positive { lower = lower.max(value) } else { upper = upper.min(value) }
            } else if self.is_lower_bound(idx) {
                if positive { upper = upper.min(value) } else { lower = lower.max(value) }
            } else {
                free += 1;
                sum_free += value;
            }
        }
        if free > 0 {
            sum_free / free as f64
        } else {
            (upper + lower) / 2.0
        }
    }
}

/// Trains a linear C-SVC on [documents] with [labels], true is the positive class.
///
/// [dimension] is the size of the vocabulary the documents are vectorized with.
pub fn solve(
    documents: &[VectorizedDocument],
    labels: &[bool],
    dimension: usize,
    parameters: &LinearSvcParameters,
) -> Result<LinearSvc, TrainingError> {
    parameters.validate()?;
    debug_assert_eq!(documents.len(), labels.len());
    let mut state = SolverState::new(documents, labels, dimension, parameters);

    let max_iterations = MIN_ITERATIONS.max(documents.len().saturating_mul(100));
    let mut iterations = 0;
    while let Some((i, j)) = state.select_working_set() {
        if iterations == max_iterations {
            log::warn!("The solver reached the maximum of {max_iterations} iterations before converging.");
            break;
        }
        iterations += 1;
        state.update(i, j);
    }

    let rho = state.calculate_rho();
    let support_vectors = state.alpha.iter().filter(|alpha| **alpha > 0.0).count();
    log::debug!("The solver finished after {iterations} iterations with {support_vectors} support vectors.");
    Ok(LinearSvc {
        weights: state.weights,
        rho,
        support_vectors,
        iterations,
    })
}

#[cfg(test)]
mod test {
    use float_cmp::approx_eq;
    use text_processing::vectorizer::{TfIdfVectorEntry, VectorizedDocument};
    use crate::error::TrainingError;
    use crate::solver::{solve, LinearSvcParameters};

    fn document(entries: &[(usize, f64)]) -> VectorizedDocument {
        entries.iter().map(|(idx, value)| TfIdfVectorEntry(*idx, *value)).collect()
    }

    fn parameters(cost: f64) -> LinearSvcParameters {
        LinearSvcParameters {
            positive_cost: cost,
            negative_cost: cost,
            eps: 1e-3,
        }
    }

    #[test]
    fn finds_the_maximum_margin() {
        let documents = [document(&[(0, 3.0)]), document(&[(0, 1.0)])];
        let svc = solve(&documents, &[true, false], 1, &parameters(10.0)).unwrap();
        assert!(approx_eq!(f64, 1.0, svc.weights[0], epsilon = 1e-9), "{svc:?}");
        assert!(approx_eq!(f64, 2.0, svc.rho, epsilon = 1e-9), "{svc:?}");
        assert_eq!(2, svc.support_vectors);
    }

    #[test]
    fn separates_two_clusters() {
        let documents = [
            document(&[(0, 1.0)]),
            document(&[(0, 0.8), (2, 0.6)]),
            document(&[(0, 0.6), (3, 0.8)]),
            document(&[(1, 1.0)]),
            document(&[(1, 0.8), (2, 0.6)]),
            document(&[(1, 0.6), (3, 0.8)]),
        ];
        let labels = [true, true, true, false, false, false];
        let svc = solve(&documents, &labels, 4, &parameters(10.0)).unwrap();
        for (document, label) in documents.iter().zip(labels) {
            assert_eq!(label, document.dot(&svc.weights) - svc.rho >= 0.0);
        }
        assert!(svc.weights[0] > 0.0);
        assert!(svc.weights[1] < 0.0);
    }

    #[test]
    fn contradicting_points_cancel_out() {
        // Identical points with both labels cancel out.
        let documents = [document(&[(0, 1.0)]), document(&[(0, 1.0)]), document(&[(0, 1.0)])];
        let svc = solve(&documents, &[true, false, true], 1, &parameters(0.01)).unwrap();
        assert!(svc.weights[0].abs() <= 0.01 + 1e-12, "{svc:?}");
    }

    #[test]
    fn empty_documents_are_handled() {
        let documents = [document(&[(0, 1.0)]), VectorizedDocument::default(), document(&[(1, 1.0)])];
        let svc = solve(&documents, &[true, true, false], 2, &parameters(1.0)).unwrap();
        assert!(svc.rho.is_finite());
        assert!(svc.weights.iter().all(|weight| weight.is_finite()));
    }

    #[test]
    fn rejects_invalid_parameters() {
        let documents = [document(&[(0, 1.0)]), document(&[(1, 1.0)])];
        let err = solve(&documents, &[true, false], 2, &parameters(0.0)).unwrap_err();
        assert!(matches!(err, TrainingError::InvalidCost(_)), "{err}");
        let err = solve(
            &documents,
            &[true, false],
            2,
            &LinearSvcParameters { eps: f64::NAN, ..parameters(1.0) }
        ).unwrap_err();
        assert!(matches!(err, TrainingError::InvalidTolerance(_)), "{err}");
    }

    #[test]
    fn trains_on_many_documents() {
        // A kernel matrix for this many documents would need gigabytes.
        const DOCUMENTS: usize = 20_000;
        let documents = (0..DOCUMENTS)
            .map(|idx| {
                let class = idx % 2;
                document(&[(class, 0.8), (2 + idx % 50, 0.6)])
            })
            .collect::<Vec<_>>();
        let labels = (0..DOCUMENTS).map(|idx| idx % 2 == 0).collect::<Vec<_>>();
        let svc = solve(&documents, &labels, 52, &parameters(1.0)).unwrap();
        assert_eq!(52, svc.weights.len());
        for (document, label) in documents.iter().zip(&labels).step_by(997) {
            assert_eq!(*label, document.dot(&svc.weights) - svc.rho >= 0.0);
        }
    }
}
