//! Eigenspectrum of a layer's output covariance.
//!
//! The covariance is decomposed with a bounded symmetric eigen solver.
//! Eigenvalues are taken in absolute value (a PSD matrix can still produce
//! tiny negative eigenvalues from rounding), then sorted descending with a
//! stable sort so equal eigenvalues keep their solver order.
//!
//! # Saturation
//!
//! With `p_i = |λ_i| / Σ|λ_j|` the normalized eigenvalue distribution, the
//! saturation score is the concentration index `Σ p_i²`:
//!
//! - `1/F` when variance is spread evenly over all F directions
//! - `→ 1` when a single direction carries all variance
//!
//! Its reciprocal is the participation ratio, an effective dimensionality.

use super::covariance::Covariance;
use super::outcome::SkipReason;
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use std::cmp::Ordering;

/// Sorted eigenpairs of a covariance matrix.
#[derive(Clone, Debug)]
pub struct EigenSpectrum {
    /// |λ|, descending.
    eigenvalues: Vec<f64>,
    /// Column `i` pairs with `eigenvalues[i]`.
    eigenvectors: DMatrix<f64>,
    total: f64,
}

impl EigenSpectrum {
    /// Decompose a covariance matrix.
    ///
    /// Every numerical failure is mapped to a [`SkipReason`]; this never panics
    /// and never loops unbounded.
    pub fn from_covariance(cov: &Covariance) -> Result<Self, SkipReason> {
        let features = cov.features();
        let max_iterations = (features * 30).max(1000);
        let eigen = SymmetricEigen::try_new(cov.matrix().clone(), f64::EPSILON, max_iterations)
            .ok_or(SkipReason::DecompositionFailed)?;

        let mut pairs: Vec<(f64, usize)> = eigen
            .eigenvalues
            .iter()
            .enumerate()
            .map(|(i, v)| (v.abs(), i))
            .collect();
        if pairs.iter().any(|(v, _)| !v.is_finite()) {
            return Err(SkipReason::NonFinite);
        }
        pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let total: f64 = pairs.iter().map(|(v, _)| v).sum();
        // Centering identical values leaves at most N·eps·|x| per entry, so a
        // total below F·(N·eps·|x|)² is rounding residue. Shift-invariant
        // variance well above that is kept.
        let n = cov.observations() as f64;
        let floor = features as f64 * (n * f64::EPSILON * cov.magnitude()).powi(2);
        if total <= floor {
            return Err(SkipReason::ZeroVarianceTotal);
        }

        let eigenvalues = pairs.iter().map(|(v, _)| *v).collect();
        let columns: Vec<DVector<f64>> = pairs
            .iter()
            .map(|(_, i)| eigen.eigenvectors.column(*i).into_owned())
            .collect();
        let eigenvectors = DMatrix::from_columns(&columns);

        Ok(Self {
            eigenvalues,
            eigenvectors,
            total,
        })
    }

    /// Number of eigenpairs (the feature count).
    pub fn dimension(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Absolute eigenvalues, largest first.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Eigenvectors as columns, in the same order as [`eigenvalues`](Self::eigenvalues).
    pub fn eigenvectors(&self) -> &DMatrix<f64> {
        &self.eigenvectors
    }

    /// Sum of absolute eigenvalues (total variance).
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Share of total variance per eigenvalue; sums to 1.
    pub fn explained_variance(&self) -> Vec<f64> {
        self.eigenvalues.iter().map(|v| v / self.total).collect()
    }

    /// The `n` largest eigenvalues (fewer if the spectrum is shorter).
    pub fn top(&self, n: usize) -> &[f64] {
        &self.eigenvalues[..n.min(self.eigenvalues.len())]
    }

    /// Concentration of the normalized spectrum, `Σ p_i²`, in `[1/F, 1]`.
    pub fn saturation(&self) -> f64 {
        self.eigenvalues
            .iter()
            .map(|v| {
                let p = v / self.total;
                p * p
            })
            .sum()
    }

    /// Participation ratio `1 / Σ p_i²`, in `[1, F]`.
    pub fn effective_dimensionality(&self) -> f64 {
        1.0 / self.saturation()
    }
}
