//! Observation matrix and sample covariance.
//!
//! One representative row (the first example of the batch) is taken from
//! every snapshot. With N snapshots of F features this gives an F × N
//! matrix, so the covariance costs O(F²·N) instead of O(F²·N·batch).

use super::outcome::SkipReason;
use super::snapshot::Snapshot;
use nalgebra::DMatrix;

/// Row taken from every snapshot as its representative observation.
pub const REPRESENTATIVE_ROW: usize = 0;

/// Sample covariance of a layer's observations, F × F.
#[derive(Clone, Debug)]
pub struct Covariance {
    matrix: DMatrix<f64>,
    observations: usize,
    /// Largest absolute observed value, used to scale the zero-variance floor.
    magnitude: f64,
}

impl Covariance {
    /// Compute the unbiased covariance of a feature × observation matrix.
    ///
    /// Skips when there are fewer observations than features (the matrix
    /// would be rank-deficient by construction) or when any value is not
    /// finite.
    pub fn from_observations(obs: &DMatrix<f64>) -> Result<Self, SkipReason> {
        let (features, observations) = obs.shape();
        if observations < 2 {
            return Err(SkipReason::InsufficientData { observations });
        }
        if features == 0 || observations < features {
            return Err(SkipReason::DegenerateCovariance {
                observations,
                features,
            });
        }
        if obs.iter().any(|v| !v.is_finite()) {
            return Err(SkipReason::NonFinite);
        }

        let magnitude = obs.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        let mean = obs.column_mean();
        let mut centered = obs.clone();
        for mut col in centered.column_iter_mut() {
            col -= &mean;
        }

        let matrix = (&centered * centered.transpose()) / (observations as f64 - 1.0);
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(SkipReason::NonFinite);
        }

        Ok(Self {
            matrix,
            observations,
            magnitude,
        })
    }

    /// Stack snapshots and compute their covariance in one go.
    pub fn from_history(history: &[Snapshot]) -> Result<Self, SkipReason> {
        let obs = observation_matrix(history)?;
        Self::from_observations(&obs)
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn into_matrix(self) -> DMatrix<f64> {
        self.matrix
    }

    pub fn features(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }
}

/// Build the F × N observation matrix from a layer's history.
///
/// Column `j` is row [`REPRESENTATIVE_ROW`] of snapshot `j`, so column order
/// follows training-step order.
pub fn observation_matrix(history: &[Snapshot]) -> Result<DMatrix<f64>, SkipReason> {
    if history.len() < 2 {
        return Err(SkipReason::InsufficientData {
            observations: history.len(),
        });
    }

    let features = history[0].cols();
    let mut rows: Vec<&[f64]> = Vec::with_capacity(history.len());
    for snap in history {
        match snap.row(REPRESENTATIVE_ROW) {
            Some(row) if row.len() == features => rows.push(row),
            Some(row) => {
                return Err(SkipReason::InconsistentShape {
                    expected: features,
                    got: row.len(),
                })
            }
            None => {
                return Err(SkipReason::InconsistentShape {
                    expected: features,
                    got: 0,
                })
            }
        }
    }

    Ok(DMatrix::from_fn(features, rows.len(), |i, j| rows[j][i]))
}
