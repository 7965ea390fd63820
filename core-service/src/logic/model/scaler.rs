//! Standard Scaler
//!
//! Column-wise z-score, fitted on the training split and shipped inside the
//! model artifact.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RockfallError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub std_dev: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(RockfallError::Model("cannot fit scaler on empty matrix".to_string()));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| RockfallError::Model("cannot compute column means".to_string()))?;
        let std_dev = x.std_axis(Axis(0), 0.0);

        Ok(Self {
            mean: mean.to_vec(),
            // Constant columns keep their offset and are left unscaled
            std_dev: std_dev.iter().map(|&s| if s > 1e-12 { s } else { 1.0 }).collect(),
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(RockfallError::Model(format!(
                "scaler expects {} features, got {}",
                self.n_features(),
                x.ncols()
            )));
        }

        let mut out = x.clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (m, s) = (self.mean[j], self.std_dev[j]);
            column.mapv_inplace(|v| (v - m) / s);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_transform_centers_columns() {
        let x = array![[1.0, 10.0], [3.0, 10.0], [5.0, 10.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        let z = scaler.transform(&x).unwrap();

        assert!((scaler.mean[0] - 3.0).abs() < 1e-12);
        assert!(z.column(0).sum().abs() < 1e-12);
        // constant column is only shifted
        assert!(z.column(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_width_mismatch_fails() {
        let scaler = StandardScaler::fit(&array![[1.0, 2.0], [2.0, 3.0]]).unwrap();
        assert!(scaler.transform(&array![[1.0, 2.0, 3.0]]).is_err());
    }
}
