// src/tuning/grid.rs

use anyhow::Result;

use crate::error::BlockingError;

/// Deterministic enumeration of an integer range `min..=max` by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntGridSearch {
    max: i64,
    min: i64,
    step: i64,
}

impl IntGridSearch {
    pub fn new(max: i64, min: i64, step: i64) -> Self {
        Self {
            max,
            min,
            step: step.max(1),
        }
    }

    pub fn number_of_configurations(&self) -> usize {
        if self.max < self.min {
            return 0;
        }
        ((self.max - self.min) / self.step) as usize + 1
    }

    /// Value of the `iteration`-th configuration.
    pub fn numbered_value(&self, method: &'static str, iteration: usize) -> Result<i64> {
        let total = self.number_of_configurations();
        if iteration >= total {
            return Err(BlockingError::InvalidConfiguration {
                method,
                index: iteration,
                total,
            }
            .into());
        }
        Ok(self.min + iteration as i64 * self.step)
    }
}

/// Deterministic enumeration of a real range `min..=max` by `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleGridSearch {
    max: f64,
    min: f64,
    step: f64,
}

impl DoubleGridSearch {
    pub fn new(max: f64, min: f64, step: f64) -> Self {
        Self { max, min, step }
    }

    pub fn number_of_configurations(&self) -> usize {
        if self.max < self.min || self.step <= 0.0 {
            return 0;
        }
        // tolerate rounding in (max - min) / step, e.g. 0.9 / 0.05
        ((self.max - self.min) / self.step + 1e-9).floor() as usize + 1
    }

    pub fn numbered_value(&self, method: &'static str, iteration: usize) -> Result<f64> {
        let total = self.number_of_configurations();
        if iteration >= total {
            return Err(BlockingError::InvalidConfiguration {
                method,
                index: iteration,
                total,
            }
            .into());
        }
        Ok(self.min + iteration as f64 * self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_grid() {
        let grid = IntGridSearch::new(3, 0, 1);
        assert_eq!(grid.number_of_configurations(), 4);
        assert_eq!(grid.numbered_value("test", 0).unwrap(), 0);
        assert_eq!(grid.numbered_value("test", 3).unwrap(), 3);

        let err = grid.numbered_value("test", 4).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BlockingError>(),
            Some(&BlockingError::InvalidConfiguration {
                method: "test",
                index: 4,
                total: 4
            })
        );
    }

    #[test]
    fn test_int_grid_with_step() {
        let grid = IntGridSearch::new(10, 2, 4);
        assert_eq!(grid.number_of_configurations(), 3);
        assert_eq!(grid.numbered_value("test", 2).unwrap(), 10);
    }

    #[test]
    fn test_double_grid() {
        let grid = DoubleGridSearch::new(0.95, 0.05, 0.05);
        assert_eq!(grid.number_of_configurations(), 19);
        assert!((grid.numbered_value("test", 0).unwrap() - 0.05).abs() < 1e-9);
        assert!((grid.numbered_value("test", 18).unwrap() - 0.95).abs() < 1e-9);
        assert!(grid.numbered_value("test", 19).is_err());
    }
}
