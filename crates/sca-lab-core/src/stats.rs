use serde::Serialize;
use std::cmp::Ordering;

/// Descriptive statistics of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// Sample standard deviation (N - 1 denominator); zero for fewer than two values.
    pub stddev: f64,
}

impl Summary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let max = values
            .iter()
            .copied()
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))?;
        let min = values
            .iter()
            .copied()
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))?;

        let stddev = if count > 1 {
            let variance = values
                .iter()
                .map(|&v| {
                    let diff = mean - v;
                    diff * diff
                })
                .sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Some(Self {
            count,
            mean,
            max,
            min,
            stddev,
        })
    }
}
