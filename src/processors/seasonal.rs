use crate::error::{AqError, Result};
use serde::{Deserialize, Serialize};

/// Additive decomposition `observed = trend + seasonal + residual`.
///
/// `trend` and `residual` are absent over the half-window at both ends where
/// the centred moving average is undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub period: usize,
    pub observed: Vec<f64>,
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<Option<f64>>,
}

impl Decomposition {
    /// One seasonal cycle, indexed by phase
    pub fn seasonal_pattern(&self) -> &[f64] {
        &self.seasonal[..self.period.min(self.seasonal.len())]
    }
}

/// Decompose a gap-free series with the given seasonal period.
///
/// Needs at least two full periods of observations.
pub fn seasonal_decompose(values: &[f64], period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(AqError::InvalidParameter(format!(
            "seasonal period must be at least 2, got {}",
            period
        )));
    }

    let required = period.checked_mul(2).ok_or_else(|| {
        AqError::InvalidParameter(format!("seasonal period {} is too large", period))
    })?;
    if values.len() < required {
        return Err(AqError::insufficient(
            "seasonal decomposition",
            required,
            values.len(),
        ));
    }

    let trend = centred_moving_average(values, period);

    let mut phase_sums = vec![0.0; period];
    let mut phase_counts = vec![0usize; period];
    for (i, (value, t)) in values.iter().zip(&trend).enumerate() {
        if let Some(t) = t {
            phase_sums[i % period] += value - t;
            phase_counts[i % period] += 1;
        }
    }

    let mut pattern: Vec<f64> = phase_sums
        .iter()
        .zip(&phase_counts)
        .map(|(sum, count)| if *count > 0 { sum / *count as f64 } else { 0.0 })
        .collect();

    let pattern_mean = pattern.iter().sum::<f64>() / period as f64;
    for p in pattern.iter_mut() {
        *p -= pattern_mean;
    }

    let seasonal: Vec<f64> = (0..values.len()).map(|i| pattern[i % period]).collect();
    let residual = values
        .iter()
        .zip(&trend)
        .zip(&seasonal)
        .map(|((v, t), s)| t.map(|t| v - t - s))
        .collect();

    Ok(Decomposition {
        period,
        observed: values.to_vec(),
        trend,
        seasonal,
        residual,
    })
}

/// Centred moving average of length `period`; even periods use a 2×period
/// average with half weights at both ends so the window stays centred.
fn centred_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let half = period / 2;
    let n = values.len();

    (0..n)
        .map(|i| {
            if i < half || i + half >= n {
                return None;
            }

            let window = &values[i - half..=i + half];
            let mean = if period % 2 == 1 {
                window.iter().sum::<f64>() / period as f64
            } else {
                let inner: f64 = window[1..window.len() - 1].iter().sum();
                (inner + 0.5 * (window[0] + window[window.len() - 1])) / period as f64
            };
            Some(mean)
        })
        .collect()
}
