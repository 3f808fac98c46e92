use crate::models::{AirQualityRecord, Measure};
use crate::utils::constants::VARIANCE_EPSILON;
use serde::{Deserialize, Serialize};

/// Pearson coefficient over `(x, y)` pairs.
///
/// `None` when there are fewer than two pairs or either side is constant.
pub fn pearson<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let pairs: Vec<(f64, f64)> = pairs.into_iter().collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x < VARIANCE_EPSILON || var_y < VARIANCE_EPSILON {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Correlation of two columns over records where both are present
pub fn correlate<'a, I>(records: I, a: Measure, b: Measure) -> Option<f64>
where
    I: IntoIterator<Item = &'a AirQualityRecord>,
{
    pearson(
        records
            .into_iter()
            .filter_map(|r| Some((r.get(a)?, r.get(b)?))),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<Measure>,
    /// Row-major, `values[i][j]` is the coefficient of `columns[i]` against `columns[j]`
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Measure, b: Measure) -> Option<f64> {
        let i = self.columns.iter().position(|m| *m == a)?;
        let j = self.columns.iter().position(|m| *m == b)?;
        self.values[i][j]
    }
}

/// Pairwise coefficients of every column against every other
pub fn correlation_matrix<'a, I>(records: I, columns: &[Measure]) -> CorrelationMatrix
where
    I: IntoIterator<Item = &'a AirQualityRecord> + Clone,
{
    let n = columns.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        for j in i..n {
            let r = correlate(records.clone(), columns[i], columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    }
}
