//! Descriptive statistics over price and volume series.
//!
//! Means, variances and covariances are population statistics (divisor `N`).

use crate::error::LookupError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub max: f64,
    pub min: f64,
    pub range: f64,
}

pub fn range(series: &[f64]) -> Result<Range, LookupError> {
    let (first, rest) = series
        .split_first()
        .ok_or_else(|| LookupError::insufficient_data("range of an empty series"))?;

    let (max, min) = rest
        .iter()
        .fold((*first, *first), |(max, min), v| (max.max(*v), min.min(*v)));

    Ok(Range {
        max,
        min,
        range: max - min,
    })
}

pub fn mean(series: &[f64]) -> Result<f64, LookupError> {
    if series.is_empty() {
        return Err(LookupError::insufficient_data("mean of an empty series"));
    }
    Ok(series.iter().sum::<f64>() / series.len() as f64)
}

/// Returns `(mean, variance)`.
pub fn mean_variance(series: &[f64]) -> Result<(f64, f64), LookupError> {
    let m = mean(series)?;
    let var = series.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / series.len() as f64;
    Ok((m, var))
}

/// First differences. The first element is always `0.0`.
pub fn deltas(series: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(series.len());
    if !series.is_empty() {
        out.push(0.0);
    }
    out.extend(series.windows(2).map(|w| w[1] - w[0]));
    out
}

pub fn covariance(a: &[f64], b: &[f64]) -> Result<f64, LookupError> {
    if a.len() != b.len() {
        return Err(LookupError::insufficient_data(format!(
            "covariance needs equal-length series (got {} and {})",
            a.len(),
            b.len()
        )));
    }
    let ma = mean(a)?;
    let mb = mean(b)?;
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    Ok(sum / a.len() as f64)
}

/// `Cov(subject, reference) / Var(reference)` over index-aligned price levels.
pub fn beta(subject: &[f64], reference: &[f64]) -> Result<f64, LookupError> {
    if subject.len() != reference.len() {
        return Err(LookupError::insufficient_data(format!(
            "beta needs index-aligned series: subject has {} points, reference has {}",
            subject.len(),
            reference.len()
        )));
    }
    if reference.len() < 2 {
        return Err(LookupError::insufficient_data(format!(
            "beta needs at least 2 points (got {})",
            reference.len()
        )));
    }

    // Variance within the rounding noise of the mean counts as flat.
    let (mean_ref, var_ref) = mean_variance(reference)?;
    let flat = reference.iter().all(|v| *v == reference[0]);
    if flat || !var_ref.is_finite() || var_ref <= f64::EPSILON * mean_ref * mean_ref {
        return Err(LookupError::insufficient_data(format!(
            "reference series is flat (variance {var_ref:e}); beta is undefined"
        )));
    }

    Ok(covariance(subject, reference)? / var_ref)
}
