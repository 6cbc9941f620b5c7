//! Numeric helpers over optional values.
//!
//! All functions skip `None` entries and answer `None` when nothing is left,
//! so callers can feed section and question statistics straight through.

use std::collections::BTreeMap;

use crate::model::Rating;

/// Arithmetic mean of the present values.
///
/// ```
/// # use evaluation_core::stats::average;
/// assert_eq!(average([Some(2.0), None, Some(4.0)]), Some(3.0));
/// assert_eq!(average(Vec::<Option<f64>>::new()), None);
/// ```
#[must_use]
pub fn average<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = sum / count as f64;
    Some(mean)
}

/// Median of the present values.
///
/// Even-length input returns the upper of the two middle elements (index
/// `n / 2` of the sorted values), not their mean: `[1, 2, 3, 4]` gives `3`.
/// Published results depend on this tie-break.
#[must_use]
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut items: Vec<f64> = values.into_iter().flatten().collect();
    if items.is_empty() {
        return None;
    }
    items.sort_by(f64::total_cmp);
    Some(items[items.len() / 2])
}

/// `alpha * a + (1 - alpha) * b`, falling back to whichever side is present.
#[must_use]
pub fn weighted_mix(a: Option<f64>, b: Option<f64>, alpha: f64) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => Some(alpha * a + (1.0 - alpha) * b),
    }
}

/// Population variance (mean squared deviation from `mean`).
#[must_use]
pub fn variance(values: &[f64], mean: f64) -> Option<f64> {
    average(values.iter().map(|v| Some((mean - v).powi(2))))
}

/// Share of ratings per value 1..=5, in percent.
///
/// Every bucket is present, including empty ones.
#[must_use]
pub fn distribution(ratings: &[Rating]) -> Option<BTreeMap<u8, f64>> {
    if ratings.is_empty() {
        return None;
    }
    let mut counts: BTreeMap<u8, usize> = Rating::VALUES.iter().map(|v| (*v, 0)).collect();
    for rating in ratings {
        *counts.entry(rating.value()).or_default() += 1;
    }
    #[allow(clippy::cast_precision_loss)]
    let total = ratings.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let percentages = counts
        .into_iter()
        .map(|(value, count)| (value, count as f64 / total * 100.0))
        .collect();
    Some(percentages)
}
