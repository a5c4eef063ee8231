//! Provides some helper functions.

/// Returns the smoothing constant `1 / (C * D)` used
/// when fitting the scores of a weak hypothesis.
#[inline(always)]
pub(crate) fn smoothing_epsilon(n_categories: usize, n_documents: usize)
    -> f64
{
    1f64 / (n_categories as f64 * n_documents as f64)
}

/// Returns `max(0, a - b)`.
/// Weight masses obtained by subtraction may become slightly negative
/// by round-off; they are clamped to zero.
#[inline(always)]
pub(crate) fn clamped_difference(a: f64, b: f64) -> f64 {
    (a - b).max(0f64)
}

/// Normalizes the given slice so that its entries sum to `1`.
/// Returns `false` (and leaves `items` untouched)
/// if the total mass is zero or not finite.
#[inline(always)]
pub(crate) fn normalize(items: &mut [f64]) -> bool {
    let z = items.iter()
        .map(|it| it.abs())
        .sum::<f64>();

    if z == 0f64 || !z.is_finite() {
        return false;
    }

    items.iter_mut()
        .for_each(|item| { *item /= z; });
    true
}

/// Mean of the finite values in `values`, `None` if there is none.
pub(crate) fn finite_mean(values: &[f64]) -> Option<f64> {
    let (sum, n) = values.iter()
        .filter(|v| v.is_finite())
        .fold((0f64, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}
