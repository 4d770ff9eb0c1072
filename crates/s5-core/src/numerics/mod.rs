//! Small numeric kernels shared by the profile shaper and the document helpers.
//!
//! Means over route data are distance-weighted: the trapezoidal integral over
//! the (possibly non-uniform) independent variable divided by its span.

/// Running Kahan-compensated total.
#[derive(Debug, Default, Clone, Copy)]
struct CompensatedSum {
    total: f64,
    lost: f64,
}

impl CompensatedSum {
    fn push(&mut self, value: f64) {
        let adjusted = value - self.lost;
        let total = self.total + adjusted;
        self.lost = (total - self.total) - adjusted;
        self.total = total;
    }
}

pub fn stable_sum(values: &[f64]) -> f64 {
    values
        .iter()
        .fold(CompensatedSum::default(), |mut acc, &value| {
            acc.push(value);
            acc
        })
        .total
}

/// Trapezoidal integral of `y` over `x`. Returns `None` on a length mismatch.
pub fn trapezoid(y: &[f64], x: &[f64]) -> Option<f64> {
    if y.len() != x.len() {
        return None;
    }

    let mut area = CompensatedSum::default();
    for (ys, xs) in y.windows(2).zip(x.windows(2)) {
        area.push(0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]));
    }

    Some(area.total)
}

/// `max(x) - min(x)`, or `None` for an empty grid.
pub fn span(x: &[f64]) -> Option<f64> {
    let (min, max) = x.iter().copied().fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((f64::min(min, value), f64::max(max, value))),
    })?;
    Some(max - min)
}

/// Trapezoidal average of `y` over `x`; `None` when the shapes differ or the span is zero.
pub fn distance_weighted_mean(y: &[f64], x: &[f64]) -> Option<f64> {
    let span = span(x)?;
    if span == 0.0 {
        return None;
    }
    Some(trapezoid(y, x)? / span)
}

pub fn arithmetic_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(stable_sum(values) / values.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let mean = arithmetic_mean(values)?;
    let squares: Vec<f64> = values.iter().map(|value| (value - mean).powi(2)).collect();
    Some((stable_sum(&squares) / values.len() as f64).sqrt())
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is in percent (`0..=100`). NaN inputs sort last.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&q) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// `count` evenly spaced points from `start` to `end`, both included.
pub fn linear_grid(start: f64, end: f64, count: usize) -> Option<Vec<f64>> {
    let intervals = count.checked_sub(1).filter(|&n| n > 0)? as f64;
    let step = (end - start) / intervals;
    Some(
        (0..count)
            .map(|index| if index + 1 == count { end } else { start + step * index as f64 })
            .collect(),
    )
}

pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
