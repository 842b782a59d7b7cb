//! Maps a set of values onto a two-segment color gradient that pivots at the median.
//!
//! Budget categories are usually long-tailed: one dominant expense and many small ones. Pivoting
//! at the median rather than at the midpoint between min and max keeps one outlier from pushing
//! every other slice to the same end of the gradient.

use crate::model::{ColorScheme, ColorStop};
use serde::{Deserialize, Serialize};

/// Returned when no sample survives filtering.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum ColorError {
    #[error("No valid samples to color: every sample needs a label and a positive value")]
    EmptyInput,
}

/// One labeled data point, e.g. one pie slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSample {
    pub label: String,
    pub value: f64,
}

impl ValueSample {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    /// A sample takes part in coloring only with a non-empty label and a finite positive value.
    pub fn is_valid(&self) -> bool {
        !self.label.is_empty() && self.value.is_finite() && self.value > 0.0
    }
}

/// Computes one `#rrggbb` color per valid sample, in input order.
///
/// Values at or below the median are interpolated from `scheme.low` (at the minimum) to
/// `scheme.mid` (at the median). Values above the median go from `scheme.mid` to `scheme.high`
/// (at the maximum). Invalid samples are dropped from both the statistics and the output.
///
/// # Errors
/// `ColorError::EmptyInput` when there are no valid samples.
pub fn compute_colors(
    samples: &[ValueSample],
    scheme: &ColorScheme,
) -> Result<Vec<String>, ColorError> {
    Ok(compute_stops(samples, scheme)?
        .iter()
        .map(ColorStop::to_hex)
        .collect())
}

/// Same as [`compute_colors`] but returns the colors unformatted.
pub fn compute_stops(
    samples: &[ValueSample],
    scheme: &ColorScheme,
) -> Result<Vec<ColorStop>, ColorError> {
    let values: Vec<f64> = samples
        .iter()
        .filter(|s| s.is_valid())
        .map(|s| s.value)
        .collect();
    let stats = Stats::new(&values).ok_or(ColorError::EmptyInput)?;
    Ok(values.iter().map(|&v| stats.color(v, scheme)).collect())
}

/// The median of `values`, or `None` when empty. NaN values must be filtered out beforehand.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Stats {
    min: f64,
    max: f64,
    median: f64,
}

impl Stats {
    fn new(values: &[f64]) -> Option<Self> {
        let median = median(values)?;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self { min, max, median })
    }

    fn color(&self, v: f64, scheme: &ColorScheme) -> ColorStop {
        if v <= self.median {
            let t = fraction(v - self.min, self.median - self.min);
            scheme.low.lerp(&scheme.mid, t)
        } else {
            let t = fraction(v - self.median, self.max - self.median);
            scheme.mid.lerp(&scheme.high, t)
        }
    }
}

/// `num / den`, or zero when the segment is degenerate.
fn fraction(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::color::RED_TO_YELLOW;

    fn white_black_blue() -> ColorScheme {
        ColorScheme::new(
            ColorStop::new(255, 255, 255),
            ColorStop::new(0, 0, 0),
            ColorStop::new(0, 0, 255),
        )
    }

    fn samples(items: &[(&str, f64)]) -> Vec<ValueSample> {
        items
            .iter()
            .map(|(label, value)| ValueSample::new(*label, *value))
            .collect()
    }

    #[test]
    fn test_all_equal_values_use_low_color() {
        let input = samples(&[("A", 10.0), ("B", 10.0), ("C", 10.0)]);
        let colors = compute_colors(&input, &RED_TO_YELLOW).unwrap();
        assert_eq!(colors, vec!["#ffffcc"; 3]);
    }

    #[test]
    fn test_three_point_split() {
        let input = samples(&[("A", 10.0), ("B", 50.0), ("C", 100.0)]);
        let colors = compute_colors(&input, &white_black_blue()).unwrap();
        assert_eq!(colors, vec!["#ffffff", "#000000", "#0000ff"]);
    }

    #[test]
    fn test_invalid_samples_are_dropped_and_order_kept() {
        let input = samples(&[("A", -5.0), ("B", 20.0), ("", 30.0), ("C", 40.0)]);
        let colors = compute_colors(&input, &white_black_blue()).unwrap();
        // B and C remain; median 30, so B is low and C is high.
        assert_eq!(colors, vec!["#ffffff", "#0000ff"]);
    }

    #[test]
    fn test_output_follows_input_order_not_value_order() {
        let input = samples(&[("C", 100.0), ("A", 10.0), ("B", 50.0)]);
        let colors = compute_colors(&input, &white_black_blue()).unwrap();
        assert_eq!(colors, vec!["#0000ff", "#ffffff", "#000000"]);
    }

    #[test]
    fn test_even_count_median_is_mean_of_middle_values() {
        assert_eq!(median(&[40.0, 10.0, 30.0, 20.0]), Some(25.0));
        let input = samples(&[("A", 10.0), ("B", 20.0), ("C", 30.0), ("D", 40.0)]);
        let colors = compute_colors(&input, &white_black_blue()).unwrap();
        // 20 sits 2/3 of the way from 10 to 25; 30 sits 1/3 of the way from 25 to 40.
        assert_eq!(colors, vec!["#ffffff", "#555555", "#000055", "#0000ff"]);
    }

    #[test]
    fn test_median_odd_count() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[7.0]), Some(7.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            compute_colors(&[], &RED_TO_YELLOW),
            Err(ColorError::EmptyInput)
        );
    }

    #[test]
    fn test_all_invalid_input() {
        let input = samples(&[("A", 0.0), ("", 5.0), ("B", f64::NAN), ("C", f64::INFINITY)]);
        assert_eq!(
            compute_colors(&input, &RED_TO_YELLOW),
            Err(ColorError::EmptyInput)
        );
    }

    #[test]
    fn test_single_sample_is_low() {
        let input = samples(&[("Rent", 1500.0)]);
        let colors = compute_colors(&input, &white_black_blue()).unwrap();
        assert_eq!(colors, vec!["#ffffff"]);
    }

    #[test]
    fn test_outlier_does_not_flatten_the_low_segment() {
        let input = samples(&[("A", 10.0), ("B", 15.0), ("C", 20.0), ("D", 10_000.0)]);
        let stops = compute_stops(&input, &white_black_blue()).unwrap();
        // median 17.5: 15 is two thirds of the way to black, far from white.
        assert_eq!(stops[1], ColorStop::new(85, 85, 85));
        assert_eq!(stops[3], ColorStop::new(0, 0, 255));
    }
}
