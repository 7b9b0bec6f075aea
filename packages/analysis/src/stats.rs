//! Descriptive statistics and association measures.

use std::collections::BTreeMap;

use serde::Serialize;
use statrs::statistics::{Data, Median as _, Statistics};

/// Summary of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericSummary {
    /// Number of non-missing values.
    pub count: u64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (mean of the two middle values for even counts).
    pub median: f64,
    /// Sample standard deviation (`n - 1` denominator), 0 for one value.
    pub std_dev: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

/// Describes `values`. Returns `None` when empty.
#[must_use]
pub fn describe(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }

    let std_dev = Statistics::std_dev(values);

    Some(NumericSummary {
        count: values.len() as u64,
        mean: Statistics::mean(values),
        median: Data::new(values.to_vec()).median(),
        std_dev: if std_dev.is_nan() { 0.0 } else { std_dev },
        min: Statistics::min(values),
        max: Statistics::max(values),
    })
}

/// Cramér's V between two categorical variables, from the Pearson
/// chi-squared statistic of their contingency table.
///
/// A 2x2 table gets the Yates continuity correction: each cell contributes
/// `(max(|O - E| - 0.5, 0))^2 / E`.
///
/// Returns `None` when either variable has fewer than two distinct values.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cramers_v<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Option<f64> {
    let mut table: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    let mut rows: BTreeMap<&str, u64> = BTreeMap::new();
    let mut cols: BTreeMap<&str, u64> = BTreeMap::new();
    let mut n = 0_u64;

    for (x, y) in pairs {
        *table.entry((x, y)).or_default() += 1;
        *rows.entry(x).or_default() += 1;
        *cols.entry(y).or_default() += 1;
        n += 1;
    }

    let dof = rows.len().min(cols.len()).checked_sub(1)?;
    if dof == 0 {
        return None;
    }

    let yates = rows.len() == 2 && cols.len() == 2;
    let n = n as f64;
    let mut chi2 = 0.0;
    for (x, row_total) in &rows {
        for (y, col_total) in &cols {
            let expected = (*row_total as f64) * (*col_total as f64) / n;
            let observed = table.get(&(*x, *y)).copied().unwrap_or(0) as f64;
            let mut deviation = (observed - expected).abs();
            if yates {
                deviation = (deviation - 0.5).max(0.0);
            }
            chi2 += deviation.powi(2) / expected;
        }
    }

    Some((chi2 / n / dof as f64).sqrt())
}

/// Correlation ratio η² of a numeric variable grouped by a categorical one:
/// `SS_between / SS_total`.
///
/// Returns 0 when there are fewer than two groups or no variance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn correlation_ratio<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> f64 {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (group, value) in pairs {
        groups.entry(group).or_default().push(value);
    }
    if groups.len() < 2 {
        return 0.0;
    }

    let all: Vec<f64> = groups.values().flatten().copied().collect();
    let grand_mean = all.iter().sum::<f64>() / all.len() as f64;

    let ss_total: f64 = all.iter().map(|v| (v - grand_mean).powi(2)).sum();
    if ss_total <= 0.0 {
        return 0.0;
    }

    let ss_between: f64 = groups
        .values()
        .map(|g| {
            let mean = g.iter().sum::<f64>() / g.len() as f64;
            g.len() as f64 * (mean - grand_mean).powi(2)
        })
        .sum();

    ss_between / ss_total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn describe_matches_hand_computation() {
        let summary = describe(&[30.0, 10.0, 20.0, 40.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert!(close(summary.mean, 25.0));
        assert!(close(summary.median, 25.0));
        // Sample variance: (225 + 25 + 25 + 225) / 3
        assert!(close(summary.std_dev, (500.0_f64 / 3.0).sqrt()));
        assert!(close(summary.min, 10.0));
        assert!(close(summary.max, 40.0));

        let single = describe(&[7.0]).unwrap();
        assert!(close(single.median, 7.0));
        assert!(close(single.std_dev, 0.0));

        assert_eq!(describe(&[]), None);
    }

    #[test]
    fn cramers_v_is_one_for_perfect_association() {
        let pairs = [("a", "x"), ("a", "x"), ("b", "y"), ("b", "y"), ("c", "z")];
        assert!(close(cramers_v(pairs).unwrap(), 1.0));
    }

    #[test]
    fn cramers_v_is_zero_for_independence() {
        let pairs = [("a", "x"), ("a", "y"), ("b", "x"), ("b", "y")];
        assert!(close(cramers_v(pairs).unwrap(), 0.0));
    }

    #[test]
    fn cramers_v_two_by_two_uses_continuity_correction() {
        // Table [[3, 1], [1, 3]]: E = 2 per cell, corrected chi2 = 4 * 0.25 / 2,
        // V = sqrt(0.5 / 8).
        let mut pairs = vec![("a", "x"); 3];
        pairs.push(("a", "y"));
        pairs.push(("b", "x"));
        pairs.extend(vec![("b", "y"); 3]);
        assert!(close(cramers_v(pairs).unwrap(), 0.25));
    }

    #[test]
    fn cramers_v_larger_tables_are_uncorrected() {
        // Table [[2, 0, 0], [0, 2, 0], [0, 0, 2]] is a perfect association only
        // without the correction.
        let pairs = [
            ("a", "x"),
            ("a", "x"),
            ("b", "y"),
            ("b", "y"),
            ("c", "z"),
            ("c", "z"),
        ];
        assert!(close(cramers_v(pairs).unwrap(), 1.0));
    }

    #[test]
    fn cramers_v_needs_two_levels() {
        assert_eq!(cramers_v([("a", "x"), ("a", "y")]), None);
        assert_eq!(cramers_v(std::iter::empty()), None);
    }

    #[test]
    fn correlation_ratio_bounds() {
        let separated = [("a", 1.0), ("a", 1.0), ("b", 9.0), ("b", 9.0)];
        assert!(close(correlation_ratio(separated), 1.0));

        let mixed = [("a", 1.0), ("a", 9.0), ("b", 1.0), ("b", 9.0)];
        assert!(close(correlation_ratio(mixed), 0.0));

        // Group means 2 and 6, grand mean 4: SS_between = 16, SS_total = 20.
        let partial = [("a", 1.0), ("a", 3.0), ("b", 5.0), ("b", 7.0)];
        assert!(close(correlation_ratio(partial), 0.8));
    }

    #[test]
    fn correlation_ratio_single_group_is_zero() {
        assert!(close(correlation_ratio([("a", 1.0), ("a", 5.0)]), 0.0));
    }
}
