use std::fmt;

use crate::error::DataError;
use crate::models::{CustomerMetrics, CustomerScore};

pub const QUINTILES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Recency,
    Frequency,
    Monetary,
}

impl Metric {
    /// Recency scores in reverse: the most recent buyers land in bin 5.
    pub fn higher_is_better(self) -> bool {
        !matches!(self, Metric::Recency)
    }

    /// Frequency is heavily tied in practice, so it is binned on rank.
    fn binned_on_rank(self) -> bool {
        matches!(self, Metric::Frequency)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Recency => "Recency",
            Metric::Frequency => "Frequency",
            Metric::Monetary => "Monetary",
        };
        f.write_str(name)
    }
}

/// Score every customer against the population passed in.
///
/// Scores are relative: the same customer can move bins when the population
/// changes. Output order matches `metrics`.
pub fn score_customers(metrics: &[CustomerMetrics]) -> Result<Vec<CustomerScore>, DataError> {
    if metrics.is_empty() {
        return Ok(Vec::new());
    }

    let recency: Vec<f64> = metrics.iter().map(|c| c.recency as f64).collect();
    let frequency: Vec<f64> = metrics.iter().map(|c| c.frequency as f64).collect();
    let monetary: Vec<f64> = metrics.iter().map(|c| c.monetary).collect();

    let r = score_metric(Metric::Recency, &recency)?;
    let f = score_metric(Metric::Frequency, &frequency)?;
    let m = score_metric(Metric::Monetary, &monetary)?;

    Ok(metrics
        .iter()
        .enumerate()
        .map(|(i, customer)| CustomerScore::new(customer.customer_id.clone(), r[i], f[i], m[i]))
        .collect())
}

/// Assign a 1..=5 score to each value by quintile.
pub fn score_metric(metric: Metric, values: &[f64]) -> Result<Vec<u8>, DataError> {
    if let Some(&value) = values.iter().find(|value| !value.is_finite()) {
        return Err(DataError::NonFiniteValue { metric, value });
    }

    let binned = if metric.binned_on_rank() {
        first_appearance_ranks(values)
    } else {
        let distinct = distinct_count(values);
        if distinct < QUINTILES {
            return Err(DataError::InsufficientDistinctValues {
                metric,
                distinct,
                required: QUINTILES,
            });
        }
        values.to_vec()
    };

    let edges = quintile_edges(metric, &binned)?;

    Ok(binned
        .iter()
        .map(|&value| {
            let bin = bin_index(&edges, value);
            if metric.higher_is_better() {
                (bin + 1) as u8
            } else {
                (QUINTILES - bin) as u8
            }
        })
        .collect())
}

/// Ranks 1..=N by value; equal values keep their input order.
pub fn first_appearance_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    for (rank, index) in order.into_iter().enumerate() {
        ranks[index] = (rank + 1) as f64;
    }
    ranks
}

/// The 0, 0.2, .. 1.0 quantiles, linearly interpolated between order statistics.
///
/// Cut points must be strictly increasing; a repeated cut point would leave a
/// bin empty.
pub fn quintile_edges(metric: Metric, values: &[f64]) -> Result<[f64; QUINTILES + 1], DataError> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    if sorted.is_empty() {
        return Err(DataError::InsufficientDistinctValues {
            metric,
            distinct: 0,
            required: QUINTILES,
        });
    }

    let mut edges = [0.0; QUINTILES + 1];
    for (i, edge) in edges.iter_mut().enumerate() {
        *edge = interpolate(&sorted, i);
    }

    if let Some(pair) = edges.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(DataError::DuplicateQuantileEdge {
            metric,
            edge: pair[1],
        });
    }

    Ok(edges)
}

// position = i/5 * (n - 1), kept in integer arithmetic so cut points that land on
// an order statistic are exact
fn interpolate(sorted: &[f64], i: usize) -> f64 {
    let scaled = i * (sorted.len() - 1);
    let lower = scaled / QUINTILES;
    let remainder = scaled % QUINTILES;
    if remainder == 0 {
        return sorted[lower];
    }
    let fraction = remainder as f64 / QUINTILES as f64;
    sorted[lower] + (sorted[lower + 1] - sorted[lower]) * fraction
}

/// Zero-based bin; bins are right-closed so a value on a cut point goes low.
pub fn bin_index(edges: &[f64; QUINTILES + 1], value: f64) -> usize {
    edges[1..QUINTILES].iter().filter(|&&edge| value > edge).count()
}

fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}
