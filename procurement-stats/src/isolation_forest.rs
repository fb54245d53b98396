//! Isolation forest over one-dimensional samples.
//!
//! Each tree is grown on a random sub-sample by picking a split uniformly
//! between the node's min and max until the point is alone or the height
//! limit is reached. Outliers are isolated in short paths. Scores follow the
//! usual convention: `score = -2^(-E[h(x)] / c(psi))`, lower is more
//! anomalous, and the decision offset is the `contamination` quantile of the
//! training scores.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

use crate::descriptive::{check_finite, percentile};
use crate::error::{StatsError, StatsResult};
use crate::thresholds::{FOREST_CONTAMINATION, FOREST_MAX_SAMPLES, FOREST_SEED, FOREST_TREES};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Clone, Debug, PartialEq)]
pub struct IsolationForestConfig {
    pub n_trees: usize,
    pub max_samples: usize,
    /// Expected outlier share in the training data, in `(0, 0.5]`.
    pub contamination: f64,
    pub seed: u64,
}

impl Default for IsolationForestConfig {
    fn default() -> Self {
        Self {
            n_trees: FOREST_TREES,
            max_samples: FOREST_MAX_SAMPLES,
            contamination: FOREST_CONTAMINATION,
            seed: FOREST_SEED,
        }
    }
}

impl IsolationForestConfig {
    pub fn validate(&self) -> StatsResult<()> {
        if self.n_trees == 0 {
            return Err(StatsError::InvalidParameter("n_trees must be > 0".into()));
        }
        if self.max_samples < 2 {
            return Err(StatsError::InvalidParameter(format!(
                "max_samples={} must be >= 2",
                self.max_samples
            )));
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(StatsError::InvalidParameter(format!(
                "contamination={} out of range (0, 0.5]",
                self.contamination
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted isolation forest.
#[derive(Clone, Debug)]
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
    offset: f64,
}

impl IsolationForest {
    /// Fit a forest on `data`. Requires at least two finite samples.
    pub fn fit(data: &[f64], config: &IsolationForestConfig) -> StatsResult<Self> {
        config.validate()?;
        check_finite(data)?;
        if data.len() < 2 {
            return Err(StatsError::InsufficientSamples {
                needed: 2,
                got: data.len(),
            });
        }

        let sample_size = config.max_samples.min(data.len());
        let height_limit = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let trees = (0..config.n_trees)
            .map(|_| {
                let mut sample: Vec<f64> = index::sample(&mut rng, data.len(), sample_size)
                    .into_iter()
                    .map(|i| data[i])
                    .collect();
                grow(&mut sample, 0, height_limit, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            offset: 0.0,
        };

        let training_scores: Vec<f64> = data.iter().map(|&x| forest.score(x)).collect();
        forest.offset = percentile(&training_scores, config.contamination * 100.0)?;
        Ok(forest)
    }

    /// Negated anomaly score; lower means more anomalous.
    pub fn score(&self, x: f64) -> f64 {
        let total: f64 = self.trees.iter().map(|t| path_length(t, x, 0)).sum();
        let mean_path = total / self.trees.len() as f64;
        let norm = average_path_length(self.sample_size);
        if norm <= 0.0 {
            return -0.5;
        }
        -(2f64.powf(-mean_path / norm))
    }

    /// Decision threshold derived from the training scores.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_outlier(&self, x: f64) -> bool {
        self.score(x) < self.offset
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn grow(values: &mut [f64], depth: usize, height_limit: usize, rng: &mut StdRng) -> Node {
    if depth >= height_limit || values.len() <= 1 {
        return Node::Leaf { size: values.len() };
    }

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = max - min;
    if !(span.is_finite() && span > 0.0) {
        return Node::Leaf { size: values.len() };
    }

    let threshold = min + rng.gen::<f64>() * span;
    let mut left: Vec<f64> = Vec::with_capacity(values.len());
    let mut right: Vec<f64> = Vec::with_capacity(values.len());
    for &v in values.iter() {
        if v < threshold {
            left.push(v);
        } else {
            right.push(v);
        }
    }

    Node::Split {
        threshold,
        left: Box::new(grow(&mut left, depth + 1, height_limit, rng)),
        right: Box::new(grow(&mut right, depth + 1, height_limit, rng)),
    }
}

fn path_length(node: &Node, x: f64, depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            threshold,
            left,
            right,
        } => {
            if x < *threshold {
                path_length(left, x, depth + 1)
            } else {
                path_length(right, x, depth + 1)
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}
