//! CART classification tree with Gini impurity.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Smallest impurity decrease accepted as a real split.
const MIN_DECREASE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features sampled as split candidates at each node.
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        class: u8,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    root: Node,
    importances: Vec<f64>,
}

struct Split {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

struct Builder<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [u8],
    params: &'a TreeParams,
    importances: Vec<f64>,
    rng: ChaCha8Rng,
}

impl DecisionTree {
    /// Grow a tree over the rows listed in `sample` (duplicates allowed, as
    /// produced by bootstrap sampling).
    pub fn fit(
        features: &[Vec<f64>],
        labels: &[u8],
        sample: &[usize],
        params: &TreeParams,
        rng: ChaCha8Rng,
    ) -> Self {
        let n_features = features.first().map_or(0, Vec::len);
        let mut builder = Builder {
            features,
            labels,
            params,
            importances: vec![0.0; n_features],
            rng,
        };

        let mut indices = sample.to_vec();
        let root = builder.build(&mut indices, 0);

        let mut importances = builder.importances;
        normalize(&mut importances);

        Self { root, importances }
    }

    pub fn predict_one(&self, row: &[f64]) -> u8 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { class } => return *class,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(f64::NAN);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Impurity-decrease importances, summing to 1 unless the tree is a
    /// single leaf.
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

impl Builder<'_> {
    fn build(&mut self, indices: &mut [usize], depth: usize) -> Node {
        let (zeros, ones) = class_counts(self.labels, indices);
        let leaf = Node::Leaf {
            class: u8::from(ones > zeros),
        };

        if depth >= self.params.max_depth
            || indices.len() < self.params.min_samples_split
            || zeros == 0
            || ones == 0
        {
            return leaf;
        }

        let Some(split) = self.best_split(indices, zeros, ones) else {
            return leaf;
        };
        self.importances[split.feature] += split.decrease;

        let features = self.features;
        let mid = partition_in_place(indices, |i| features[i][split.feature] <= split.threshold);
        let (left, right) = indices.split_at_mut(mid);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(left, depth + 1)),
            right: Box::new(self.build(right, depth + 1)),
        }
    }

    /// Best threshold over a random subset of features, scanning each
    /// feature once in sorted order. Features constant within the node do
    /// not count towards `max_features`.
    fn best_split(&mut self, indices: &[usize], zeros: usize, ones: usize) -> Option<Split> {
        let n_features = self.importances.len();
        if n_features == 0 {
            return None;
        }

        let mut candidates: Vec<usize> = (0..n_features).collect();
        candidates.shuffle(&mut self.rng);
        let max_features = self.params.max_features.clamp(1, n_features);

        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let parent = n as f64 * gini(zeros, ones);

        let mut best: Option<Split> = None;
        let mut order = indices.to_vec();
        let mut visited = 0;

        for feature in candidates {
            if visited == max_features {
                break;
            }
            let value = |i: usize| self.features[i][feature];
            order.sort_by(|&a, &b| value(a).total_cmp(&value(b)));
            if value(order[0]) == value(order[n - 1]) {
                continue;
            }
            visited += 1;

            let (mut left_zeros, mut left_ones) = (0usize, 0usize);
            for k in 0..n - 1 {
                if self.labels[order[k]] == 1 {
                    left_ones += 1;
                } else {
                    left_zeros += 1;
                }

                let left_n = k + 1;
                let right_n = n - left_n;
                let (here, next) = (value(order[k]), value(order[k + 1]));
                if here == next || left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let decrease = parent
                    - left_n as f64 * gini(left_zeros, left_ones)
                    - right_n as f64 * gini(zeros - left_zeros, ones - left_ones);
                if decrease > best.as_ref().map_or(MIN_DECREASE, |b| b.decrease) {
                    let mid = here + (next - here) / 2.0;
                    // rounding can push the midpoint onto `next`
                    let threshold = if mid < next { mid } else { here };
                    best = Some(Split {
                        feature,
                        threshold,
                        decrease,
                    });
                }
            }
        }

        best
    }
}

fn class_counts(labels: &[u8], indices: &[usize]) -> (usize, usize) {
    let ones = indices.iter().filter(|&&i| labels[i] == 1).count();
    (indices.len() - ones, ones)
}

fn gini(zeros: usize, ones: usize) -> f64 {
    let n = (zeros + ones) as f64;
    if n == 0.0 {
        return 0.0;
    }
    let p0 = zeros as f64 / n;
    let p1 = ones as f64 / n;
    1.0 - p0 * p0 - p1 * p1
}

/// Moves rows satisfying `goes_left` to the front; returns how many did.
fn partition_in_place(indices: &mut [usize], goes_left: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for j in 0..indices.len() {
        if goes_left(indices[j]) {
            indices.swap(mid, j);
            mid += 1;
        }
    }
    mid
}

pub(super) fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
}
