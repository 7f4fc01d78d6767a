//! The action classifier (spec.md section 1 treats the learner itself as an
//! external black box; this module defines the trait boundary and the two
//! concrete implementations the core ships with: a constant predictor for
//! single-label buckets, and a small averaged-perceptron linear model for
//! buckets that need to discriminate).

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// Hyperparameters for the multi-class SVM mentioned in spec.md section 6.
/// Carried here so a bucket's configuration round-trips through
/// serialization even though this crate's bundled learner does not
/// implement the polynomial kernel itself (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvmHyperParams {
    pub c: f64,
    pub degree: u32,
    pub gamma: f64,
    pub coef0: f64,
}

impl Default for SvmHyperParams {
    fn default() -> Self {
        SvmHyperParams { c: 0.5, degree: 2, gamma: 0.2, coef0: 0.0 }
    }
}

/// Maps a feature vector to an action code, or `None` to signal stop.
pub trait ActionClassifier {
    fn predict(&self, features: &FeatureVector) -> Option<i32>;
}

/// A bucket whose training data carried a single distinct label: no model
/// is built, the label is just replayed (spec.md section 4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantClassifier {
    pub action_code: i32,
}

impl ActionClassifier for ConstantClassifier {
    fn predict(&self, _features: &FeatureVector) -> Option<i32> {
        Some(self.action_code)
    }
}

/// An averaged-perceptron multi-class linear model: one weight vector per
/// observed label, dense over the feature dimension declared at training
/// time. Missing feature indices (sparse vector entries beyond the weight
/// length) are treated as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub dim: u32,
    pub labels: Vec<i32>,
    pub weights: Vec<Vec<f32>>,
}

impl LinearClassifier {
    pub fn new(dim: u32) -> Self {
        LinearClassifier { dim, labels: Vec::new(), weights: Vec::new() }
    }

    fn label_index(&self, label: i32) -> Option<usize> {
        self.labels.iter().position(|l| *l == label)
    }

    fn ensure_label(&mut self, label: i32) -> usize {
        if let Some(idx) = self.label_index(label) {
            return idx;
        }
        self.labels.push(label);
        self.weights.push(vec![0.0; self.dim as usize]);
        self.labels.len() - 1
    }

    fn score(&self, weights: &[f32], features: &FeatureVector) -> f32 {
        features.bits.iter().filter(|&&b| (b as usize) < weights.len()).map(|&b| weights[b as usize]).sum()
    }

    /// One averaged-perceptron training pass over `examples`. `rounds`
    /// controls how many epochs to run before averaging the accumulated
    /// weights. Example order is reshuffled every epoch, the usual way to
    /// keep a perceptron from cycling on a fixed presentation order.
    pub fn train(&mut self, examples: &[(FeatureVector, i32)], rounds: u32) {
        for (_, label) in examples {
            self.ensure_label(*label);
        }

        let num_labels = self.labels.len();
        let mut totals: Vec<Vec<f64>> = vec![vec![0.0; self.dim as usize]; num_labels];
        let mut updates = 0u64;

        let mut order: Vec<usize> = (0..examples.len()).collect();
        let mut rng = rand::thread_rng();

        for _ in 0..rounds.max(1) {
            order.shuffle(&mut rng);
            for &i in &order {
                let (features, label) = &examples[i];
                let gold_idx = self.ensure_label(*label);
                if gold_idx >= totals.len() {
                    totals.resize(self.labels.len(), vec![0.0; self.dim as usize]);
                }

                let mut best_idx = gold_idx;
                let mut best_score = f32::MIN;
                for (idx, w) in self.weights.iter().enumerate() {
                    let s = self.score(w, features);
                    if s > best_score {
                        best_score = s;
                        best_idx = idx;
                    }
                }

                if best_idx != gold_idx {
                    for &bit in &features.bits {
                        let i = bit as usize;
                        if i < self.dim as usize {
                            self.weights[gold_idx][i] += 1.0;
                            self.weights[best_idx][i] -= 1.0;
                        }
                    }
                }

                updates += 1;
                for (label_idx, total_row) in totals.iter_mut().enumerate() {
                    for (i, acc) in total_row.iter_mut().enumerate() {
                        *acc += self.weights[label_idx][i] as f64;
                    }
                }
            }
        }

        if updates > 0 {
            for (label_idx, total_row) in totals.iter().enumerate() {
                for (i, w) in self.weights[label_idx].iter_mut().enumerate() {
                    *w = (total_row[i] / updates as f64) as f32;
                }
            }
        }
    }
}

impl ActionClassifier for LinearClassifier {
    fn predict(&self, features: &FeatureVector) -> Option<i32> {
        self.weights
            .iter()
            .enumerate()
            .map(|(idx, w)| (idx, self.score(w, features)))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(idx, _)| self.labels[idx])
    }
}

/// Either shape a trained bucket can take.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BucketModel {
    Constant(ConstantClassifier),
    Linear(LinearClassifier),
}

impl ActionClassifier for BucketModel {
    fn predict(&self, features: &FeatureVector) -> Option<i32> {
        match self {
            BucketModel::Constant(c) => c.predict(features),
            BucketModel::Linear(l) => l.predict(features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(bits: &[u32], dim: u32) -> FeatureVector {
        FeatureVector { bits: bits.to_vec(), dim }
    }

    #[test]
    fn constant_classifier_always_predicts_its_code() {
        let c = ConstantClassifier { action_code: 3 };
        assert_eq!(c.predict(&fv(&[], 4)), Some(3));
        assert_eq!(c.predict(&fv(&[1, 2], 4)), Some(3));
    }

    #[test]
    fn linear_classifier_separates_disjoint_feature_sets() {
        let examples = vec![
            (fv(&[0], 4), 10),
            (fv(&[0], 4), 10),
            (fv(&[1], 4), 20),
            (fv(&[1], 4), 20),
        ];
        let mut model = LinearClassifier::new(4);
        model.train(&examples, 10);

        assert_eq!(model.predict(&fv(&[0], 4)), Some(10));
        assert_eq!(model.predict(&fv(&[1], 4)), Some(20));
    }
}
