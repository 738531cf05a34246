//! Top-k readout for image classifiers.

use std::cmp::Ordering;
use std::fmt;

/// Number of predictions shown by default
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    pub class_id: usize,
    pub label: String,
    pub probability: f32,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.2}", self.label, self.probability)
    }
}

/// The `k` most probable classes, highest first
///
/// Classes without a label are named `class N`. NaN probabilities sort last.
pub fn top_k(probabilities: &[f32], labels: &[String], k: usize) -> Vec<Prediction> {
    let mut ranked: Vec<(usize, f32)> = probabilities.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal),
    });

    ranked
        .into_iter()
        .take(k)
        .map(|(class_id, probability)| Prediction {
            class_id,
            label: labels
                .get(class_id)
                .cloned()
                .unwrap_or_else(|| format!("class {class_id}")),
            probability,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        ["cat", "dog", "car"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ranks_by_probability() {
        let preds = top_k(&[0.1, 0.7, 0.2], &labels(), 2);
        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0].label, "dog");
        assert_eq!(preds[1].label, "car");
        assert_eq!(preds[0].to_string(), "dog: 0.70");
    }

    #[test]
    fn missing_labels_and_nan() {
        let preds = top_k(&[f32::NAN, 0.3, 0.1, 0.6], &labels(), 4);
        assert_eq!(preds[0].label, "class 3");
        assert_eq!(preds[1].label, "dog");
        assert!(preds[3].probability.is_nan());
    }

    #[test]
    fn k_larger_than_classes() {
        assert_eq!(top_k(&[1.0], &labels(), DEFAULT_TOP_K).len(), 1);
        assert!(top_k(&[], &labels(), 3).is_empty());
    }
}
