use crate::error::Result;
use ndarray::ArrayView2;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Label used by model metadata for class slots with no category
pub const EMPTY_LABEL: &str = "--";

#[derive(Deserialize)]
struct ClassList {
    labels: Vec<String>,
}

/// Class id to label map read from model metadata
#[derive(Clone, Debug)]
pub struct ClassLabels {
    /// Raw class count, including empty slots
    num_classes: usize,
    ids_to_labels: BTreeMap<usize, String>,
}

impl ClassLabels {
    /// Parse `{"labels": [...]}`, dropping the empty `"--"` slots
    pub fn from_json(json: &str) -> Result<Self> {
        let list: ClassList = serde_json::from_str(json)?;
        Ok(Self::from_labels(list.labels))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_labels(labels: Vec<String>) -> Self {
        let num_classes = labels.len();
        let ids_to_labels = labels
            .into_iter()
            .enumerate()
            .filter(|(_, label)| label != EMPTY_LABEL)
            .collect();
        Self {
            num_classes,
            ids_to_labels,
        }
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn label(&self, class_id: i32) -> Option<&str> {
        let id = usize::try_from(class_id).ok()?;
        self.ids_to_labels.get(&id).map(String::as_str)
    }

    /// Labels in class id order; empty slots render as `class N`
    pub fn to_vec(&self) -> Vec<String> {
        (0..self.num_classes)
            .map(|id| {
                self.ids_to_labels
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| format!("class {id}"))
            })
            .collect()
    }
}

/// Pixel count per class id present in a class map
pub fn class_histogram(class_map: ArrayView2<'_, i32>) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for &id in class_map.iter() {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
}
