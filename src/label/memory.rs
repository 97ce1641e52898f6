//! In-memory label manager.
//!
//! Reference implementation of `LabelManager`. Similarity is token Jaccard
//! over lowercase alphanumeric tokens, so at threshold 1.0 two labels are
//! similar only when they consist of the same words.

use std::collections::BTreeSet;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::LabelManager;
use crate::config::{IndexConfig, validate_thresholds};
use crate::model::{Task, TaskId};
use crate::{Error, Result};

/// Token-set Jaccard similarity in `[0, 1]`.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() && tb.is_empty() {
        return if a.trim() == b.trim() { 1.0 } else { 0.0 };
    }
    let shared = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    shared as f64 / union as f64
}

fn tokens(label: &str) -> BTreeSet<String> {
    label
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn normalize(label: &str) -> Result<&str> {
    let label = label.trim();
    if label.is_empty() {
        return Err(Error::Label("empty label".into()));
    }
    Ok(label)
}

fn same_threshold(a: f64, b: f64) -> bool {
    a.total_cmp(&b).is_eq()
}

/// In-memory label registry.
#[derive(Clone)]
pub struct MemoryLabelManager {
    inner: Arc<RwLock<LabelRegistry>>,
    similarities: Vec<f64>,
    default_similarity: f64,
}

#[derive(Default)]
struct LabelRegistry {
    labels: BTreeSet<String>,
    task_labels: BTreeSet<String>,
    /// (label, threshold bits) → task id
    task_ids: HashMap<(String, u64), TaskId>,
    next_task_id: i64,
}

impl MemoryLabelManager {
    /// Index tasks at the given thresholds, each in `(0, 1]`.
    pub fn new(similarities: Vec<f64>) -> Result<Self> {
        validate_thresholds(&similarities)?;
        let mut similarities = similarities;
        similarities.sort_by(|a, b| b.total_cmp(a));
        similarities.dedup_by(|a, b| same_threshold(*a, *b));
        Ok(Self {
            inner: Arc::new(RwLock::new(LabelRegistry { next_task_id: 1, ..Default::default() })),
            similarities,
            default_similarity: 1.0,
        })
    }

    pub fn from_config(config: &IndexConfig) -> Result<Self> {
        config.validate()?;
        let mut mgr = Self::new(config.indexed_similarities.clone())?;
        mgr.default_similarity = config.default_similarity;
        Ok(mgr)
    }

    /// Threshold used by `query_task`.
    pub fn default_similarity(&self) -> f64 {
        self.default_similarity
    }

    /// The task a query naming only `label` refers to: the label at the
    /// default similarity, resolved against the indexed thresholds.
    pub fn query_task(&self, label: &str) -> Result<Task> {
        self.load_task(label, self.default_similarity, &self.similarities)
    }

    /// Id of the task for `label` at `similarity`, if registered.
    pub fn task_id(&self, label: &str, similarity: f64) -> Option<TaskId> {
        self.inner
            .read()
            .task_ids
            .get(&(label.trim().to_string(), similarity.to_bits()))
            .copied()
    }

    pub fn labels(&self) -> Vec<String> {
        self.inner.read().labels.iter().cloned().collect()
    }

    pub fn task_labels(&self) -> Vec<String> {
        self.inner.read().task_labels.iter().cloned().collect()
    }
}

impl LabelManager for MemoryLabelManager {
    fn index_label(&self, label: &str) -> Result<()> {
        let label = normalize(label)?;
        self.inner.write().labels.insert(label.to_string());
        Ok(())
    }

    fn index_task(&self, label: &str) -> Result<()> {
        let label = normalize(label)?;
        let mut reg = self.inner.write();
        reg.task_labels.insert(label.to_string());
        for sim in &self.similarities {
            let key = (label.to_string(), sim.to_bits());
            if !reg.task_ids.contains_key(&key) {
                let id = TaskId(reg.next_task_id);
                reg.next_task_id += 1;
                reg.task_ids.insert(key, id);
            }
        }
        Ok(())
    }

    fn indexed_similarities(&self) -> Result<Vec<f64>> {
        Ok(self.similarities.clone())
    }

    fn load_task(&self, label: &str, similarity: f64, indexed: &[f64]) -> Result<Task> {
        let label = normalize(label)?;
        let reg = self.inner.read();

        let similar: Vec<String> = reg
            .task_labels
            .iter()
            .filter(|other| jaccard_similarity(label, other) >= similarity)
            .cloned()
            .collect();

        let id = if indexed.iter().any(|s| same_threshold(*s, similarity)) {
            reg.task_ids
                .get(&(label.to_string(), similarity.to_bits()))
                .copied()
                .unwrap_or(TaskId::UNRESOLVED)
        } else {
            TaskId::UNRESOLVED
        };

        Ok(Task::new(label, similarity, id, similar))
    }
}
