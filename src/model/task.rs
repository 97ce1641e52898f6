//! Tasks and their label-similarity classes.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Identity assigned to a task by the label manager.
///
/// Ids below 1 mean the task could not be resolved; such tasks are
/// evaluated like any other but never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub i64);

impl TaskId {
    pub const UNRESOLVED: TaskId = TaskId(0);

    pub fn is_resolved(self) -> bool {
        self.0 >= 1
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of labels forming a task's equivalence class.
///
/// Stored sorted and deduplicated, so equality and hashing are set
/// semantics. Relation outcomes depend only on this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelClass(SmallVec<[String; 4]>);

impl LabelClass {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: SmallVec<[String; 4]> = labels.into_iter().map(Into::into).collect();
        labels.sort();
        labels.dedup();
        Self(labels)
    }

    pub fn singleton(label: impl Into<String>) -> Self {
        Self::new([label])
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.binary_search_by(|l| l.as_str().cmp(label)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for LabelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0.join(", "))
    }
}

/// A normalized activity identity: one label at one similarity threshold.
///
/// Built fresh for every indexing pass and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    label: String,
    similarity: f64,
    id: TaskId,
    similar_labels: LabelClass,
}

impl Task {
    /// Build a task. The own label is always part of its class.
    pub fn new(
        label: impl Into<String>,
        similarity: f64,
        id: TaskId,
        similar_labels: impl IntoIterator<Item = String>,
    ) -> Self {
        let label = label.into();
        let similar_labels =
            LabelClass::new(similar_labels.into_iter().chain(std::iter::once(label.clone())));
        Self { label, similarity, id, similar_labels }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn similar_labels(&self) -> &LabelClass {
        &self.similar_labels
    }

    /// Tasks with equal classes must yield identical relation outcomes.
    pub fn is_relation_equivalent(&self, other: &Task) -> bool {
        self.similar_labels == other.similar_labels
    }
}
