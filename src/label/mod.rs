//! # Label Management
//!
//! The label manager owns activity labels: it registers them, assigns task
//! ids, and decides which labels are similar enough to form one class.
//! The index only consumes classes; it never compares labels itself.

pub mod memory;

pub use memory::{MemoryLabelManager, jaccard_similarity};

use crate::Result;
use crate::model::Task;

/// Label registry and similarity-class provider.
pub trait LabelManager: Send + Sync {
    /// Register a label for similarity search.
    fn index_label(&self, label: &str) -> Result<()>;

    /// Register a label as a task label, assigning task ids at every
    /// indexed similarity threshold.
    fn index_task(&self, label: &str) -> Result<()>;

    /// Thresholds the deployment indexes tasks at.
    fn indexed_similarities(&self) -> Result<Vec<f64>>;

    /// Build the task for `label` at `similarity`, with its class populated.
    ///
    /// A task whose threshold is not among `indexed` or whose label was
    /// never registered as a task comes back unresolved (id < 1).
    fn load_task(&self, label: &str, similarity: f64, indexed: &[f64]) -> Result<Task>;
}
