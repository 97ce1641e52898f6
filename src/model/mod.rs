//! # Index Model
//!
//! Plain data shared by every layer: the net being indexed, the tasks
//! derived from its labels, and the index lifecycle.
//!
//! Design rule: no I/O and no collaborator handles here.

pub mod net;
pub mod task;
pub mod status;

pub use net::{Flow, Marking, NetId, NetSystem, PlaceId, Transition, TransitionId};
pub use task::{LabelClass, Task, TaskId};
pub use status::{IndexStatus, IndexType};
