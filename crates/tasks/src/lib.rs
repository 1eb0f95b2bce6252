//! Project tasks: scheduling, assignment and progress tracking.

pub mod task;

pub use task::{NewTask, Task, TaskId, TaskPatch, TaskStatus};
