pub mod critical_path;
pub mod priority_index;

pub use critical_path::{CriticalPath, CriticalPathPass};
pub use priority_index::PriorityIndex;
