//! Built-in reference problems, one per primary visualization kind.

pub mod bubble_sort;
pub mod equality_equations;
pub mod flood_fill;
pub mod implement_trie;
pub mod task_scheduler;

pub use bubble_sort::BubbleSort;
pub use equality_equations::EqualityEquations;
pub use flood_fill::FloodFill;
pub use implement_trie::ImplementTrie;
pub use task_scheduler::TaskScheduler;

use crate::problem::Problem;

/// Every built-in problem, in no particular order.
pub fn builtin() -> Vec<Box<dyn Problem>> {
    vec![
        Box::new(FloodFill),
        Box::new(TaskScheduler),
        Box::new(EqualityEquations),
        Box::new(ImplementTrie),
        Box::new(BubbleSort),
    ]
}
