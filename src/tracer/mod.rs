//! Mutable state holders, one per visualization kind.
//!
//! A driver owns one primary tracer (and optionally an [`AuxPanelTracer`]),
//! mutates it while the algorithm runs and calls `snapshot` whenever a frame
//! should be recorded. Snapshots never share storage with the tracer.

pub mod array;
pub mod aux_panel;
pub mod board;
pub mod dsu;
pub mod graph;
pub mod trie;

pub use array::Array1DTracer;
pub use aux_panel::{combine_step, AuxPanelTracer};
pub use board::Board2DTracer;
pub use dsu::DsuTracer;
pub use graph::GraphTracer;
pub use trie::TrieTracer;
