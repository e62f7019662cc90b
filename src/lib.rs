pub mod value;
pub mod error;
pub mod step;
pub mod log_buffer;
pub mod layout;
pub mod tracer;
pub mod theme;
pub mod writer;
pub mod reader;
pub mod config;
pub mod problem;
pub mod problems;

// Export frame model
pub use value::{NodeId, Value};
pub use step::{
    ArrayCell, ArrowDir, AuxPanel, AuxPanelItem, CellState, DsuNode, GraphEdge, GraphNode,
    Step, TrieEdge, TrieNode, Visual,
};

// Export tracers
pub use error::{Result, TracerError};
pub use layout::CycleLayering;
pub use tracer::{
    combine_step, Array1DTracer, AuxPanelTracer, Board2DTracer, DsuTracer, GraphTracer,
    TrieTracer,
};

// Export problem catalog
pub use problem::{run_problem, Params, Problem, ProblemInfo, ProblemRegistry, RendererType, RunOutput};

// Export step file I/O
pub use writer::{StepWriter, STEP_FILE_VERSION};
pub use reader::{read_steps, StepFile, StepFileFooter, StepFileHeader};

// Export palette and settings support
pub use theme::{Palette, PaletteColors, PaletteManager};
pub use config::StepgenConfig;
