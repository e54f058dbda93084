//! Dependency-aware row generation.
//!
//! A row is built column by column from the type registry; primary keys are
//! then made unique and every foreign key is pointed at a row that exists,
//! creating that row first when its table is still empty.

pub mod context;
pub mod registry;
pub mod resolver;
pub mod synthesizer;

pub use context::GenerationContext;
pub use registry::value_for;
pub use resolver::{check_parent_cycles, resolve};
pub use synthesizer::synthesize;
