pub mod dependencies;
pub mod introspect;
pub mod types;

pub use dependencies::*;
pub use introspect::*;
pub use types::*;
