pub mod model;
pub mod sql_gen;
pub mod sqlite;

pub use model::*;
pub use sqlite::*;
